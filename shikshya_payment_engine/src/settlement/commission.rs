//! Commission splits between the platform and instructors.
//!
//! The split always uses the commission rate captured **on the order** at sale time, never the live platform
//! rate, so settlement reports stay stable after a platform-wide rate change. The live rate is only a fallback
//! for orders that carry no snapshot.

use spg_common::Money;

use crate::db_types::Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionBreakdown {
    /// The platform's cut
    pub commission: Money,
    /// What the instructor is owed
    pub instructor_net: Money,
}

/// Split `amount` at `rate` percent, rounding the platform cut to the nearest paisa.
pub fn split(amount: Money, rate: f64) -> CommissionBreakdown {
    let commission = Money::from_paisa((amount.value() as f64 * rate / 100.0).round() as i64);
    CommissionBreakdown { commission, instructor_net: amount - commission }
}

/// The commission split for an order, falling back to `platform_default` only when the order carries no
/// snapshot.
pub fn for_order(order: &Order, platform_default: f64) -> CommissionBreakdown {
    let rate = order.commission_percentage.unwrap_or(platform_default);
    split(order.amount, rate)
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use spg_common::Money;

    use super::*;
    use crate::db_types::{OrderStatus, PaymentMethod};

    fn order_with_rate(rate: Option<f64>) -> Order {
        Order {
            id: 1,
            user_id: "user-1".to_string(),
            course_id: "course-1".to_string(),
            amount: Money::from_rupees(1000),
            commission_percentage: rate,
            payment_method: PaymentMethod::Esewa,
            payment_reference: None,
            transaction_uuid: "abc123".to_string(),
            status: OrderStatus::Completed,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn split_rounds_to_nearest_paisa() {
        let breakdown = split(Money::from_paisa(999), 15.0);
        // 149.85 paisa rounds to 150
        assert_eq!(breakdown.commission, Money::from_paisa(150));
        assert_eq!(breakdown.instructor_net, Money::from_paisa(849));
    }

    #[test]
    fn snapshot_rate_survives_platform_rate_change() {
        let order = order_with_rate(Some(15.0));
        // The platform default has since been raised to 25% -- the order's frozen rate must win.
        let breakdown = for_order(&order, 25.0);
        assert_eq!(breakdown.commission, Money::from_rupees(150));
        assert_eq!(breakdown.instructor_net, Money::from_rupees(850));
    }

    #[test]
    fn missing_snapshot_falls_back_to_platform_default() {
        let order = order_with_rate(None);
        let breakdown = for_order(&order, 25.0);
        assert_eq!(breakdown.commission, Money::from_rupees(250));
        assert_eq!(breakdown.instructor_net, Money::from_rupees(750));
    }

    #[test]
    fn commission_and_net_always_sum_to_amount() {
        for rate in [0.0, 7.5, 15.0, 33.3, 100.0] {
            let breakdown = split(Money::from_paisa(123_457), rate);
            assert_eq!(breakdown.commission + breakdown.instructor_net, Money::from_paisa(123_457));
        }
    }
}
