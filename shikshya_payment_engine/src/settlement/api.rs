use std::fmt::Debug;

use log::*;
use serde::{Deserialize, Serialize};
use spg_common::Money;
use wallet_gateways::VerifiedPayment;

use crate::{
    db_types::{Order, OrderStatus},
    settlement::{commission, commission::CommissionBreakdown, SettlementError},
    traits::{SettlementDatabase, StorageError},
};

/// Resolved order totals may drift from the provider-reported amount by up to one rupee before a warning is
/// logged. eSewa reports whole-rupee amounts, so sub-rupee drift is expected.
const AMOUNT_TOLERANCE_PAISA: i64 = 100;

/// The result of reconciling one verified payment against its resolved orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementOutcome {
    /// Every course that is (now or already) completed among the resolved orders. The success page uses this
    /// to decide between single-course and multi-course messaging.
    pub course_ids: Vec<String>,
    /// Enrollments actually created by this invocation (zero on a pure replay).
    pub enrolled_count: usize,
    /// Orders transitioned `Pending → Completed` by this invocation.
    pub settled_count: usize,
}

/// `SettlementApi` is the primary API for turning a verified wallet payment into completed orders and
/// enrollments.
///
/// It is deliberately stateless between invocations: each call is a request-scoped flow whose only suspension
/// points are storage operations, and whose safety under replays and concurrent double-invocation comes
/// entirely from the conditional-write semantics of [`SettlementDatabase`].
pub struct SettlementApi<B> {
    db: B,
}

impl<B> Debug for SettlementApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SettlementApi")
    }
}

impl<B> SettlementApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> SettlementApi<B>
where B: SettlementDatabase
{
    /// Map a verified payment back to the set of orders it settles.
    ///
    /// Three strategies are tried in priority order, stopping at the first non-empty result:
    /// 1. The batch correlation key (`transaction_uuid`) recorded at checkout.
    /// 2. The provider payment reference stored on the order at checkout-initiation time (Khalti's pidx).
    /// 3. All of the user's pending orders for the payment's provider, most recent first. This tolerates
    ///    redirect URLs that lost their query parameters and clients that lost their session state.
    ///
    /// If every strategy comes up empty the payment cannot be attributed and [`SettlementError::NoMatchingOrder`]
    /// is returned without touching any state.
    pub async fn resolve_orders(&self, user_id: &str, payment: &VerifiedPayment) -> Result<Vec<Order>, SettlementError> {
        for key in payment.correlation_keys() {
            let orders = self.db.fetch_orders_by_transaction_uuid(user_id, key).await?;
            if !orders.is_empty() {
                debug!("🔗️ {} orders matched batch key [{key}] for user [{user_id}]", orders.len());
                self.check_amount(payment, &orders);
                return Ok(orders);
            }
        }
        for key in payment.correlation_keys() {
            let orders = self.db.fetch_orders_by_payment_reference(user_id, key).await?;
            if !orders.is_empty() {
                debug!("🔗️ {} orders matched payment reference [{key}] for user [{user_id}]", orders.len());
                self.check_amount(payment, &orders);
                return Ok(orders);
            }
        }
        let orders = self.db.fetch_pending_orders(user_id, payment.provider.into()).await?;
        if orders.is_empty() {
            warn!(
                "🔗️ No orders matched any correlation strategy for user [{user_id}] and payment [{}]",
                payment.provider_reference
            );
            return Err(SettlementError::NoMatchingOrder);
        }
        warn!(
            "🔗️ Neither correlation key resolved for user [{user_id}]. Falling back to their {} most recent pending \
             {} orders.",
            orders.len(),
            payment.provider
        );
        self.check_amount(payment, &orders);
        Ok(orders)
    }

    fn check_amount(&self, payment: &VerifiedPayment, orders: &[Order]) {
        let total: Money = orders.iter().map(|o| o.amount).sum();
        if total.abs_diff(payment.amount).value() > AMOUNT_TOLERANCE_PAISA {
            warn!(
                "⚖️ Amount mismatch: resolved orders total {total}, but {} reported {} for [{}]. Settling anyway.",
                payment.provider, payment.amount, payment.provider_reference
            );
        }
    }

    /// Reconcile a verified payment against its resolved orders.
    ///
    /// Each order is settled independently: complete it (at most once), grant the enrollment if absent, and
    /// clear the cart item. Orders are independent and commutative, so processing order does not matter. A
    /// storage failure on one order is logged and skipped; the remaining orders still settle, and the failed
    /// one stays `Pending` for the next replay.
    ///
    /// Already-completed orders mutate nothing but are still reported in `course_ids` -- "already enrolled"
    /// is success, not failure.
    pub async fn settle_orders(
        &self,
        user_id: &str,
        payment: &VerifiedPayment,
        orders: &[Order],
    ) -> Result<SettlementOutcome, SettlementError> {
        let mut outcome = SettlementOutcome::default();
        for order in orders {
            match self.settle_order(user_id, payment, order).await {
                Ok(Some(settled)) => {
                    outcome.course_ids.push(order.course_id.clone());
                    if settled.newly_completed {
                        outcome.settled_count += 1;
                    }
                    if settled.newly_enrolled {
                        outcome.enrolled_count += 1;
                    }
                },
                Ok(None) => {},
                Err(e) => {
                    warn!("⚖️ Could not settle order #{}: {e}. Continuing with the remaining orders.", order.id);
                },
            }
        }
        if outcome.course_ids.is_empty() {
            return Err(SettlementError::NothingSettled);
        }
        debug!(
            "⚖️ Payment [{}] reconciled for user [{user_id}]: {} courses, {} newly settled, {} newly enrolled",
            payment.provider_reference,
            outcome.course_ids.len(),
            outcome.settled_count,
            outcome.enrolled_count
        );
        Ok(outcome)
    }

    /// Settle a single order. Returns `None` if the order is in a terminal non-completed state and must not be
    /// settled (it is then also left out of the reported course ids).
    async fn settle_order(
        &self,
        user_id: &str,
        payment: &VerifiedPayment,
        order: &Order,
    ) -> Result<Option<SettledOrder>, StorageError> {
        let newly_completed = match order.status {
            OrderStatus::Completed => {
                trace!("⚖️ Order #{} is already completed. Replay detected.", order.id);
                false
            },
            OrderStatus::Pending => {
                match self.db.complete_order(order.id, &payment.provider_reference).await? {
                    Some(_) => true,
                    None => {
                        // The status guard failed: a concurrent invocation completed the order, or an
                        // operator moved it to a terminal state after it was resolved. Re-read to decide.
                        let current = self
                            .db
                            .fetch_order_by_id(order.id)
                            .await?
                            .ok_or(StorageError::OrderIdNotFound(order.id))?;
                        if current.status != OrderStatus::Completed {
                            warn!("⚖️ Order #{} is {} and cannot be settled. Skipping.", order.id, current.status);
                            return Ok(None);
                        }
                        trace!("⚖️ Order #{} was completed by a concurrent invocation.", order.id);
                        false
                    },
                }
            },
            status => {
                warn!("⚖️ Order #{} is {status} and cannot be settled. Skipping.", order.id);
                return Ok(None);
            },
        };
        // Run the enrollment check even on the replay path: it repairs a crash that landed between
        // completing the order and granting access, and it is a no-op otherwise.
        let newly_enrolled = self.db.enroll_if_absent(user_id, &order.course_id).await?;
        let _ = self.db.remove_cart_item(user_id, &order.course_id).await?;
        Ok(Some(SettledOrder { newly_completed, newly_enrolled }))
    }

    /// Convenience wrapper: resolve the orders for a verified payment and reconcile them in one call.
    pub async fn resolve_and_settle(
        &self,
        user_id: &str,
        payment: &VerifiedPayment,
    ) -> Result<SettlementOutcome, SettlementError> {
        let orders = self.resolve_orders(user_id, payment).await?;
        self.settle_orders(user_id, payment, &orders).await
    }

    /// The platform/instructor split for an order, consulting the live platform rate only when the order has
    /// no snapshot.
    pub async fn commission_for(&self, order: &Order) -> Result<CommissionBreakdown, SettlementError> {
        let rate = match order.commission_percentage {
            Some(rate) => rate,
            None => self.db.platform_commission_rate().await?,
        };
        Ok(commission::split(order.amount, rate))
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

struct SettledOrder {
    newly_completed: bool,
    newly_enrolled: bool,
}
