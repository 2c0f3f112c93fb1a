use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use spg_common::Money;
use sqlx::{FromRow, Type};
use thiserror::Error;
use wallet_gateways::Provider;

//--------------------------------------    OrderStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatus {
    /// The order has been created at checkout and no verified payment has settled it yet.
    Pending,
    /// A verified payment has settled the order. Terminal and absorbing: re-observing a completed order
    /// during reconciliation is a no-op, never an error.
    Completed,
    /// The order was marked as failed by an operator. Never set by the reconciler.
    Failed,
    /// The payment was refunded after settlement.
    Refunded,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Completed => write!(f, "Completed"),
            OrderStatus::Failed => write!(f, "Failed"),
            OrderStatus::Refunded => write!(f, "Refunded"),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatus::Pending
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Completed" => Ok(Self::Completed),
            "Failed" => Ok(Self::Failed),
            "Refunded" => Ok(Self::Refunded),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------   PaymentMethod     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentMethod {
    Esewa,
    Khalti,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Esewa => write!(f, "Esewa"),
            PaymentMethod::Khalti => write!(f, "Khalti"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "esewa" => Ok(Self::Esewa),
            "khalti" => Ok(Self::Khalti),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

impl From<Provider> for PaymentMethod {
    fn from(value: Provider) -> Self {
        match value {
            Provider::Esewa => Self::Esewa,
            Provider::Khalti => Self::Khalti,
        }
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
/// A requested purchase of one course by one user. A cart checkout creates one row per course, all sharing a
/// `transaction_uuid`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: String,
    pub course_id: String,
    /// The price at time of order, in paisa. May differ from the course's live price.
    pub amount: Money,
    /// Snapshot of the platform commission rate at time of order. `None` falls back to the current platform
    /// setting when commission is computed.
    pub commission_percentage: Option<f64>,
    pub payment_method: PaymentMethod,
    /// The provider-assigned transaction reference. Populated when the order completes.
    pub payment_reference: Option<String>,
    /// The client-generated batch correlation key shared by all orders created in one checkout.
    pub transaction_uuid: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: String,
    pub course_id: String,
    /// The price at time of order, in paisa
    pub amount: Money,
    /// Snapshot of the platform commission rate, if one was captured at checkout
    pub commission_percentage: Option<f64>,
    pub payment_method: PaymentMethod,
    /// The batch correlation key for this checkout
    pub transaction_uuid: String,
    /// A provider payment reference known at checkout-initiation time (Khalti's `pidx`)
    pub payment_reference: Option<String>,
}

impl NewOrder {
    pub fn new<S1, S2, S3>(user_id: S1, course_id: S2, amount: Money, method: PaymentMethod, txn_uuid: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            user_id: user_id.into(),
            course_id: course_id.into(),
            amount,
            commission_percentage: None,
            payment_method: method,
            transaction_uuid: txn_uuid.into(),
            payment_reference: None,
        }
    }

    pub fn with_commission(mut self, percentage: f64) -> Self {
        self.commission_percentage = Some(percentage);
        self
    }

    /// Record the provider payment reference at checkout-initiation time. Khalti hands out the `pidx` before
    /// the redirect, and storing it on the order gives the resolver its second correlation strategy.
    pub fn with_payment_reference<S: Into<String>>(mut self, reference: S) -> Self {
        self.payment_reference = Some(reference.into());
        self
    }
}

//--------------------------------------     Enrollment      ---------------------------------------------------------
/// Grants a user access to a course. At most one row per (user, course); creation is always conditional on
/// absence.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub user_id: String,
    pub course_id: String,
    pub enrolled_at: DateTime<Utc>,
}

//--------------------------------------      CartItem       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub user_id: String,
    pub course_id: String,
    pub created_at: DateTime<Utc>,
}
