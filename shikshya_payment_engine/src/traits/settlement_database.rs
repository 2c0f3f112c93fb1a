use thiserror::Error;

use crate::db_types::{Enrollment, NewOrder, Order, PaymentMethod};

/// This trait defines the storage behaviour for backends supporting the settlement engine.
///
/// This behaviour includes:
/// * Creating pending orders on behalf of checkout, and looking them up by the three correlation strategies.
/// * Completing orders with compare-and-set semantics.
/// * Granting enrollments with insert-if-absent semantics.
/// * Cart cleanup and the platform commission setting.
#[allow(async_fn_in_trait)]
pub trait SettlementDatabase {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a new pending order. This is the record checkout creates before redirecting the buyer to the
    /// wallet provider.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StorageError>;

    /// Fetches a single order by its internal id.
    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, StorageError>;

    /// Correlation strategy 1: all of the user's orders carrying the given batch correlation key.
    async fn fetch_orders_by_transaction_uuid(&self, user_id: &str, uuid: &str) -> Result<Vec<Order>, StorageError>;

    /// Correlation strategy 2: all of the user's orders whose stored provider payment reference matches.
    async fn fetch_orders_by_payment_reference(
        &self,
        user_id: &str,
        reference: &str,
    ) -> Result<Vec<Order>, StorageError>;

    /// Correlation strategy 3 (fallback): the user's pending orders for the given payment method, most
    /// recent first. Used only when neither structured key resolves.
    async fn fetch_pending_orders(&self, user_id: &str, method: PaymentMethod) -> Result<Vec<Order>, StorageError>;

    /// Transitions the order to `Completed` and records the provider reference, **only if** the order is
    /// currently `Pending`. Returns the updated order, or `None` if the guard did not hold (the order was
    /// already completed by a concurrent call, or is in a terminal state).
    ///
    /// This must execute as a single conditional write; it is the storage-level guarantee that
    /// `Pending → Completed` happens at most once.
    async fn complete_order(&self, id: i64, payment_reference: &str) -> Result<Option<Order>, StorageError>;

    /// Creates the enrollment for `(user_id, course_id)` if it does not exist. Returns `true` if a row was
    /// inserted, `false` if the enrollment was already present.
    ///
    /// Backends must enforce this with a uniqueness constraint so concurrent calls cannot both insert.
    async fn enroll_if_absent(&self, user_id: &str, course_id: &str) -> Result<bool, StorageError>;

    /// Fetches an enrollment, if present.
    async fn fetch_enrollment(&self, user_id: &str, course_id: &str) -> Result<Option<Enrollment>, StorageError>;

    /// Adds a course to the user's cart. Part of the checkout contract, and handy for tests.
    async fn add_cart_item(&self, user_id: &str, course_id: &str) -> Result<(), StorageError>;

    /// Removes the cart item for a settled course. Returns `false` (not an error) if it was absent.
    async fn remove_cart_item(&self, user_id: &str, course_id: &str) -> Result<bool, StorageError>;

    /// The platform's current default commission percentage. Only consulted for orders that carry no
    /// commission snapshot.
    async fn platform_commission_rate(&self) -> Result<f64, StorageError>;

    /// Updates the platform default commission percentage. Existing orders keep their snapshots.
    async fn set_platform_commission_rate(&self, rate: f64) -> Result<(), StorageError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("We have an internal database engine error: {0}")]
    DatabaseError(String),
    #[error("The requested order (internal id {0}) does not exist")]
    OrderIdNotFound(i64),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        StorageError::DatabaseError(e.to_string())
    }
}
