use thiserror::Error;

use crate::traits::StorageError;

#[derive(Debug, Clone, Error)]
pub enum SettlementError {
    /// No correlation strategy produced any candidate orders for this payment. Nothing was mutated.
    #[error("No matching order was found for this payment")]
    NoMatchingOrder,
    /// Orders were resolved, but every per-order settlement attempt failed. Safe to retry.
    #[error("No orders could be settled for this payment")]
    NothingSettled,
    #[error("{0}")]
    StorageError(#[from] StorageError),
}
