//! The public API of the settlement engine: correlation resolution, reconciliation and commission splits.

pub mod api;
pub mod commission;
mod errors;

pub use api::{SettlementApi, SettlementOutcome};
pub use errors::SettlementError;
