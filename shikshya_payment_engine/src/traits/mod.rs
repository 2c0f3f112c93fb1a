//! Storage behaviour required by the settlement engine.
//!
//! The engine expresses idempotency as read-then-conditional-write sequences; backends must make the
//! conditional part real. Concretely, [`SettlementDatabase::complete_order`] must be a compare-and-set on the
//! `Pending` status, and [`SettlementDatabase::enroll_if_absent`] must lean on a uniqueness constraint, so
//! that concurrent invocations cannot double-enroll or resurrect a settled order.

mod settlement_database;

pub use settlement_database::{SettlementDatabase, StorageError};
