//! Shikshya Payment Engine
//!
//! The settlement core of the Shikshya course marketplace. Checkout (out of scope here) creates a batch of
//! `Pending` orders sharing a `transaction_uuid` and redirects the buyer to a wallet provider; once a gateway
//! adapter has normalised the provider's callback into a
//! [`VerifiedPayment`](wallet_gateways::VerifiedPayment), this crate takes over:
//!
//! 1. The **correlation resolver** maps the payment back to the pending orders it settles, surviving mangled
//!    redirect URLs and lost client state by falling back through three lookup strategies.
//! 2. The **reconciler** transitions each resolved order `Pending → Completed` exactly once, grants the
//!    enrollment if it is absent, and clears the cart item. Every mutation is a conditional write, so replays
//!    (the user mashing refresh on the success page) and concurrent double-invocations are safe.
//! 3. The **commission calculator** computes the platform/instructor split from the commission rate frozen on
//!    the order at sale time.
//!
//! Storage access goes through the [`SettlementDatabase`] trait; the bundled SQLite backend lives behind the
//! `sqlite` feature. The engine holds no in-process shared mutable state: all idempotency comes from
//! conditional writes at the storage layer.

pub mod db_types;
pub mod settlement;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use settlement::{api::SettlementApi, commission, SettlementError, SettlementOutcome};
pub use traits::{SettlementDatabase, StorageError};
