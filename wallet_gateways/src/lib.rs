//! Wallet gateway integrations.
//!
//! The Shikshya marketplace accepts payments through two Nepali wallet providers, and each one hands the result
//! of a payment back to us in a completely different shape:
//!
//! * **eSewa** redirects the buyer back with a base64-encoded JSON payload that carries an HMAC-SHA256 signature.
//!   Verification is local: decode, check the signature, and trust the embedded status field.
//! * **Khalti** redirects back with an opaque payment index (`pidx`) that must be looked up against Khalti's
//!   server-side API using a secret key before the payment can be trusted.
//!
//! Both adapters normalise their provider's response into a [`VerifiedPayment`], which is the only shape the
//! settlement engine ever sees. Unvalidated provider JSON never crosses this crate's boundary.

mod config;
mod error;
mod esewa;
mod khalti;

mod data_objects;

pub use config::{EsewaConfig, KhaltiConfig};
pub use data_objects::{EsewaCallback, KhaltiLookup, Provider, RecoveryContext, VerifiedPayment};
pub use error::GatewayError;
pub use esewa::{calculate_signature, extract_data_param, signature_message, EsewaGateway};
pub use khalti::KhaltiApi;
