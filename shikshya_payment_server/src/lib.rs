//! The HTTP face of the Shikshya payment gateway.
//!
//! A single settlement endpoint, `POST /payments/verify`, receives whatever the provider redirect left the
//! success page with, verifies the payment against the relevant wallet provider, and hands the normalised
//! result to the settlement engine. Identity arrives as an `X-User-Id` header set by the authenticating
//! reverse proxy in front of this service; the endpoint never trusts a user id from the request body.

pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
