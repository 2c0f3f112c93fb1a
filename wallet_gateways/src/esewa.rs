//! The eSewa adapter.
//!
//! eSewa delivers payment results as a redirect carrying a single `data` query parameter: a base64-encoded JSON
//! document with the batch correlation uuid, the paid amount, the provider's transaction code and an
//! HMAC-SHA256 signature over a canonical subset of the fields.
//!
//! A signature mismatch is logged but does not block settlement; the provider's own `status` field is treated
//! as authoritative. Signature failures have been observed on legitimate callbacks, so enforcing them strictly
//! would strand real payments. This is a known risk that is deliberately preserved.

use hmac::{Hmac, Mac};
use log::*;
use sha2::Sha256;
use spg_common::Money;

use crate::{
    data_objects::{EsewaCallback, Provider, VerifiedPayment},
    EsewaConfig,
    GatewayError,
};

/// The provider status value that indicates a successful payment.
const ESEWA_STATUS_COMPLETE: &str = "COMPLETE";

pub struct EsewaGateway {
    config: EsewaConfig,
}

impl EsewaGateway {
    pub fn new(config: EsewaConfig) -> Self {
        Self { config }
    }

    /// Decode the base64 `data` parameter into an [`EsewaCallback`].
    pub fn decode_callback(&self, data: &str) -> Result<EsewaCallback, GatewayError> {
        let raw = base64::decode(data.trim())
            .map_err(|e| GatewayError::MalformedPayload(format!("Invalid base64 in eSewa data parameter: {e}")))?;
        let callback = serde_json::from_slice::<EsewaCallback>(&raw)
            .map_err(|e| GatewayError::MalformedPayload(format!("Invalid JSON in eSewa data parameter: {e}")))?;
        trace!("💳️ Decoded eSewa callback for batch {}", callback.transaction_uuid);
        Ok(callback)
    }

    /// Verify a decoded callback and normalise it into a [`VerifiedPayment`].
    pub fn verify(&self, callback: &EsewaCallback) -> Result<VerifiedPayment, GatewayError> {
        if !self.signature_matches(callback) {
            warn!(
                "💳️ eSewa signature mismatch for batch {}. Continuing on the provider status field.",
                callback.transaction_uuid
            );
        }
        if callback.status != ESEWA_STATUS_COMPLETE {
            return Err(GatewayError::VerificationFailed(format!(
                "eSewa reports payment status '{}' for batch {}",
                callback.status, callback.transaction_uuid
            )));
        }
        let amount = parse_esewa_amount(&callback.total_amount)?;
        debug!("💳️ eSewa payment [{}] verified for {amount}", callback.transaction_code);
        Ok(VerifiedPayment {
            provider: Provider::Esewa,
            amount,
            provider_reference: callback.transaction_code.clone(),
            correlation_key: callback.transaction_uuid.clone(),
            secondary_key: None,
        })
    }

    fn signature_matches(&self, callback: &EsewaCallback) -> bool {
        let Some(supplied) = callback.signature.as_deref() else {
            return false;
        };
        let message = signature_message(&callback.total_amount, &callback.transaction_uuid, &self.config.product_code);
        match calculate_signature(self.config.secret_key.reveal(), &message) {
            Ok(expected) => expected == supplied,
            Err(e) => {
                warn!("💳️ Could not calculate eSewa signature: {e}");
                false
            },
        }
    }
}

/// The canonical message eSewa signs on every callback.
pub fn signature_message(total_amount: &str, transaction_uuid: &str, product_code: &str) -> String {
    format!("total_amount={total_amount},transaction_uuid={transaction_uuid},product_code={product_code}")
}

/// HMAC-SHA256 over `message` with the shared secret, base64 encoded.
pub fn calculate_signature(secret: &str, message: &str) -> Result<String, GatewayError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| GatewayError::Initialization(format!("Invalid HMAC key: {e}")))?;
    mac.update(message.as_bytes());
    Ok(base64::encode(mac.finalize().into_bytes()))
}

/// Pull the base64 payload out of the redirect query parameters.
///
/// Normally the payload arrives in the `data` parameter. Some eSewa redirects URL-encode badly and the payload
/// ends up nested inside the `method` parameter value instead (`...?method=esewa?data=<payload>`), so that
/// variant is tolerated here.
pub fn extract_data_param(data: Option<&str>, method: Option<&str>) -> Option<String> {
    if let Some(data) = data {
        if !data.is_empty() {
            return Some(data.to_string());
        }
    }
    method.and_then(|m| m.split_once("data=")).map(|(_, payload)| payload.to_string()).filter(|p| !p.is_empty())
}

/// eSewa reports decimal rupee amounts, sometimes with thousands separators.
pub fn parse_esewa_amount(amount: &str) -> Result<Money, GatewayError> {
    let cleaned = amount.trim().replace(',', "");
    let mut parts = cleaned.split('.');
    let rupees = parts
        .next()
        .ok_or_else(|| GatewayError::InvalidCurrencyAmount(amount.to_string()))?
        .parse::<i64>()
        .map_err(|e| GatewayError::InvalidCurrencyAmount(format!("Invalid amount value: {amount}. {e}.")))?;
    let paisa = match parts.next() {
        None | Some("") => 0,
        Some(frac) => {
            // Normalise the fraction to exactly two digits: "5" is 50 paisa, "005" truncates to 0.
            let frac = frac.chars().chain(std::iter::repeat('0')).take(2).collect::<String>();
            frac.parse::<i64>()
                .map_err(|e| GatewayError::InvalidCurrencyAmount(format!("Invalid amount value: {amount}. {e}.")))?
        },
    };
    if parts.next().is_some() {
        return Err(GatewayError::InvalidCurrencyAmount(amount.to_string()));
    }
    Ok(Money::from_paisa(rupees * 100 + paisa))
}
