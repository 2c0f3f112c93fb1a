use std::{fmt::Display, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use spg_common::Money;

use crate::GatewayError;

//--------------------------------------      Provider       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Esewa,
    Khalti,
}

impl Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Esewa => write!(f, "esewa"),
            Provider::Khalti => write!(f, "khalti"),
        }
    }
}

impl FromStr for Provider {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "esewa" => Ok(Self::Esewa),
            "khalti" => Ok(Self::Khalti),
            other => Err(GatewayError::MalformedPayload(format!("Unknown payment provider: {other}"))),
        }
    }
}

//--------------------------------------   VerifiedPayment    ---------------------------------------------------------
/// The normalised output of a gateway adapter. This is the only payment shape the settlement engine accepts.
///
/// A `VerifiedPayment` is constructed fresh for every verification call and discarded once reconciliation
/// completes or fails. It is never persisted.
#[derive(Debug, Clone)]
pub struct VerifiedPayment {
    pub provider: Provider,
    /// The amount the provider reports as paid, normalised to paisa.
    pub amount: Money,
    /// The provider-assigned transaction reference (eSewa transaction code, Khalti transaction id).
    pub provider_reference: String,
    /// The best available key for finding the orders this payment settles: the batch `transaction_uuid`
    /// for eSewa, or the `pidx` for Khalti.
    pub correlation_key: String,
    /// A second correlation candidate, when the redirect supplied one (Khalti's `purchase_order_id`).
    pub secondary_key: Option<String>,
}

impl VerifiedPayment {
    /// All correlation keys worth trying, in priority order.
    pub fn correlation_keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.correlation_key.as_str()).chain(self.secondary_key.as_deref())
    }
}

//--------------------------------------   RecoveryContext    ---------------------------------------------------------
/// Client-side state recovered from the frontend's session storage.
///
/// Provider redirects are not always well formed; when the query string loses the `pidx` (or the method
/// entirely), the success page sends along whatever it stashed before redirecting to the provider. Passing this
/// in explicitly keeps the fallback path testable instead of burying it in ambient state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecoveryContext {
    pub pidx: Option<String>,
    pub method: Option<Provider>,
}

//--------------------------------------    EsewaCallback     ---------------------------------------------------------
/// The decoded JSON payload eSewa embeds in its redirect `data` query parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct EsewaCallback {
    pub transaction_uuid: String,
    pub status: String,
    /// A decimal rupee amount. eSewa formats this inconsistently: sometimes a JSON number, sometimes a
    /// string with thousands separators ("1,500.0").
    #[serde(deserialize_with = "string_or_number")]
    pub total_amount: String,
    pub transaction_code: String,
    pub product_code: Option<String>,
    pub signed_field_names: Option<String>,
    pub signature: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where D: Deserializer<'de> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("expected a string or number, got {other}"))),
    }
}

//--------------------------------------     KhaltiLookup     ---------------------------------------------------------
/// The response from Khalti's epayment lookup endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct KhaltiLookup {
    pub pidx: String,
    /// Amount in paisa, as reported by Khalti.
    pub total_amount: i64,
    pub status: String,
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub fee: i64,
    #[serde(default)]
    pub refunded: bool,
}
