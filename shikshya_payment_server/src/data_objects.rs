use serde::{Deserialize, Serialize};
use shikshya_payment_engine::SettlementOutcome;
use wallet_gateways::RecoveryContext;

/// Everything the success page managed to salvage from the provider redirect, forwarded verbatim.
///
/// Only `method` is required. Providers routinely mangle their own redirect URLs, so every other field is
/// optional and the server works out what it can from whatever arrived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    /// The payment method from the redirect query string. May itself contain a mangled eSewa payload
    /// (`"esewa?data=<base64>"`).
    pub method: String,
    /// eSewa's base64 `data` query parameter.
    #[serde(default)]
    pub data: Option<String>,
    /// Khalti's payment index from the redirect.
    #[serde(default)]
    pub pidx: Option<String>,
    /// Khalti echoes the purchase order id the checkout supplied. Used as a secondary correlation key.
    #[serde(default)]
    pub purchase_order_id: Option<String>,
    /// Client session state stashed before the redirect, for when the redirect loses its parameters.
    #[serde(default)]
    pub recovery: Option<RecoveryContext>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentResult {
    pub success: bool,
    pub course_ids: Vec<String>,
    pub message: String,
}

impl From<SettlementOutcome> for VerifyPaymentResult {
    fn from(outcome: SettlementOutcome) -> Self {
        let message = match outcome.course_ids.len() {
            1 => "Payment verified. You are now enrolled in your course.".to_string(),
            n => format!("Payment verified. You are now enrolled in {n} courses."),
        };
        Self { success: true, course_ids: outcome.course_ids, message }
    }
}
