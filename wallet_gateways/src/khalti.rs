//! The Khalti adapter.
//!
//! Khalti does not sign its redirects. The redirect only carries an opaque payment index (`pidx`) which must be
//! looked up against Khalti's server-side API, authenticated with a secret key, before anything about the
//! payment can be trusted.

use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};

use crate::{
    data_objects::{KhaltiLookup, Provider, RecoveryContext, VerifiedPayment},
    GatewayError,
    KhaltiConfig,
};

/// The provider status value that indicates a successful payment.
const KHALTI_STATUS_COMPLETED: &str = "Completed";
/// Lookup calls that hang past this are treated as terminal failures. Retrying is the caller's business.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct KhaltiApi {
    config: KhaltiConfig,
    client: Arc<Client>,
}

impl KhaltiApi {
    pub fn new(config: KhaltiConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::with_capacity(2);
        let val = HeaderValue::from_str(&format!("Key {}", config.secret_key.reveal()))
            .map_err(|e| GatewayError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(LOOKUP_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// Look up the payment state for a `pidx` against Khalti's epayment API.
    pub async fn lookup(&self, pidx: &str) -> Result<KhaltiLookup, GatewayError> {
        trace!("💳️ Sending Khalti lookup for pidx {pidx}");
        let body = serde_json::json!({ "pidx": pidx });
        let response = self
            .client
            .post(&self.config.lookup_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::LookupRequestError(e.to_string()))?;
        if response.status().is_success() {
            response.json::<KhaltiLookup>().await.map_err(|e| GatewayError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayError::LookupRequestError(e.to_string()))?;
            Err(GatewayError::LookupQueryError { status, message })
        }
    }

    /// Verify a Khalti payment and normalise it into a [`VerifiedPayment`].
    ///
    /// The `pidx` may come from the redirect query parameters, or be recovered from the client's
    /// [`RecoveryContext`] when the redirect was malformed. No pidx from any source is a hard failure.
    pub async fn verify(
        &self,
        pidx: Option<&str>,
        purchase_order_id: Option<&str>,
        recovery: Option<&RecoveryContext>,
    ) -> Result<VerifiedPayment, GatewayError> {
        let recovered = recovery.and_then(|r| r.pidx.as_deref());
        let pidx = match pidx.filter(|p| !p.is_empty()).or(recovered) {
            Some(p) => p,
            None => {
                warn!("💳️ Khalti redirect carried no pidx and none could be recovered from client state");
                return Err(GatewayError::PaymentMethodNotDetected);
            },
        };
        let lookup = self.lookup(pidx).await?;
        if lookup.status != KHALTI_STATUS_COMPLETED {
            return Err(GatewayError::VerificationFailed(format!(
                "Khalti reports payment status '{}' for pidx {pidx}",
                lookup.status
            )));
        }
        let provider_reference = lookup.transaction_id.clone().unwrap_or_else(|| pidx.to_string());
        debug!("💳️ Khalti payment [{provider_reference}] verified for {} paisa", lookup.total_amount);
        Ok(VerifiedPayment {
            provider: Provider::Khalti,
            amount: lookup.total_amount.into(),
            provider_reference,
            correlation_key: pidx.to_string(),
            secondary_key: purchase_order_id.map(String::from),
        })
    }
}
