use log::*;
use spg_common::Secret;

pub const KHALTI_LOOKUP_URL: &str = "https://a.khalti.com/api/v2/epayment/lookup/";

#[derive(Debug, Clone, Default)]
pub struct EsewaConfig {
    /// The merchant product code registered with eSewa. Part of the signed message on every callback.
    pub product_code: String,
    /// The shared secret used to verify the HMAC-SHA256 signature on redirect payloads.
    pub secret_key: Secret<String>,
}

impl EsewaConfig {
    pub fn new_from_env_or_default() -> Self {
        let product_code = std::env::var("SPG_ESEWA_PRODUCT_CODE").unwrap_or_else(|_| {
            warn!("SPG_ESEWA_PRODUCT_CODE not set, using the UAT default, EPAYTEST");
            "EPAYTEST".to_string()
        });
        let secret_key = Secret::new(std::env::var("SPG_ESEWA_SECRET_KEY").unwrap_or_else(|_| {
            warn!("SPG_ESEWA_SECRET_KEY not set, using the published UAT key. Do not run production like this.");
            "8gBm/:&EnhH.1/q".to_string()
        }));
        Self { product_code, secret_key }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KhaltiConfig {
    /// The server-held API key, sent as `Authorization: Key <secret>` on lookup calls.
    pub secret_key: Secret<String>,
    pub lookup_url: String,
}

impl KhaltiConfig {
    pub fn new_from_env_or_default() -> Self {
        let secret_key = Secret::new(std::env::var("SPG_KHALTI_SECRET_KEY").unwrap_or_else(|_| {
            warn!("SPG_KHALTI_SECRET_KEY not set, using (probably useless) default");
            "test_secret_key_00000000000000".to_string()
        }));
        let lookup_url = std::env::var("SPG_KHALTI_LOOKUP_URL").unwrap_or_else(|_| KHALTI_LOOKUP_URL.to_string());
        Self { secret_key, lookup_url }
    }
}
