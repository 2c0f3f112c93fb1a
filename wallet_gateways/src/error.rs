use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not decode provider payload: {0}")]
    MalformedPayload(String),
    #[error("Provider verification failed: {0}")]
    VerificationFailed(String),
    #[error("Payment method not detected")]
    PaymentMethodNotDetected,
    #[error("Lookup request failed: {0}")]
    LookupRequestError(String),
    #[error("Lookup failed. Error {status}. {message}")]
    LookupQueryError { status: u16, message: String },
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Invalid currency amount: {0}")]
    InvalidCurrencyAmount(String),
}
