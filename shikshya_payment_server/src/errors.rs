use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use shikshya_payment_engine::SettlementError;
use thiserror::Error;
use wallet_gateways::GatewayError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("User identity header missing or unreadable")]
    UnidentifiedUser,
    #[error("Payload deserialization error. {0}")]
    CouldNotDeserializePayload(String),
    #[error("Payment verification failed. {0}")]
    PaymentVerificationFailed(String),
    #[error("Payment verified, but no matching order was found. Contact support with your transaction reference.")]
    NoMatchingOrder,
    #[error("The payment provider could not be reached. {0}")]
    ProviderUnreachable(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnidentifiedUser => StatusCode::UNAUTHORIZED,
            Self::CouldNotDeserializePayload(_) => StatusCode::BAD_REQUEST,
            Self::PaymentVerificationFailed(_) => StatusCode::BAD_REQUEST,
            Self::NoMatchingOrder => StatusCode::NOT_FOUND,
            Self::ProviderUnreachable(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<GatewayError> for ServerError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::MalformedPayload(_) |
            GatewayError::PaymentMethodNotDetected |
            GatewayError::InvalidCurrencyAmount(_) => Self::CouldNotDeserializePayload(e.to_string()),
            GatewayError::VerificationFailed(_) => Self::PaymentVerificationFailed(e.to_string()),
            GatewayError::LookupRequestError(_) => Self::ProviderUnreachable(e.to_string()),
            GatewayError::LookupQueryError { .. } | GatewayError::JsonError(_) => {
                Self::PaymentVerificationFailed(e.to_string())
            },
            GatewayError::Initialization(_) => Self::InitializeError(e.to_string()),
        }
    }
}

impl From<SettlementError> for ServerError {
    fn from(e: SettlementError) -> Self {
        match e {
            SettlementError::NoMatchingOrder => Self::NoMatchingOrder,
            SettlementError::NothingSettled => Self::BackendError(e.to_string()),
            SettlementError::StorageError(e) => Self::BackendError(e.to_string()),
        }
    }
}
