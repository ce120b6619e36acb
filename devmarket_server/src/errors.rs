use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use devmarket_engine::traits::{MessagingError, OrderFlowError, ReviewError, UserApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Request rejected. {0}")]
    Rejected(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::Rejected(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::UNAUTHORIZED,
            },
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
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

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided.")]
    MissingToken,
    #[error("Access token signature is invalid. {0}")]
    ValidationError(String),
    #[error("Access token has expired.")]
    TokenExpired,
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            OrderFlowError::OrderNotFound(_) | OrderFlowError::GigNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderFlowError::Forbidden(_) => Self::InsufficientPermissions(e.to_string()),
            OrderFlowError::InvalidTransition { .. } |
            OrderFlowError::CannotOrderOwnGig |
            OrderFlowError::PaymentAlreadySubmitted(_) => Self::Rejected(e.to_string()),
        }
    }
}

impl From<MessagingError> for ServerError {
    fn from(e: MessagingError) -> Self {
        match e {
            MessagingError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            MessagingError::RecipientNotFound(_) | MessagingError::OrderNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
            MessagingError::EmptyMessage => Self::InvalidRequestBody(e.to_string()),
        }
    }
}

impl From<ReviewError> for ServerError {
    fn from(e: ReviewError) -> Self {
        match e {
            ReviewError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            ReviewError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            ReviewError::NotAParticipant => Self::InsufficientPermissions(e.to_string()),
            ReviewError::OrderNotCompleted | ReviewError::AlreadyReviewed | ReviewError::InvalidRating(_) => {
                Self::Rejected(e.to_string())
            },
        }
    }
}

impl From<UserApiError> for ServerError {
    fn from(e: UserApiError) -> Self {
        match e {
            UserApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            UserApiError::UserNotFound(_) | UserApiError::GigNotFound(_) => Self::NoRecordFound(e.to_string()),
            UserApiError::EmailInUse(_) => Self::Rejected(e.to_string()),
            UserApiError::InvalidProfile(_) => Self::InvalidRequestBody(e.to_string()),
        }
    }
}
