use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use school_fees_engine::PaymentFlowError;
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
    #[error("{0}")]
    PaymentError(#[from] PaymentFlowError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PaymentError(e) => match e {
                PaymentFlowError::InvalidAmount { .. } => StatusCode::BAD_REQUEST,
                PaymentFlowError::DuplicateStudents => StatusCode::BAD_REQUEST,
                PaymentFlowError::ExcessExamPayment { .. } => StatusCode::BAD_REQUEST,
                PaymentFlowError::FeeScheduleEmpty => StatusCode::BAD_REQUEST,
                PaymentFlowError::ParentNotFound(_) => StatusCode::NOT_FOUND,
                PaymentFlowError::StudentNotFound(_) => StatusCode::NOT_FOUND,
                PaymentFlowError::ExamFeeNotFound(_) => StatusCode::NOT_FOUND,
                PaymentFlowError::PaymentNotFound(_) => StatusCode::NOT_FOUND,
                PaymentFlowError::Conflict(_) => StatusCode::CONFLICT,
                PaymentFlowError::UpstreamError(_) => StatusCode::BAD_GATEWAY,
                PaymentFlowError::TransportError(_) => StatusCode::BAD_GATEWAY,
                PaymentFlowError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                PaymentFlowError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                PaymentFlowError::QueryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}
