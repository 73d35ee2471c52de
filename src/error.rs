use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use thiserror::Error;

use crate::{processor::ProcessorError, response::ErrorResponse, store::StoreError};

pub const MISSING_FIELDS: &str = "Missing required fields";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStage {
    Initialization,
    Verification,
}

impl PaymentStage {
    pub fn failure_message(self) -> &'static str {
        match self {
            PaymentStage::Initialization => "Payment initialization failed. Please try again.",
            PaymentStage::Verification => "Payment verification failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid order details")]
    InvalidOrder,

    #[error("{}", .stage.failure_message())]
    Processor {
        stage: PaymentStage,
        #[source]
        source: ProcessorError,
    },

    #[error("Payment verification failed")]
    Persistence(#[from] StoreError),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn missing_fields() -> Self {
        AppError::Validation(MISSING_FIELDS.to_string())
    }

    pub fn processor(stage: PaymentStage) -> impl FnOnce(ProcessorError) -> Self {
        move |source| AppError::Processor { stage, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidOrder => StatusCode::BAD_REQUEST,
            AppError::Processor { .. } | AppError::Persistence(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::Validation(message) => ErrorResponse::error(message.clone()),
            AppError::InvalidOrder => ErrorResponse::message(self.to_string()),
            AppError::Processor { source, .. } => {
                tracing::error!(error = %source, detail = %source.detail(), "{}", self);
                ErrorResponse::upstream(self.to_string(), source.detail())
            }
            AppError::Persistence(source) => {
                tracing::error!(error = %source, "{}", self);
                ErrorResponse::upstream(self.to_string(), Value::String(source.to_string()))
            }
            AppError::Internal(source) => {
                tracing::error!(error = ?source, "unhandled error");
                ErrorResponse::upstream(self.to_string(), Value::String(self.to_string()))
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
