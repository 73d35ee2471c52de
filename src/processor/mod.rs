use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod paystack;

pub use paystack::PaystackClient;

/// Status string the processor reports for a settled, successful charge.
pub const SUCCESS_STATUS: &str = "success";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitializeTransaction {
    pub email: String,
    /// Minor currency units.
    pub amount: i64,
    pub currency: String,
    pub callback_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub metadata: TransactionMetadata,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TransactionMetadata {
    pub custom_fields: Vec<CustomField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomField {
    pub display_name: String,
    pub variable_name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentSession {
    pub authorization_url: String,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionVerification {
    pub reference: String,
    pub status: String,
    pub amount: Option<i64>,
    /// Full `data` object returned by the processor.
    pub raw: Value,
}

impl TransactionVerification {
    pub fn is_successful(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("payment processor request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payment processor did not answer within {0:?}")]
    Timeout(Duration),

    #[error("payment processor rejected the request with status {status}")]
    Rejected { status: u16, body: Value },

    #[error("unexpected payment processor response: {0}")]
    Malformed(String),
}

impl ProcessorError {
    /// Upstream diagnostic payload surfaced to API callers: the processor's own
    /// response body when there is one, the error message otherwise.
    pub fn detail(&self) -> Value {
        match self {
            ProcessorError::Rejected { body, .. } => body.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

/// Hosted-checkout payment processor.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn initialize(
        &self,
        request: InitializeTransaction,
    ) -> Result<PaymentSession, ProcessorError>;

    async fn verify(&self, reference: &str) -> Result<TransactionVerification, ProcessorError>;
}
