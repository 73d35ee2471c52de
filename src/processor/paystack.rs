use std::time::Duration;

use anyhow::{Context, bail};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use serde_json::Value;

use super::{
    InitializeTransaction, PaymentProcessor, PaymentSession, ProcessorError,
    TransactionVerification,
};

pub const DEFAULT_BASE_URL: &str = "https://api.paystack.co";

/// Paystack REST client. Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct PaystackClient {
    http: Client,
    base_url: Url,
    secret_key: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: bool,
    #[serde(default)]
    message: String,
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
    reference: String,
    amount: Option<i64>,
}

impl PaystackClient {
    pub fn new(
        base_url: &str,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid payment processor url {base_url}"))?;
        if base_url.cannot_be_a_base() {
            bail!("payment processor url {base_url} cannot be used as a base");
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build payment processor http client")?;
        Ok(Self {
            http,
            base_url,
            secret_key: secret_key.into(),
            timeout,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProcessorError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProcessorError::Malformed("base url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ProcessorError> {
        let response = request
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| self.transport_error(err))?;
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

        tracing::debug!(status = %status, body = %body, "paystack response");

        if !status.is_success() {
            return Err(ProcessorError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope = serde_json::from_value(body.clone())
            .map_err(|err| ProcessorError::Malformed(err.to_string()))?;
        if !envelope.status {
            tracing::warn!(message = %envelope.message, "paystack reported failure");
            return Err(ProcessorError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        envelope
            .data
            .ok_or_else(|| ProcessorError::Malformed("response has no data".into()))
    }

    fn transport_error(&self, err: reqwest::Error) -> ProcessorError {
        if err.is_timeout() {
            ProcessorError::Timeout(self.timeout)
        } else {
            ProcessorError::Transport(err)
        }
    }
}

#[async_trait]
impl PaymentProcessor for PaystackClient {
    async fn initialize(
        &self,
        request: InitializeTransaction,
    ) -> Result<PaymentSession, ProcessorError> {
        let url = self.endpoint(&["transaction", "initialize"])?;
        let data = self.send(self.http.post(url).json(&request)).await?;

        serde_json::from_value(data).map_err(|err| ProcessorError::Malformed(err.to_string()))
    }

    async fn verify(&self, reference: &str) -> Result<TransactionVerification, ProcessorError> {
        let url = self.endpoint(&["transaction", "verify", reference])?;
        let data = self.send(self.http.get(url)).await?;

        let parsed: VerifyData = serde_json::from_value(data.clone())
            .map_err(|err| ProcessorError::Malformed(err.to_string()))?;

        Ok(TransactionVerification {
            reference: parsed.reference,
            status: parsed.status,
            amount: parsed.amount,
            raw: data,
        })
    }
}
