#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use rust_decimal_macros::dec;
use serde_json::{Value, json};

use checkout_gateway::{
    config::AppConfig,
    dto::payments::{CreatePaymentIntentRequest, VerifyPaymentRequest},
    models::{CartItem, ShippingInfo},
    processor::{
        InitializeTransaction, PaymentProcessor, PaymentSession, ProcessorError,
        TransactionVerification,
    },
    state::{AppState, PaymentSettings},
    store::{DocumentStore, InsertOutcome, MemoryDocumentStore, StoreError},
};

pub const AUTHORIZATION_URL: &str = "https://checkout.paystack.com/0peioxfhpn";
pub const REFERENCE: &str = "7PVGX8MEk85tgeEpVDtD";

/// Processor double that records every call it receives.
pub struct FakeProcessor {
    verify_status: String,
    rejection: Option<(u16, Value)>,
    initialize_calls: Mutex<Vec<InitializeTransaction>>,
    verify_calls: Mutex<Vec<String>>,
}

impl FakeProcessor {
    pub fn with_status(status: &str) -> Self {
        Self {
            verify_status: status.to_string(),
            rejection: None,
            initialize_calls: Mutex::new(Vec::new()),
            verify_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::with_status("success")
    }

    pub fn rejecting(status: u16, body: Value) -> Self {
        Self {
            rejection: Some((status, body)),
            ..Self::succeeding()
        }
    }

    pub fn initialize_calls(&self) -> Vec<InitializeTransaction> {
        self.initialize_calls.lock().unwrap().clone()
    }

    pub fn verify_calls(&self) -> Vec<String> {
        self.verify_calls.lock().unwrap().clone()
    }

    fn rejected(&self) -> Result<(), ProcessorError> {
        match &self.rejection {
            Some((status, body)) => Err(ProcessorError::Rejected {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentProcessor for FakeProcessor {
    async fn initialize(
        &self,
        request: InitializeTransaction,
    ) -> Result<PaymentSession, ProcessorError> {
        self.initialize_calls.lock().unwrap().push(request);
        self.rejected()?;
        Ok(PaymentSession {
            authorization_url: AUTHORIZATION_URL.to_string(),
            reference: REFERENCE.to_string(),
        })
    }

    async fn verify(&self, reference: &str) -> Result<TransactionVerification, ProcessorError> {
        self.verify_calls.lock().unwrap().push(reference.to_string());
        self.rejected()?;
        Ok(TransactionVerification {
            reference: reference.to_string(),
            status: self.verify_status.clone(),
            amount: Some(2000),
            raw: json!({ "reference": reference, "status": self.verify_status }),
        })
    }
}

/// Store whose writes never finish.
pub struct StalledStore;

#[async_trait]
impl DocumentStore for StalledStore {
    async fn insert(&self, _collection: &str, _document: Value) -> Result<String, StoreError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("never".to_string())
    }

    async fn insert_with_key(
        &self,
        _collection: &str,
        _key: &str,
        _document: Value,
    ) -> Result<InsertOutcome, StoreError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(InsertOutcome::Created("never".to_string()))
    }
}

/// Store that fails every write.
pub struct BrokenStore;

#[async_trait]
impl DocumentStore for BrokenStore {
    async fn insert(&self, _collection: &str, _document: Value) -> Result<String, StoreError> {
        Err(sea_orm::DbErr::Custom("connection reset".into()).into())
    }

    async fn insert_with_key(
        &self,
        _collection: &str,
        _key: &str,
        _document: Value,
    ) -> Result<InsertOutcome, StoreError> {
        Err(sea_orm::DbErr::Custom("connection reset".into()).into())
    }
}

pub fn settings(idempotent_verification: bool) -> PaymentSettings {
    PaymentSettings {
        currency: "NGN".to_string(),
        callback_url: "http://localhost:4243/Payment-success".to_string(),
        store_timeout: Duration::from_millis(200),
        idempotent_verification,
    }
}

pub fn state(
    processor: Arc<FakeProcessor>,
    store: Arc<dyn DocumentStore>,
    idempotent_verification: bool,
) -> AppState {
    AppState::new(processor, store, settings(idempotent_verification))
}

pub fn memory_state(processor: Arc<FakeProcessor>) -> (AppState, Arc<MemoryDocumentStore>) {
    let store = Arc::new(MemoryDocumentStore::new());
    (state(processor, store.clone(), true), store)
}

pub fn shipping() -> ShippingInfo {
    ShippingInfo {
        name: "Ada Obi".to_string(),
        phone: "+2348012345678".to_string(),
        line1: "12 Allen Avenue".to_string(),
        city: "Ikeja".to_string(),
        country: "NG".to_string(),
    }
}

pub fn intent_request() -> CreatePaymentIntentRequest {
    CreatePaymentIntentRequest {
        items: Some(vec![CartItem::new(dec!(10), 2)]),
        email: Some("ada@example.com".to_string()),
        shipping: Some(shipping()),
        description: Some("Order from the storefront".to_string()),
    }
}

pub fn verify_request() -> VerifyPaymentRequest {
    VerifyPaymentRequest {
        user_id: Some("user-42".to_string()),
        email: Some("ada@example.com".to_string()),
        amount: Some(dec!(20)),
        items: Some(vec![CartItem::new(dec!(10), 2)]),
        shipping: Some(json!({ "city": "Ikeja" })),
    }
}

pub fn config(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}
