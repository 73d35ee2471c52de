use std::{sync::Arc, time::Duration};

use crate::{config::AppConfig, processor::PaymentProcessor, store::DocumentStore};

pub const CURRENCY: &str = "NGN";

/// Shared handles injected into every handler. Both clients are safe for
/// concurrent use; nothing here is mutated per request.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<dyn PaymentProcessor>,
    pub store: Arc<dyn DocumentStore>,
    pub settings: PaymentSettings,
}

#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub currency: String,
    pub callback_url: String,
    pub store_timeout: Duration,
    pub idempotent_verification: bool,
}

impl PaymentSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            currency: CURRENCY.to_string(),
            callback_url: config.callback_url(),
            store_timeout: config.store_timeout,
            idempotent_verification: config.idempotent_verification,
        }
    }
}

impl AppState {
    pub fn new(
        processor: Arc<dyn PaymentProcessor>,
        store: Arc<dyn DocumentStore>,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            processor,
            store,
            settings,
        }
    }
}
