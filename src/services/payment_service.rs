use anyhow::Context;
use chrono::Utc;
use serde_json::Value;

use crate::{
    dto::payments::{
        CreatePaymentIntentRequest, PaymentSessionResponse, VerifyPaymentRequest,
        VerifyPaymentResponse,
    },
    error::{AppError, AppResult, PaymentStage},
    models::{Order, ShippingInfo},
    processor::{CustomField, InitializeTransaction, TransactionMetadata},
    services::amount::calculate_order_amount,
    state::AppState,
    store::{InsertOutcome, ORDERS_COLLECTION, StoreError},
};

pub const PAYMENT_NOT_SUCCESSFUL: &str = "Payment not successful";

/// Prices the cart and opens a hosted checkout session with the processor.
///
/// Input is validated before anything leaves the process. Nothing is stored.
#[tracing::instrument(skip_all)]
pub async fn initiate(
    state: &AppState,
    payload: CreatePaymentIntentRequest,
) -> AppResult<PaymentSessionResponse> {
    let CreatePaymentIntentRequest {
        items,
        email,
        shipping,
        description,
    } = payload;

    let (Some(items), Some(email), Some(shipping)) = (
        items.filter(|items| !items.is_empty()),
        email.filter(|email| !email.trim().is_empty()),
        shipping.filter(ShippingInfo::is_complete),
    ) else {
        return Err(AppError::missing_fields());
    };

    if let Some(position) = items.iter().position(|item| !item.is_valid()) {
        return Err(AppError::Validation(format!(
            "Invalid cart item at position {position}: price must not be negative and quantity must be at least 1"
        )));
    }

    let amount = calculate_order_amount(&items);
    let request = InitializeTransaction {
        email: email.trim().to_string(),
        amount,
        currency: state.settings.currency.clone(),
        callback_url: state.settings.callback_url.clone(),
        description,
        metadata: TransactionMetadata {
            custom_fields: vec![CustomField {
                display_name: shipping.name.clone(),
                variable_name: shipping.phone.clone(),
                value: shipping.single_line_address(),
            }],
        },
    };

    let session = state
        .processor
        .initialize(request)
        .await
        .map_err(AppError::processor(PaymentStage::Initialization))?;

    tracing::info!(reference = %session.reference, amount, "payment session created");

    Ok(PaymentSessionResponse {
        authorization_url: session.authorization_url,
        reference: session.reference,
    })
}

/// Confirms a transaction with the processor and records the order.
///
/// The charge and the order write are not atomic: a successful charge whose
/// payload fails validation, or whose write fails, is left as-is.
#[tracing::instrument(skip(state, payload))]
pub async fn verify(
    state: &AppState,
    reference: &str,
    payload: VerifyPaymentRequest,
) -> AppResult<VerifyPaymentResponse> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(AppError::Validation("Missing payment reference".to_string()));
    }

    let verification = state
        .processor
        .verify(reference)
        .await
        .map_err(AppError::processor(PaymentStage::Verification))?;

    if !verification.is_successful() {
        tracing::info!(status = %verification.status, "payment not successful");
        return Ok(VerifyPaymentResponse::Failed {
            message: PAYMENT_NOT_SUCCESSFUL.to_string(),
        });
    }

    let order = Order::from_payload(payload, Utc::now());
    if let Err(rejection) = order.validate() {
        // TODO: decide whether a confirmed charge with an unusable order should be refunded.
        tracing::warn!(
            ?rejection,
            charged = ?verification.amount,
            "payment succeeded but order details are invalid"
        );
        return Err(AppError::InvalidOrder);
    }

    let document = serde_json::to_value(&order).context("failed to serialize order")?;
    let outcome = persist_order(state, reference, document).await?;

    match &outcome {
        InsertOutcome::Created(id) => tracing::info!(order_id = %id, "order saved"),
        InsertOutcome::Existing(id) => {
            tracing::info!(order_id = %id, "order already recorded for this reference")
        }
    }

    Ok(VerifyPaymentResponse::Success {
        order_id: outcome.into_id(),
    })
}

async fn persist_order(
    state: &AppState,
    reference: &str,
    document: Value,
) -> AppResult<InsertOutcome> {
    let store = state.store.as_ref();
    let deadline = state.settings.store_timeout;

    let write = async {
        if state.settings.idempotent_verification {
            store
                .insert_with_key(ORDERS_COLLECTION, reference, document)
                .await
        } else {
            store
                .insert(ORDERS_COLLECTION, document)
                .await
                .map(InsertOutcome::Created)
        }
    };

    let outcome = tokio::time::timeout(deadline, write)
        .await
        .map_err(|_| StoreError::Timeout(deadline))??;
    Ok(outcome)
}
