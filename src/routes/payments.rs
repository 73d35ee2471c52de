use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::post,
};

use crate::{
    dto::payments::{
        CreatePaymentIntentRequest, PaymentSessionResponse, VerifyPaymentRequest,
        VerifyPaymentResponse,
    },
    error::{AppError, AppResult},
    response::ErrorResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-payment-intent", post(create_payment_intent))
        .route("/verify-payment/{reference}", post(verify_payment))
}

#[utoipa::path(
    post,
    path = "/create-payment-intent",
    request_body = CreatePaymentIntentRequest,
    responses(
        (status = 200, description = "Hosted checkout session opened", body = PaymentSessionResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 500, description = "Payment processor failure", body = ErrorResponse),
    ),
    tag = "Payments"
)]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    payload: Result<Json<CreatePaymentIntentRequest>, JsonRejection>,
) -> AppResult<Json<PaymentSessionResponse>> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(JsonRejection::MissingJsonContentType(_)) => return Err(AppError::missing_fields()),
        Err(rejection) => return Err(AppError::Validation(rejection.body_text())),
    };

    let session = payment_service::initiate(&state, payload).await?;
    Ok(Json(session))
}

#[utoipa::path(
    post,
    path = "/verify-payment/{reference}",
    params(
        ("reference" = String, Path, description = "Processor transaction reference")
    ),
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Payment confirmed and order recorded", body = VerifyPaymentResponse),
        (status = 400, description = "Payment not successful or order details invalid", body = VerifyPaymentResponse),
        (status = 500, description = "Payment processor or store failure", body = ErrorResponse),
    ),
    tag = "Payments"
)]
pub async fn verify_payment(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    payload: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> AppResult<VerifyPaymentResponse> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(JsonRejection::MissingJsonContentType(_)) => VerifyPaymentRequest::default(),
        Err(rejection) => return Err(AppError::Validation(rejection.body_text())),
    };

    payment_service::verify(&state, &reference, payload).await
}
