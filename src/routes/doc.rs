use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::payments::{
        CreatePaymentIntentRequest, PaymentSessionResponse, VerifyPaymentRequest,
        VerifyPaymentResponse,
    },
    models::{CartItemSchema, Order, ShippingInfo},
    response::ErrorResponse,
    routes::{health, payments},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::welcome,
        health::health_check,
        payments::create_payment_intent,
        payments::verify_payment
    ),
    components(
        schemas(
            CartItemSchema,
            ShippingInfo,
            Order,
            CreatePaymentIntentRequest,
            PaymentSessionResponse,
            VerifyPaymentRequest,
            VerifyPaymentResponse,
            ErrorResponse,
            health::HealthData
        )
    ),
    tags(
        (name = "Health", description = "Liveness endpoints"),
        (name = "Payments", description = "Payment initiation and verification"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
