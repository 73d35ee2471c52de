use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::models::{CartItem, CartItemSchema, ShippingInfo};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreatePaymentIntentRequest {
    #[schema(value_type = Option<Vec<CartItemSchema>>)]
    pub items: Option<Vec<CartItem>>,
    pub email: Option<String>,
    pub shipping: Option<ShippingInfo>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSessionResponse {
    pub authorization_url: String,
    pub reference: String,
}

/// Body of `POST /verify-payment/{reference}`. Every field is optional; gaps
/// are filled with placeholders when the order is built.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct VerifyPaymentRequest {
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub amount: Option<Decimal>,
    #[schema(value_type = Option<Vec<CartItemSchema>>)]
    pub items: Option<Vec<CartItem>>,
    pub shipping: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum VerifyPaymentResponse {
    Success {
        #[serde(rename = "orderId")]
        order_id: String,
    },
    Failed {
        message: String,
    },
}

impl IntoResponse for VerifyPaymentResponse {
    fn into_response(self) -> Response {
        let status = match &self {
            VerifyPaymentResponse::Success { .. } => StatusCode::OK,
            VerifyPaymentResponse::Failed { .. } => StatusCode::BAD_REQUEST,
        };
        (status, Json(self)).into_response()
    }
}
