use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;
use utoipa::ToSchema;

use crate::dto::payments::VerifyPaymentRequest;

pub const ORDER_PLACED_STATUS: &str = "Order Placed...";
pub const UNKNOWN_USER: &str = "Unknown User";
pub const NO_EMAIL: &str = "No Email";

/// Quantity keys in lookup order. The storefront sends `cartQuantity` and may
/// also carry an unrelated `quantity` (stock on hand) on the same item.
pub const QUANTITY_KEYS: [&str; 2] = ["cartQuantity", "quantity"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartItemError {
    #[error("cart item is missing `price`")]
    MissingPrice,
    #[error("cart item `price` must be a number")]
    InvalidPrice,
    #[error("cart item is missing `cartQuantity`")]
    MissingQuantity,
    #[error("cart item `{0}` must be a non-negative integer")]
    InvalidQuantity(&'static str),
}

/// A cart line as sent by the storefront.
///
/// Only price and quantity take part in pricing. The object itself is kept
/// exactly as received and is what lands in the persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct CartItem {
    price: Decimal,
    quantity: u32,
    fields: Map<String, Value>,
}

impl CartItem {
    pub fn new(price: Decimal, quantity: u32) -> Self {
        let mut fields = Map::new();
        fields.insert("price".to_string(), json!(price));
        fields.insert(QUANTITY_KEYS[0].to_string(), json!(quantity));
        Self {
            price,
            quantity,
            fields,
        }
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// The item as the storefront sent it.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_valid(&self) -> bool {
        self.price >= Decimal::ZERO && self.quantity >= 1
    }
}

impl TryFrom<Map<String, Value>> for CartItem {
    type Error = CartItemError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let price = fields
            .get("price")
            .filter(|price| !price.is_null())
            .ok_or(CartItemError::MissingPrice)?;
        let price = serde_json::from_value::<Decimal>(price.clone())
            .map_err(|_| CartItemError::InvalidPrice)?;

        let (key, quantity) = QUANTITY_KEYS
            .iter()
            .find_map(|key| {
                fields
                    .get(*key)
                    .filter(|value| !value.is_null())
                    .map(|value| (*key, value))
            })
            .ok_or(CartItemError::MissingQuantity)?;
        let quantity = quantity
            .as_u64()
            .and_then(|quantity| u32::try_from(quantity).ok())
            .ok_or(CartItemError::InvalidQuantity(key))?;

        Ok(Self {
            price,
            quantity,
            fields,
        })
    }
}

impl From<CartItem> for Map<String, Value> {
    fn from(item: CartItem) -> Self {
        item.fields
    }
}

/// Documented shape of a cart line. Fields other than these pass through.
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = CartItem)]
#[serde(rename_all = "camelCase")]
pub struct CartItemSchema {
    pub price: Decimal,
    /// Preferred over `quantity` when both are present.
    pub cart_quantity: Option<u32>,
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ShippingInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

impl ShippingInfo {
    pub fn is_complete(&self) -> bool {
        [
            &self.name,
            &self.phone,
            &self.line1,
            &self.city,
            &self.country,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }

    pub fn single_line_address(&self) -> String {
        format!("{}, {}, {}", self.line1, self.city, self.country)
    }
}

/// Order document written to the `orders` collection.
///
/// `createdAt` is not part of this struct. The store stamps it on insert and
/// [`StoredDocument::to_document`](crate::store::StoredDocument::to_document)
/// folds it back into the document on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub user_email: String,
    pub order_date: String,
    pub order_time: String,
    pub order_amount: Decimal,
    pub order_status: String,
    #[schema(value_type = Vec<CartItemSchema>)]
    pub cart_items: Vec<CartItem>,
    pub shipping_address: Value,
}

#[derive(Debug, PartialEq, Eq)]
pub enum OrderRejection {
    MissingUser,
    MissingEmail,
    EmptyCart,
}

impl Order {
    pub fn from_payload(payload: VerifyPaymentRequest, placed_at: DateTime<Utc>) -> Self {
        Self {
            user_id: non_blank(payload.user_id).unwrap_or_else(|| UNKNOWN_USER.to_string()),
            user_email: non_blank(payload.email).unwrap_or_else(|| NO_EMAIL.to_string()),
            order_date: placed_at.format("%a %b %d %Y").to_string(),
            order_time: placed_at.format("%-I:%M:%S %p").to_string(),
            order_amount: payload.amount.unwrap_or_default(),
            order_status: ORDER_PLACED_STATUS.to_string(),
            cart_items: payload.items.unwrap_or_default(),
            shipping_address: payload
                .shipping
                .unwrap_or_else(|| Value::Object(Default::default())),
        }
    }

    pub fn validate(&self) -> Result<(), OrderRejection> {
        if self.user_id.trim().is_empty() {
            return Err(OrderRejection::MissingUser);
        }
        if self.user_email.trim().is_empty() {
            return Err(OrderRejection::MissingEmail);
        }
        if self.cart_items.is_empty() {
            return Err(OrderRejection::EmptyCart);
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
