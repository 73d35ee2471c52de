mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use checkout_gateway::{app::build_app, store::ORDERS_COLLECTION};

use common::{AUTHORIZATION_URL, FakeProcessor, REFERENCE, config, memory_state};

fn app(processor: Arc<FakeProcessor>) -> (Router, Arc<checkout_gateway::store::MemoryDocumentStore>) {
    let (state, store) = memory_state(processor);
    let config = config(&[("PAYSTACK_SECRET_KEY", "sk_test_123")]).expect("config");
    (build_app(state, &config).expect("app"), store)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn text_body(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn intent_body() -> Value {
    json!({
        "items": [
            { "id": "sku-1", "name": "Ankara tote", "price": 10, "cartQuantity": 2 }
        ],
        "email": "ada@example.com",
        "shipping": {
            "name": "Ada Obi",
            "phone": "+2348012345678",
            "line1": "12 Allen Avenue",
            "city": "Ikeja",
            "country": "NG"
        },
        "description": "Storefront order"
    })
}

#[tokio::test]
async fn welcome_route_returns_text() {
    let (app, _store) = app(Arc::new(FakeProcessor::succeeding()));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).starts_with("Welcome"));
}

#[tokio::test]
async fn create_payment_intent_returns_session() {
    let processor = Arc::new(FakeProcessor::succeeding());
    let (app, _store) = app(processor.clone());

    let response = app
        .oneshot(post_json("/create-payment-intent", intent_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        json_body(response).await,
        json!({ "authorizationUrl": AUTHORIZATION_URL, "reference": REFERENCE })
    );
    assert_eq!(processor.initialize_calls()[0].amount, 2000);
}

#[tokio::test]
async fn create_payment_intent_missing_fields_is_bad_request() {
    let processor = Arc::new(FakeProcessor::succeeding());
    let (app, _store) = app(processor.clone());

    let response = app
        .oneshot(post_json(
            "/create-payment-intent",
            json!({ "email": "ada@example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Missing required fields" })
    );
    assert!(processor.initialize_calls().is_empty());
}

#[tokio::test]
async fn create_payment_intent_processor_failure_is_server_error() {
    let upstream = json!({ "status": false, "message": "Invalid key" });
    let (app, _store) = app(Arc::new(FakeProcessor::rejecting(401, upstream.clone())));

    let response = app
        .oneshot(post_json("/create-payment-intent", intent_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({
            "message": "Payment initialization failed. Please try again.",
            "error": upstream
        })
    );
}

#[tokio::test]
async fn verify_payment_records_order() {
    let (app, store) = app(Arc::new(FakeProcessor::succeeding()));

    let response = app
        .oneshot(post_json(
            &format!("/verify-payment/{REFERENCE}"),
            json!({
                "userID": "user-42",
                "email": "ada@example.com",
                "amount": 20,
                "items": [{ "id": "sku-1", "price": 10, "cartQuantity": 2 }],
                "shipping": { "city": "Ikeja" }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let docs = store.documents(ORDERS_COLLECTION).await;
    assert_eq!(docs.len(), 1);
    assert_eq!(body, json!({ "status": "success", "orderId": docs[0].id }));
    // Storefront-specific item fields survive into the stored order.
    assert_eq!(docs[0].body["cartItems"][0]["id"], "sku-1");
}

#[tokio::test]
async fn verify_payment_keeps_items_with_stock_and_cart_quantity() {
    let (app, store) = app(Arc::new(FakeProcessor::succeeding()));
    let item = json!({ "id": "sku-1", "price": 10, "quantity": 5, "cartQuantity": 2 });

    let response = app
        .oneshot(post_json(
            &format!("/verify-payment/{REFERENCE}"),
            json!({
                "userID": "user-42",
                "email": "ada@example.com",
                "amount": 20,
                "items": [item.clone()]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let docs = store.documents(ORDERS_COLLECTION).await;
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].body["cartItems"], json!([item]));
}

#[tokio::test]
async fn verify_payment_not_successful_is_bad_request() {
    let (app, store) = app(Arc::new(FakeProcessor::with_status("failed")));

    let response = app
        .oneshot(post_json(
            &format!("/verify-payment/{REFERENCE}"),
            json!({ "items": [{ "price": 10, "quantity": 1 }] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "status": "failed", "message": "Payment not successful" })
    );
    assert!(store.documents(ORDERS_COLLECTION).await.is_empty());
}

#[tokio::test]
async fn verify_payment_without_body_is_invalid_order() {
    let (app, store) = app(Arc::new(FakeProcessor::succeeding()));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/verify-payment/{REFERENCE}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "message": "Invalid order details" })
    );
    assert!(store.documents(ORDERS_COLLECTION).await.is_empty());
}

#[tokio::test]
async fn verify_payment_processor_failure_is_server_error() {
    let upstream = json!({ "status": false, "message": "Transaction reference not found" });
    let (app, _store) = app(Arc::new(FakeProcessor::rejecting(400, upstream.clone())));

    let response = app
        .oneshot(post_json(&format!("/verify-payment/{REFERENCE}"), json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "message": "Payment verification failed", "error": upstream })
    );
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let (app, _store) = app(Arc::new(FakeProcessor::succeeding()));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/create-payment-intent")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn unknown_paths_are_json_not_found_outside_production() {
    let (app, _store) = app(Arc::new(FakeProcessor::succeeding()));

    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"]["path"], "/nope");
}

#[tokio::test]
async fn cors_preflight_allows_frontend_origin() {
    let (app, _store) = app(Arc::new(FakeProcessor::succeeding()));

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/create-payment-intent")
                .header(header::ORIGIN, "http://localhost:4243")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:4243"
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );
}

#[tokio::test]
async fn production_serves_front_end_bundle_with_spa_fallback() {
    let bundle = tempfile::tempdir().unwrap();
    std::fs::write(bundle.path().join("index.html"), "<html>spa</html>").unwrap();
    std::fs::create_dir(bundle.path().join("static")).unwrap();
    std::fs::write(bundle.path().join("static/app.js"), "js").unwrap();

    let (state, _store) = memory_state(Arc::new(FakeProcessor::succeeding()));
    let static_dir = bundle.path().to_string_lossy().into_owned();
    let config = config(&[
        ("PAYSTACK_SECRET_KEY", "sk_test_123"),
        ("APP_ENV", "production"),
        ("STATIC_DIR", static_dir.as_str()),
    ])
    .unwrap();
    let app = build_app(state, &config).unwrap();

    let page = app.clone().oneshot(get("/Payment-success")).await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    assert_eq!(text_body(page).await, "<html>spa</html>");

    let asset = app.clone().oneshot(get("/static/app.js")).await.unwrap();
    assert_eq!(asset.status(), StatusCode::OK);
    assert_eq!(text_body(asset).await, "js");

    let welcome = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(welcome.status(), StatusCode::OK);
    assert!(text_body(welcome).await.starts_with("Welcome"));

    let health = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(json_body(health).await, json!({ "status": "ok" }));
}
