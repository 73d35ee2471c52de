use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    Json, Router,
    http::{HeaderName, HeaderValue, Method, Request, Response, StatusCode, Uri, header},
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    processor::PaystackClient,
    response::ErrorResponse,
    routes::{create_api_router, doc::scalar_docs},
    state::{AppState, PaymentSettings},
    store::{DocumentStore, MemoryDocumentStore, PgDocumentStore},
};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Construct the long-lived processor and store clients once at startup.
pub async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let processor = PaystackClient::new(
        &config.paystack_base_url,
        config.paystack_secret_key.clone(),
        config.paystack_timeout,
    )?;

    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(database_url) => {
            let pool = create_pool(database_url, config.db_max_connections, config.store_timeout)
                .await
                .context("failed to connect to the document store")?;
            let orm = create_orm_conn(pool);
            run_migrations(&orm).await?;
            tracing::info!("orders are stored in postgres");
            Arc::new(PgDocumentStore::new(orm))
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; orders are kept in memory only");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    Ok(AppState::new(
        Arc::new(processor),
        store,
        PaymentSettings::from_config(config),
    ))
}

pub fn build_app(state: AppState, config: &AppConfig) -> anyhow::Result<Router> {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id(request)
            )
        })
        .on_request(|request: &Request<_>, _span: &tracing::Span| {
            tracing::info!(
                request_id = %request_id(request),
                method = %request.method(),
                uri = %request.uri(),
                "request started"
            );
        })
        .on_response(|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                status = %response.status(),
                ms = %latency.as_millis(),
                "request finished"
            );
        });

    let router = create_api_router().merge(scalar_docs());
    let router = if config.is_production() {
        let index = config.static_dir.join("index.html");
        router.fallback_service(ServeDir::new(&config.static_dir).fallback(ServeFile::new(index)))
    } else {
        router.fallback(not_found)
    };

    let app = router
        .layer(trace_layer)
        .layer(cors_layer(config)?)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .layer(ConcurrencyLimitLayer::new(100))
        .with_state(state);

    Ok(app)
}

fn cors_layer(config: &AppConfig) -> anyhow::Result<CorsLayer> {
    let origins = config
        .allowed_origins()
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("invalid CORS origin {origin}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}

fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ErrorResponse>) {
    let body = ErrorResponse::upstream("Not Found", serde_json::json!({ "path": uri.path() }));
    (StatusCode::NOT_FOUND, Json(body))
}
