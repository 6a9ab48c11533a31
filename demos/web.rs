/// HTTP front-end for the secret store.
///
/// Exposes:
/// - `POST /secrets` with `{"id": "...", "ttlSeconds": 10}` returning `201 {"secret": "..."}`
/// - `GET /secrets/:id` returning `200 {"secret": "..."}` exactly once
///
/// Failures carry `{"message": "...", "reason": "..."}`; field validation
/// failures add per-field details under `fieldErrors`.
///
/// Run with: cargo run --example web
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use onetime_secret::{ErrorBody, ErrorReason, SecretConfig, SecretError, SecretStore, Sweeper};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSecretRequest {
    id: String,
    ttl_seconds: i64,
}

#[derive(Serialize)]
struct SecretResponse {
    secret: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationErrorResponse {
    message: &'static str,
    reason: ErrorReason,
    field_errors: BTreeMap<&'static str, &'static str>,
}

fn error_response(err: SecretError) -> Response {
    let status = match err {
        SecretError::IdentifierUnavailable => StatusCode::BAD_REQUEST,
        SecretError::NotFound | SecretError::Expired | SecretError::AlreadyConsumed => {
            StatusCode::NOT_FOUND
        }
    };
    (status, Json(err.to_body())).into_response()
}

fn validation_response(field_errors: BTreeMap<&'static str, &'static str>) -> Response {
    let body = ValidationErrorResponse {
        message: "Invalid input provided.",
        reason: ErrorReason::InvalidInput,
        field_errors,
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

async fn create_secret(
    State(store): State<Arc<SecretStore>>,
    payload: Result<Json<CreateSecretRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        let body = ErrorBody {
            message: "Invalid JSON format or missing required fields.".to_string(),
            reason: ErrorReason::InvalidInput,
        };
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    let mut field_errors = BTreeMap::new();
    if request.id.trim().is_empty() {
        field_errors.insert("id", "ID is required.");
    }
    if request.ttl_seconds < 1 {
        field_errors.insert("ttlSeconds", "TTL must be at least 1 second.");
    }
    if !field_errors.is_empty() {
        return validation_response(field_errors);
    }

    match store.create(&request.id, request.ttl_seconds.unsigned_abs()) {
        Ok(secret) => (StatusCode::CREATED, Json(SecretResponse { secret })).into_response(),
        Err(e) => error_response(e),
    }
}

async fn get_secret(State(store): State<Arc<SecretStore>>, Path(id): Path<String>) -> Response {
    match store.consume(&id) {
        Ok(secret) => (StatusCode::OK, Json(SecretResponse { secret })).into_response(),
        Err(e) => error_response(e),
    }
}

fn app(store: Arc<SecretStore>) -> Router {
    Router::new()
        .route("/secrets", post(create_secret))
        .route("/secrets/:id", get(get_secret))
        .with_state(store)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = SecretConfig::default();
    tracing::info!("{}", config.summary());

    let sweep = config
        .dead_record_retention
        .map(|retention| (config.sweep_interval, retention));
    let store = Arc::new(SecretStore::builder().with_config(config).build());
    let _sweeper = sweep.map(|(interval, retention)| {
        Sweeper::spawn(Arc::clone(&store), interval, retention)
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(store)).await?;

    Ok(())
}
