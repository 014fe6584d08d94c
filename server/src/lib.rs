//! HTTP API for licensegate.
//!
//! Exposes a single activation endpoint plus a health check:
//!
//! - `POST /api/activate` with `{ "license": ..., "pc_id": ... }`
//! - `GET /healthz`
//!
//! Every failure is answered with a fixed JSON body; store errors and
//! internal details never reach the client.

pub mod config;

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use licensegate_activation::{ActivationError, Activator, RejectReason};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Largest request body the activation endpoint will read.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Activation request body. Fields are optional so that a missing field is
/// reported as a bad request rather than a deserialization failure.
#[derive(Deserialize, Debug, Default)]
pub struct ActivateRequest {
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub pc_id: Option<String>,
}

/// Activation response body.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ActivateResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
}

impl ActivateResponse {
    pub fn granted(token: String) -> Self {
        Self {
            ok: true,
            token: Some(token),
            reason: None,
        }
    }

    pub fn denied(reason: Option<RejectReason>) -> Self {
        Self {
            ok: false,
            token: None,
            reason,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
}

/// Maps an activation failure to its HTTP status.
pub fn status_for(err: &ActivationError) -> StatusCode {
    match err {
        ActivationError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ActivationError::LicenseNotFound | ActivationError::DeviceLimitExceeded(_) => {
            StatusCode::FORBIDDEN
        }
        ActivationError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Activation failure rendered as a fixed-shape JSON response.
pub struct ApiError(pub ActivationError);

impl From<ActivationError> for ApiError {
    fn from(err: ActivationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ActivateResponse::denied(self.0.reject_reason());
        (status_for(&self.0), Json(body)).into_response()
    }
}

/// Parses the raw body. Anything that is not an object with non-empty string
/// `license` and `pc_id` fields is an invalid request.
fn parse_request(body: &[u8]) -> Result<(String, String), ActivationError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ActivationError::InvalidRequest(format!("malformed body: {e}")))?;
    // Derived deserializers also accept arrays; only objects are valid here.
    if !value.is_object() {
        return Err(ActivationError::InvalidRequest(
            "body must be a JSON object".to_string(),
        ));
    }
    let request: ActivateRequest = serde_json::from_value(value)
        .map_err(|e| ActivationError::InvalidRequest(format!("malformed body: {e}")))?;

    match (request.license, request.pc_id) {
        (Some(license), Some(pc_id)) if !license.is_empty() && !pc_id.is_empty() => {
            Ok((license, pc_id))
        }
        _ => Err(ActivationError::InvalidRequest(
            "license and pc_id are required".to_string(),
        )),
    }
}

async fn activate_handler(
    State(activator): State<Arc<Activator>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ActivateResponse>, ApiError> {
    // Oversize or unreadable bodies get the same 400 as malformed ones.
    let body = body.map_err(|e| {
        debug!(error = %e, "failed to read activation body");
        ActivationError::InvalidRequest(format!("unreadable body: {e}"))
    })?;
    let (license, pc_id) = parse_request(&body).inspect_err(|e| {
        debug!(error = %e, "rejecting activation request");
    })?;

    let grant = activator.activate(&license, &pc_id).await?;
    Ok(Json(ActivateResponse::granted(grant.token)))
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(ActivateResponse::denied(None)),
    )
}

async fn health_handler(State(activator): State<Arc<Activator>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        store: activator.store().backend_name().to_string(),
    })
}

/// Build the HTTP API router around the given activator.
pub fn build_router(activator: Arc<Activator>) -> Router {
    Router::new()
        .route(
            "/api/activate",
            post(activate_handler).fallback(method_not_allowed),
        )
        .route("/healthz", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(activator)
}
