//! # Content Fragment Endpoints
//!
//! - `GET /handbook/introduction/content/` returns the introduction as raw
//!   HTML.
//! - `GET /handbook/policy/:policy/content/` returns `{"content": "..."}`.
//!
//! Any path value that is not a positive integer, an unknown ID, and an
//! unpublished policy all produce 404.

use axum::extract::{Path, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use handbook_core::PolicyId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::fragments;
use crate::state::AppState;

/// Envelope around a rendered policy fragment.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PolicyContentResponse {
    /// HTML fragment for the content region.
    pub content: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/handbook/introduction/content/", get(introduction_content))
        .route("/handbook/policy/:policy/content/", get(policy_content))
}

/// GET /handbook/introduction/content/: Introduction fragment.
#[utoipa::path(
    get,
    path = "/handbook/introduction/content/",
    responses(
        (status = 200, description = "Introduction fragment", body = String, content_type = "text/html"),
        (status = 500, description = "Rendering failed", body = crate::error::ErrorBody),
    ),
    tag = "content"
)]
pub(crate) async fn introduction_content(
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let handbook = state.handbook.read();
    let html = fragments::render_introduction(&handbook, &state.config.title)?;
    Ok(Html(html))
}

/// GET /handbook/policy/:policy/content/: Policy fragment in a JSON envelope.
#[utoipa::path(
    get,
    path = "/handbook/policy/{policy}/content/",
    params(("policy" = u64, Path, description = "Policy ID")),
    responses(
        (status = 200, description = "Policy fragment", body = PolicyContentResponse),
        (status = 404, description = "Unknown or unpublished policy", body = crate::error::ErrorBody),
    ),
    tag = "content"
)]
pub(crate) async fn policy_content(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<PolicyContentResponse>, AppError> {
    let not_found = || AppError::NotFound(format!("policy {raw} not found"));
    let id: PolicyId = raw.parse().map_err(|_| not_found())?;

    let handbook = state.handbook.read();
    let policy = handbook.published_policy(id).ok_or_else(not_found)?;
    let content = fragments::render_policy(&handbook, policy)?;
    tracing::debug!(policy_id = %id, "served policy fragment");
    Ok(Json(PolicyContentResponse { content }))
}
