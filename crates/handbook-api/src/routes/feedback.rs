//! # Policy Feedback
//!
//! Employees submit questions about a policy, addressed by its policy
//! number. Submissions are kept in memory and written through to the
//! database when one is configured. Mail delivery is not handled here.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use handbook_core::model::{MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_QUESTION_LEN};
use handbook_core::{PolicyNumber, PolicyRequest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeedbackRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub question: String,
}

impl Validate for FeedbackRequest {
    fn validate(&self) -> Result<(), String> {
        for (field, value, max) in [
            ("first_name", &self.first_name, MAX_NAME_LEN),
            ("last_name", &self.last_name, MAX_NAME_LEN),
            ("email", &self.email, MAX_EMAIL_LEN),
            ("question", &self.question, MAX_QUESTION_LEN),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} must not be empty"));
            }
            if value.chars().count() > max {
                return Err(format!("{field} must not exceed {max} characters"));
            }
        }
        if !self.email.contains('@') {
            return Err("email must be a valid address".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeedbackResponse {
    pub policy_number: String,
    pub policy_title: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub question: String,
    pub submitted_at: DateTime<Utc>,
    pub resolved: bool,
}

impl FeedbackResponse {
    fn new(request: &PolicyRequest, policy_title: String) -> Self {
        Self {
            policy_number: request.policy.to_string(),
            policy_title,
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            email: request.email.clone(),
            question: request.question.clone(),
            submitted_at: request.submitted_at,
            resolved: request.resolved,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/handbook/policy/:policy/feedback", post(submit_feedback))
}

/// POST /handbook/policy/:policy/feedback: Ask a question about a policy.
#[utoipa::path(
    post,
    path = "/handbook/policy/{policy}/feedback",
    params(("policy" = String, Path, description = "Policy number, e.g. 1.2")),
    request_body = FeedbackRequest,
    responses(
        (status = 201, description = "Question recorded", body = FeedbackResponse),
        (status = 404, description = "No published policy with that number", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid submission", body = crate::error::ErrorBody),
    ),
    tag = "feedback"
)]
pub(crate) async fn submit_feedback(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    body: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FeedbackResponse>), AppError> {
    let not_found = || AppError::NotFound(format!("policy {raw} not found"));
    let number: PolicyNumber = raw.parse().map_err(|_| not_found())?;

    let title = {
        let handbook = state.handbook.read();
        handbook
            .policy_by_number(number)
            .filter(|p| p.published)
            .map(|p| p.title.clone())
            .ok_or_else(not_found)?
    };

    let req = extract_validated_json(body)?;
    let request = PolicyRequest::new(
        number,
        req.first_name.trim(),
        req.last_name.trim(),
        req.email.trim(),
        req.question,
        Utc::now(),
    )?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::requests::insert(pool, &request).await {
            tracing::error!(policy_number = %number, error = %e, "failed to persist policy question");
            return Err(AppError::Internal(
                "policy question could not be stored".to_string(),
            ));
        }
    }

    let response = FeedbackResponse::new(&request, title);
    state.requests.write().push(request);
    tracing::info!(policy_number = %number, "policy question submitted");

    Ok((StatusCode::CREATED, Json(response)))
}
