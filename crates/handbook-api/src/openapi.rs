//! # OpenAPI Specification Assembly
//!
//! Collects the utoipa-documented routes into one OpenAPI document served at
//! `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Employee Handbook API",
        version = "0.3.0",
        description = "Serves handbook content to the policy browser.\n\n- **Content**: introduction fragment (HTML) and policy fragments (JSON envelope)\n- **Navigation**: sections and published policies for the sidebar\n- **Feedback**: employee questions about a policy",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        crate::routes::content::introduction_content,
        crate::routes::content::policy_content,
        crate::routes::navigation::navigation,
        crate::routes::feedback::submit_feedback,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            crate::routes::content::PolicyContentResponse,
            crate::routes::navigation::NavigationDocument,
            crate::routes::navigation::IntroductionLink,
            crate::routes::navigation::NavigationSection,
            crate::routes::navigation::NavigationPolicy,
            crate::routes::feedback::FeedbackRequest,
            crate::routes::feedback::FeedbackResponse,
        ),
    ),
    tags(
        (name = "content", description = "Markup fragments swapped into the browser's content region"),
        (name = "navigation", description = "Sidebar structure"),
        (name = "feedback", description = "Questions about a policy"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
