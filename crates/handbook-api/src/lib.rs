//! # handbook-api: Axum Service for the Employee Handbook
//!
//! Serves the content the policy browser swaps into its single content
//! region, plus the navigation document it builds its sidebar from.
//!
//! ## API Surface
//!
//! | Route                                   | Module                   |
//! |-----------------------------------------|--------------------------|
//! | `GET /handbook/introduction/content/`   | [`routes::content`]      |
//! | `GET /handbook/policy/:id/content/`     | [`routes::content`]      |
//! | `GET /handbook/navigation/`             | [`routes::navigation`]   |
//! | `POST /handbook/policy/:number/feedback`| [`routes::feedback`]     |
//! | `GET /health/liveness`, `/health/readiness` | probes               |
//! | `GET /metrics`                          | Prometheus scrape        |
//! | `GET /openapi.json`                     | [`openapi`]              |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```

pub mod db;
pub mod error;
pub mod extractors;
pub mod fragments;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();
    let metrics_on = state.config.metrics_enabled;

    let mut api = Router::new()
        .merge(routes::content::router())
        .merge(routes::navigation::router())
        .merge(routes::feedback::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(64 * 1024));

    if metrics_on {
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics.clone()));
    }

    let api = api.layer(TraceLayer::new_for_http()).with_state(state.clone());

    let mut probes = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    if metrics_on {
        probes = probes
            .route("/metrics", axum::routing::get(prometheus_metrics))
            .layer(Extension(metrics));
    }

    Router::new().merge(probes.with_state(state)).merge(api)
}

/// GET /metrics: Prometheus metrics scrape endpoint.
///
/// Refreshes the handbook gauges from current state, then encodes the
/// registry in Prometheus text exposition format.
async fn prometheus_metrics(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
) -> impl IntoResponse {
    {
        let handbook = state.handbook.read();
        let published = handbook.published_count();
        metrics.set_handbook_counts(
            handbook.section_count(),
            published,
            handbook.policy_count() - published,
        );
    }

    let unresolved = match &state.db_pool {
        Some(pool) => match db::requests::count_unresolved(pool).await {
            Ok(n) => usize::try_from(n).unwrap_or(0),
            Err(e) => {
                tracing::warn!(error = %e, "failed to count unresolved policy questions");
                unresolved_in_memory(&state)
            }
        },
        None => unresolved_in_memory(&state),
    };
    metrics.set_feedback_unresolved(unresolved);

    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

fn unresolved_in_memory(state: &AppState) -> usize {
    state.requests.read().iter().filter(|r| !r.resolved).count()
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: the handbook store is not wedged and, when configured,
/// the database answers. Returns 200 "ready" or a 503 error envelope.
async fn readiness(State(state): State<AppState>) -> Result<&'static str, AppError> {
    if state.handbook.try_read().is_none() {
        return Err(AppError::ServiceUnavailable("handbook store locked".into()));
    }

    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::debug!("Database health check failed: {e}");
            return Err(AppError::ServiceUnavailable("database unreachable".into()));
        }
    }

    Ok("ready")
}
