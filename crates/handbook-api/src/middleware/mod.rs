//! # Middleware Stack
//!
//! - [`metrics`]: Prometheus request metrics, mounted when
//!   `HANDBOOK_METRICS_ENABLED` is not `false`.
//!
//! Request tracing uses `tower_http::trace::TraceLayer` directly in
//! [`crate::app`].

pub mod metrics;
