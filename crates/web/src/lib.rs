//! PhD Tracker web service
//!
//! JSON endpoints over the reconciliation core plus the form-encoded
//! professor submission. Handles:
//! - Professor add/edit/delete and listings
//! - Program counts, catalog and dashboard views
//! - Applicant profiles
//! - Observability (logging, metrics)

pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware::from_fn,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use phdtrack_common::{config::AppConfig, db::DbPool, Repository};
use tower::{limit::ConcurrencyLimitLayer, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    /// Present when the Prometheus recorder was installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, db: DbPool) -> Self {
        Self {
            config,
            db,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn repo(&self) -> Repository {
        Repository::new(self.db.clone())
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let request_timeout = state.config.request_timeout();
    let max_concurrent = state.config.server.max_concurrent_requests.max(1);

    let routes = Router::new()
        // Probes
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .route("/metrics", get(handlers::health::metrics))

        // Professors
        .route(
            "/professors",
            get(handlers::professors::list_professors).post(handlers::professors::submit_professor),
        )
        .route(
            "/professors/{id}",
            get(handlers::professors::get_professor).delete(handlers::professors::delete_professor),
        )

        // Aggregates
        .route("/programs", get(handlers::programs::list_programs))
        .route("/catalog", get(handlers::catalog::catalog))
        .route("/dashboard", get(handlers::dashboard::dashboard))

        // Applicants
        .route(
            "/applicants",
            get(handlers::applicants::list_applicants).post(handlers::applicants::create_applicant),
        )
        .route(
            "/applicants/{id}",
            get(handlers::applicants::get_applicant).delete(handlers::applicants::delete_applicant),
        )
        .route_layer(from_fn(middleware::metrics::track_requests));

    routes
        .layer(
            ServiceBuilder::new()
                // Request ID first so traces carry it
                .layer(request_id)
                .layer(propagate_id)
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                // Request timeout
                .layer(TimeoutLayer::new(request_timeout))
                // Concurrency limit for backpressure
                .layer(ConcurrencyLimitLayer::new(max_concurrent)),
        )
        .with_state(state)
}

/// Router exposing only `/metrics`, for a dedicated metrics listener
pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || std::future::ready(handle.render())))
}
