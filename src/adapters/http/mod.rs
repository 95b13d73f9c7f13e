pub mod cors;
pub mod handlers;

use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

pub const PHASE_CHANGE_DIAGRAM_PATH: &str = "/phase-change-diagram";

/// Builds the service router.
pub fn router(config: &ServerConfig) -> Router {
    let routes = Router::new().route(
        PHASE_CHANGE_DIAGRAM_PATH,
        // axum answers HEAD through the GET handler unless told otherwise
        get(handlers::phase_change_diagram).head(handlers::method_not_allowed),
    );
    with_middleware(routes, config)
}

/// Wraps `routes` in the service middleware.
///
/// Layers are registered innermost first, so the CORS middleware is the
/// outermost and sees every request before routing.
pub fn with_middleware(routes: Router, config: &ServerConfig) -> Router {
    routes
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.write_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(cors::cors_middleware))
}
