use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::auth::require_auth;
use super::handlers;

pub fn create_router(state: AppState) -> Router {
    // Public routes, no authentication
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    // Statistics routes behind the static admin token
    let protected = Router::new()
        .route("/gross_gaming_rev", get(handlers::statistics::gross_gaming_revenue))
        .route("/daily_wager_volume", get(handlers::statistics::daily_wager_volume))
        .route(
            "/user/:user_id/wager_percentile",
            get(handlers::statistics::user_wager_percentile),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
