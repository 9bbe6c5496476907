use axum::{Router, middleware::from_fn, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{AppState, routes};

mod auth;

pub use auth::AuthUser;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(routes::todos::router(&state))
        .layer(from_fn(auth::require_user));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
