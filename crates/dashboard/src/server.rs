//! Dashboard HTTP server: API routes plus the static frontend with SPA
//! fallback.

use std::path::Path;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::auth::require_jwt;
use crate::envelope;
use crate::handlers;
use crate::state::DashboardState;

pub fn router(state: Arc<DashboardState>) -> Router {
    let assets_dir = Path::new(&state.assets_dir).to_path_buf();

    let public = Router::new()
        .route(
            "/api/login",
            post(handlers::login).fallback(method_not_allowed),
        )
        .route(
            "/api/tob/webhook",
            post(handlers::handle_tob_webhook).fallback(method_not_allowed),
        );

    let protected = Router::new()
        .route(
            "/api/services",
            get(handlers::get_services).fallback(method_not_allowed),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_jwt));

    // static frontend, SPA routes fall back to index.html
    let assets = ServeDir::new(&assets_dir)
        .not_found_service(ServeFile::new(assets_dir.join("index.html")));

    Router::new()
        .merge(public)
        .merge(protected)
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn method_not_allowed() -> axum::response::Response {
    envelope::method_not_allowed()
}
