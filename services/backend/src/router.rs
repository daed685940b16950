use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use drawnzones_core::health::{healthz, readyz};
use drawnzones_core::middleware::request_id_layer;

use crate::handlers::{
    api_key::{create_api_key, delete_api_key, list_api_keys},
    magic_link::{send_magic_link, verify_magic_link},
    profile::{get_profile, update_profile},
    rectangle::{
        create_rectangle, delete_rectangle, get_rectangle, list_rectangles, rectangle_stats,
        update_rectangle,
    },
    session::{auth_status, logout},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Magic link
        .route("/api/auth/magic-link/send", post(send_magic_link))
        .route("/api/auth/magic-link/verify", post(verify_magic_link))
        // Profile + session
        .route("/api/auth/profile", get(get_profile))
        .route("/api/auth/profile", put(update_profile))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/status", get(auth_status))
        // API keys
        .route("/api/auth/api-keys", get(list_api_keys))
        .route("/api/auth/api-keys", post(create_api_key))
        .route("/api/auth/api-keys/{id}", delete(delete_api_key))
        // Rectangles
        .route("/api/rectangles", get(list_rectangles))
        .route("/api/rectangles", post(create_rectangle))
        .route("/api/rectangles/stats", get(rectangle_stats))
        .route("/api/rectangles/{id}", get(get_rectangle))
        .route("/api/rectangles/{id}", put(update_rectangle))
        .route("/api/rectangles/{id}", delete(delete_rectangle))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
