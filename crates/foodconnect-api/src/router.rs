use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{auth, donations, health, messages, notifications, requests};

/// Every route lives under `/api`.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/profile/{user_id}", get(auth::profile))
        .route("/donations", post(donations::create_donation))
        .route("/donations/user/{owner_email}", get(donations::list_donations))
        .route("/donations/{id}/status", patch(donations::update_donation_status))
        .route("/donations/{id}", delete(donations::delete_donation))
        .route("/requests", post(requests::create_request))
        .route("/requests/user/{owner_email}", get(requests::list_requests))
        .route("/requests/{id}/status", patch(requests::update_request_status))
        .route("/requests/{id}", delete(requests::delete_request))
        .route("/messages", post(messages::create_message))
        .route("/messages/user/{owner_email}", get(messages::list_messages))
        .route("/messages/{id}/read", patch(messages::mark_message_read))
        .route("/messages/{id}", delete(messages::delete_message))
        .route("/notifications", post(notifications::create_notification))
        .route(
            "/notifications/user/{owner_email}",
            get(notifications::list_notifications).delete(notifications::clear_notifications),
        )
        .route("/notifications/{id}/read", patch(notifications::mark_notification_read))
        .route("/notifications/{id}", delete(notifications::delete_notification))
        .route("/health", get(health::health));

    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
