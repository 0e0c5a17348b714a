//! HTTP API.
//!
//! An explicit routing table over the domain services; handlers stay thin
//! and defer every decision to a service.

pub mod auth;
pub mod error;
pub mod handlers;

use axum::{Router, routing::get};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;

pub use error::ApiError;

/// Simple acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Build the application router.
#[must_use]
pub fn router(context: AppContext) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/auth", handlers::auth::routes())
        .nest("/users", handlers::users::routes())
        .nest("/vaccines", handlers::vaccines::routes())
        .nest("/suppliers", handlers::suppliers::routes())
        .nest("/manufacturers", handlers::manufacturers::routes())
        .nest("/categories", handlers::categories::routes())
        .nest("/tags", handlers::tags::routes())
        .nest("/posts", handlers::posts::routes())
        .nest("/inventory", handlers::inventory::routes())
        .nest("/bookings", handlers::bookings::routes())
        .nest("/appointments", handlers::appointments::routes())
        .nest("/payments", handlers::payments::routes())
        .nest("/gateway", handlers::gateway::routes())
        .nest("/notifications", handlers::notifications::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(context)
}
