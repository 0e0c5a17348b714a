//! Notification routes.

use axum::{Json, Router, extract::State, routing::get};

use crate::{
    context::AppContext,
    domain::notifications::models::Notification,
    http::{auth::CurrentUser, error::ApiError},
};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/me", get(my_notifications))
        .route("/me/unread", get(my_unread_notifications))
}

async fn my_notifications(
    State(context): State<AppContext>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = context
        .notifications
        .user_notifications(identity.user_uuid)
        .await?;

    Ok(Json(notifications))
}

async fn my_unread_notifications(
    State(context): State<AppContext>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = context
        .notifications
        .unread_notifications(identity.user_uuid)
        .await?;

    Ok(Json(notifications))
}
