//! User management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    context::AppContext,
    domain::{
        pagination::{Page, PageRequest},
        users::models::{Role, User, UserUpdate, UserUuid},
    },
    http::{MessageResponse, auth::{AdminUser, CurrentUser}, error::ApiError},
};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(list))
        .route("/me", get(me).put(update_me))
        .route("/count", get(count))
        .route("/:id", get(detail).delete(remove))
        .route("/:id/role", put(update_role))
}

#[derive(Debug, Deserialize)]
struct RoleUpdateRequest {
    role: Role,
}

#[derive(Debug, Serialize)]
struct CountResponse {
    total: i64,
}

async fn list(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<User>>, ApiError> {
    Ok(Json(context.users.list_users(page).await?))
}

async fn me(
    State(context): State<AppContext>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<User>, ApiError> {
    Ok(Json(context.users.get_user(identity.user_uuid).await?))
}

async fn update_me(
    State(context): State<AppContext>,
    CurrentUser(identity): CurrentUser,
    Json(update): Json<UserUpdate>,
) -> Result<Json<User>, ApiError> {
    let user = context
        .users
        .update_profile(identity.user_uuid, update)
        .await?;

    Ok(Json(user))
}

async fn count(
    State(context): State<AppContext>,
    _admin: AdminUser,
) -> Result<Json<CountResponse>, ApiError> {
    let total = context.users.count_users().await?;

    Ok(Json(CountResponse { total }))
}

async fn detail(
    State(context): State<AppContext>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(context.users.get_user(UserUuid::from_uuid(id)).await?))
}

async fn update_role(
    State(context): State<AppContext>,
    AdminUser(identity): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RoleUpdateRequest>,
) -> Result<Json<User>, ApiError> {
    let user = context
        .users
        .update_role(UserUuid::from_uuid(id), request.role, identity.user_uuid)
        .await?;

    Ok(Json(user))
}

async fn remove(
    State(context): State<AppContext>,
    AdminUser(identity): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    context
        .users
        .delete_user(UserUuid::from_uuid(id), identity.user_uuid)
        .await?;

    Ok(Json(MessageResponse::new("user deleted")))
}
