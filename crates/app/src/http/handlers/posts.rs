//! Blog post routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    context::AppContext,
    domain::{
        pagination::{Page, PageRequest},
        posts::models::{NewPost, Post, PostUuid},
    },
    http::{MessageResponse, auth::{AdminUser, CurrentUser}, error::ApiError},
};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(detail).put(update).delete(remove))
}

async fn list(
    State(context): State<AppContext>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<Post>>, ApiError> {
    Ok(Json(context.posts.list_posts(page).await?))
}

async fn detail(
    State(context): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(context.posts.get_post(PostUuid::from_uuid(id)).await?))
}

async fn create(
    State(context): State<AppContext>,
    CurrentUser(identity): CurrentUser,
    Json(new): Json<NewPost>,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(context.posts.create_post(identity.user_uuid, new).await?))
}

async fn update(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<NewPost>,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(context.posts.update_post(PostUuid::from_uuid(id), body).await?))
}

async fn remove(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    context.posts.delete_post(PostUuid::from_uuid(id)).await?;

    Ok(Json(MessageResponse::new("post deleted")))
}
