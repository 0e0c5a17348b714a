//! Tag routes.

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
        tags::models::{NewTag, Tag, TagUuid},
    },
    http::{MessageResponse, auth::AdminUser, error::ApiError},
};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(detail).put(update).delete(remove))
}

async fn list(
    State(context): State<AppContext>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<Tag>>, ApiError> {
    Ok(Json(context.tags.list_tags(page).await?))
}

async fn detail(
    State(context): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Tag>, ApiError> {
    Ok(Json(context.tags.get_tag(TagUuid::from_uuid(id)).await?))
}

async fn create(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Json(new): Json<NewTag>,
) -> Result<Json<Tag>, ApiError> {
    Ok(Json(context.tags.create_tag(new).await?))
}

async fn update(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<NewTag>,
) -> Result<Json<Tag>, ApiError> {
    Ok(Json(context.tags.update_tag(TagUuid::from_uuid(id), body).await?))
}

async fn remove(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    context.tags.delete_tag(TagUuid::from_uuid(id)).await?;

    Ok(Json(MessageResponse::new("tag deleted")))
}
