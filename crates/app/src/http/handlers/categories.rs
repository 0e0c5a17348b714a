//! Category routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    context::AppContext,
    domain::{
        categories::models::{Category, CategoryUuid, NewCategory},
        pagination::{Page, PageRequest},
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
) -> Result<Json<Page<Category>>, ApiError> {
    Ok(Json(context.categories.list_categories(page).await?))
}

async fn detail(
    State(context): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, ApiError> {
    let category = context
        .categories
        .get_category(CategoryUuid::from_uuid(id))
        .await?;

    Ok(Json(category))
}

async fn create(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Json(new): Json<NewCategory>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(context.categories.create_category(new).await?))
}

async fn update(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<NewCategory>,
) -> Result<Json<Category>, ApiError> {
    let category = context
        .categories
        .update_category(CategoryUuid::from_uuid(id), body)
        .await?;

    Ok(Json(category))
}

async fn remove(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    context
        .categories
        .delete_category(CategoryUuid::from_uuid(id))
        .await?;

    Ok(Json(MessageResponse::new("category deleted")))
}
