//! Manufacturer routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    context::AppContext,
    domain::{
        manufacturers::models::{Manufacturer, ManufacturerUuid, NewManufacturer},
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
) -> Result<Json<Page<Manufacturer>>, ApiError> {
    Ok(Json(context.manufacturers.list_manufacturers(page).await?))
}

async fn detail(
    State(context): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Manufacturer>, ApiError> {
    let manufacturer = context
        .manufacturers
        .get_manufacturer(ManufacturerUuid::from_uuid(id))
        .await?;

    Ok(Json(manufacturer))
}

async fn create(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Json(new): Json<NewManufacturer>,
) -> Result<Json<Manufacturer>, ApiError> {
    Ok(Json(context.manufacturers.create_manufacturer(new).await?))
}

async fn update(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<NewManufacturer>,
) -> Result<Json<Manufacturer>, ApiError> {
    let manufacturer = context
        .manufacturers
        .update_manufacturer(ManufacturerUuid::from_uuid(id), body)
        .await?;

    Ok(Json(manufacturer))
}

async fn remove(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    context
        .manufacturers
        .delete_manufacturer(ManufacturerUuid::from_uuid(id))
        .await?;

    Ok(Json(MessageResponse::new("manufacturer deleted")))
}
