//! Supplier routes.

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
        suppliers::models::{NewSupplier, Supplier, SupplierUuid},
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
) -> Result<Json<Page<Supplier>>, ApiError> {
    Ok(Json(context.suppliers.list_suppliers(page).await?))
}

async fn detail(
    State(context): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Supplier>, ApiError> {
    let supplier = context
        .suppliers
        .get_supplier(SupplierUuid::from_uuid(id))
        .await?;

    Ok(Json(supplier))
}

async fn create(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Json(new): Json<NewSupplier>,
) -> Result<Json<Supplier>, ApiError> {
    Ok(Json(context.suppliers.create_supplier(new).await?))
}

async fn update(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<NewSupplier>,
) -> Result<Json<Supplier>, ApiError> {
    let supplier = context
        .suppliers
        .update_supplier(SupplierUuid::from_uuid(id), body)
        .await?;

    Ok(Json(supplier))
}

async fn remove(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    context
        .suppliers
        .delete_supplier(SupplierUuid::from_uuid(id))
        .await?;

    Ok(Json(MessageResponse::new("supplier deleted")))
}
