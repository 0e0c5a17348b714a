//! Vaccine catalog routes.

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
        vaccines::models::{NewVaccine, Vaccine, VaccineUpdate, VaccineUuid},
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
) -> Result<Json<Page<Vaccine>>, ApiError> {
    Ok(Json(context.vaccines.list_vaccines(page).await?))
}

async fn detail(
    State(context): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vaccine>, ApiError> {
    let vaccine = context
        .vaccines
        .get_vaccine(VaccineUuid::from_uuid(id))
        .await?;

    Ok(Json(vaccine))
}

async fn create(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Json(new): Json<NewVaccine>,
) -> Result<Json<Vaccine>, ApiError> {
    Ok(Json(context.vaccines.create_vaccine(new).await?))
}

async fn update(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<VaccineUpdate>,
) -> Result<Json<Vaccine>, ApiError> {
    let vaccine = context
        .vaccines
        .update_vaccine(VaccineUuid::from_uuid(id), body)
        .await?;

    Ok(Json(vaccine))
}

async fn remove(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    context
        .vaccines
        .delete_vaccine(VaccineUuid::from_uuid(id))
        .await?;

    Ok(Json(MessageResponse::new("vaccine deleted")))
}
