//! Appointment routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    context::AppContext,
    domain::{
        appointments::models::{
            Appointment, AppointmentDetail, AppointmentUpdate, AppointmentUuid, DaySchedule,
        },
        pagination::{Page, PageRequest},
    },
    http::{MessageResponse, auth::{AdminUser, CurrentUser}, error::ApiError},
};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(list))
        .route("/today", get(today))
        .route("/:id", get(detail).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct TodayQuery {
    search: Option<String>,
}

async fn list(
    State(context): State<AppContext>,
    _user: CurrentUser,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<AppointmentDetail>>, ApiError> {
    Ok(Json(context.appointments.list_appointments(page).await?))
}

async fn today(
    State(context): State<AppContext>,
    _user: CurrentUser,
    Query(query): Query<TodayQuery>,
) -> Result<Json<DaySchedule>, ApiError> {
    let schedule = context.appointments.today_appointments(query.search).await?;

    Ok(Json(schedule))
}

async fn detail(
    State(context): State<AppContext>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentDetail>, ApiError> {
    let appointment = context
        .appointments
        .get_appointment(AppointmentUuid::from_uuid(id))
        .await?;

    Ok(Json(appointment))
}

async fn update(
    State(context): State<AppContext>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AppointmentUpdate>,
) -> Result<Json<Appointment>, ApiError> {
    let appointment = context
        .appointments
        .update_appointment(AppointmentUuid::from_uuid(id), body)
        .await?;

    Ok(Json(appointment))
}

async fn remove(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    context
        .appointments
        .delete_appointment(AppointmentUuid::from_uuid(id))
        .await?;

    Ok(Json(MessageResponse::new("appointment deleted")))
}
