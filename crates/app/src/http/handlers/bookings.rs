//! Booking routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    context::AppContext,
    domain::{
        bookings::models::{Booking, BookingDetail, BookingUuid, NewBooking},
        pagination::{Page, PageRequest},
    },
    http::{MessageResponse, auth::{AdminUser, CurrentUser}, error::ApiError},
};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(list))
        .route("/vaccination", post(create))
        .route("/confirm", post(confirm))
        .route("/:id", get(detail).delete(remove))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmBookingRequest {
    booking_id: BookingUuid,
}

async fn list(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<BookingDetail>>, ApiError> {
    Ok(Json(context.bookings.list_bookings(page).await?))
}

async fn detail(
    State(context): State<AppContext>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingDetail>, ApiError> {
    let booking = context
        .bookings
        .get_booking(BookingUuid::from_uuid(id))
        .await?;

    Ok(Json(booking))
}

async fn create(
    State(context): State<AppContext>,
    CurrentUser(identity): CurrentUser,
    Json(new): Json<NewBooking>,
) -> Result<Json<Booking>, ApiError> {
    let booking = context
        .bookings
        .create_booking(identity.user_uuid, new)
        .await?;

    Ok(Json(booking))
}

async fn confirm(
    State(context): State<AppContext>,
    CurrentUser(identity): CurrentUser,
    Json(request): Json<ConfirmBookingRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    context
        .bookings
        .confirm_booking(request.booking_id, identity.user_uuid)
        .await?;

    Ok(Json(MessageResponse::new(
        "booking confirmed for cash payment; confirmation email sent",
    )))
}

async fn remove(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    context
        .bookings
        .delete_booking(BookingUuid::from_uuid(id))
        .await?;

    Ok(Json(MessageResponse::new("booking deleted")))
}
