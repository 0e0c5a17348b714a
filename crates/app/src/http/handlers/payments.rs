//! Payment routes.

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
        payments::models::{Payment, PaymentStatus, PaymentUuid, UserPaymentSummary},
    },
    http::{MessageResponse, auth::{AdminUser, CurrentUser}, error::ApiError},
};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(list))
        .route("/me", get(my_payments))
        .route("/count", get(count_completed))
        .route("/:id", get(detail).delete(remove))
        .route("/:id/status", put(change_status))
}

#[derive(Debug, Deserialize)]
struct StatusUpdateRequest {
    status: PaymentStatus,
}

#[derive(Debug, Serialize)]
struct CountResponse {
    total: i64,
}

async fn list(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<Payment>>, ApiError> {
    Ok(Json(context.payments.list_payments(page).await?))
}

async fn my_payments(
    State(context): State<AppContext>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<Vec<UserPaymentSummary>>, ApiError> {
    let payments = context
        .payments
        .user_payment_history(identity.user_uuid)
        .await?;

    Ok(Json(payments))
}

async fn count_completed(
    State(context): State<AppContext>,
    _admin: AdminUser,
) -> Result<Json<CountResponse>, ApiError> {
    let total = context.payments.count_completed_payments().await?;

    Ok(Json(CountResponse { total }))
}

async fn detail(
    State(context): State<AppContext>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Payment>, ApiError> {
    let payment = context
        .payments
        .get_payment(PaymentUuid::from_uuid(id))
        .await?;

    Ok(Json(payment))
}

async fn change_status(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    context
        .payments
        .change_cash_status(PaymentUuid::from_uuid(id), request.status)
        .await?;

    Ok(Json(MessageResponse::new(
        "payment and booking status updated",
    )))
}

async fn remove(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    context
        .payments
        .delete_payment(PaymentUuid::from_uuid(id))
        .await?;

    Ok(Json(MessageResponse::new("payment deleted")))
}
