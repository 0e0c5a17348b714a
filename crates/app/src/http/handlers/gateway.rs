//! Payment gateway routes.
//!
//! The IPN route is unauthenticated: the gateway cannot hold a bearer
//! token, so the HMAC signature on the payload is the authentication.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use crate::{
    context::AppContext,
    domain::{bookings::models::BookingUuid, payments::models::GatewayOrder},
    gateway::types::{IpnPayload, StatusResponse},
    http::{MessageResponse, auth::CurrentUser, error::ApiError},
};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/create", post(create_order))
        .route("/ipn", post(ipn))
        .route("/status", get(status))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderBody {
    booking_id: BookingUuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusQuery {
    order_id: String,
    request_id: String,
}

async fn create_order(
    State(context): State<AppContext>,
    CurrentUser(identity): CurrentUser,
    Json(body): Json<CreateOrderBody>,
) -> Result<Json<GatewayOrder>, ApiError> {
    let order = context
        .payments
        .create_gateway_order(body.booking_id, identity.user_uuid)
        .await?;

    Ok(Json(order))
}

async fn ipn(
    State(context): State<AppContext>,
    Json(payload): Json<IpnPayload>,
) -> Result<Json<MessageResponse>, ApiError> {
    context.payments.handle_ipn(payload).await?;

    Ok(Json(MessageResponse::new("ok")))
}

async fn status(
    State(context): State<AppContext>,
    _user: CurrentUser,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusResponse>, ApiError> {
    let response = context
        .payments
        .check_gateway_status(&query.order_id, &query.request_id)
        .await?;

    Ok(Json(response))
}
