//! Inventory routes.

use axum::{Json, Router, extract::State, routing::get};

use crate::{
    context::AppContext,
    domain::vaccines::models::StockLevel,
    http::{auth::AdminUser, error::ApiError},
};

pub fn routes() -> Router<AppContext> {
    Router::new().route("/", get(stock_summary))
}

async fn stock_summary(
    State(context): State<AppContext>,
    _admin: AdminUser,
) -> Result<Json<Vec<StockLevel>>, ApiError> {
    Ok(Json(context.inventory.stock_summary().await?))
}
