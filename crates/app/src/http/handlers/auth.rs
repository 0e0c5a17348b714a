//! Account and session routes.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use crate::{
    auth::models::{LoginOutcome, NewStaffUser, RegisterRequest},
    context::AppContext,
    domain::users::models::User,
    http::{MessageResponse, auth::{AdminUser, CurrentUser}, error::ApiError},
};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/register", post(register))
        .route("/verify-email", post(verify_email))
        .route("/resend-verification", post(resend_verification))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/change-password", post(change_password))
        .route("/staff", post(create_staff))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyEmailRequest {
    email: String,
    code: String,
}

#[derive(Debug, Deserialize)]
struct EmailRequest {
    email: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest {
    refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordRequest {
    new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
    confirm_password: String,
}

async fn register(
    State(context): State<AppContext>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    context.auth.register(request).await?;

    Ok(Json(MessageResponse::new(
        "check your email for a verification code",
    )))
}

async fn verify_email(
    State(context): State<AppContext>,
    Json(request): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    context.auth.verify_email(&request.email, &request.code).await?;

    Ok(Json(MessageResponse::new("registration complete")))
}

async fn resend_verification(
    State(context): State<AppContext>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    context.auth.resend_verification(&request.email).await?;

    Ok(Json(MessageResponse::new("verification email resent")))
}

async fn login(
    State(context): State<AppContext>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginOutcome>, ApiError> {
    let outcome = context.auth.login(&request.email, &request.password).await?;

    Ok(Json(outcome))
}

async fn refresh(
    State(context): State<AppContext>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let access_token = context
        .auth
        .refresh_access_token(&request.refresh_token)
        .await?;

    Ok(Json(RefreshResponse { access_token }))
}

async fn logout(
    State(context): State<AppContext>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    context.auth.logout(&request.refresh_token).await?;

    Ok(Json(MessageResponse::new("logged out")))
}

async fn forgot_password(
    State(context): State<AppContext>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    context.auth.forgot_password(&request.email).await?;

    Ok(Json(MessageResponse::new(
        "password reset instructions sent",
    )))
}

async fn reset_password(
    State(context): State<AppContext>,
    CurrentUser(identity): CurrentUser,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    context
        .auth
        .reset_password(identity.user_uuid, &request.new_password)
        .await?;

    Ok(Json(MessageResponse::new("password reset")))
}

async fn change_password(
    State(context): State<AppContext>,
    CurrentUser(identity): CurrentUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    context
        .auth
        .change_password(
            identity.user_uuid,
            &request.current_password,
            &request.new_password,
            &request.confirm_password,
        )
        .await?;

    Ok(Json(MessageResponse::new("password changed")))
}

async fn create_staff(
    State(context): State<AppContext>,
    _admin: AdminUser,
    Json(request): Json<NewStaffUser>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(context.auth.create_user_by_admin(request).await?))
}
