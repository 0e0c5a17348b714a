//! HTTP error responses.
//!
//! Bridges domain errors into status codes and a JSON body of
//! `{ code, message }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    auth::AuthServiceError,
    domain::{
        appointments::AppointmentsServiceError, bookings::BookingsServiceError,
        categories::CategoriesServiceError, inventory::InventoryServiceError,
        manufacturers::ManufacturersServiceError, notifications::NotificationsServiceError,
        payments::PaymentsServiceError, posts::PostsServiceError,
        suppliers::SuppliersServiceError, tags::TagsServiceError, users::UsersServiceError,
        vaccines::VaccinesServiceError,
    },
    gateway::GatewayError,
};

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "VALIDATION_ERROR",
            message,
        )
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "An internal error occurred",
        )
    }

    #[must_use]
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", message)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, code = self.code, message = %self.message, "request failed");
        }

        let body = ErrorBody {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

fn sql_error() -> ApiError {
    ApiError::internal()
}

impl From<SuppliersServiceError> for ApiError {
    fn from(error: SuppliersServiceError) -> Self {
        match error {
            SuppliersServiceError::NotFound => Self::not_found(error.to_string()),
            SuppliersServiceError::Sql(_) => sql_error(),
        }
    }
}

impl From<ManufacturersServiceError> for ApiError {
    fn from(error: ManufacturersServiceError) -> Self {
        match error {
            ManufacturersServiceError::NotFound => Self::not_found(error.to_string()),
            ManufacturersServiceError::Sql(_) => sql_error(),
        }
    }
}

impl From<CategoriesServiceError> for ApiError {
    fn from(error: CategoriesServiceError) -> Self {
        match error {
            CategoriesServiceError::NotFound => Self::not_found(error.to_string()),
            CategoriesServiceError::Sql(_) => sql_error(),
        }
    }
}

impl From<TagsServiceError> for ApiError {
    fn from(error: TagsServiceError) -> Self {
        match error {
            TagsServiceError::AlreadyExists => Self::conflict(error.to_string()),
            TagsServiceError::NotFound => Self::not_found(error.to_string()),
            TagsServiceError::Sql(_) => sql_error(),
        }
    }
}

impl From<PostsServiceError> for ApiError {
    fn from(error: PostsServiceError) -> Self {
        match error {
            PostsServiceError::NotFound => Self::not_found(error.to_string()),
            PostsServiceError::InvalidReference => Self::validation(error.to_string()),
            PostsServiceError::Sql(_) => sql_error(),
        }
    }
}

impl From<VaccinesServiceError> for ApiError {
    fn from(error: VaccinesServiceError) -> Self {
        match error {
            VaccinesServiceError::AlreadyExists => Self::conflict(error.to_string()),
            VaccinesServiceError::NotFound => Self::not_found(error.to_string()),
            VaccinesServiceError::InvalidReference | VaccinesServiceError::InvalidData => {
                Self::validation(error.to_string())
            }
            VaccinesServiceError::Sql(_) => sql_error(),
        }
    }
}

impl From<InventoryServiceError> for ApiError {
    fn from(_: InventoryServiceError) -> Self {
        sql_error()
    }
}

impl From<UsersServiceError> for ApiError {
    fn from(error: UsersServiceError) -> Self {
        match error {
            UsersServiceError::NotFound => Self::not_found(error.to_string()),
            UsersServiceError::CannotChangeOwnRole
            | UsersServiceError::CannotDeleteAdmin
            | UsersServiceError::CannotDeleteSelf => Self::forbidden(error.to_string()),
            UsersServiceError::Sql(_) => sql_error(),
        }
    }
}

impl From<AuthServiceError> for ApiError {
    fn from(error: AuthServiceError) -> Self {
        match error {
            AuthServiceError::Unauthorized | AuthServiceError::Token(_) => {
                Self::unauthorized("invalid credentials or token")
            }
            AuthServiceError::EmailTaken | AuthServiceError::AlreadyInitialized => {
                Self::conflict(error.to_string())
            }
            AuthServiceError::PasswordMismatch
            | AuthServiceError::WrongPassword
            | AuthServiceError::SamePassword
            | AuthServiceError::AlreadyVerified
            | AuthServiceError::InvalidCode
            | AuthServiceError::CodeExpired => Self::bad_request(error.to_string()),
            AuthServiceError::NotFound => Self::not_found(error.to_string()),
            AuthServiceError::Mail(_) => Self::upstream("notification email failed"),
            AuthServiceError::Sql(_) => sql_error(),
        }
    }
}

impl From<BookingsServiceError> for ApiError {
    fn from(error: BookingsServiceError) -> Self {
        match error {
            BookingsServiceError::VaccineNotFound | BookingsServiceError::NotFound => {
                Self::not_found(error.to_string())
            }
            BookingsServiceError::InsufficientStock => {
                Self::new(StatusCode::CONFLICT, "INSUFFICIENT_STOCK", error.to_string())
            }
            BookingsServiceError::InvalidQuantity => Self::validation(error.to_string()),
            BookingsServiceError::Forbidden => Self::forbidden(error.to_string()),
            BookingsServiceError::InvalidState(_) => Self::bad_request(error.to_string()),
            BookingsServiceError::Mail(_) => {
                // the state change is already committed; the caller only
                // learns that the notification leg failed
                Self::upstream("booking confirmed but the confirmation email failed")
            }
            BookingsServiceError::Qr(_) | BookingsServiceError::Sql(_) => sql_error(),
        }
    }
}

impl From<PaymentsServiceError> for ApiError {
    fn from(error: PaymentsServiceError) -> Self {
        match error {
            PaymentsServiceError::NotFound | PaymentsServiceError::BookingNotFound => {
                Self::not_found(error.to_string())
            }
            PaymentsServiceError::CashOnly => Self::bad_request(error.to_string()),
            PaymentsServiceError::Gateway(GatewayError::InvalidSignature) => {
                Self::unauthorized("gateway signature mismatch")
            }
            PaymentsServiceError::Gateway(gateway_error) => {
                Self::upstream(gateway_error.to_string())
            }
            PaymentsServiceError::Sql(_) => sql_error(),
        }
    }
}

impl From<AppointmentsServiceError> for ApiError {
    fn from(error: AppointmentsServiceError) -> Self {
        match error {
            AppointmentsServiceError::NotFound => Self::not_found(error.to_string()),
            AppointmentsServiceError::Time(_) | AppointmentsServiceError::Sql(_) => sql_error(),
        }
    }
}

impl From<NotificationsServiceError> for ApiError {
    fn from(_: NotificationsServiceError) -> Self {
        sql_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_maps_to_conflict() {
        let error = ApiError::from(BookingsServiceError::InsufficientStock);

        assert_eq!(error.status, StatusCode::CONFLICT);
        assert_eq!(error.code, "INSUFFICIENT_STOCK");
    }

    #[test]
    fn bad_ipn_signature_maps_to_unauthorized() {
        let error =
            ApiError::from(PaymentsServiceError::Gateway(GatewayError::InvalidSignature));

        assert_eq!(error.status, StatusCode::UNAUTHORIZED);
    }
}
