//! Payments Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::{amount_to_i64, try_get_amount, try_get_variant},
    domain::{
        bookings::models::{Booking, BookingStatus, BookingUuid},
        pagination::PageRequest,
        payments::models::{
            Payment, PaymentMethod, PaymentStatus, PaymentUuid, UserPaymentSummary,
        },
        users::models::UserUuid,
        vaccines::models::VaccineUuid,
    },
};

const BOOKING_AMOUNT_SQL: &str = include_str!("sql/booking_amount.sql");
const CREATE_GATEWAY_PAYMENT_SQL: &str = include_str!("sql/create_gateway_payment.sql");
const GET_PAYMENT_SQL: &str = include_str!("sql/get_payment.sql");
const GET_PAYMENT_BY_ORDER_SQL: &str = include_str!("sql/get_payment_by_order.sql");
const SET_PAYMENT_STATUS_SQL: &str = include_str!("sql/set_payment_status.sql");
const CONFIRM_BOOKING_PAID_SQL: &str = include_str!("sql/confirm_booking_paid.sql");
const COMPLETE_APPOINTMENT_SQL: &str = include_str!("sql/complete_appointment.sql");
const SET_BOOKING_STATUS_SQL: &str = include_str!("sql/set_booking_status.sql");
const LIST_PAYMENTS_SQL: &str = include_str!("sql/list_payments.sql");
const COUNT_PAYMENTS_SQL: &str = include_str!("sql/count_payments.sql");
const LIST_USER_PAYMENTS_SQL: &str = include_str!("sql/list_user_payments.sql");
const COUNT_COMPLETED_SQL: &str = include_str!("sql/count_completed.sql");
const DELETE_PAYMENT_SQL: &str = include_str!("sql/delete_payment.sql");

/// Frozen booking fields needed to build a gateway order.
pub(crate) struct BookingAmount {
    pub total_amount: u64,
    pub appointment_date: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPaymentsRepository;

impl PgPaymentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn booking_amount(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
    ) -> Result<Option<BookingAmount>, sqlx::Error> {
        let row = query(BOOKING_AMOUNT_SQL)
            .bind(booking.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        row.map(|row| {
            Ok(BookingAmount {
                total_amount: try_get_amount(&row, "total_amount")?,
                appointment_date: row
                    .try_get::<SqlxTimestamp, _>("appointment_date")?
                    .to_jiff(),
            })
        })
        .transpose()
    }

    pub(crate) async fn create_gateway_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        booking: BookingUuid,
        user: UserUuid,
        amount: u64,
        order_id: &str,
        appointment_date: Timestamp,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_GATEWAY_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .bind(booking.into_uuid())
            .bind(user.into_uuid())
            .bind(amount_to_i64(amount, "amount")?)
            .bind(order_id)
            .bind(SqlxTimestamp::from(appointment_date))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn get_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<Payment, sqlx::Error> {
        query_as::<Postgres, Payment>(GET_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_payment_by_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: &str,
    ) -> Result<Option<Payment>, sqlx::Error> {
        query_as::<Postgres, Payment>(GET_PAYMENT_BY_ORDER_SQL)
            .bind(order_id)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn set_payment_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        status: PaymentStatus,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_PAYMENT_STATUS_SQL)
            .bind(payment.into_uuid())
            .bind(status.as_str())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Mark a booking CONFIRMED, stamping the completion instant into
    /// `confirmation_time`.
    pub(crate) async fn confirm_booking_paid(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
    ) -> Result<Booking, sqlx::Error> {
        query_as::<Postgres, Booking>(CONFIRM_BOOKING_PAID_SQL)
            .bind(booking.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn complete_appointment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        vaccine: VaccineUuid,
        appointment_date: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(COMPLETE_APPOINTMENT_SQL)
            .bind(user.into_uuid())
            .bind(vaccine.into_uuid())
            .bind(SqlxTimestamp::from(appointment_date))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn set_booking_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
        status: BookingStatus,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_BOOKING_STATUS_SQL)
            .bind(booking.into_uuid())
            .bind(status.as_str())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn list_payments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        page: &PageRequest,
    ) -> Result<(Vec<Payment>, i64), sqlx::Error> {
        let payments = query_as::<Postgres, Payment>(LIST_PAYMENTS_SQL)
            .bind(page.search_pattern())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut **tx)
            .await?;

        let total = query_scalar::<Postgres, i64>(COUNT_PAYMENTS_SQL)
            .bind(page.search_pattern())
            .fetch_one(&mut **tx)
            .await?;

        Ok((payments, total))
    }

    pub(crate) async fn list_user_payments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<UserPaymentSummary>, sqlx::Error> {
        query_as::<Postgres, UserPaymentSummary>(LIST_USER_PAYMENTS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_completed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<i64, sqlx::Error> {
        query_scalar::<Postgres, i64>(COUNT_COMPLETED_SQL)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for Payment {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PaymentUuid::from_uuid(row.try_get("uuid")?),
            booking_uuid: BookingUuid::from_uuid(row.try_get::<Uuid, _>("booking_uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get::<Uuid, _>("user_uuid")?),
            amount: try_get_amount(row, "amount")?,
            method: try_get_variant(row, "method", PaymentMethod::parse)?,
            status: try_get_variant(row, "status", PaymentStatus::parse)?,
            order_id: row.try_get("order_id")?,
            appointment_date: row
                .try_get::<Option<SqlxTimestamp>, _>("appointment_date")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for UserPaymentSummary {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            payment_uuid: PaymentUuid::from_uuid(row.try_get("uuid")?),
            booking_uuid: BookingUuid::from_uuid(row.try_get::<Uuid, _>("booking_uuid")?),
            appointment_date: row
                .try_get::<Option<SqlxTimestamp>, _>("appointment_date")?
                .map(SqlxTimestamp::to_jiff),
            quantity: try_get_amount(row, "quantity")?,
            total_amount: try_get_amount(row, "total_amount")?,
            vaccine_name: row.try_get("vaccine_name")?,
            status: try_get_variant(row, "status", PaymentStatus::parse)?,
            method: try_get_variant(row, "method", PaymentMethod::parse)?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
