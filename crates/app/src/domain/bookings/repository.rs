//! Bookings Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::{amount_to_i64, try_get_amount, try_get_variant},
    domain::{
        appointments::models::AppointmentUuid,
        bookings::models::{Booking, BookingDetail, BookingStatus, BookingUuid},
        pagination::PageRequest,
        payments::models::PaymentUuid,
        users::models::UserUuid,
        vaccines::models::VaccineUuid,
    },
};

const RESERVE_STOCK_SQL: &str = include_str!("sql/reserve_stock.sql");
const VACCINE_EXISTS_SQL: &str = include_str!("sql/vaccine_exists.sql");
const CREATE_BOOKING_SQL: &str = include_str!("sql/create_booking.sql");
const CREATE_APPOINTMENT_SQL: &str = include_str!("sql/create_appointment.sql");
const GET_BOOKING_DETAIL_SQL: &str = include_str!("sql/get_booking_detail.sql");
const LIST_BOOKINGS_SQL: &str = include_str!("sql/list_bookings.sql");
const COUNT_BOOKINGS_SQL: &str = include_str!("sql/count_bookings.sql");
const SET_BOOKING_STATUS_SQL: &str = include_str!("sql/set_booking_status.sql");
const CREATE_CASH_PAYMENT_SQL: &str = include_str!("sql/create_cash_payment.sql");
const CONFIRM_APPOINTMENT_SQL: &str = include_str!("sql/confirm_appointment.sql");
const DELETE_BOOKING_SQL: &str = include_str!("sql/delete_booking.sql");
const DELETE_EXPIRED_BOOKINGS_SQL: &str = include_str!("sql/delete_expired_bookings.sql");

/// Booking insertion payload with the frozen price snapshot.
pub(crate) struct NewBookingRow {
    pub uuid: BookingUuid,
    pub user_uuid: UserUuid,
    pub vaccine_uuid: VaccineUuid,
    pub quantity: u64,
    pub unit_price: u64,
    pub total_amount: u64,
    pub appointment_date: Timestamp,
    pub confirmation_time: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgBookingsRepository;

impl PgBookingsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Atomically decrement remaining stock when enough doses are left.
    ///
    /// Returns the vaccine's current unit price when the decrement applied,
    /// `None` when the vaccine is missing or short on stock. The conditional
    /// `UPDATE` is what makes two concurrent bookings unable to oversell.
    pub(crate) async fn reserve_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        vaccine: VaccineUuid,
        quantity: u64,
    ) -> Result<Option<u64>, sqlx::Error> {
        let row = query(RESERVE_STOCK_SQL)
            .bind(vaccine.into_uuid())
            .bind(amount_to_i64(quantity, "quantity")?)
            .fetch_optional(&mut **tx)
            .await?;

        row.map(|row| try_get_amount(&row, "price")).transpose()
    }

    pub(crate) async fn vaccine_exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        vaccine: VaccineUuid,
    ) -> Result<bool, sqlx::Error> {
        query_scalar::<Postgres, bool>(VACCINE_EXISTS_SQL)
            .bind(vaccine.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_booking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        new: &NewBookingRow,
    ) -> Result<Booking, sqlx::Error> {
        query_as::<Postgres, Booking>(CREATE_BOOKING_SQL)
            .bind(new.uuid.into_uuid())
            .bind(new.user_uuid.into_uuid())
            .bind(new.vaccine_uuid.into_uuid())
            .bind(amount_to_i64(new.quantity, "quantity")?)
            .bind(amount_to_i64(new.unit_price, "unit_price")?)
            .bind(amount_to_i64(new.total_amount, "total_amount")?)
            .bind(BookingStatus::Pending.as_str())
            .bind(SqlxTimestamp::from(new.appointment_date))
            .bind(SqlxTimestamp::from(new.confirmation_time))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_appointment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        appointment: AppointmentUuid,
        user: UserUuid,
        vaccine: VaccineUuid,
        appointment_date: Timestamp,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_APPOINTMENT_SQL)
            .bind(appointment.into_uuid())
            .bind(user.into_uuid())
            .bind(vaccine.into_uuid())
            .bind(SqlxTimestamp::from(appointment_date))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn get_booking_detail(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
    ) -> Result<BookingDetail, sqlx::Error> {
        query_as::<Postgres, BookingDetail>(GET_BOOKING_DETAIL_SQL)
            .bind(booking.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_bookings(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        page: &PageRequest,
    ) -> Result<(Vec<BookingDetail>, i64), sqlx::Error> {
        let bookings = query_as::<Postgres, BookingDetail>(LIST_BOOKINGS_SQL)
            .bind(page.search_pattern())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut **tx)
            .await?;

        let total = query_scalar::<Postgres, i64>(COUNT_BOOKINGS_SQL)
            .bind(page.search_pattern())
            .fetch_one(&mut **tx)
            .await?;

        Ok((bookings, total))
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

    pub(crate) async fn create_cash_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        booking: BookingUuid,
        user: UserUuid,
        amount: u64,
        appointment_date: Timestamp,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_CASH_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .bind(booking.into_uuid())
            .bind(user.into_uuid())
            .bind(amount_to_i64(amount, "amount")?)
            .bind(SqlxTimestamp::from(appointment_date))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn confirm_appointment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        vaccine: VaccineUuid,
        appointment_date: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CONFIRM_APPOINTMENT_SQL)
            .bind(user.into_uuid())
            .bind(vaccine.into_uuid())
            .bind(SqlxTimestamp::from(appointment_date))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_booking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_BOOKING_SQL)
            .bind(booking.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Delete PENDING bookings created before the cutoff. Rows only; the
    /// stock reserved by an expired booking is not returned to the vaccine.
    pub(crate) async fn delete_expired(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_EXPIRED_BOOKINGS_SQL)
            .bind(SqlxTimestamp::from(cutoff))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

pub(crate) fn booking_from_row(row: &PgRow) -> sqlx::Result<Booking> {
    Ok(Booking {
        uuid: BookingUuid::from_uuid(row.try_get("uuid")?),
        user_uuid: UserUuid::from_uuid(row.try_get::<Uuid, _>("user_uuid")?),
        vaccine_uuid: VaccineUuid::from_uuid(row.try_get::<Uuid, _>("vaccine_uuid")?),
        quantity: try_get_amount(row, "quantity")?,
        unit_price: try_get_amount(row, "unit_price")?,
        total_amount: try_get_amount(row, "total_amount")?,
        status: try_get_variant(row, "status", BookingStatus::parse)?,
        appointment_date: row.try_get::<SqlxTimestamp, _>("appointment_date")?.to_jiff(),
        confirmation_time: row.try_get::<SqlxTimestamp, _>("confirmation_time")?.to_jiff(),
        created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
    })
}

impl<'r> FromRow<'r, PgRow> for Booking {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        booking_from_row(row)
    }
}

impl<'r> FromRow<'r, PgRow> for BookingDetail {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            booking: booking_from_row(row)?,
            user_name: row.try_get("user_name")?,
            user_email: row.try_get("user_email")?,
            vaccine_name: row.try_get("vaccine_name")?,
        })
    }
}
