//! Appointments Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::try_get_variant,
    domain::{
        appointments::models::{
            Appointment, AppointmentDetail, AppointmentStatus, AppointmentUpdate, AppointmentUuid,
        },
        pagination::PageRequest,
        users::models::UserUuid,
        vaccines::models::VaccineUuid,
    },
    ids::TypedUuid,
};

const LIST_APPOINTMENTS_SQL: &str = include_str!("sql/list_appointments.sql");
const COUNT_APPOINTMENTS_SQL: &str = include_str!("sql/count_appointments.sql");
const GET_APPOINTMENT_SQL: &str = include_str!("sql/get_appointment.sql");
const UPDATE_APPOINTMENT_SQL: &str = include_str!("sql/update_appointment.sql");
const DELETE_APPOINTMENT_SQL: &str = include_str!("sql/delete_appointment.sql");
const LIST_DAY_APPOINTMENTS_SQL: &str = include_str!("sql/list_day_appointments.sql");
const VACCINE_PROVENANCE_SQL: &str = include_str!("sql/vaccine_provenance.sql");
const CREATE_VACCINATION_RECORD_SQL: &str = include_str!("sql/create_vaccination_record.sql");

/// Certificate source fields read from the vaccine row.
pub(crate) struct VaccineProvenance {
    pub location: Option<String>,
    pub manufacturer_uuid: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAppointmentsRepository;

impl PgAppointmentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_appointments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        page: &PageRequest,
    ) -> Result<(Vec<AppointmentDetail>, i64), sqlx::Error> {
        let appointments = query_as::<Postgres, AppointmentDetail>(LIST_APPOINTMENTS_SQL)
            .bind(page.search_pattern())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut **tx)
            .await?;

        let total = query_scalar::<Postgres, i64>(COUNT_APPOINTMENTS_SQL)
            .bind(page.search_pattern())
            .fetch_one(&mut **tx)
            .await?;

        Ok((appointments, total))
    }

    pub(crate) async fn get_appointment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        appointment: AppointmentUuid,
    ) -> Result<AppointmentDetail, sqlx::Error> {
        query_as::<Postgres, AppointmentDetail>(GET_APPOINTMENT_SQL)
            .bind(appointment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_appointment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        appointment: AppointmentUuid,
        update: &AppointmentUpdate,
    ) -> Result<Appointment, sqlx::Error> {
        query_as::<Postgres, Appointment>(UPDATE_APPOINTMENT_SQL)
            .bind(appointment.into_uuid())
            .bind(update.status.map(AppointmentStatus::as_str))
            .bind(update.appointment_date.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_appointment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        appointment: AppointmentUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_APPOINTMENT_SQL)
            .bind(appointment.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn list_day_appointments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        start: Timestamp,
        end: Timestamp,
        search: Option<&str>,
    ) -> Result<Vec<AppointmentDetail>, sqlx::Error> {
        query_as::<Postgres, AppointmentDetail>(LIST_DAY_APPOINTMENTS_SQL)
            .bind(SqlxTimestamp::from(start))
            .bind(SqlxTimestamp::from(end))
            .bind(search.map(|term| format!("%{term}%")))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn vaccine_provenance(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        vaccine: VaccineUuid,
    ) -> Result<VaccineProvenance, sqlx::Error> {
        let row = query(VACCINE_PROVENANCE_SQL)
            .bind(vaccine.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        Ok(VaccineProvenance {
            location: row.try_get("location")?,
            manufacturer_uuid: row.try_get("manufacturer_uuid")?,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn create_vaccination_record(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        vaccine: VaccineUuid,
        vaccinated_on: Timestamp,
        location: &str,
        provider: &str,
        certificate: &str,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_VACCINATION_RECORD_SQL)
            .bind(Uuid::now_v7())
            .bind(user.into_uuid())
            .bind(vaccine.into_uuid())
            .bind(SqlxTimestamp::from(vaccinated_on))
            .bind(location)
            .bind(provider)
            .bind(certificate)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

pub(crate) fn appointment_from_row(row: &PgRow) -> sqlx::Result<Appointment> {
    Ok(Appointment {
        uuid: TypedUuid::from_uuid(row.try_get("uuid")?),
        user_uuid: UserUuid::from_uuid(row.try_get::<Uuid, _>("user_uuid")?),
        vaccine_uuid: VaccineUuid::from_uuid(row.try_get::<Uuid, _>("vaccine_uuid")?),
        appointment_date: row.try_get::<SqlxTimestamp, _>("appointment_date")?.to_jiff(),
        status: try_get_variant(row, "status", AppointmentStatus::parse)?,
        created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
    })
}

impl<'r> FromRow<'r, PgRow> for Appointment {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        appointment_from_row(row)
    }
}

impl<'r> FromRow<'r, PgRow> for AppointmentDetail {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            appointment: appointment_from_row(row)?,
            user_name: row.try_get("user_name")?,
            user_email: row.try_get("user_email")?,
            vaccine_name: row.try_get("vaccine_name")?,
        })
    }
}
