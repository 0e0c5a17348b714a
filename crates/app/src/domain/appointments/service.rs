//! Appointments service.

use async_trait::async_trait;
use jiff::{Timestamp, ToSpan, civil::Date, tz::TimeZone};
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        appointments::{
            errors::AppointmentsServiceError,
            models::{
                Appointment, AppointmentDetail, AppointmentStatus, AppointmentUpdate,
                AppointmentUuid, DaySchedule,
            },
            repository::PgAppointmentsRepository,
        },
        pagination::{Page, PageRequest},
    },
};

/// Half-open `[start, end)` bounds of a UTC calendar day, `days_ahead`
/// days from now.
pub(crate) fn utc_day_bounds(days_ahead: i32) -> Result<(Date, Timestamp, Timestamp), jiff::Error> {
    let day = Timestamp::now()
        .to_zoned(TimeZone::UTC)
        .date()
        .checked_add(days_ahead.days())?;

    let start = day.to_zoned(TimeZone::UTC)?.timestamp();
    let end = start.checked_add(24.hours())?;

    Ok((day, start, end))
}

#[derive(Debug, Clone)]
pub struct PgAppointmentsService {
    db: Db,
    repository: PgAppointmentsRepository,
}

impl PgAppointmentsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAppointmentsRepository::new(),
        }
    }
}

#[async_trait]
impl AppointmentsService for PgAppointmentsService {
    async fn list_appointments(
        &self,
        page: PageRequest,
    ) -> Result<Page<AppointmentDetail>, AppointmentsServiceError> {
        let mut tx = self.db.begin().await?;

        let (appointments, total) = self.repository.list_appointments(&mut tx, &page).await?;

        tx.commit().await?;

        Ok(Page::new(appointments, total, &page))
    }

    async fn get_appointment(
        &self,
        appointment: AppointmentUuid,
    ) -> Result<AppointmentDetail, AppointmentsServiceError> {
        let mut tx = self.db.begin().await?;

        let detail = self.repository.get_appointment(&mut tx, appointment).await?;

        tx.commit().await?;

        Ok(detail)
    }

    async fn update_appointment(
        &self,
        appointment: AppointmentUuid,
        update: AppointmentUpdate,
    ) -> Result<Appointment, AppointmentsServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_appointment(&mut tx, appointment, &update)
            .await?;

        // A completed visit produces a vaccination record with its
        // certificate, inside the same transaction as the status change.
        if updated.status == AppointmentStatus::Completed {
            let provenance = self
                .repository
                .vaccine_provenance(&mut tx, updated.vaccine_uuid)
                .await?;

            let certificate =
                format!("CERT-{}-{}", updated.uuid, Timestamp::now().as_millisecond());

            self.repository
                .create_vaccination_record(
                    &mut tx,
                    updated.user_uuid,
                    updated.vaccine_uuid,
                    updated.appointment_date,
                    provenance.location.as_deref().unwrap_or("Unknown"),
                    provenance
                        .manufacturer_uuid
                        .map(|uuid| uuid.to_string())
                        .as_deref()
                        .unwrap_or("Unknown"),
                    &certificate,
                )
                .await?;
        }

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_appointment(
        &self,
        appointment: AppointmentUuid,
    ) -> Result<(), AppointmentsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_appointment(&mut tx, appointment).await?;

        if rows_affected == 0 {
            return Err(AppointmentsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn today_appointments(
        &self,
        search: Option<String>,
    ) -> Result<DaySchedule, AppointmentsServiceError> {
        let (day, start, end) = utc_day_bounds(0)?;

        let mut tx = self.db.begin().await?;

        let appointments = self
            .repository
            .list_day_appointments(&mut tx, start, end, search.as_deref())
            .await?;

        tx.commit().await?;

        Ok(DaySchedule {
            date: day.to_string(),
            total: appointments.len() as i64,
            appointments,
        })
    }
}

#[automock]
#[async_trait]
pub trait AppointmentsService: Send + Sync {
    /// Retrieve a page of appointments, searching by vaccine name.
    async fn list_appointments(
        &self,
        page: PageRequest,
    ) -> Result<Page<AppointmentDetail>, AppointmentsServiceError>;

    /// Retrieve a single appointment with its user and vaccine.
    async fn get_appointment(
        &self,
        appointment: AppointmentUuid,
    ) -> Result<AppointmentDetail, AppointmentsServiceError>;

    /// Update status and/or date. Completing an appointment also writes a
    /// vaccination record.
    async fn update_appointment(
        &self,
        appointment: AppointmentUuid,
        update: AppointmentUpdate,
    ) -> Result<Appointment, AppointmentsServiceError>;

    /// Deletes an appointment with the given UUID.
    async fn delete_appointment(
        &self,
        appointment: AppointmentUuid,
    ) -> Result<(), AppointmentsServiceError>;

    /// All of today's appointments (UTC), optionally filtered by vaccine
    /// name.
    async fn today_appointments(
        &self,
        search: Option<String>,
    ) -> Result<DaySchedule, AppointmentsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::bookings::models::NewBooking,
        test::{TestContext, new_vaccine},
    };

    use super::*;

    async fn booked_appointment(
        ctx: &TestContext,
        appointment_date: Timestamp,
    ) -> TestResult<AppointmentUuid> {
        let user = ctx.create_user("alice@example.com").await;

        let vaccine = ctx
            .vaccines
            .create_vaccine(new_vaccine("Fluvax", 100, 5))
            .await?;

        ctx.bookings
            .create_booking(
                user,
                NewBooking {
                    vaccine_uuid: vaccine.uuid,
                    quantity: 1,
                    appointment_date,
                },
            )
            .await?;

        let page = ctx
            .appointments
            .list_appointments(PageRequest::default())
            .await?;

        Ok(page.data[0].appointment.uuid)
    }

    #[tokio::test]
    async fn completing_appointment_writes_vaccination_record() -> TestResult {
        let ctx = TestContext::new().await;
        let when = Timestamp::now().saturating_add(48.hours());

        let appointment = booked_appointment(&ctx, when).await?;

        let updated = ctx
            .appointments
            .update_appointment(
                appointment,
                AppointmentUpdate {
                    status: Some(AppointmentStatus::Completed),
                    appointment_date: None,
                },
            )
            .await?;

        assert_eq!(updated.status, AppointmentStatus::Completed);

        let certificates = ctx.vaccination_certificates(updated.user_uuid).await;

        assert_eq!(certificates.len(), 1);
        assert!(certificates[0].starts_with(&format!("CERT-{}", updated.uuid)));

        Ok(())
    }

    #[tokio::test]
    async fn non_completed_update_writes_no_record() -> TestResult {
        let ctx = TestContext::new().await;
        let when = Timestamp::now().saturating_add(48.hours());

        let appointment = booked_appointment(&ctx, when).await?;

        let updated = ctx
            .appointments
            .update_appointment(
                appointment,
                AppointmentUpdate {
                    status: Some(AppointmentStatus::Confirmed),
                    appointment_date: None,
                },
            )
            .await?;

        assert!(ctx.vaccination_certificates(updated.user_uuid).await.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn today_appointments_only_include_todays() -> TestResult {
        let ctx = TestContext::new().await;

        // noon today keeps the appointment inside the UTC day regardless
        // of when the test runs
        let (_, start, _) = utc_day_bounds(0)?;
        let today_noon = start.saturating_add(12.hours());

        booked_appointment(&ctx, today_noon).await?;

        let user = ctx.create_user("bob@example.com").await;
        let vaccine = ctx
            .vaccines
            .create_vaccine(new_vaccine("Hepatitis B", 100, 5))
            .await?;

        ctx.bookings
            .create_booking(
                user,
                NewBooking {
                    vaccine_uuid: vaccine.uuid,
                    quantity: 1,
                    appointment_date: today_noon.saturating_add(72.hours()),
                },
            )
            .await?;

        let schedule = ctx.appointments.today_appointments(None).await?;

        assert_eq!(schedule.total, 1);
        assert_eq!(schedule.appointments[0].vaccine_name, "Fluvax");

        Ok(())
    }

    #[tokio::test]
    async fn delete_appointment_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .appointments
            .delete_appointment(AppointmentUuid::new())
            .await;

        assert!(
            matches!(result, Err(AppointmentsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
