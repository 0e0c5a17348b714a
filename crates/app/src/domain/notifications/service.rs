//! Notifications service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        appointments::service::utc_day_bounds,
        notifications::{
            errors::NotificationsServiceError,
            models::{Notification, NotificationKind},
            repository::PgNotificationsRepository,
        },
        users::models::UserUuid,
    },
    mail::{Mailer, OutgoingEmail, templates},
};

#[derive(Clone)]
pub struct PgNotificationsService {
    db: Db,
    repository: PgNotificationsRepository,
    mailer: Arc<dyn Mailer>,
}

impl PgNotificationsService {
    #[must_use]
    pub fn new(db: Db, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            db,
            repository: PgNotificationsRepository::new(),
            mailer,
        }
    }
}

#[async_trait]
impl NotificationsService for PgNotificationsService {
    async fn notify(
        &self,
        user: UserUuid,
        message: &str,
        kind: NotificationKind,
    ) -> Result<Notification, NotificationsServiceError> {
        let mut tx = self.db.begin().await?;

        let notification = self
            .repository
            .create_notification(&mut tx, user, message, kind, Timestamp::now())
            .await?;

        tx.commit().await?;

        Ok(notification)
    }

    async fn user_notifications(
        &self,
        user: UserUuid,
    ) -> Result<Vec<Notification>, NotificationsServiceError> {
        let mut tx = self.db.begin().await?;

        let notifications = self.repository.list_user_notifications(&mut tx, user).await?;

        tx.commit().await?;

        Ok(notifications)
    }

    async fn unread_notifications(
        &self,
        user: UserUuid,
    ) -> Result<Vec<Notification>, NotificationsServiceError> {
        let mut tx = self.db.begin().await?;

        let notifications = self
            .repository
            .list_unread_notifications(&mut tx, user)
            .await?;

        tx.commit().await?;

        Ok(notifications)
    }

    async fn send_appointment_reminders(&self) -> Result<u64, NotificationsServiceError> {
        let (_, start, end) = utc_day_bounds(1)?;

        let mut tx = self.db.begin().await?;

        let due = self.repository.list_due_reminders(&mut tx, start, end).await?;

        tx.commit().await?;

        let mut sent = 0_u64;

        for reminder in due {
            let (subject, html) = templates::appointment_reminder(
                &reminder.user_name,
                &reminder.vaccine_name,
                reminder.appointment_date,
                reminder.location.as_deref(),
            );

            let delivery = self
                .mailer
                .send(&OutgoingEmail {
                    to: reminder.user_email.clone(),
                    subject,
                    html,
                })
                .await;

            // One refused recipient must not starve the rest of the sweep.
            if let Err(error) = delivery {
                warn!(to = %reminder.user_email, %error, "failed to send appointment reminder");
                continue;
            }

            let message = format!(
                "Reminder: {} appointment on {}",
                reminder.vaccine_name,
                reminder.appointment_date.strftime("%Y-%m-%d %H:%M UTC"),
            );

            self.notify(reminder.user_uuid, &message, NotificationKind::Reminder)
                .await?;

            sent += 1;
        }

        info!(sent, "appointment reminders sent");

        Ok(sent)
    }
}

#[automock]
#[async_trait]
pub trait NotificationsService: Send + Sync {
    /// Append a notification to a user's log.
    async fn notify(
        &self,
        user: UserUuid,
        message: &str,
        kind: NotificationKind,
    ) -> Result<Notification, NotificationsServiceError>;

    /// A user's notifications, newest first.
    async fn user_notifications(
        &self,
        user: UserUuid,
    ) -> Result<Vec<Notification>, NotificationsServiceError>;

    /// A user's unread notifications, newest first.
    async fn unread_notifications(
        &self,
        user: UserUuid,
    ) -> Result<Vec<Notification>, NotificationsServiceError>;

    /// Email a reminder for every PENDING or CONFIRMED appointment falling
    /// on tomorrow's UTC day, logging one notification per delivered
    /// email. Returns the number of reminders delivered.
    async fn send_appointment_reminders(&self) -> Result<u64, NotificationsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use testresult::TestResult;

    use crate::{
        domain::{
            appointments::models::{AppointmentStatus, AppointmentUpdate},
            bookings::models::NewBooking,
            pagination::PageRequest,
        },
        test::{TestContext, new_vaccine},
    };

    use super::*;

    async fn book_for(
        ctx: &TestContext,
        email: &str,
        vaccine_name: &str,
        appointment_date: Timestamp,
    ) -> TestResult<UserUuid> {
        let user = ctx.create_user(email).await;

        let vaccine = ctx
            .vaccines
            .create_vaccine(new_vaccine(vaccine_name, 100, 5))
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

        Ok(user)
    }

    #[tokio::test]
    async fn notify_appends_unread_notification() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("alice@example.com").await;

        ctx.notifications
            .notify(user, "Welcome!", NotificationKind::System)
            .await?;

        let unread = ctx.notifications.unread_notifications(user).await?;

        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].message, "Welcome!");
        assert!(!unread[0].is_read);

        Ok(())
    }

    #[tokio::test]
    async fn reminders_cover_only_tomorrows_open_appointments() -> TestResult {
        let ctx = TestContext::new().await;
        let (_, start, _) = utc_day_bounds(1)?;
        let tomorrow_noon = start.saturating_add(12.hours());

        let due_user = book_for(&ctx, "due@example.com", "Fluvax", tomorrow_noon).await?;
        book_for(
            &ctx,
            "later@example.com",
            "Hepatitis B",
            tomorrow_noon.saturating_add(96.hours()),
        )
        .await?;

        // a completed appointment tomorrow gets no reminder
        let done_user = book_for(&ctx, "done@example.com", "Rabies", tomorrow_noon).await?;
        let appointment = ctx
            .appointments
            .list_appointments(PageRequest {
                search: Some("Rabies".to_string()),
                ..PageRequest::default()
            })
            .await?
            .data[0]
            .appointment
            .uuid;

        ctx.appointments
            .update_appointment(
                appointment,
                AppointmentUpdate {
                    status: Some(AppointmentStatus::Completed),
                    appointment_date: None,
                },
            )
            .await?;

        ctx.mailer.clear();

        let sent = ctx.notifications.send_appointment_reminders().await?;

        assert_eq!(sent, 1);

        let emails = ctx.mailer.sent();

        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].to, "due@example.com");

        assert_eq!(ctx.notifications.user_notifications(due_user).await?.len(), 1);
        assert!(ctx.notifications.user_notifications(done_user).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn one_failed_reminder_does_not_abort_the_sweep() -> TestResult {
        let ctx = TestContext::new().await;
        let (_, start, _) = utc_day_bounds(1)?;
        let tomorrow_noon = start.saturating_add(12.hours());

        book_for(&ctx, "broken@example.com", "Fluvax", tomorrow_noon).await?;
        let ok_user = book_for(&ctx, "fine@example.com", "Hepatitis B", tomorrow_noon).await?;

        ctx.mailer.clear();
        ctx.mailer.fail_for("broken@example.com");

        let sent = ctx.notifications.send_appointment_reminders().await?;

        assert_eq!(sent, 1);
        assert_eq!(ctx.notifications.user_notifications(ok_user).await?.len(), 1);

        Ok(())
    }
}
