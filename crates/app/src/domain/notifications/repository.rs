//! Notifications Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    database::try_get_variant,
    domain::{
        notifications::models::{Notification, NotificationKind, NotificationUuid},
        users::models::UserUuid,
    },
};

const CREATE_NOTIFICATION_SQL: &str = include_str!("sql/create_notification.sql");
const LIST_USER_NOTIFICATIONS_SQL: &str = include_str!("sql/list_user_notifications.sql");
const LIST_UNREAD_NOTIFICATIONS_SQL: &str = include_str!("sql/list_unread_notifications.sql");
const LIST_DUE_REMINDERS_SQL: &str = include_str!("sql/list_due_reminders.sql");

/// One appointment due for a reminder, joined with recipient and vaccine.
#[derive(Debug, Clone)]
pub(crate) struct ReminderRow {
    pub user_uuid: UserUuid,
    pub user_name: String,
    pub user_email: String,
    pub vaccine_name: String,
    pub appointment_date: Timestamp,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgNotificationsRepository;

impl PgNotificationsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_notification(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        message: &str,
        kind: NotificationKind,
        sent_at: Timestamp,
    ) -> Result<Notification, sqlx::Error> {
        query_as::<Postgres, Notification>(CREATE_NOTIFICATION_SQL)
            .bind(Uuid::now_v7())
            .bind(user.into_uuid())
            .bind(message)
            .bind(kind.as_str())
            .bind(SqlxTimestamp::from(sent_at))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_user_notifications(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        query_as::<Postgres, Notification>(LIST_USER_NOTIFICATIONS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_unread_notifications(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        query_as::<Postgres, Notification>(LIST_UNREAD_NOTIFICATIONS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// PENDING and CONFIRMED appointments inside `[start, end)`.
    pub(crate) async fn list_due_reminders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<ReminderRow>, sqlx::Error> {
        let rows = query(LIST_DUE_REMINDERS_SQL)
            .bind(SqlxTimestamp::from(start))
            .bind(SqlxTimestamp::from(end))
            .fetch_all(&mut **tx)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(ReminderRow {
                    user_uuid: UserUuid::from_uuid(row.try_get::<Uuid, _>("user_uuid")?),
                    user_name: row.try_get("user_name")?,
                    user_email: row.try_get("user_email")?,
                    vaccine_name: row.try_get("vaccine_name")?,
                    appointment_date: row
                        .try_get::<SqlxTimestamp, _>("appointment_date")?
                        .to_jiff(),
                    location: row.try_get("location")?,
                })
            })
            .collect()
    }
}

impl<'r> FromRow<'r, PgRow> for Notification {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: NotificationUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get::<Uuid, _>("user_uuid")?),
            message: row.try_get("message")?,
            kind: try_get_variant(row, "kind", NotificationKind::parse)?,
            sent_at: row.try_get::<SqlxTimestamp, _>("sent_at")?.to_jiff(),
            is_read: row.try_get("is_read")?,
        })
    }
}
