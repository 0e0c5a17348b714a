//! Bookings service.

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use jiff::{Timestamp, ToSpan};
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        appointments::models::AppointmentUuid,
        bookings::{
            errors::BookingsServiceError,
            models::{Booking, BookingDetail, BookingStatus, BookingUuid, NewBooking},
            repository::{NewBookingRow, PgBookingsRepository},
        },
        pagination::{Page, PageRequest},
        payments::models::{PaymentMethod, PaymentUuid},
        users::models::UserUuid,
    },
    mail::{Mailer, OutgoingEmail, qr, templates},
};

/// A fresh booking must be confirmed within this window.
const CONFIRMATION_WINDOW_MINUTES: i64 = 3;

/// PENDING bookings older than this are swept.
const EXPIRY_AGE_HOURS: i64 = 24;

#[derive(Clone)]
pub struct PgBookingsService {
    db: Db,
    repository: PgBookingsRepository,
    mailer: Arc<dyn Mailer>,
    qr_dir: Option<PathBuf>,
}

impl PgBookingsService {
    #[must_use]
    pub fn new(db: Db, mailer: Arc<dyn Mailer>, qr_dir: Option<PathBuf>) -> Self {
        Self {
            db,
            repository: PgBookingsRepository::new(),
            mailer,
            qr_dir,
        }
    }

    async fn send_confirmation_email(
        &self,
        detail: &BookingDetail,
    ) -> Result<(), BookingsServiceError> {
        let booking = &detail.booking;

        let payload = qr::booking_payload(
            booking.uuid,
            booking.total_amount,
            PaymentMethod::Cash,
            booking.user_uuid,
        );
        let svg = qr::render_svg(&payload)?;

        if let Some(dir) = &self.qr_dir {
            let path = dir.join(format!("{}.svg", booking.uuid));

            if let Err(error) = tokio::fs::write(&path, &svg).await {
                warn!(%error, path = %path.display(), "failed to write QR file");
            }
        }

        let qr_data_uri = qr::svg_data_uri(&svg);

        let (subject, html) = templates::booking_confirmation(&templates::BookingConfirmation {
            user_name: &detail.user_name,
            booking_id: &booking.uuid.to_string(),
            vaccine_name: &detail.vaccine_name,
            quantity: booking.quantity,
            created_at: booking.created_at,
            total_amount: booking.total_amount,
            payment_method: PaymentMethod::Cash.as_str(),
            qr_data_uri: &qr_data_uri,
        });

        self.mailer
            .send(&OutgoingEmail {
                to: detail.user_email.clone(),
                subject,
                html,
            })
            .await
            .map_err(BookingsServiceError::from)
    }
}

#[async_trait]
impl BookingsService for PgBookingsService {
    async fn list_bookings(
        &self,
        page: PageRequest,
    ) -> Result<Page<BookingDetail>, BookingsServiceError> {
        let mut tx = self.db.begin().await?;

        let (bookings, total) = self.repository.list_bookings(&mut tx, &page).await?;

        tx.commit().await?;

        Ok(Page::new(bookings, total, &page))
    }

    async fn get_booking(&self, booking: BookingUuid) -> Result<BookingDetail, BookingsServiceError> {
        let mut tx = self.db.begin().await?;

        let detail = self.repository.get_booking_detail(&mut tx, booking).await?;

        tx.commit().await?;

        Ok(detail)
    }

    async fn create_booking(
        &self,
        user: UserUuid,
        new: NewBooking,
    ) -> Result<Booking, BookingsServiceError> {
        if new.quantity == 0 {
            return Err(BookingsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin().await?;

        let unit_price = match self
            .repository
            .reserve_stock(&mut tx, new.vaccine_uuid, new.quantity)
            .await?
        {
            Some(price) => price,
            None => {
                return Err(
                    if self.repository.vaccine_exists(&mut tx, new.vaccine_uuid).await? {
                        BookingsServiceError::InsufficientStock
                    } else {
                        BookingsServiceError::VaccineNotFound
                    },
                );
            }
        };

        let total_amount = unit_price
            .checked_mul(new.quantity)
            .ok_or(BookingsServiceError::InvalidQuantity)?;

        let booking = self
            .repository
            .create_booking(
                &mut tx,
                &NewBookingRow {
                    uuid: BookingUuid::new(),
                    user_uuid: user,
                    vaccine_uuid: new.vaccine_uuid,
                    quantity: new.quantity,
                    unit_price,
                    total_amount,
                    appointment_date: new.appointment_date,
                    confirmation_time: Timestamp::now()
                        .saturating_add(CONFIRMATION_WINDOW_MINUTES.minutes()),
                },
            )
            .await?;

        self.repository
            .create_appointment(
                &mut tx,
                AppointmentUuid::new(),
                user,
                new.vaccine_uuid,
                new.appointment_date,
            )
            .await?;

        tx.commit().await?;

        Ok(booking)
    }

    async fn confirm_booking(
        &self,
        booking: BookingUuid,
        user: UserUuid,
    ) -> Result<(), BookingsServiceError> {
        let mut tx = self.db.begin().await?;

        let detail = self.repository.get_booking_detail(&mut tx, booking).await?;

        if detail.booking.user_uuid != user {
            return Err(BookingsServiceError::Forbidden);
        }

        if detail.booking.status != BookingStatus::Pending {
            return Err(BookingsServiceError::InvalidState(detail.booking.status));
        }

        self.repository
            .set_booking_status(&mut tx, booking, BookingStatus::WaitingPayment)
            .await?;

        self.repository
            .create_cash_payment(
                &mut tx,
                PaymentUuid::new(),
                booking,
                user,
                detail.booking.total_amount,
                detail.booking.appointment_date,
            )
            .await?;

        self.repository
            .confirm_appointment(
                &mut tx,
                user,
                detail.booking.vaccine_uuid,
                detail.booking.appointment_date,
            )
            .await?;

        tx.commit().await?;

        // The state transition above is committed; a failure from here on
        // reaches the caller but never rolls the booking back.
        self.send_confirmation_email(&detail).await
    }

    async fn delete_booking(&self, booking: BookingUuid) -> Result<(), BookingsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_booking(&mut tx, booking).await?;

        if rows_affected == 0 {
            return Err(BookingsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn delete_expired_bookings(&self) -> Result<u64, BookingsServiceError> {
        let cutoff = Timestamp::now().saturating_sub(EXPIRY_AGE_HOURS.hours());

        let mut tx = self.db.begin().await?;

        let deleted = self.repository.delete_expired(&mut tx, cutoff).await?;

        tx.commit().await?;

        info!(deleted, "expired pending bookings deleted");

        Ok(deleted)
    }
}

#[automock]
#[async_trait]
pub trait BookingsService: Send + Sync {
    /// Retrieve a page of bookings, searching by vaccine name.
    async fn list_bookings(
        &self,
        page: PageRequest,
    ) -> Result<Page<BookingDetail>, BookingsServiceError>;

    /// Retrieve a single booking with its user and vaccine.
    async fn get_booking(&self, booking: BookingUuid)
    -> Result<BookingDetail, BookingsServiceError>;

    /// Reserve stock and create a PENDING booking plus its appointment,
    /// atomically.
    async fn create_booking(
        &self,
        user: UserUuid,
        new: NewBooking,
    ) -> Result<Booking, BookingsServiceError>;

    /// Confirm a PENDING booking for cash payment: transition to
    /// WAITING_PAYMENT, create the payment row, confirm the appointment,
    /// then email a QR confirmation.
    async fn confirm_booking(
        &self,
        booking: BookingUuid,
        user: UserUuid,
    ) -> Result<(), BookingsServiceError>;

    /// Delete a booking outright.
    async fn delete_booking(&self, booking: BookingUuid) -> Result<(), BookingsServiceError>;

    /// Sweep PENDING bookings older than 24 hours. Returns the number of
    /// rows deleted.
    async fn delete_expired_bookings(&self) -> Result<u64, BookingsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::payments::models::{PaymentMethod, PaymentStatus},
        test::{TestContext, new_vaccine},
    };

    use super::*;

    fn appointment_date() -> Timestamp {
        Timestamp::now().saturating_add(48.hours())
    }

    #[tokio::test]
    async fn create_booking_freezes_price_and_decrements_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("alice@example.com").await;

        let vaccine = ctx
            .vaccines
            .create_vaccine(new_vaccine("Fluvax", 100_000, 5))
            .await?;

        let booking = ctx
            .bookings
            .create_booking(
                user,
                NewBooking {
                    vaccine_uuid: vaccine.uuid,
                    quantity: 2,
                    appointment_date: appointment_date(),
                },
            )
            .await?;

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.unit_price, 100_000);
        assert_eq!(booking.total_amount, 200_000);

        let vaccine = ctx.vaccines.get_vaccine(vaccine.uuid).await?;

        assert_eq!(vaccine.remaining_quantity, 3);

        // later price changes must not affect the frozen snapshot
        let detail = ctx.bookings.get_booking(booking.uuid).await?;

        assert_eq!(detail.booking.total_amount, 200_000);

        Ok(())
    }

    #[tokio::test]
    async fn create_booking_creates_pending_appointment() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("alice@example.com").await;

        let vaccine = ctx
            .vaccines
            .create_vaccine(new_vaccine("Fluvax", 100, 5))
            .await?;

        let when = appointment_date();

        ctx.bookings
            .create_booking(
                user,
                NewBooking {
                    vaccine_uuid: vaccine.uuid,
                    quantity: 1,
                    appointment_date: when,
                },
            )
            .await?;

        let status = ctx.appointment_status(user, vaccine.uuid).await;

        assert_eq!(status.as_deref(), Some("PENDING"));

        Ok(())
    }

    #[tokio::test]
    async fn create_booking_rejects_insufficient_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("alice@example.com").await;

        let vaccine = ctx
            .vaccines
            .create_vaccine(new_vaccine("Fluvax", 100, 1))
            .await?;

        let result = ctx
            .bookings
            .create_booking(
                user,
                NewBooking {
                    vaccine_uuid: vaccine.uuid,
                    quantity: 2,
                    appointment_date: appointment_date(),
                },
            )
            .await;

        assert!(
            matches!(result, Err(BookingsServiceError::InsufficientStock)),
            "expected InsufficientStock, got {result:?}"
        );

        // the failed booking must not leak a stock decrement
        let vaccine = ctx.vaccines.get_vaccine(vaccine.uuid).await?;

        assert_eq!(vaccine.remaining_quantity, 1);

        Ok(())
    }

    #[tokio::test]
    async fn create_booking_unknown_vaccine_returns_not_found() {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("alice@example.com").await;

        let result = ctx
            .bookings
            .create_booking(
                user,
                NewBooking {
                    vaccine_uuid: crate::domain::vaccines::models::VaccineUuid::new(),
                    quantity: 1,
                    appointment_date: appointment_date(),
                },
            )
            .await;

        assert!(
            matches!(result, Err(BookingsServiceError::VaccineNotFound)),
            "expected VaccineNotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn confirm_booking_transitions_state_and_sends_email() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("alice@example.com").await;

        let vaccine = ctx
            .vaccines
            .create_vaccine(new_vaccine("Fluvax", 100_000, 5))
            .await?;

        let booking = ctx
            .bookings
            .create_booking(
                user,
                NewBooking {
                    vaccine_uuid: vaccine.uuid,
                    quantity: 2,
                    appointment_date: appointment_date(),
                },
            )
            .await?;

        ctx.mailer.clear();
        ctx.bookings.confirm_booking(booking.uuid, user).await?;

        let detail = ctx.bookings.get_booking(booking.uuid).await?;

        assert_eq!(detail.booking.status, BookingStatus::WaitingPayment);

        let payments = ctx.payments_for_booking(booking.uuid).await;

        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].method, PaymentMethod::Cash);
        assert_eq!(payments[0].status, PaymentStatus::Pending);
        assert_eq!(payments[0].amount, 200_000);

        let status = ctx.appointment_status(user, vaccine.uuid).await;

        assert_eq!(status.as_deref(), Some("CONFIRMED"));

        let sent = ctx.mailer.sent();

        assert_eq!(sent.len(), 1);
        assert!(sent[0].html.contains("data:image/svg+xml;base64,"));

        Ok(())
    }

    #[tokio::test]
    async fn confirm_booking_by_other_user_is_forbidden_and_changes_nothing() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = ctx.create_user("owner@example.com").await;
        let intruder = ctx.create_user("intruder@example.com").await;

        let vaccine = ctx
            .vaccines
            .create_vaccine(new_vaccine("Fluvax", 100, 5))
            .await?;

        let booking = ctx
            .bookings
            .create_booking(
                owner,
                NewBooking {
                    vaccine_uuid: vaccine.uuid,
                    quantity: 1,
                    appointment_date: appointment_date(),
                },
            )
            .await?;

        let result = ctx.bookings.confirm_booking(booking.uuid, intruder).await;

        assert!(
            matches!(result, Err(BookingsServiceError::Forbidden)),
            "expected Forbidden, got {result:?}"
        );

        let detail = ctx.bookings.get_booking(booking.uuid).await?;

        assert_eq!(detail.booking.status, BookingStatus::Pending);
        assert!(ctx.payments_for_booking(booking.uuid).await.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn confirm_booking_twice_is_invalid_state() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("alice@example.com").await;

        let vaccine = ctx
            .vaccines
            .create_vaccine(new_vaccine("Fluvax", 100, 5))
            .await?;

        let booking = ctx
            .bookings
            .create_booking(
                user,
                NewBooking {
                    vaccine_uuid: vaccine.uuid,
                    quantity: 1,
                    appointment_date: appointment_date(),
                },
            )
            .await?;

        ctx.bookings.confirm_booking(booking.uuid, user).await?;

        let result = ctx.bookings.confirm_booking(booking.uuid, user).await;

        assert!(
            matches!(
                result,
                Err(BookingsServiceError::InvalidState(BookingStatus::WaitingPayment))
            ),
            "expected InvalidState, got {result:?}"
        );

        // no second payment row
        assert_eq!(ctx.payments_for_booking(booking.uuid).await.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn email_failure_does_not_roll_back_confirmation() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("alice@example.com").await;

        let vaccine = ctx
            .vaccines
            .create_vaccine(new_vaccine("Fluvax", 100, 5))
            .await?;

        let booking = ctx
            .bookings
            .create_booking(
                user,
                NewBooking {
                    vaccine_uuid: vaccine.uuid,
                    quantity: 1,
                    appointment_date: appointment_date(),
                },
            )
            .await?;

        ctx.mailer.fail_next();

        let result = ctx.bookings.confirm_booking(booking.uuid, user).await;

        assert!(
            matches!(result, Err(BookingsServiceError::Mail(_))),
            "expected Mail error, got {result:?}"
        );

        // the committed transition survives the failed notification
        let detail = ctx.bookings.get_booking(booking.uuid).await?;

        assert_eq!(detail.booking.status, BookingStatus::WaitingPayment);
        assert_eq!(ctx.payments_for_booking(booking.uuid).await.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn expiry_sweep_deletes_only_old_pending_bookings() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("alice@example.com").await;

        let vaccine = ctx
            .vaccines
            .create_vaccine(new_vaccine("Fluvax", 100, 10))
            .await?;

        let make_booking = || async {
            ctx.bookings
                .create_booking(
                    user,
                    NewBooking {
                        vaccine_uuid: vaccine.uuid,
                        quantity: 1,
                        appointment_date: appointment_date(),
                    },
                )
                .await
        };

        let stale_pending = make_booking().await?;
        let fresh_pending = make_booking().await?;
        let stale_waiting = make_booking().await?;

        ctx.backdate_booking(stale_pending.uuid, 25).await;
        ctx.backdate_booking(fresh_pending.uuid, 1).await;
        ctx.backdate_booking(stale_waiting.uuid, 25).await;
        ctx.bookings.confirm_booking(stale_waiting.uuid, user).await?;

        let deleted = ctx.bookings.delete_expired_bookings().await?;

        assert_eq!(deleted, 1);

        assert!(matches!(
            ctx.bookings.get_booking(stale_pending.uuid).await,
            Err(BookingsServiceError::NotFound)
        ));
        assert!(ctx.bookings.get_booking(fresh_pending.uuid).await.is_ok());
        assert!(ctx.bookings.get_booking(stale_waiting.uuid).await.is_ok());

        Ok(())
    }
}
