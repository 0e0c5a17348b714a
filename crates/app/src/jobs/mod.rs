//! Periodic sweep jobs.
//!
//! Two independent wall-clock timers: an hourly expiry sweep over PENDING
//! bookings and a daily reminder sweep over tomorrow's appointments. Each
//! loop awaits its own sweep to completion before sleeping again, so a
//! sweep never overlaps itself; the two sweeps are independent of each
//! other and touch disjoint status transitions.

use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::error;

use crate::domain::{bookings::BookingsService, notifications::NotificationsService};

const EXPIRY_SWEEP_PERIOD: Duration = Duration::from_secs(60 * 60);
const REMINDER_SWEEP_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Spawn both sweep loops. The handles run until aborted.
pub fn spawn_sweeps(
    bookings: Arc<dyn BookingsService>,
    notifications: Arc<dyn NotificationsService>,
) -> (JoinHandle<()>, JoinHandle<()>) {
    let expiry = tokio::spawn(run_expiry_sweep(bookings));
    let reminders = tokio::spawn(run_reminder_sweep(notifications));

    (expiry, reminders)
}

async fn run_expiry_sweep(bookings: Arc<dyn BookingsService>) {
    let mut ticker = interval(EXPIRY_SWEEP_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // the first tick completes immediately; skip it so the sweep runs on
    // the period, not at startup
    ticker.tick().await;

    loop {
        ticker.tick().await;

        if let Err(err) = bookings.delete_expired_bookings().await {
            error!(error = %err, "booking expiry sweep failed");
        }
    }
}

async fn run_reminder_sweep(notifications: Arc<dyn NotificationsService>) {
    let mut ticker = interval(REMINDER_SWEEP_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    ticker.tick().await;

    loop {
        ticker.tick().await;

        if let Err(err) = notifications.send_appointment_reminders().await {
            error!(error = %err, "appointment reminder sweep failed");
        }
    }
}
