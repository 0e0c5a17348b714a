//! Console transport for local development: logs instead of sending.

use async_trait::async_trait;
use tracing::info;

use crate::mail::{MailError, Mailer, OutgoingEmail};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        info!(to = %email.to, subject = %email.subject, "email (console transport)");

        Ok(())
    }
}
