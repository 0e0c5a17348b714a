//! Outbound email.
//!
//! The [`Mailer`] trait abstracts over the delivery transport so services
//! can be tested without a mail server; [`SmtpMailer`] is the production
//! implementation.

mod console;
pub mod qr;
mod smtp;
pub mod templates;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

pub use console::ConsoleMailer;
pub use smtp::{SmtpConfig, SmtpMailer};

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid email message: {0}")]
    InvalidMessage(String),

    #[error("email delivery failed: {0}")]
    Delivery(String),
}

#[automock]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message, best effort. There is no read receipt; a
    /// successful return only means the transport accepted the message.
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}
