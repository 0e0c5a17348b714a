//! SMTP delivery via lettre.

use async_trait::async_trait;
use lettre::{
    Message, SmtpTransport, Transport,
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
};

use crate::mail::{MailError, Mailer, OutgoingEmail};

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

#[derive(Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
    credentials: Credentials,
}

impl SmtpMailer {
    #[must_use]
    pub fn new(config: SmtpConfig) -> Self {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        Self {
            config,
            credentials,
        }
    }

    /// A fresh transport per message avoids stale pooled connections.
    fn build_transport(&self) -> Result<SmtpTransport, MailError> {
        let transport = SmtpTransport::relay(&self.config.server)
            .map_err(|e| MailError::Delivery(format!("SMTP relay error: {e}")))?
            .port(self.config.port)
            .credentials(self.credentials.clone())
            .build();

        Ok(transport)
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.config.from_name, self.config.from_email)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| MailError::InvalidMessage(format!("invalid from address: {e}")))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|e| MailError::InvalidMessage(format!("invalid to address: {e}")))?)
            .subject(&email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html.clone())
            .map_err(|e| MailError::InvalidMessage(format!("failed to build email: {e}")))?;

        let mailer = self.build_transport()?;

        tokio::task::spawn_blocking(move || {
            mailer
                .send(&message)
                .map(|_| ())
                .map_err(|e| MailError::Delivery(format!("failed to send email: {e}")))
        })
        .await
        .map_err(|e| MailError::Delivery(format!("email task failed: {e}")))?
    }
}
