//! Test doubles for the external collaborators.

use std::{
    collections::HashSet,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;

use crate::{
    gateway::{
        GatewayError, PaymentGateway,
        types::{CreateOrderRequest, CreateOrderResponse, StatusRequest, StatusResponse},
    },
    mail::{MailError, Mailer, OutgoingEmail},
};

/// A mailer that records outgoing messages and can be told to fail.
#[derive(Debug, Default)]
pub(crate) struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail_next: AtomicBool,
    failing_recipients: Mutex<HashSet<String>>,
}

impl RecordingMailer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().expect("mailer lock poisoned").clone()
    }

    pub(crate) fn clear(&self) {
        self.sent.lock().expect("mailer lock poisoned").clear();
    }

    /// Fail the next send, whoever the recipient is.
    pub(crate) fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Fail every send to this recipient.
    pub(crate) fn fail_for(&self, recipient: &str) {
        self.failing_recipients
            .lock()
            .expect("mailer lock poisoned")
            .insert(recipient.to_string());
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(MailError::Delivery("induced failure".to_string()));
        }

        if self
            .failing_recipients
            .lock()
            .expect("mailer lock poisoned")
            .contains(&email.to)
        {
            return Err(MailError::Delivery(format!("recipient {} refused", email.to)));
        }

        self.sent
            .lock()
            .expect("mailer lock poisoned")
            .push(email.clone());

        Ok(())
    }
}

/// An in-process gateway with scriptable responses.
#[derive(Debug, Default)]
pub(crate) struct FakeGateway {
    fail_create: AtomicBool,
    status: Mutex<Option<String>>,
}

impl FakeGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reject the next order creation.
    pub(crate) fn fail_next_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    /// Set the `status` field returned by subsequent status queries.
    pub(crate) fn set_status_response(&self, status: &str) {
        *self.status.lock().expect("gateway lock poisoned") = Some(status.to_string());
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(
        &self,
        _request: CreateOrderRequest,
    ) -> Result<CreateOrderResponse, GatewayError> {
        if self.fail_create.swap(false, Ordering::SeqCst) {
            return Err(GatewayError::Rejected("gateway unavailable".to_string()));
        }

        Ok(CreateOrderResponse {
            result_code: 0,
            message: Some("Successful.".to_string()),
            pay_url: Some("https://gateway.test/pay/checkout".to_string()),
        })
    }

    async fn query_status(&self, _request: StatusRequest) -> Result<StatusResponse, GatewayError> {
        let status = self
            .status
            .lock()
            .expect("gateway lock poisoned")
            .clone()
            .unwrap_or_else(|| "PENDING".to_string());

        Ok(StatusResponse {
            result_code: Some(0),
            status: Some(status),
            message: None,
        })
    }
}
