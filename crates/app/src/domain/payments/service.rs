//! Payments service.
//!
//! Owns the gateway order flow and the reconciliation that converges
//! payment, booking, and appointment state on a gateway result. The two
//! reconciliation entry points (IPN callback and status poll) both funnel
//! into [`PaymentsService::mark_order_completed`], which is idempotent per
//! order id.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        bookings::models::{BookingStatus, BookingUuid},
        pagination::{Page, PageRequest},
        payments::{
            errors::PaymentsServiceError,
            models::{GatewayOrder, Payment, PaymentMethod, PaymentStatus, PaymentUuid,
                UserPaymentSummary},
            repository::PgPaymentsRepository,
        },
        users::models::UserUuid,
    },
    gateway::{
        GatewayConfig, GatewayError, PaymentGateway, signature,
        types::{
            CreateOrderRequest, IpnPayload, ORDER_INFO, REQUEST_TYPE, StatusRequest,
            StatusResponse,
        },
    },
};

const GATEWAY_COMPLETED: &str = "COMPLETED";

#[derive(Clone)]
pub struct PgPaymentsService {
    db: Db,
    repository: PgPaymentsRepository,
    gateway: Arc<dyn PaymentGateway>,
    config: GatewayConfig,
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(db: Db, gateway: Arc<dyn PaymentGateway>, config: GatewayConfig) -> Self {
        Self {
            db,
            repository: PgPaymentsRepository::new(),
            gateway,
            config,
        }
    }
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    async fn create_gateway_order(
        &self,
        booking: BookingUuid,
        user: UserUuid,
    ) -> Result<GatewayOrder, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let amount = self
            .repository
            .booking_amount(&mut tx, booking)
            .await?
            .ok_or(PaymentsServiceError::BookingNotFound)?;

        tx.commit().await?;

        let order_id = format!(
            "{}_{}_{}",
            self.config.partner_code,
            booking,
            Timestamp::now().as_millisecond()
        );
        let request_id = order_id.clone();
        let extra_data = String::new();

        let signature = signature::order_signature(
            &self.config,
            amount.total_amount,
            &order_id,
            &request_id,
            &extra_data,
        )?;

        let response = self
            .gateway
            .create_order(CreateOrderRequest {
                partner_code: self.config.partner_code.clone(),
                partner_name: self.config.partner_name.clone(),
                store_id: self.config.store_id.clone(),
                request_id: request_id.clone(),
                amount: amount.total_amount,
                order_id: order_id.clone(),
                order_info: ORDER_INFO.to_string(),
                redirect_url: self.config.redirect_url.clone(),
                ipn_url: self.config.ipn_url.clone(),
                lang: "en".to_string(),
                request_type: REQUEST_TYPE.to_string(),
                auto_capture: true,
                extra_data,
                order_group_id: String::new(),
                signature,
            })
            .await?;

        let pay_url = response.pay_url.ok_or_else(|| {
            GatewayError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| format!("result code {}", response.result_code)),
            )
        })?;

        // The payment row is written only after the gateway accepted the
        // order; an outbound failure leaves no partial state behind.
        let mut tx = self.db.begin().await?;

        self.repository
            .create_gateway_payment(
                &mut tx,
                PaymentUuid::new(),
                booking,
                user,
                amount.total_amount,
                &order_id,
                amount.appointment_date,
            )
            .await?;

        tx.commit().await?;

        Ok(GatewayOrder {
            partner_code: self.config.partner_code.clone(),
            order_id,
            amount: amount.total_amount,
            request_id,
            pay_url,
        })
    }

    async fn check_gateway_status(
        &self,
        order_id: &str,
        request_id: &str,
    ) -> Result<StatusResponse, PaymentsServiceError> {
        let signature = signature::status_signature(&self.config, order_id, request_id)?;

        let response = self
            .gateway
            .query_status(StatusRequest {
                partner_code: self.config.partner_code.clone(),
                access_key: self.config.access_key.clone(),
                order_id: order_id.to_string(),
                request_id: request_id.to_string(),
                signature,
            })
            .await?;

        if response.status.as_deref() == Some(GATEWAY_COMPLETED) {
            self.mark_order_completed(order_id).await?;
        }

        Ok(response)
    }

    async fn handle_ipn(&self, payload: IpnPayload) -> Result<(), PaymentsServiceError> {
        signature::verify_ipn(&self.config, &payload)?;

        if payload.result_code != 0 {
            warn!(
                order_id = %payload.order_id,
                result_code = payload.result_code,
                message = payload.message.as_deref().unwrap_or(""),
                "gateway reported a failed payment"
            );

            return Ok(());
        }

        self.mark_order_completed(&payload.order_id).await
    }

    async fn mark_order_completed(&self, order_id: &str) -> Result<(), PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let payment = self
            .repository
            .get_payment_by_order(&mut tx, order_id)
            .await?
            .ok_or(PaymentsServiceError::NotFound)?;

        // Re-delivery of an IPN for an already-completed payment is a no-op.
        if payment.status == PaymentStatus::Completed {
            return Ok(());
        }

        self.repository
            .set_payment_status(&mut tx, payment.uuid, PaymentStatus::Completed)
            .await?;

        let booking = self
            .repository
            .confirm_booking_paid(&mut tx, payment.booking_uuid)
            .await?;

        let matched = self
            .repository
            .complete_appointment(
                &mut tx,
                booking.user_uuid,
                booking.vaccine_uuid,
                booking.appointment_date,
            )
            .await?;

        if matched == 0 {
            warn!(booking = %booking.uuid, "no matching appointment for completed payment");
        }

        tx.commit().await?;

        info!(%order_id, "payment reconciled as completed");

        Ok(())
    }

    async fn change_cash_status(
        &self,
        payment: PaymentUuid,
        status: PaymentStatus,
    ) -> Result<(), PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.get_payment(&mut tx, payment).await?;

        if record.method != PaymentMethod::Cash {
            return Err(PaymentsServiceError::CashOnly);
        }

        self.repository
            .set_payment_status(&mut tx, payment, status)
            .await?;

        let booking_status = match status {
            PaymentStatus::Completed => BookingStatus::Confirmed,
            PaymentStatus::Pending => BookingStatus::WaitingPayment,
        };

        self.repository
            .set_booking_status(&mut tx, record.booking_uuid, booking_status)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn list_payments(&self, page: PageRequest) -> Result<Page<Payment>, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let (payments, total) = self.repository.list_payments(&mut tx, &page).await?;

        tx.commit().await?;

        Ok(Page::new(payments, total, &page))
    }

    async fn get_payment(&self, payment: PaymentUuid) -> Result<Payment, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let payment = self.repository.get_payment(&mut tx, payment).await?;

        tx.commit().await?;

        Ok(payment)
    }

    async fn user_payment_history(
        &self,
        user: UserUuid,
    ) -> Result<Vec<UserPaymentSummary>, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let payments = self.repository.list_user_payments(&mut tx, user).await?;

        tx.commit().await?;

        Ok(payments)
    }

    async fn count_completed_payments(&self) -> Result<i64, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let total = self.repository.count_completed(&mut tx).await?;

        tx.commit().await?;

        Ok(total)
    }

    async fn delete_payment(&self, payment: PaymentUuid) -> Result<(), PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_payment(&mut tx, payment).await?;

        if rows_affected == 0 {
            return Err(PaymentsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Create a signed gateway order for a booking and persist the
    /// CREDIT_CARD payment row. No row is written when the gateway call
    /// fails.
    async fn create_gateway_order(
        &self,
        booking: BookingUuid,
        user: UserUuid,
    ) -> Result<GatewayOrder, PaymentsServiceError>;

    /// Poll the gateway for an order; a COMPLETED result triggers the same
    /// reconciliation as the IPN path.
    async fn check_gateway_status(
        &self,
        order_id: &str,
        request_id: &str,
    ) -> Result<StatusResponse, PaymentsServiceError>;

    /// Verify and apply an inbound IPN callback. Signature mismatch or a
    /// missing payment row is a hard failure with no state change.
    async fn handle_ipn(&self, payload: IpnPayload) -> Result<(), PaymentsServiceError>;

    /// Reconcile a successful gateway result: payment COMPLETED, booking
    /// CONFIRMED, matching appointment COMPLETED. Idempotent per order id.
    async fn mark_order_completed(&self, order_id: &str) -> Result<(), PaymentsServiceError>;

    /// Admin override for CASH payments; the booking status moves with the
    /// payment status in the same transaction.
    async fn change_cash_status(
        &self,
        payment: PaymentUuid,
        status: PaymentStatus,
    ) -> Result<(), PaymentsServiceError>;

    /// Retrieve a page of payments, searching by payer email.
    async fn list_payments(&self, page: PageRequest)
    -> Result<Page<Payment>, PaymentsServiceError>;

    /// Retrieve a single payment.
    async fn get_payment(&self, payment: PaymentUuid) -> Result<Payment, PaymentsServiceError>;

    /// A user's payment history joined with booking and vaccine details.
    async fn user_payment_history(
        &self,
        user: UserUuid,
    ) -> Result<Vec<UserPaymentSummary>, PaymentsServiceError>;

    /// Number of COMPLETED payments.
    async fn count_completed_payments(&self) -> Result<i64, PaymentsServiceError>;

    /// Deletes a payment with the given UUID.
    async fn delete_payment(&self, payment: PaymentUuid) -> Result<(), PaymentsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use testresult::TestResult;

    use crate::{
        domain::bookings::models::{BookingUuid, NewBooking},
        gateway::signature::ipn_signature,
        test::{TestContext, new_vaccine},
    };

    use super::*;

    async fn booked(ctx: &TestContext) -> TestResult<(UserUuid, BookingUuid)> {
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
                    appointment_date: Timestamp::now().saturating_add(48.hours()),
                },
            )
            .await?;

        Ok((user, booking.uuid))
    }

    fn signed_ipn(ctx: &TestContext, order_id: &str, result_code: i64) -> IpnPayload {
        let mut payload = IpnPayload {
            partner_code: ctx.gateway_config.partner_code.clone(),
            order_id: order_id.to_string(),
            request_id: order_id.to_string(),
            amount: 200_000,
            result_code,
            message: None,
            response_time: 0,
            extra_data: String::new(),
            signature: String::new(),
        };

        payload.signature =
            ipn_signature(&ctx.gateway_config, &payload).expect("signature should compute");

        payload
    }

    #[tokio::test]
    async fn create_gateway_order_persists_credit_card_payment() -> TestResult {
        let ctx = TestContext::new().await;
        let (user, booking) = booked(&ctx).await?;

        let order = ctx.payments.create_gateway_order(booking, user).await?;

        assert!(order.order_id.starts_with("PARTNER_"));
        assert_eq!(order.amount, 200_000);
        assert_eq!(order.pay_url, "https://gateway.test/pay/checkout");

        let payments = ctx.payments_for_booking(booking).await;

        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].method, PaymentMethod::CreditCard);
        assert_eq!(payments[0].status, PaymentStatus::Pending);
        assert_eq!(payments[0].order_id.as_deref(), Some(order.order_id.as_str()));

        Ok(())
    }

    #[tokio::test]
    async fn gateway_failure_writes_no_payment_row() -> TestResult {
        let ctx = TestContext::new().await;
        let (user, booking) = booked(&ctx).await?;

        ctx.gateway.fail_next_create();

        let result = ctx.payments.create_gateway_order(booking, user).await;

        assert!(
            matches!(result, Err(PaymentsServiceError::Gateway(_))),
            "expected Gateway error, got {result:?}"
        );
        assert!(ctx.payments_for_booking(booking).await.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn create_gateway_order_unknown_booking_fails() {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("alice@example.com").await;

        let result = ctx
            .payments
            .create_gateway_order(BookingUuid::new(), user)
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::BookingNotFound)),
            "expected BookingNotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn reconciliation_is_idempotent_per_order() -> TestResult {
        let ctx = TestContext::new().await;
        let (user, booking) = booked(&ctx).await?;

        let order = ctx.payments.create_gateway_order(booking, user).await?;

        ctx.payments.mark_order_completed(&order.order_id).await?;
        // a repeated delivery of the same result must be a no-op
        ctx.payments.mark_order_completed(&order.order_id).await?;

        let payments = ctx.payments_for_booking(booking).await;

        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].status, PaymentStatus::Completed);

        let detail = ctx.bookings.get_booking(booking).await?;

        assert_eq!(detail.booking.status, BookingStatus::Confirmed);

        let status = ctx.appointment_status(user, detail.booking.vaccine_uuid).await;

        assert_eq!(status.as_deref(), Some("COMPLETED"));

        Ok(())
    }

    #[tokio::test]
    async fn ipn_success_reconciles_payment() -> TestResult {
        let ctx = TestContext::new().await;
        let (user, booking) = booked(&ctx).await?;

        let order = ctx.payments.create_gateway_order(booking, user).await?;

        ctx.payments
            .handle_ipn(signed_ipn(&ctx, &order.order_id, 0))
            .await?;

        let payments = ctx.payments_for_booking(booking).await;

        assert_eq!(payments[0].status, PaymentStatus::Completed);

        Ok(())
    }

    #[tokio::test]
    async fn ipn_failure_code_changes_nothing() -> TestResult {
        let ctx = TestContext::new().await;
        let (user, booking) = booked(&ctx).await?;

        let order = ctx.payments.create_gateway_order(booking, user).await?;

        ctx.payments
            .handle_ipn(signed_ipn(&ctx, &order.order_id, 1006))
            .await?;

        let payments = ctx.payments_for_booking(booking).await;

        assert_eq!(payments[0].status, PaymentStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn ipn_with_bad_signature_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let (user, booking) = booked(&ctx).await?;

        let order = ctx.payments.create_gateway_order(booking, user).await?;

        let mut payload = signed_ipn(&ctx, &order.order_id, 0);
        payload.signature = "deadbeef".to_string();

        let result = ctx.payments.handle_ipn(payload).await;

        assert!(
            matches!(
                result,
                Err(PaymentsServiceError::Gateway(GatewayError::InvalidSignature))
            ),
            "expected InvalidSignature, got {result:?}"
        );

        let payments = ctx.payments_for_booking(booking).await;

        assert_eq!(payments[0].status, PaymentStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn ipn_for_unknown_order_is_a_hard_failure() {
        let ctx = TestContext::new().await;

        let result = ctx
            .payments
            .handle_ipn(signed_ipn(&ctx, "PARTNER_missing_0", 0))
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn status_poll_completion_reconciles() -> TestResult {
        let ctx = TestContext::new().await;
        let (user, booking) = booked(&ctx).await?;

        let order = ctx.payments.create_gateway_order(booking, user).await?;

        ctx.gateway.set_status_response(GATEWAY_COMPLETED);

        ctx.payments
            .check_gateway_status(&order.order_id, &order.request_id)
            .await?;

        let payments = ctx.payments_for_booking(booking).await;

        assert_eq!(payments[0].status, PaymentStatus::Completed);

        Ok(())
    }

    #[tokio::test]
    async fn cash_override_moves_booking_with_payment() -> TestResult {
        let ctx = TestContext::new().await;
        let (user, booking) = booked(&ctx).await?;

        ctx.bookings.confirm_booking(booking, user).await?;

        let payment = ctx.payments_for_booking(booking).await[0].uuid;

        ctx.payments
            .change_cash_status(payment, PaymentStatus::Completed)
            .await?;

        let detail = ctx.bookings.get_booking(booking).await?;

        assert_eq!(detail.booking.status, BookingStatus::Confirmed);

        // flipping back to PENDING demotes the booking as well
        ctx.payments
            .change_cash_status(payment, PaymentStatus::Pending)
            .await?;

        let detail = ctx.bookings.get_booking(booking).await?;

        assert_eq!(detail.booking.status, BookingStatus::WaitingPayment);

        Ok(())
    }

    #[tokio::test]
    async fn cash_override_rejects_credit_card_payments() -> TestResult {
        let ctx = TestContext::new().await;
        let (user, booking) = booked(&ctx).await?;

        let order = ctx.payments.create_gateway_order(booking, user).await?;
        let payment = ctx.payments_for_booking(booking).await[0].uuid;

        let result = ctx
            .payments
            .change_cash_status(payment, PaymentStatus::Completed)
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::CashOnly)),
            "expected CashOnly, got {result:?}"
        );

        // nothing moved
        let payments = ctx.payments_for_booking(booking).await;

        assert_eq!(payments[0].status, PaymentStatus::Pending);
        assert_eq!(payments[0].order_id.as_deref(), Some(order.order_id.as_str()));

        let detail = ctx.bookings.get_booking(booking).await?;

        assert_eq!(detail.booking.status, BookingStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn user_payment_history_joins_booking_details() -> TestResult {
        let ctx = TestContext::new().await;
        let (user, booking) = booked(&ctx).await?;

        ctx.bookings.confirm_booking(booking, user).await?;

        let history = ctx.payments.user_payment_history(user).await?;

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].vaccine_name, "Fluvax");
        assert_eq!(history[0].total_amount, 200_000);
        assert_eq!(history[0].quantity, 2);

        Ok(())
    }

    #[tokio::test]
    async fn count_completed_payments_counts_only_completed() -> TestResult {
        let ctx = TestContext::new().await;
        let (user, booking) = booked(&ctx).await?;

        let order = ctx.payments.create_gateway_order(booking, user).await?;

        assert_eq!(ctx.payments.count_completed_payments().await?, 0);

        ctx.payments.mark_order_completed(&order.order_id).await?;

        assert_eq!(ctx.payments.count_completed_payments().await?, 1);

        Ok(())
    }
}
