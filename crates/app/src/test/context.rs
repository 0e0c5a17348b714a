//! Test context for service-level integration tests.

use std::sync::Arc;

use sqlx::{Postgres, query, query_as, query_scalar};
use testresult::TestResult;

use crate::{
    auth::{AuthService, PgAuthService, TokenKey, models::LoginOutcome, service::AuthConfig},
    context::{AppContext, AppSettings},
    domain::{
        appointments::AppointmentsService,
        bookings::{BookingsService, models::BookingUuid},
        categories::CategoriesService,
        inventory::InventoryService,
        manufacturers::ManufacturersService,
        notifications::NotificationsService,
        payments::{PaymentsService, models::Payment},
        posts::PostsService,
        suppliers::SuppliersService,
        tags::TagsService,
        users::{UsersService, models::UserUuid},
        vaccines::{VaccinesService, models::VaccineUuid},
    },
    gateway::{GatewayConfig, GatewaySecret, PaymentGateway},
    mail::Mailer,
};

use super::{
    db::TestDb,
    fakes::{FakeGateway, RecordingMailer},
};

const TEST_TOKEN_KEY: &str = "test-token-key";

fn test_gateway_config() -> GatewayConfig {
    GatewayConfig {
        endpoint: "https://gateway.test/v2".to_string(),
        partner_code: "PARTNER".to_string(),
        partner_name: "Test".to_string(),
        store_id: "TestStore".to_string(),
        access_key: "access".to_string(),
        secret_key: GatewaySecret::new("secret"),
        redirect_url: "https://app.test/return".to_string(),
        ipn_url: "https://app.test/api/gateway/ipn".to_string(),
    }
}

pub(crate) struct TestContext {
    pub db: TestDb,
    pub mailer: Arc<RecordingMailer>,
    pub gateway: Arc<FakeGateway>,
    pub gateway_config: GatewayConfig,
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UsersService>,
    pub vaccines: Arc<dyn VaccinesService>,
    pub suppliers: Arc<dyn SuppliersService>,
    pub manufacturers: Arc<dyn ManufacturersService>,
    pub categories: Arc<dyn CategoriesService>,
    pub tags: Arc<dyn TagsService>,
    pub posts: Arc<dyn PostsService>,
    pub inventory: Arc<dyn InventoryService>,
    pub bookings: Arc<dyn BookingsService>,
    pub appointments: Arc<dyn AppointmentsService>,
    pub payments: Arc<dyn PaymentsService>,
    pub notifications: Arc<dyn NotificationsService>,
}

impl TestContext {
    pub(crate) async fn new() -> Self {
        let test_db = TestDb::new().await;
        let mailer = Arc::new(RecordingMailer::new());
        let gateway = Arc::new(FakeGateway::new());
        let gateway_config = test_gateway_config();

        let settings = AppSettings {
            auth: AuthConfig {
                token_key: TokenKey::new(TEST_TOKEN_KEY),
                reset_base_url: "https://app.test/reset-password".to_string(),
            },
            gateway: gateway_config.clone(),
            qr_dir: None,
        };

        let context = AppContext::new(
            test_db.pool().clone(),
            Arc::clone(&mailer) as Arc<dyn Mailer>,
            Arc::clone(&gateway) as Arc<dyn PaymentGateway>,
            settings,
        );

        Self {
            db: test_db,
            mailer,
            gateway,
            gateway_config,
            auth: context.auth,
            users: context.users,
            vaccines: context.vaccines,
            suppliers: context.suppliers,
            manufacturers: context.manufacturers,
            categories: context.categories,
            tags: context.tags,
            posts: context.posts,
            inventory: context.inventory,
            bookings: context.bookings,
            appointments: context.appointments,
            payments: context.payments,
            notifications: context.notifications,
        }
    }

    /// A concrete auth service, for the inherent operations the trait does
    /// not expose.
    pub(crate) fn auth_service(&self) -> PgAuthService {
        PgAuthService::new(
            self.db.pool().clone(),
            Arc::clone(&self.mailer) as Arc<dyn Mailer>,
            AuthConfig {
                token_key: TokenKey::new(TEST_TOKEN_KEY),
                reset_base_url: "https://app.test/reset-password".to_string(),
            },
        )
    }

    /// Insert a verified user directly, bypassing the registration flow.
    pub(crate) async fn create_user(&self, email: &str) -> UserUuid {
        let uuid = UserUuid::new();

        query(
            "INSERT INTO users (uuid, email, password_hash, password_salt, name, role, is_verified) \
             VALUES ($1, $2, 'unused', 'unused', 'Test User', 'USER', TRUE)",
        )
        .bind(uuid.into_uuid())
        .bind(email)
        .execute(self.db.pool())
        .await
        .expect("failed to insert test user");

        uuid
    }

    /// Register, verify, and log in a user through the real flows.
    pub(crate) async fn register_verified(
        &self,
        email: &str,
        password: &str,
    ) -> TestResult<LoginOutcome> {
        self.auth
            .register(crate::auth::models::RegisterRequest {
                email: email.to_string(),
                password: password.to_string(),
                confirm_password: password.to_string(),
                name: "Test User".to_string(),
                phone: None,
            })
            .await?;

        let code = self.verification_code(email).await;

        self.auth.verify_email(email, &code).await?;

        Ok(self.auth.login(email, password).await?)
    }

    /// Read the verification code straight from storage.
    pub(crate) async fn verification_code(&self, email: &str) -> String {
        query_scalar::<Postgres, Option<String>>(
            "SELECT verification_code FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(self.db.pool())
        .await
        .expect("failed to read verification code")
        .expect("user has no verification code")
    }

    pub(crate) async fn expire_verification_code(&self, email: &str) {
        query(
            "UPDATE users SET verification_code_expires_at = now() - interval '1 hour' \
             WHERE email = $1",
        )
        .bind(email)
        .execute(self.db.pool())
        .await
        .expect("failed to expire verification code");
    }

    /// Shift a booking's creation time into the past.
    pub(crate) async fn backdate_booking(&self, booking: BookingUuid, hours: i32) {
        query("UPDATE bookings SET created_at = now() - make_interval(hours => $2) WHERE uuid = $1")
            .bind(booking.into_uuid())
            .bind(hours)
            .execute(self.db.pool())
            .await
            .expect("failed to backdate booking");
    }

    pub(crate) async fn payments_for_booking(&self, booking: BookingUuid) -> Vec<Payment> {
        query_as::<Postgres, Payment>(
            "SELECT uuid, booking_uuid, user_uuid, amount, method, status, order_id, \
                    appointment_date, created_at, updated_at \
             FROM payments WHERE booking_uuid = $1 ORDER BY created_at",
        )
        .bind(booking.into_uuid())
        .fetch_all(self.db.pool())
        .await
        .expect("failed to list payments for booking")
    }

    pub(crate) async fn appointment_status(
        &self,
        user: UserUuid,
        vaccine: VaccineUuid,
    ) -> Option<String> {
        query_scalar::<Postgres, String>(
            "SELECT status FROM appointments WHERE user_uuid = $1 AND vaccine_uuid = $2",
        )
        .bind(user.into_uuid())
        .bind(vaccine.into_uuid())
        .fetch_optional(self.db.pool())
        .await
        .expect("failed to read appointment status")
    }

    pub(crate) async fn vaccination_certificates(&self, user: UserUuid) -> Vec<String> {
        query_scalar::<Postgres, String>(
            "SELECT certificate FROM vaccination_records WHERE user_uuid = $1",
        )
        .bind(user.into_uuid())
        .fetch_all(self.db.pool())
        .await
        .expect("failed to read vaccination records")
    }
}
