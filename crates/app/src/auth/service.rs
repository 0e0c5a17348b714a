//! Auth service.

use std::sync::Arc;

use async_trait::async_trait;
use constant_time_eq::constant_time_eq;
use jiff::{Timestamp, ToSpan};
use mockall::automock;
use rand::Rng;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::{
    auth::{
        errors::AuthServiceError,
        models::{
            AuthenticatedUser, CredentialUser, IssuedTokens, LoginOutcome, NewAuthToken,
            NewStaffUser, RegisterRequest, StoredAuthToken,
        },
        password::{hash_password, verify_password},
        repository::{NewCredentialUser, PgAuthRepository},
        token::{
            ACCESS_TOKEN_TTL_HOURS, REFRESH_TOKEN_TTL_HOURS, TokenKey, TokenKind,
            build_verifier_input, format_auth_token, generate_token_secret, hash_verifier_input,
            parse_auth_token,
        },
    },
    domain::users::models::{Role, User, UserUuid},
    mail::{Mailer, OutgoingEmail, templates},
};

const VERIFICATION_CODE_LEN: usize = 6;
const VERIFICATION_CODE_TTL_MINUTES: i64 = 5;

/// Auth configuration shared by token issuance and the reset-link email.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub token_key: TokenKey,
    pub reset_base_url: String,
}

#[derive(Clone)]
pub struct PgAuthService {
    repository: PgAuthRepository,
    mailer: Arc<dyn Mailer>,
    config: AuthConfig,
}

impl PgAuthService {
    #[must_use]
    pub fn new(pool: PgPool, mailer: Arc<dyn Mailer>, config: AuthConfig) -> Self {
        Self {
            repository: PgAuthRepository::new(pool),
            mailer,
            config,
        }
    }

    /// Create the initial admin account. Refuses to run once any account
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an error when accounts already exist or persistence fails.
    pub async fn bootstrap_admin(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, AuthServiceError> {
        if self.repository.count_accounts().await.map_err(AuthServiceError::from)? > 0 {
            return Err(AuthServiceError::AlreadyInitialized);
        }

        let (password_salt, password_hash) = hash_password(password);

        let created = self
            .repository
            .create_user(&NewCredentialUser {
                uuid: UserUuid::new(),
                email,
                password_hash: &password_hash,
                password_salt: &password_salt,
                name,
                phone: None,
                role: Role::Admin,
                is_verified: true,
                verification_code: None,
                verification_code_expires_at: None,
            })
            .await?;

        Ok(created.user)
    }

    async fn issue_token(
        &self,
        user: UserUuid,
        kind: TokenKind,
        ttl_hours: i64,
    ) -> Result<String, AuthServiceError> {
        let token_uuid = Uuid::now_v7();
        let secret = generate_token_secret();
        let raw_token = format_auth_token(token_uuid, kind, &secret);

        let verifier_input = build_verifier_input(&token_uuid, kind, user, &secret);
        let token_hash = hash_verifier_input(&self.config.token_key, &verifier_input)?;

        self.repository
            .create_auth_token(&NewAuthToken {
                uuid: token_uuid,
                user_uuid: user,
                kind,
                token_hash,
                expires_at: Timestamp::now().saturating_add(ttl_hours.hours()),
            })
            .await
            .map_err(AuthServiceError::from)?;

        Ok(raw_token)
    }

    /// Parse and verify a raw token of the expected kind, returning the
    /// stored row on success.
    async fn verify_token(
        &self,
        raw_token: &str,
        expected_kind: TokenKind,
    ) -> Result<StoredAuthToken, AuthServiceError> {
        let parsed =
            parse_auth_token(raw_token).map_err(|_| AuthServiceError::Unauthorized)?;

        if parsed.kind != expected_kind {
            return Err(AuthServiceError::Unauthorized);
        }

        let token = self
            .repository
            .find_auth_token(parsed.token_uuid, parsed.kind)
            .await
            .map_err(AuthServiceError::from)?
            .ok_or(AuthServiceError::Unauthorized)?;

        if token.revoked_at.is_some() || token.expires_at <= Timestamp::now() {
            return Err(AuthServiceError::Unauthorized);
        }

        let verifier_input =
            build_verifier_input(&parsed.token_uuid, parsed.kind, token.user_uuid, &parsed.secret);
        let computed_hash = hash_verifier_input(&self.config.token_key, &verifier_input)?;

        if !constant_time_eq(computed_hash.as_bytes(), token.token_hash.as_bytes()) {
            return Err(AuthServiceError::Unauthorized);
        }

        Ok(token)
    }

    async fn load_credential(&self, user: UserUuid) -> Result<CredentialUser, AuthServiceError> {
        self.repository
            .find_credential_by_uuid(user)
            .await
            .map_err(AuthServiceError::from)?
            .ok_or(AuthServiceError::NotFound)
    }

    async fn send_verification_email(
        &self,
        email: &str,
        code: &str,
    ) -> Result<(), AuthServiceError> {
        let (subject, html) = templates::verification_email(code);

        self.mailer
            .send(&OutgoingEmail {
                to: email.to_string(),
                subject,
                html,
            })
            .await
            .map_err(AuthServiceError::from)
    }
}

fn generate_verification_code() -> (String, Timestamp) {
    let mut rng = rand::thread_rng();

    let code: String = (0..VERIFICATION_CODE_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10_u8)))
        .collect();

    let expires_at = Timestamp::now().saturating_add(VERIFICATION_CODE_TTL_MINUTES.minutes());

    (code, expires_at)
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn register(&self, request: RegisterRequest) -> Result<(), AuthServiceError> {
        if self
            .repository
            .find_credential_by_email(&request.email)
            .await
            .map_err(AuthServiceError::from)?
            .is_some()
        {
            return Err(AuthServiceError::EmailTaken);
        }

        if request.password != request.confirm_password {
            return Err(AuthServiceError::PasswordMismatch);
        }

        let (password_salt, password_hash) = hash_password(&request.password);
        let (code, code_expires_at) = generate_verification_code();

        self.repository
            .create_user(&NewCredentialUser {
                uuid: UserUuid::new(),
                email: &request.email,
                password_hash: &password_hash,
                password_salt: &password_salt,
                name: &request.name,
                phone: request.phone.as_deref(),
                role: Role::User,
                is_verified: false,
                verification_code: Some(&code),
                verification_code_expires_at: Some(code_expires_at),
            })
            .await?;

        self.send_verification_email(&request.email, &code).await
    }

    async fn verify_email(&self, email: &str, code: &str) -> Result<(), AuthServiceError> {
        let credential = self
            .repository
            .find_credential_by_email(email)
            .await
            .map_err(AuthServiceError::from)?
            .ok_or(AuthServiceError::NotFound)?;

        if credential.user.is_verified {
            return Err(AuthServiceError::AlreadyVerified);
        }

        if credential.verification_code.as_deref() != Some(code) {
            return Err(AuthServiceError::InvalidCode);
        }

        match credential.verification_code_expires_at {
            Some(expires_at) if expires_at > Timestamp::now() => {}
            _ => return Err(AuthServiceError::CodeExpired),
        }

        self.repository
            .mark_verified(email)
            .await
            .map_err(AuthServiceError::from)?;

        Ok(())
    }

    async fn resend_verification(&self, email: &str) -> Result<(), AuthServiceError> {
        let credential = self
            .repository
            .find_credential_by_email(email)
            .await
            .map_err(AuthServiceError::from)?
            .ok_or(AuthServiceError::NotFound)?;

        if credential.user.is_verified {
            return Err(AuthServiceError::AlreadyVerified);
        }

        let (code, code_expires_at) = generate_verification_code();

        self.repository
            .set_verification_code(email, &code, code_expires_at)
            .await
            .map_err(AuthServiceError::from)?;

        self.send_verification_email(email, &code).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthServiceError> {
        let credential = self
            .repository
            .find_credential_by_email(email)
            .await
            .map_err(AuthServiceError::from)?
            .ok_or(AuthServiceError::Unauthorized)?;

        if !credential.user.is_verified {
            return Err(AuthServiceError::Unauthorized);
        }

        if !verify_password(password, &credential.password_salt, &credential.password_hash) {
            return Err(AuthServiceError::Unauthorized);
        }

        let user_uuid = credential.user.uuid;

        let access_token = self
            .issue_token(user_uuid, TokenKind::Access, ACCESS_TOKEN_TTL_HOURS)
            .await?;
        let refresh_token = self
            .issue_token(user_uuid, TokenKind::Refresh, REFRESH_TOKEN_TTL_HOURS)
            .await?;

        Ok(LoginOutcome {
            tokens: IssuedTokens {
                access_token,
                refresh_token,
            },
            user: credential.user,
        })
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, AuthServiceError> {
        let token = self.verify_token(refresh_token, TokenKind::Refresh).await?;

        self.issue_token(token.user_uuid, TokenKind::Access, ACCESS_TOKEN_TTL_HOURS)
            .await
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthServiceError> {
        let token = self.verify_token(refresh_token, TokenKind::Refresh).await?;

        let was_active = self
            .repository
            .revoke_auth_token(token.uuid)
            .await
            .map_err(AuthServiceError::from)?;

        if !was_active {
            return Err(AuthServiceError::Unauthorized);
        }

        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AuthServiceError> {
        let credential = self
            .repository
            .find_credential_by_email(email)
            .await
            .map_err(AuthServiceError::from)?
            .ok_or(AuthServiceError::NotFound)?;

        let reset_token = self
            .issue_token(credential.user.uuid, TokenKind::Access, ACCESS_TOKEN_TTL_HOURS)
            .await?;

        let reset_link = format!("{}?token={reset_token}", self.config.reset_base_url);
        let (subject, html) = templates::reset_password_email(&reset_link);

        self.mailer
            .send(&OutgoingEmail {
                to: email.to_string(),
                subject,
                html,
            })
            .await
            .map_err(AuthServiceError::from)
    }

    async fn reset_password(
        &self,
        user: UserUuid,
        new_password: &str,
    ) -> Result<(), AuthServiceError> {
        let credential = self.load_credential(user).await?;

        if verify_password(new_password, &credential.password_salt, &credential.password_hash) {
            return Err(AuthServiceError::SamePassword);
        }

        let (password_salt, password_hash) = hash_password(new_password);

        self.repository
            .update_password(user, &password_hash, &password_salt)
            .await
            .map_err(AuthServiceError::from)?;

        Ok(())
    }

    async fn change_password(
        &self,
        user: UserUuid,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthServiceError> {
        let credential = self.load_credential(user).await?;

        if !verify_password(
            current_password,
            &credential.password_salt,
            &credential.password_hash,
        ) {
            return Err(AuthServiceError::WrongPassword);
        }

        if current_password == new_password {
            return Err(AuthServiceError::SamePassword);
        }

        if new_password != confirm_password {
            return Err(AuthServiceError::PasswordMismatch);
        }

        let (password_salt, password_hash) = hash_password(new_password);

        self.repository
            .update_password(user, &password_hash, &password_salt)
            .await
            .map_err(AuthServiceError::from)?;

        Ok(())
    }

    async fn authenticate_bearer(
        &self,
        bearer_token: &str,
    ) -> Result<AuthenticatedUser, AuthServiceError> {
        let token = self.verify_token(bearer_token, TokenKind::Access).await?;

        let credential = self
            .load_credential(token.user_uuid)
            .await
            .map_err(|_| AuthServiceError::Unauthorized)?;

        // Best-effort metadata update; auth success should not depend on this write.
        if let Err(error) = self.repository.touch_auth_token(token.uuid).await {
            warn!(%error, "failed to touch auth token");
        }

        Ok(AuthenticatedUser {
            user_uuid: credential.user.uuid,
            role: credential.user.role,
        })
    }

    async fn create_user_by_admin(&self, new: NewStaffUser) -> Result<User, AuthServiceError> {
        if self
            .repository
            .find_credential_by_email(&new.email)
            .await
            .map_err(AuthServiceError::from)?
            .is_some()
        {
            return Err(AuthServiceError::EmailTaken);
        }

        let (password_salt, password_hash) = hash_password(&new.password);

        let created = self
            .repository
            .create_user(&NewCredentialUser {
                uuid: UserUuid::new(),
                email: &new.email,
                password_hash: &password_hash,
                password_salt: &password_salt,
                name: &new.name,
                phone: new.phone.as_deref(),
                role: Role::Employee,
                is_verified: true,
                verification_code: None,
                verification_code_expires_at: None,
            })
            .await?;

        Ok(created.user)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an unverified account and email it a verification code.
    async fn register(&self, request: RegisterRequest) -> Result<(), AuthServiceError>;

    /// Redeem an emailed verification code.
    async fn verify_email(&self, email: &str, code: &str) -> Result<(), AuthServiceError>;

    /// Regenerate and resend the verification code.
    async fn resend_verification(&self, email: &str) -> Result<(), AuthServiceError>;

    /// Check credentials and issue an access/refresh token pair.
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthServiceError>;

    /// Exchange a live refresh token for a new access token.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, AuthServiceError>;

    /// Revoke a refresh token.
    async fn logout(&self, refresh_token: &str) -> Result<(), AuthServiceError>;

    /// Email a password-reset link.
    async fn forgot_password(&self, email: &str) -> Result<(), AuthServiceError>;

    /// Set a new password; it must differ from the current one.
    async fn reset_password(
        &self,
        user: UserUuid,
        new_password: &str,
    ) -> Result<(), AuthServiceError>;

    /// Change the password after verifying the current one.
    async fn change_password(
        &self,
        user: UserUuid,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthServiceError>;

    /// Resolve a bearer token to the requesting identity.
    async fn authenticate_bearer(
        &self,
        bearer_token: &str,
    ) -> Result<AuthenticatedUser, AuthServiceError>;

    /// Provision a pre-verified staff account.
    async fn create_user_by_admin(&self, new: NewStaffUser) -> Result<User, AuthServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "correct horse".to_string(),
            confirm_password: "correct horse".to_string(),
            name: "Alice".to_string(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn register_sends_verification_email() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.auth.register(register_request("alice@example.com")).await?;

        let sent = ctx.mailer.sent();

        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "alice@example.com");

        Ok(())
    }

    #[tokio::test]
    async fn register_duplicate_email_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.auth.register(register_request("alice@example.com")).await?;

        let result = ctx.auth.register(register_request("alice@example.com")).await;

        assert!(
            matches!(result, Err(AuthServiceError::EmailTaken)),
            "expected EmailTaken, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_password_mismatch() {
        let ctx = TestContext::new().await;

        let result = ctx
            .auth
            .register(RegisterRequest {
                confirm_password: "something else".to_string(),
                ..register_request("alice@example.com")
            })
            .await;

        assert!(
            matches!(result, Err(AuthServiceError::PasswordMismatch)),
            "expected PasswordMismatch, got {result:?}"
        );
    }

    #[tokio::test]
    async fn login_requires_verification() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.auth.register(register_request("alice@example.com")).await?;

        let result = ctx.auth.login("alice@example.com", "correct horse").await;

        assert!(
            matches!(result, Err(AuthServiceError::Unauthorized)),
            "expected Unauthorized before verification, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn verify_email_then_login_issues_tokens() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.auth.register(register_request("alice@example.com")).await?;

        let code = ctx.verification_code("alice@example.com").await;

        ctx.auth.verify_email("alice@example.com", &code).await?;

        let outcome = ctx.auth.login("alice@example.com", "correct horse").await?;

        assert_eq!(outcome.user.email, "alice@example.com");
        assert!(outcome.tokens.access_token.starts_with("vx_access_"));
        assert!(outcome.tokens.refresh_token.starts_with("vx_refresh_"));

        let identity = ctx
            .auth
            .authenticate_bearer(&outcome.tokens.access_token)
            .await?;

        assert_eq!(identity.user_uuid, outcome.user.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn verify_email_rejects_wrong_code() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.auth.register(register_request("alice@example.com")).await?;

        let result = ctx.auth.verify_email("alice@example.com", "000000").await;

        assert!(
            matches!(result, Err(AuthServiceError::InvalidCode)),
            "expected InvalidCode, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn verify_email_rejects_expired_code() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.auth.register(register_request("alice@example.com")).await?;

        let code = ctx.verification_code("alice@example.com").await;

        ctx.expire_verification_code("alice@example.com").await;

        let result = ctx.auth.verify_email("alice@example.com", &code).await;

        assert!(
            matches!(result, Err(AuthServiceError::CodeExpired)),
            "expected CodeExpired, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() -> TestResult {
        let ctx = TestContext::new().await;
        let email = "alice@example.com";

        ctx.register_verified(email, "correct horse").await?;

        let result = ctx.auth.login(email, "wrong horse").await;

        assert!(
            matches!(result, Err(AuthServiceError::Unauthorized)),
            "expected Unauthorized, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn refresh_token_issues_new_access_token() -> TestResult {
        let ctx = TestContext::new().await;

        let outcome = ctx.register_verified("alice@example.com", "correct horse").await?;

        let access = ctx
            .auth
            .refresh_access_token(&outcome.tokens.refresh_token)
            .await?;

        let identity = ctx.auth.authenticate_bearer(&access).await?;

        assert_eq!(identity.user_uuid, outcome.user.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn logout_revokes_refresh_token() -> TestResult {
        let ctx = TestContext::new().await;

        let outcome = ctx.register_verified("alice@example.com", "correct horse").await?;

        ctx.auth.logout(&outcome.tokens.refresh_token).await?;

        let result = ctx
            .auth
            .refresh_access_token(&outcome.tokens.refresh_token)
            .await;

        assert!(
            matches!(result, Err(AuthServiceError::Unauthorized)),
            "expected Unauthorized after logout, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn access_token_cannot_be_used_as_refresh_token() -> TestResult {
        let ctx = TestContext::new().await;

        let outcome = ctx.register_verified("alice@example.com", "correct horse").await?;

        let result = ctx
            .auth
            .refresh_access_token(&outcome.tokens.access_token)
            .await;

        assert!(
            matches!(result, Err(AuthServiceError::Unauthorized)),
            "expected Unauthorized for kind mismatch, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn authenticate_bearer_rejects_garbage() {
        let ctx = TestContext::new().await;

        let result = ctx.auth.authenticate_bearer("not-a-token").await;

        assert!(
            matches!(result, Err(AuthServiceError::Unauthorized)),
            "expected Unauthorized, got {result:?}"
        );
    }

    #[tokio::test]
    async fn change_password_verifies_current_password() -> TestResult {
        let ctx = TestContext::new().await;

        let outcome = ctx.register_verified("alice@example.com", "correct horse").await?;

        let result = ctx
            .auth
            .change_password(outcome.user.uuid, "wrong", "next pass", "next pass")
            .await;

        assert!(
            matches!(result, Err(AuthServiceError::WrongPassword)),
            "expected WrongPassword, got {result:?}"
        );

        ctx.auth
            .change_password(outcome.user.uuid, "correct horse", "next pass", "next pass")
            .await?;

        let login = ctx.auth.login("alice@example.com", "next pass").await?;

        assert_eq!(login.user.uuid, outcome.user.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn reset_password_rejects_reusing_current() -> TestResult {
        let ctx = TestContext::new().await;

        let outcome = ctx.register_verified("alice@example.com", "correct horse").await?;

        let result = ctx
            .auth
            .reset_password(outcome.user.uuid, "correct horse")
            .await;

        assert!(
            matches!(result, Err(AuthServiceError::SamePassword)),
            "expected SamePassword, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn forgot_password_sends_reset_link() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.register_verified("alice@example.com", "correct horse").await?;
        ctx.mailer.clear();

        ctx.auth.forgot_password("alice@example.com").await?;

        let sent = ctx.mailer.sent();

        assert_eq!(sent.len(), 1);
        assert!(sent[0].html.contains("token=vx_access_"));

        Ok(())
    }

    #[tokio::test]
    async fn create_user_by_admin_is_pre_verified_employee() -> TestResult {
        let ctx = TestContext::new().await;

        let user = ctx
            .auth
            .create_user_by_admin(NewStaffUser {
                email: "staff@example.com".to_string(),
                password: "staff pass".to_string(),
                name: "Sam".to_string(),
                phone: None,
            })
            .await?;

        assert_eq!(user.role, Role::Employee);
        assert!(user.is_verified);

        let login = ctx.auth.login("staff@example.com", "staff pass").await?;

        assert_eq!(login.user.uuid, user.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn bootstrap_admin_refuses_second_run() -> TestResult {
        let ctx = TestContext::new().await;

        let admin = ctx
            .auth_service()
            .bootstrap_admin("root@example.com", "root pass", "Root")
            .await?;

        assert_eq!(admin.role, Role::Admin);

        let result = ctx
            .auth_service()
            .bootstrap_admin("other@example.com", "pass", "Other")
            .await;

        assert!(
            matches!(result, Err(AuthServiceError::AlreadyInitialized)),
            "expected AlreadyInitialized, got {result:?}"
        );

        Ok(())
    }
}
