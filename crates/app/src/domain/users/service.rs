//! Users service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        pagination::{Page, PageRequest},
        users::{
            errors::UsersServiceError,
            models::{Role, User, UserUpdate, UserUuid},
            repository::PgUsersRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgUsersService {
    db: Db,
    repository: PgUsersRepository,
}

impl PgUsersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgUsersRepository::new(),
        }
    }
}

#[async_trait]
impl UsersService for PgUsersService {
    async fn list_users(&self, page: PageRequest) -> Result<Page<User>, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let (users, total) = self.repository.list_users(&mut tx, &page).await?;

        tx.commit().await?;

        Ok(Page::new(users, total, &page))
    }

    async fn get_user(&self, user: UserUuid) -> Result<User, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let user = self.repository.get_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(user)
    }

    async fn update_profile(
        &self,
        user: UserUuid,
        update: UserUpdate,
    ) -> Result<User, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self.repository.update_profile(&mut tx, user, &update).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn update_role(
        &self,
        target: UserUuid,
        role: Role,
        acting: UserUuid,
    ) -> Result<User, UsersServiceError> {
        if target == acting {
            return Err(UsersServiceError::CannotChangeOwnRole);
        }

        let mut tx = self.db.begin().await?;

        let updated = self.repository.update_role(&mut tx, target, role).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_user(&self, target: UserUuid, acting: UserUuid) -> Result<(), UsersServiceError> {
        if target == acting {
            return Err(UsersServiceError::CannotDeleteSelf);
        }

        let mut tx = self.db.begin().await?;

        let user = self.repository.get_user(&mut tx, target).await?;

        if user.role == Role::Admin {
            return Err(UsersServiceError::CannotDeleteAdmin);
        }

        self.repository.delete_user(&mut tx, target).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn count_users(&self) -> Result<i64, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let total = self.repository.count_all(&mut tx).await?;

        tx.commit().await?;

        Ok(total)
    }
}

#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Retrieve a page of users searching over name and email.
    async fn list_users(&self, page: PageRequest) -> Result<Page<User>, UsersServiceError>;

    /// Retrieve a single user.
    async fn get_user(&self, user: UserUuid) -> Result<User, UsersServiceError>;

    /// Update a user's own profile fields.
    async fn update_profile(
        &self,
        user: UserUuid,
        update: UserUpdate,
    ) -> Result<User, UsersServiceError>;

    /// Assign a new role. Admins cannot change their own role.
    async fn update_role(
        &self,
        target: UserUuid,
        role: Role,
        acting: UserUuid,
    ) -> Result<User, UsersServiceError>;

    /// Delete an account. Admin accounts and the acting user are protected.
    async fn delete_user(&self, target: UserUuid, acting: UserUuid)
    -> Result<(), UsersServiceError>;

    /// Total number of accounts.
    async fn count_users(&self) -> Result<i64, UsersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    async fn update_role_rejects_self() {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("solo@example.com").await;

        let result = ctx.users.update_role(user, Role::Admin, user).await;

        assert!(
            matches!(result, Err(UsersServiceError::CannotChangeOwnRole)),
            "expected CannotChangeOwnRole, got {result:?}"
        );
    }

    #[tokio::test]
    async fn update_role_promotes_other_user() -> TestResult {
        let ctx = TestContext::new().await;
        let acting = ctx.create_user("admin@example.com").await;
        let target = ctx.create_user("staff@example.com").await;

        let updated = ctx.users.update_role(target, Role::Employee, acting).await?;

        assert_eq!(updated.role, Role::Employee);

        Ok(())
    }

    #[tokio::test]
    async fn delete_user_rejects_self_deletion() {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("solo@example.com").await;

        let result = ctx.users.delete_user(user, user).await;

        assert!(
            matches!(result, Err(UsersServiceError::CannotDeleteSelf)),
            "expected CannotDeleteSelf, got {result:?}"
        );
    }

    #[tokio::test]
    async fn delete_user_rejects_admin_target() -> TestResult {
        let ctx = TestContext::new().await;
        let acting = ctx.create_user("staff@example.com").await;
        let admin = ctx.create_user("root@example.com").await;

        ctx.users.update_role(admin, Role::Admin, acting).await?;

        let result = ctx.users.delete_user(admin, acting).await;

        assert!(
            matches!(result, Err(UsersServiceError::CannotDeleteAdmin)),
            "expected CannotDeleteAdmin, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_user_removes_regular_account() -> TestResult {
        let ctx = TestContext::new().await;
        let acting = ctx.create_user("admin@example.com").await;
        let target = ctx.create_user("leaving@example.com").await;

        ctx.users.delete_user(target, acting).await?;

        let result = ctx.users.get_user(target).await;

        assert!(
            matches!(result, Err(UsersServiceError::NotFound)),
            "expected NotFound after deletion, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_users_searches_name_and_email() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.create_user("alice@example.com").await;
        ctx.create_user("bob@example.com").await;

        let page = ctx
            .users
            .list_users(PageRequest {
                search: Some("alice".to_string()),
                ..PageRequest::default()
            })
            .await?;

        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].email, "alice@example.com");

        Ok(())
    }
}
