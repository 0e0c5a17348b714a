//! Categories service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        categories::{
            errors::CategoriesServiceError,
            models::{Category, CategoryUuid, NewCategory},
            repository::PgCategoriesRepository,
        },
        pagination::{Page, PageRequest},
    },
};

#[derive(Debug, Clone)]
pub struct PgCategoriesService {
    db: Db,
    repository: PgCategoriesRepository,
}

impl PgCategoriesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCategoriesRepository::new(),
        }
    }
}

#[async_trait]
impl CategoriesService for PgCategoriesService {
    async fn list_categories(
        &self,
        page: PageRequest,
    ) -> Result<Page<Category>, CategoriesServiceError> {
        let mut tx = self.db.begin().await?;

        let (categories, total) = self.repository.list_categories(&mut tx, &page).await?;

        tx.commit().await?;

        Ok(Page::new(categories, total, &page))
    }

    async fn get_category(&self, category: CategoryUuid) -> Result<Category, CategoriesServiceError> {
        let mut tx = self.db.begin().await?;

        let category = self.repository.get_category(&mut tx, category).await?;

        tx.commit().await?;

        Ok(category)
    }

    async fn create_category(&self, new: NewCategory) -> Result<Category, CategoriesServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_category(&mut tx, CategoryUuid::new(), &new)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_category(
        &self,
        category: CategoryUuid,
        update: NewCategory,
    ) -> Result<Category, CategoriesServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_category(&mut tx, category, &update)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_category(&self, category: CategoryUuid) -> Result<(), CategoriesServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_category(&mut tx, category).await?;

        if rows_affected == 0 {
            return Err(CategoriesServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CategoriesService: Send + Sync {
    /// Retrieve a page of categories matching the search term.
    async fn list_categories(
        &self,
        page: PageRequest,
    ) -> Result<Page<Category>, CategoriesServiceError>;

    /// Retrieve a single category.
    async fn get_category(&self, category: CategoryUuid)
    -> Result<Category, CategoriesServiceError>;

    /// Creates a new category.
    async fn create_category(&self, new: NewCategory) -> Result<Category, CategoriesServiceError>;

    /// Updates a category with the given UUID.
    async fn update_category(
        &self,
        category: CategoryUuid,
        update: NewCategory,
    ) -> Result<Category, CategoriesServiceError>;

    /// Deletes a category with the given UUID.
    async fn delete_category(&self, category: CategoryUuid) -> Result<(), CategoriesServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    async fn category_round_trip() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx
            .categories
            .create_category(NewCategory {
                name: "Travel".to_string(),
                description: Some("Pre-travel immunizations".to_string()),
            })
            .await?;

        let fetched = ctx.categories.get_category(created.uuid).await?;

        assert_eq!(fetched.name, "Travel");

        ctx.categories.delete_category(created.uuid).await?;

        let result = ctx.categories.get_category(created.uuid).await;

        assert!(
            matches!(result, Err(CategoriesServiceError::NotFound)),
            "expected NotFound after deletion, got {result:?}"
        );

        Ok(())
    }
}
