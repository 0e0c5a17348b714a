//! Tags service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        pagination::{Page, PageRequest},
        tags::{
            errors::TagsServiceError,
            models::{NewTag, Tag, TagUuid},
            repository::PgTagsRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgTagsService {
    db: Db,
    repository: PgTagsRepository,
}

impl PgTagsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgTagsRepository::new(),
        }
    }
}

#[async_trait]
impl TagsService for PgTagsService {
    async fn list_tags(&self, page: PageRequest) -> Result<Page<Tag>, TagsServiceError> {
        let mut tx = self.db.begin().await?;

        let (tags, total) = self.repository.list_tags(&mut tx, &page).await?;

        tx.commit().await?;

        Ok(Page::new(tags, total, &page))
    }

    async fn get_tag(&self, tag: TagUuid) -> Result<Tag, TagsServiceError> {
        let mut tx = self.db.begin().await?;

        let tag = self.repository.get_tag(&mut tx, tag).await?;

        tx.commit().await?;

        Ok(tag)
    }

    async fn create_tag(&self, new: NewTag) -> Result<Tag, TagsServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_tag(&mut tx, TagUuid::new(), &new).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_tag(&self, tag: TagUuid, update: NewTag) -> Result<Tag, TagsServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self.repository.update_tag(&mut tx, tag, &update).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_tag(&self, tag: TagUuid) -> Result<(), TagsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_tag(&mut tx, tag).await?;

        if rows_affected == 0 {
            return Err(TagsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait TagsService: Send + Sync {
    /// Retrieve a page of tags matching the search term.
    async fn list_tags(&self, page: PageRequest) -> Result<Page<Tag>, TagsServiceError>;

    /// Retrieve a single tag.
    async fn get_tag(&self, tag: TagUuid) -> Result<Tag, TagsServiceError>;

    /// Creates a new tag. Names are unique.
    async fn create_tag(&self, new: NewTag) -> Result<Tag, TagsServiceError>;

    /// Updates a tag with the given UUID.
    async fn update_tag(&self, tag: TagUuid, update: NewTag) -> Result<Tag, TagsServiceError>;

    /// Deletes a tag with the given UUID.
    async fn delete_tag(&self, tag: TagUuid) -> Result<(), TagsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    async fn duplicate_tag_name_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.tags
            .create_tag(NewTag {
                name: "health".to_string(),
            })
            .await?;

        let result = ctx
            .tags
            .create_tag(NewTag {
                name: "health".to_string(),
            })
            .await;

        assert!(
            matches!(result, Err(TagsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_tags_returns_created_tags() -> TestResult {
        let ctx = TestContext::new().await;

        for name in ["health", "nutrition", "pediatrics"] {
            ctx.tags
                .create_tag(NewTag {
                    name: name.to_string(),
                })
                .await?;
        }

        let page = ctx.tags.list_tags(PageRequest::default()).await?;

        assert_eq!(page.total, 3);

        Ok(())
    }
}
