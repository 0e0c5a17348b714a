//! Posts service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        pagination::{Page, PageRequest},
        posts::{
            errors::PostsServiceError,
            models::{NewPost, Post, PostUuid},
            repository::PgPostsRepository,
        },
        users::models::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgPostsService {
    db: Db,
    repository: PgPostsRepository,
}

impl PgPostsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgPostsRepository::new(),
        }
    }
}

#[async_trait]
impl PostsService for PgPostsService {
    async fn list_posts(&self, page: PageRequest) -> Result<Page<Post>, PostsServiceError> {
        let mut tx = self.db.begin().await?;

        let (posts, total) = self.repository.list_posts(&mut tx, &page).await?;

        tx.commit().await?;

        Ok(Page::new(posts, total, &page))
    }

    async fn get_post(&self, post: PostUuid) -> Result<Post, PostsServiceError> {
        let mut tx = self.db.begin().await?;

        let post = self.repository.get_post(&mut tx, post).await?;

        tx.commit().await?;

        Ok(post)
    }

    async fn create_post(&self, author: UserUuid, new: NewPost) -> Result<Post, PostsServiceError> {
        let mut tx = self.db.begin().await?;

        let uuid = PostUuid::new();

        self.repository.create_post(&mut tx, uuid, author, &new).await?;

        let post = self.repository.get_post(&mut tx, uuid).await?;

        tx.commit().await?;

        Ok(post)
    }

    async fn update_post(&self, post: PostUuid, update: NewPost) -> Result<Post, PostsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.update_post(&mut tx, post, &update).await?;

        if rows_affected == 0 {
            return Err(PostsServiceError::NotFound);
        }

        let post = self.repository.get_post(&mut tx, post).await?;

        tx.commit().await?;

        Ok(post)
    }

    async fn delete_post(&self, post: PostUuid) -> Result<(), PostsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_post(&mut tx, post).await?;

        if rows_affected == 0 {
            return Err(PostsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait PostsService: Send + Sync {
    /// Retrieve a page of posts whose title matches the search term.
    async fn list_posts(&self, page: PageRequest) -> Result<Page<Post>, PostsServiceError>;

    /// Retrieve a single post.
    async fn get_post(&self, post: PostUuid) -> Result<Post, PostsServiceError>;

    /// Creates a new post authored by the given user.
    async fn create_post(&self, author: UserUuid, new: NewPost) -> Result<Post, PostsServiceError>;

    /// Updates a post with the given UUID.
    async fn update_post(&self, post: PostUuid, update: NewPost) -> Result<Post, PostsServiceError>;

    /// Deletes a post with the given UUID.
    async fn delete_post(&self, post: PostUuid) -> Result<(), PostsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{domain::tags::models::NewTag, test::TestContext};

    use super::*;

    #[tokio::test]
    async fn create_post_joins_author_and_tag() -> TestResult {
        let ctx = TestContext::new().await;
        let author = ctx.create_user("author@example.com").await;

        let tag = ctx
            .tags
            .create_tag(NewTag {
                name: "health".to_string(),
            })
            .await?;

        let post = ctx
            .posts
            .create_post(
                author,
                NewPost {
                    title: "Flu season".to_string(),
                    content: "Get your shot early.".to_string(),
                    image_url: None,
                    tag_uuid: Some(tag.uuid),
                },
            )
            .await?;

        assert_eq!(post.author_uuid, author);
        assert_eq!(post.tag_name.as_deref(), Some("health"));

        Ok(())
    }

    #[tokio::test]
    async fn update_post_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .posts
            .update_post(
                PostUuid::new(),
                NewPost {
                    title: "x".to_string(),
                    content: "y".to_string(),
                    image_url: None,
                    tag_uuid: None,
                },
            )
            .await;

        assert!(
            matches!(result, Err(PostsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
