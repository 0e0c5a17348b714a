//! Manufacturers service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        manufacturers::{
            errors::ManufacturersServiceError,
            models::{Manufacturer, ManufacturerUuid, NewManufacturer},
            repository::PgManufacturersRepository,
        },
        pagination::{Page, PageRequest},
    },
};

#[derive(Debug, Clone)]
pub struct PgManufacturersService {
    db: Db,
    repository: PgManufacturersRepository,
}

impl PgManufacturersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgManufacturersRepository::new(),
        }
    }
}

#[async_trait]
impl ManufacturersService for PgManufacturersService {
    async fn list_manufacturers(
        &self,
        page: PageRequest,
    ) -> Result<Page<Manufacturer>, ManufacturersServiceError> {
        let mut tx = self.db.begin().await?;

        let (manufacturers, total) = self.repository.list_manufacturers(&mut tx, &page).await?;

        tx.commit().await?;

        Ok(Page::new(manufacturers, total, &page))
    }

    async fn get_manufacturer(
        &self,
        manufacturer: ManufacturerUuid,
    ) -> Result<Manufacturer, ManufacturersServiceError> {
        let mut tx = self.db.begin().await?;

        let manufacturer = self
            .repository
            .get_manufacturer(&mut tx, manufacturer)
            .await?;

        tx.commit().await?;

        Ok(manufacturer)
    }

    async fn create_manufacturer(
        &self,
        new: NewManufacturer,
    ) -> Result<Manufacturer, ManufacturersServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_manufacturer(&mut tx, ManufacturerUuid::new(), &new)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_manufacturer(
        &self,
        manufacturer: ManufacturerUuid,
        update: NewManufacturer,
    ) -> Result<Manufacturer, ManufacturersServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_manufacturer(&mut tx, manufacturer, &update)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_manufacturer(
        &self,
        manufacturer: ManufacturerUuid,
    ) -> Result<(), ManufacturersServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self
            .repository
            .delete_manufacturer(&mut tx, manufacturer)
            .await?;

        if rows_affected == 0 {
            return Err(ManufacturersServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait ManufacturersService: Send + Sync {
    /// Retrieve a page of manufacturers matching the search term.
    async fn list_manufacturers(
        &self,
        page: PageRequest,
    ) -> Result<Page<Manufacturer>, ManufacturersServiceError>;

    /// Retrieve a single manufacturer.
    async fn get_manufacturer(
        &self,
        manufacturer: ManufacturerUuid,
    ) -> Result<Manufacturer, ManufacturersServiceError>;

    /// Creates a new manufacturer.
    async fn create_manufacturer(
        &self,
        new: NewManufacturer,
    ) -> Result<Manufacturer, ManufacturersServiceError>;

    /// Updates a manufacturer with the given UUID.
    async fn update_manufacturer(
        &self,
        manufacturer: ManufacturerUuid,
        update: NewManufacturer,
    ) -> Result<Manufacturer, ManufacturersServiceError>;

    /// Deletes a manufacturer with the given UUID.
    async fn delete_manufacturer(
        &self,
        manufacturer: ManufacturerUuid,
    ) -> Result<(), ManufacturersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    async fn create_and_update_manufacturer() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx
            .manufacturers
            .create_manufacturer(NewManufacturer {
                name: "Helix Biologics".to_string(),
                country: Some("DE".to_string()),
            })
            .await?;

        let updated = ctx
            .manufacturers
            .update_manufacturer(
                created.uuid,
                NewManufacturer {
                    name: "Helix Biologics".to_string(),
                    country: Some("FR".to_string()),
                },
            )
            .await?;

        assert_eq!(updated.uuid, created.uuid);
        assert_eq!(updated.country.as_deref(), Some("FR"));

        Ok(())
    }

    #[tokio::test]
    async fn delete_manufacturer_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .manufacturers
            .delete_manufacturer(ManufacturerUuid::new())
            .await;

        assert!(
            matches!(result, Err(ManufacturersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
