//! Suppliers service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        pagination::{Page, PageRequest},
        suppliers::{
            errors::SuppliersServiceError,
            models::{NewSupplier, Supplier, SupplierUuid},
            repository::PgSuppliersRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgSuppliersService {
    db: Db,
    repository: PgSuppliersRepository,
}

impl PgSuppliersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgSuppliersRepository::new(),
        }
    }
}

#[async_trait]
impl SuppliersService for PgSuppliersService {
    async fn list_suppliers(
        &self,
        page: PageRequest,
    ) -> Result<Page<Supplier>, SuppliersServiceError> {
        let mut tx = self.db.begin().await?;

        let (suppliers, total) = self.repository.list_suppliers(&mut tx, &page).await?;

        tx.commit().await?;

        Ok(Page::new(suppliers, total, &page))
    }

    async fn get_supplier(&self, supplier: SupplierUuid) -> Result<Supplier, SuppliersServiceError> {
        let mut tx = self.db.begin().await?;

        let supplier = self.repository.get_supplier(&mut tx, supplier).await?;

        tx.commit().await?;

        Ok(supplier)
    }

    async fn create_supplier(&self, new: NewSupplier) -> Result<Supplier, SuppliersServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_supplier(&mut tx, SupplierUuid::new(), &new)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_supplier(
        &self,
        supplier: SupplierUuid,
        update: NewSupplier,
    ) -> Result<Supplier, SuppliersServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_supplier(&mut tx, supplier, &update)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_supplier(&self, supplier: SupplierUuid) -> Result<(), SuppliersServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_supplier(&mut tx, supplier).await?;

        if rows_affected == 0 {
            return Err(SuppliersServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait SuppliersService: Send + Sync {
    /// Retrieve a page of suppliers matching the search term.
    async fn list_suppliers(
        &self,
        page: PageRequest,
    ) -> Result<Page<Supplier>, SuppliersServiceError>;

    /// Retrieve a single supplier.
    async fn get_supplier(&self, supplier: SupplierUuid) -> Result<Supplier, SuppliersServiceError>;

    /// Creates a new supplier.
    async fn create_supplier(&self, new: NewSupplier) -> Result<Supplier, SuppliersServiceError>;

    /// Updates a supplier with the given UUID.
    async fn update_supplier(
        &self,
        supplier: SupplierUuid,
        update: NewSupplier,
    ) -> Result<Supplier, SuppliersServiceError>;

    /// Deletes a supplier with the given UUID.
    async fn delete_supplier(&self, supplier: SupplierUuid) -> Result<(), SuppliersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    fn new_supplier(name: &str) -> NewSupplier {
        NewSupplier {
            name: name.to_string(),
            contact_info: Some("orders@example.com".to_string()),
            address: None,
        }
    }

    #[tokio::test]
    async fn create_supplier_returns_created_row() -> TestResult {
        let ctx = TestContext::new().await;

        let supplier = ctx
            .suppliers
            .create_supplier(new_supplier("Medline"))
            .await?;

        assert_eq!(supplier.name, "Medline");
        assert_eq!(supplier.contact_info.as_deref(), Some("orders@example.com"));

        Ok(())
    }

    #[tokio::test]
    async fn get_supplier_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.suppliers.get_supplier(SupplierUuid::new()).await;

        assert!(
            matches!(result, Err(SuppliersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_suppliers_filters_by_search_term() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.suppliers
            .create_supplier(new_supplier("Medline"))
            .await?;
        ctx.suppliers
            .create_supplier(new_supplier("BioSupply"))
            .await?;

        let page = ctx
            .suppliers
            .list_suppliers(PageRequest {
                search: Some("bio".to_string()),
                ..PageRequest::default()
            })
            .await?;

        assert_eq!(page.total, 1);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].name, "BioSupply");

        Ok(())
    }

    #[tokio::test]
    async fn delete_supplier_makes_it_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let supplier = ctx
            .suppliers
            .create_supplier(new_supplier("Medline"))
            .await?;

        ctx.suppliers.delete_supplier(supplier.uuid).await?;

        let result = ctx.suppliers.get_supplier(supplier.uuid).await;

        assert!(
            matches!(result, Err(SuppliersServiceError::NotFound)),
            "expected NotFound after deletion, got {result:?}"
        );

        Ok(())
    }
}
