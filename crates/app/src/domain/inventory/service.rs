//! Inventory service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        inventory::{errors::InventoryServiceError, repository::PgInventoryRepository},
        vaccines::models::StockLevel,
    },
};

#[derive(Debug, Clone)]
pub struct PgInventoryService {
    db: Db,
    repository: PgInventoryRepository,
}

impl PgInventoryService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgInventoryRepository::new(),
        }
    }
}

#[async_trait]
impl InventoryService for PgInventoryService {
    async fn stock_summary(&self) -> Result<Vec<StockLevel>, InventoryServiceError> {
        let mut tx = self.db.begin().await?;

        let summary = self.repository.stock_summary(&mut tx).await?;

        tx.commit().await?;

        Ok(summary)
    }
}

#[automock]
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Remaining stock for every vaccine in the catalog.
    async fn stock_summary(&self) -> Result<Vec<StockLevel>, InventoryServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::{TestContext, new_vaccine};

    use super::*;

    #[tokio::test]
    async fn stock_summary_lists_every_vaccine() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.vaccines
            .create_vaccine(new_vaccine("Fluvax", 100, 7))
            .await?;
        ctx.vaccines
            .create_vaccine(new_vaccine("Hepatitis B", 100, 0))
            .await?;

        let summary = ctx.inventory.stock_summary().await?;

        assert_eq!(summary.len(), 2);

        let fluvax = summary
            .iter()
            .find(|level| level.name == "Fluvax")
            .ok_or("Fluvax missing from summary")?;

        assert_eq!(fluvax.remaining_quantity, 7);

        Ok(())
    }
}
