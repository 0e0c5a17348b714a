//! Vaccines service.

use async_trait::async_trait;
use mockall::automock;
use rand::Rng;

use crate::{
    database::Db,
    domain::{
        pagination::{Page, PageRequest},
        vaccines::{
            errors::VaccinesServiceError,
            models::{NewVaccine, Vaccine, VaccineUpdate, VaccineUuid},
            repository::PgVaccinesRepository,
        },
    },
};

const BATCH_NUMBER_PREFIX: &str = "VAC-";
const BATCH_NUMBER_LEN: usize = 5;
const BATCH_NUMBER_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn generate_batch_number() -> String {
    let mut rng = rand::thread_rng();

    let suffix: String = (0..BATCH_NUMBER_LEN)
        .map(|_| {
            let index = rng.gen_range(0..BATCH_NUMBER_CHARSET.len());
            BATCH_NUMBER_CHARSET[index] as char
        })
        .collect();

    format!("{BATCH_NUMBER_PREFIX}{suffix}")
}

#[derive(Debug, Clone)]
pub struct PgVaccinesService {
    db: Db,
    repository: PgVaccinesRepository,
}

impl PgVaccinesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgVaccinesRepository::new(),
        }
    }
}

#[async_trait]
impl VaccinesService for PgVaccinesService {
    async fn list_vaccines(&self, page: PageRequest) -> Result<Page<Vaccine>, VaccinesServiceError> {
        let mut tx = self.db.begin().await?;

        let (vaccines, total) = self.repository.list_vaccines(&mut tx, &page).await?;

        tx.commit().await?;

        Ok(Page::new(vaccines, total, &page))
    }

    async fn get_vaccine(&self, vaccine: VaccineUuid) -> Result<Vaccine, VaccinesServiceError> {
        let mut tx = self.db.begin().await?;

        let vaccine = self.repository.get_vaccine(&mut tx, vaccine).await?;

        tx.commit().await?;

        Ok(vaccine)
    }

    async fn create_vaccine(&self, new: NewVaccine) -> Result<Vaccine, VaccinesServiceError> {
        let mut tx = self.db.begin().await?;

        if self.repository.name_conflicts(&mut tx, &new.name, None).await? {
            return Err(VaccinesServiceError::AlreadyExists);
        }

        let created = self
            .repository
            .create_vaccine(&mut tx, VaccineUuid::new(), &generate_batch_number(), &new)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_vaccine(
        &self,
        vaccine: VaccineUuid,
        update: VaccineUpdate,
    ) -> Result<Vaccine, VaccinesServiceError> {
        let mut tx = self.db.begin().await?;

        if self
            .repository
            .name_conflicts(&mut tx, &update.name, Some(vaccine))
            .await?
        {
            return Err(VaccinesServiceError::AlreadyExists);
        }

        let updated = self.repository.update_vaccine(&mut tx, vaccine, &update).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_vaccine(&self, vaccine: VaccineUuid) -> Result<(), VaccinesServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_vaccine(&mut tx, vaccine).await?;

        if rows_affected == 0 {
            return Err(VaccinesServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait VaccinesService: Send + Sync {
    /// Retrieve a page of vaccines whose name matches the search term.
    async fn list_vaccines(&self, page: PageRequest)
    -> Result<Page<Vaccine>, VaccinesServiceError>;

    /// Retrieve a single vaccine.
    async fn get_vaccine(&self, vaccine: VaccineUuid) -> Result<Vaccine, VaccinesServiceError>;

    /// Creates a new vaccine with a generated batch number.
    async fn create_vaccine(&self, new: NewVaccine) -> Result<Vaccine, VaccinesServiceError>;

    /// Updates a vaccine with the given UUID.
    async fn update_vaccine(
        &self,
        vaccine: VaccineUuid,
        update: VaccineUpdate,
    ) -> Result<Vaccine, VaccinesServiceError>;

    /// Deletes a vaccine with the given UUID.
    async fn delete_vaccine(&self, vaccine: VaccineUuid) -> Result<(), VaccinesServiceError>;
}
