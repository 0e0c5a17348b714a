//! App Context

use std::{path::PathBuf, sync::Arc};

use thiserror::Error;

use crate::{
    auth::{AuthService, PgAuthService, service::AuthConfig},
    database::{self, Db},
    domain::{
        appointments::{AppointmentsService, PgAppointmentsService},
        bookings::{BookingsService, PgBookingsService},
        categories::{CategoriesService, PgCategoriesService},
        inventory::{InventoryService, PgInventoryService},
        manufacturers::{ManufacturersService, PgManufacturersService},
        notifications::{NotificationsService, PgNotificationsService},
        payments::{PaymentsService, PgPaymentsService},
        posts::{PgPostsService, PostsService},
        suppliers::{PgSuppliersService, SuppliersService},
        tags::{PgTagsService, TagsService},
        users::{PgUsersService, UsersService},
        vaccines::{PgVaccinesService, VaccinesService},
    },
    gateway::{GatewayConfig, PaymentGateway},
    mail::Mailer,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// Application-level settings threaded into the services.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub auth: AuthConfig,
    pub gateway: GatewayConfig,
    /// Directory where confirmation QR images are written, if any.
    pub qr_dir: Option<PathBuf>,
}

/// Explicit wiring of every domain service; handlers and jobs receive
/// this instead of reaching into any ambient registry.
#[derive(Clone)]
pub struct AppContext {
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

impl AppContext {
    #[must_use]
    pub fn new(
        pool: sqlx::PgPool,
        mailer: Arc<dyn Mailer>,
        gateway: Arc<dyn PaymentGateway>,
        settings: AppSettings,
    ) -> Self {
        let db = Db::new(pool.clone());

        Self {
            auth: Arc::new(PgAuthService::new(pool, Arc::clone(&mailer), settings.auth)),
            users: Arc::new(PgUsersService::new(db.clone())),
            vaccines: Arc::new(PgVaccinesService::new(db.clone())),
            suppliers: Arc::new(PgSuppliersService::new(db.clone())),
            manufacturers: Arc::new(PgManufacturersService::new(db.clone())),
            categories: Arc::new(PgCategoriesService::new(db.clone())),
            tags: Arc::new(PgTagsService::new(db.clone())),
            posts: Arc::new(PgPostsService::new(db.clone())),
            inventory: Arc::new(PgInventoryService::new(db.clone())),
            bookings: Arc::new(PgBookingsService::new(
                db.clone(),
                Arc::clone(&mailer),
                settings.qr_dir,
            )),
            appointments: Arc::new(PgAppointmentsService::new(db.clone())),
            payments: Arc::new(PgPaymentsService::new(db.clone(), gateway, settings.gateway)),
            notifications: Arc::new(PgNotificationsService::new(db, mailer)),
        }
    }

    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(
        url: &str,
        mailer: Arc<dyn Mailer>,
        gateway: Arc<dyn PaymentGateway>,
        settings: AppSettings,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url).await.map_err(AppInitError::Database)?;

        Ok(Self::new(pool, mailer, gateway, settings))
    }
}
