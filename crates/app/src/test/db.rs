//! Database test utilities and shared infrastructure

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::{OnceCell, mpsc};

const DB_USER: &str = "vaxline_test";
const DB_PASSWORD: &str = "vaxline_test_password";

/// Shared PostgreSQL container that starts once and is reused across all tests
static POSTGRES_CONTAINER: Lazy<OnceCell<ContainerAsync<PostgresImage>>> = Lazy::new(OnceCell::new);

/// Cleanup channel for database cleanup requests
static CLEANUP_SENDER: Lazy<OnceCell<mpsc::UnboundedSender<String>>> = Lazy::new(OnceCell::new);

async fn init_postgres_container() -> ContainerAsync<PostgresImage> {
    PostgresImage::default()
        .with_user(DB_USER)
        .with_password(DB_PASSWORD)
        .with_db_name("vaxline_test")
        .with_env_var("POSTGRES_INITDB_ARGS", "--auth-host=trust")
        .start()
        .await
        .expect("Failed to start PostgreSQL container")
}

async fn init_cleanup_task() -> mpsc::UnboundedSender<String> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(db_name) = receiver.recv().await {
            if let Err(err) = drop_database(&db_name).await {
                eprintln!("Failed to cleanup database '{db_name}': {err}");
            }
        }
    });

    sender
}

async fn base_url() -> String {
    let container = POSTGRES_CONTAINER
        .get_or_init(init_postgres_container)
        .await;

    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get container port");

    let host =
        std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());

    format!("postgresql://{DB_USER}:{DB_PASSWORD}@{host}:{port}")
}

async fn drop_database(db_name: &str) -> Result<(), sqlx::Error> {
    if POSTGRES_CONTAINER.get().is_none() {
        return Ok(());
    }

    let url = format!("{}/postgres", base_url().await);

    if let Ok(mut conn) = PgConnection::connect(&url).await {
        // names are generated in-process; still refuse anything surprising
        if db_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\""))
                .execute(&mut conn)
                .await;
        }
        let _ = conn.close().await;
    }

    Ok(())
}

/// An isolated test database inside the shared container.
///
/// Every test gets a fresh database with migrations applied, so tests need
/// no cleanup of their own. The database is dropped in the background when
/// the `TestDb` goes out of scope.
#[derive(Debug, Clone)]
pub(crate) struct TestDb {
    pool: PgPool,
    pub name: String,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if let Some(sender) = CLEANUP_SENDER.get() {
            let _ = sender.send(self.name.clone());
        }
    }
}

impl TestDb {
    pub(crate) async fn new() -> Self {
        let _cleanup_sender = CLEANUP_SENDER.get_or_init(init_cleanup_task).await;

        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system clock before unix epoch")
            .as_nanos();

        let thread_id = std::thread::current().id();

        let name = format!("vaxline_test_{nanos}_{thread_id:?}").replace([':', ' ', '(', ')'], "");

        let base = base_url().await;

        let mut conn = PgConnection::connect(&format!("{base}/postgres"))
            .await
            .expect("Failed to connect to postgres database");

        sqlx::query(&format!("CREATE DATABASE \"{name}\""))
            .execute(&mut conn)
            .await
            .expect("Failed to create test database");

        conn.close()
            .await
            .expect("Failed to close admin connection");

        let pool = PgPool::connect(&format!("{base}/{name}"))
            .await
            .expect("Failed to create pool for test database");

        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations on test database");

        Self { pool, name }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}
