mod devices;
mod interfaces;
mod links;
pub(crate) mod row_helpers;
mod summaries;

pub use devices::DeviceRepo;
pub use interfaces::InterfaceRepo;
pub use links::LinkRepo;
pub use summaries::SummaryRepo;

use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite, Transaction};

use crate::config::Config;
use crate::models::*;

/// Store is the inventory collaborator: a transactional SQLite database
/// holding generated devices, interfaces, links and per-plan summaries.
/// Entity operations live in per-entity repo modules; generation-facing
/// methods take a connection so one transaction spans a whole run.
#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    /// Create a new database store with the default pool size
    pub async fn new(db_path: &str) -> Result<Self> {
        Self::with_pool_size(db_path, 5).await
    }

    /// Create a store wired from the environment configuration
    pub async fn from_config(cfg: &Config) -> Result<Self> {
        Self::with_pool_size(&cfg.db_path, cfg.db_max_connections).await
    }

    /// Create a new database store with a specific pool size
    pub async fn with_pool_size(db_path: &str, max_connections: u32) -> Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&db_url)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// In-memory store; a single connection so the database outlives none
    /// of its users. Intended for tests and previews.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Run database migrations and seed the settings row
    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;

        // Initialize default settings if not exists
        let count: (i32,) = sqlx::query_as("SELECT COUNT(*) FROM settings")
            .fetch_one(&self.pool)
            .await?;

        if count.0 == 0 {
            let defaults = Settings::default();
            let data = serde_json::to_string(&defaults)?;
            sqlx::query("INSERT INTO settings (id, data) VALUES (1, ?)")
                .bind(&data)
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }

    /// Begin a transaction spanning one generation run
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    pub async fn get_settings(&self) -> Result<Settings> {
        let row: (String,) = sqlx::query_as("SELECT data FROM settings WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(serde_json::from_str(&row.0)?)
    }

    pub async fn update_settings(&self, settings: &Settings) -> Result<()> {
        let data = serde_json::to_string(settings)?;
        sqlx::query("UPDATE settings SET data = ? WHERE id = 1")
            .bind(&data)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // Read-side convenience for reporting/export consumers.

    pub async fn devices_for_plan(&self, plan_id: i64) -> Result<Vec<Device>> {
        let mut conn = self.pool.acquire().await?;
        DeviceRepo::list_for_plan(&mut conn, plan_id).await
    }

    pub async fn interfaces_for_device(&self, device_id: i64) -> Result<Vec<Interface>> {
        let mut conn = self.pool.acquire().await?;
        InterfaceRepo::list_for_device(&mut conn, device_id).await
    }

    pub async fn links_for_plan(&self, plan_id: i64) -> Result<Vec<Link>> {
        let mut conn = self.pool.acquire().await?;
        LinkRepo::list_for_plan(&mut conn, plan_id).await
    }

    pub async fn summary_for_plan(&self, plan_id: i64) -> Result<Option<GenerationSummary>> {
        let mut conn = self.pool.acquire().await?;
        SummaryRepo::get(&mut conn, plan_id).await
    }
}
