use std::{ops::Deref, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

/// Options for connecting to the application database.
pub struct DatabaseOptions {
    pub url: String,
    pub pool_size: u32,
    pub timeout_seconds: u8,
}

#[derive(Clone)]
pub struct PostgresConnection(PgPool);

impl PostgresConnection {
    pub fn new(pool: PgPool) -> Self {
        Self(pool)
    }

    /// Open a connection pool to the database.
    pub async fn connect(opts: &DatabaseOptions) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(opts.pool_size)
            .acquire_timeout(Duration::from_secs(opts.timeout_seconds.into()))
            .connect(&opts.url)
            .await?;

        info!(pool_size = opts.pool_size, "Connected to database.");

        Ok(Self::new(pool))
    }

    /// Apply any migrations that have not been run against the database yet.
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.0).await?;

        info!("Database migrations are up to date.");

        Ok(())
    }
}

impl Deref for PostgresConnection {
    type Target = PgPool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
