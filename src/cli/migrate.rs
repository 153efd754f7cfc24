use crate::database::{DatabaseOptions, PostgresConnection};

pub struct MigrationOpts {
    pub database_url: String,
}

pub async fn run_migrations(opts: MigrationOpts) -> anyhow::Result<()> {
    let db = PostgresConnection::connect(&DatabaseOptions {
        url: opts.database_url,
        pool_size: 1,
        timeout_seconds: 30,
    })
    .await?;

    db.run_migrations().await
}
