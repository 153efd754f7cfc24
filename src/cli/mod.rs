use std::{net::SocketAddr, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::{database::DatabaseOptions, server};

mod migrate;

#[derive(Parser)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// DSN to tell Sentry where to send events.
    ///
    /// If provided, errors will be sent to Sentry.
    #[clap(long = "sentry-dsn", env = "SENTRY_DSN")]
    sentry_dsn: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    Migrate(MigrateOpts),
    Serve(ServeOpts),
}

#[derive(Args)]
struct MigrateOpts {
    /// Connection string for the database.
    #[clap(long = "database-url", env = "DATABASE_URL")]
    database_url: String,
}

impl From<MigrateOpts> for migrate::MigrationOpts {
    fn from(opts: MigrateOpts) -> Self {
        Self {
            database_url: opts.database_url,
        }
    }
}

#[derive(Args)]
struct ServeOpts {
    /// The address to listen for requests on.
    #[clap(long = "address", default_value = "0.0.0.0:8000", env = "ADDRESS")]
    address: SocketAddr,

    /// The number of connections to use for the database pool.
    #[clap(long = "database-pool-size", default_value = "16")]
    database_pool_size: u32,

    /// The number of seconds before a database connection times out.
    #[clap(long = "database-timeout", default_value = "5")]
    database_timeout: u8,

    /// Connection string for the application database.
    #[clap(long = "database-url", env = "DATABASE_URL")]
    database_url: String,

    /// Reject imports whose outcome transactions are not covered by the
    /// balance.
    ///
    /// Transactions created one at a time are always checked. Imports are
    /// only checked if this is set.
    #[clap(long = "enforce-import-balance", env = "ENFORCE_IMPORT_BALANCE")]
    enforce_import_balance: bool,

    /// Directory that uploaded import files are stored in until they have
    /// been imported.
    #[clap(long = "upload-dir", default_value = "tmp", env = "UPLOAD_DIR")]
    upload_dir: PathBuf,
}

impl From<ServeOpts> for server::Options {
    fn from(opts: ServeOpts) -> Self {
        Self {
            address: opts.address,
            database: DatabaseOptions {
                url: opts.database_url,
                pool_size: opts.database_pool_size,
                timeout_seconds: opts.database_timeout,
            },
            enforce_import_balance: opts.enforce_import_balance,
            upload_dir: opts.upload_dir,
        }
    }
}

pub async fn run_with_sys_args() -> anyhow::Result<()> {
    use tracing_subscriber::prelude::*;

    let cli = Cli::parse();

    let sentry_config = cli.sentry_dsn.map(|dsn| {
        debug!("Enabled sentry.");

        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let sentry_tracing_layer = if sentry_config.is_some() {
        Some(sentry_tracing::layer())
    } else {
        None
    };

    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(sentry_tracing_layer)
        .init();

    match cli.command {
        Commands::Migrate(opts) => migrate::run_migrations(opts.into()).await,
        Commands::Serve(opts) => {
            let migrate_opts = MigrateOpts {
                database_url: opts.database_url.clone(),
            };

            migrate::run_migrations(migrate_opts.into()).await?;

            server::serve(opts.into()).await
        }
    }
}
