use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use axum::{extract::FromRef, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    database::{DatabaseOptions, PostgresConnection},
    ledger::services::LedgerService,
    repos::DynLedgerRepo,
};

pub struct Options {
    pub address: SocketAddr,
    pub database: DatabaseOptions,
    pub enforce_import_balance: bool,
    pub upload_dir: PathBuf,
}

/// The directory uploaded import files are written to before being imported.
#[derive(Clone, Debug)]
pub struct UploadDirectory(Arc<PathBuf>);

impl UploadDirectory {
    pub fn new(path: PathBuf) -> Self {
        Self(Arc::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[derive(Clone)]
pub struct AppState {
    ledger_service: LedgerService,
    uploads: UploadDirectory,
}

impl AppState {
    pub fn new(ledger_service: LedgerService, uploads: UploadDirectory) -> Self {
        Self {
            ledger_service,
            uploads,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/ledger", crate::ledger::http::routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn serve(opts: Options) -> anyhow::Result<()> {
    let db_connection = PostgresConnection::connect(&opts.database).await?;

    tokio::fs::create_dir_all(&opts.upload_dir)
        .await
        .with_context(|| format!("Failed to create upload directory {:?}.", opts.upload_dir))?;

    let ledger_repo: DynLedgerRepo = Arc::new(db_connection);

    let ledger_service = LedgerService::new(ledger_repo)
        .with_import_balance_check(opts.enforce_import_balance);

    let state = AppState::new(ledger_service, UploadDirectory::new(opts.upload_dir));

    info!(address = %opts.address, "Listening for requests.");

    axum::Server::bind(&opts.address)
        .serve(router(state).into_make_service())
        .await?;

    Ok(())
}

impl FromRef<AppState> for LedgerService {
    fn from_ref(state: &AppState) -> Self {
        state.ledger_service.clone()
    }
}

impl FromRef<AppState> for UploadDirectory {
    fn from_ref(state: &AppState) -> Self {
        state.uploads.clone()
    }
}
