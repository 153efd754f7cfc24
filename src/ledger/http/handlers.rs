use anyhow::Context;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{
    http_err::{ApiError, ApiResponse},
    ledger::{
        domain::transactions::NewTransactionData,
        services::{CreateTransactionError, ImportTransactionsError, LedgerService},
    },
    server::UploadDirectory,
};

use super::reps;

/// The multipart field holding the CSV file to import.
const IMPORT_FILE_FIELD: &str = "file";

impl From<CreateTransactionError> for ApiError {
    fn from(error: CreateTransactionError) -> Self {
        match error {
            CreateTransactionError::Invalid(reason) => Self::BadRequestReason(reason.to_string()),
            CreateTransactionError::InsufficientBalance(reason) => {
                Self::BadRequestReason(reason.to_string())
            }
            CreateTransactionError::Other(error) => {
                error!(?error, "Failed to create transaction.");

                Self::InternalServerError
            }
        }
    }
}

impl From<ImportTransactionsError> for ApiError {
    fn from(error: ImportTransactionsError) -> Self {
        match error {
            ImportTransactionsError::Unreadable(reason) => {
                Self::BadRequestReason(format!("Could not read import file: {}", reason))
            }
            ImportTransactionsError::InsufficientBalance(reason) => {
                Self::BadRequestReason(reason.to_string())
            }
            ImportTransactionsError::BalanceOverflow(reason) => {
                Self::BadRequestReason(reason.to_string())
            }
            ImportTransactionsError::Other(error) => {
                error!(?error, "Failed to import transactions.");

                Self::InternalServerError
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        Self::BadRequestReason(error.body_text())
    }
}

pub(super) async fn get_transactions(
    State(ledger_service): State<LedgerService>,
) -> ApiResponse<Json<reps::Ledger>> {
    match ledger_service.list_transactions().await {
        Ok(ledger) => Ok(Json(reps::Ledger::from(&ledger))),
        Err(error) => {
            error!(?error, "Failed to list transactions.");

            Err(ApiError::InternalServerError)
        }
    }
}

pub(super) async fn create_transaction(
    State(ledger_service): State<LedgerService>,
    Json(new_transaction_data): Json<NewTransactionData>,
) -> ApiResponse<(StatusCode, Json<reps::Transaction>)> {
    let saved_transaction = ledger_service
        .create_transaction(new_transaction_data)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(reps::Transaction::from(&saved_transaction)),
    ))
}

pub(super) async fn import_transactions(
    State(ledger_service): State<LedgerService>,
    State(uploads): State<UploadDirectory>,
    mut multipart: Multipart,
) -> ApiResponse<(StatusCode, Json<Vec<reps::Transaction>>)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMPORT_FILE_FIELD) {
            debug!(name = ?field.name(), "Ignoring multipart field.");
            continue;
        }

        let contents = field.bytes().await?;

        let path = uploads.path().join(format!("{}.csv", Uuid::new_v4()));
        tokio::fs::write(&path, &contents)
            .await
            .with_context(|| format!("Failed to save uploaded file to {:?}.", path))?;

        debug!(?path, bytes = contents.len(), "Saved uploaded import file.");

        let transactions = match ledger_service.import_transactions(&path).await {
            Ok(transactions) => transactions,
            Err(error) => {
                // Successful imports remove the file themselves.
                if let Err(remove_error) = tokio::fs::remove_file(&path).await {
                    warn!(?path, error = %remove_error, "Failed to remove rejected import file.");
                }

                return Err(error.into());
            }
        };

        return Ok((
            StatusCode::CREATED,
            Json(transactions.iter().map(reps::Transaction::from).collect()),
        ));
    }

    Err(ApiError::BadRequestReason(format!(
        "Expected a CSV file in the {:?} field.",
        IMPORT_FILE_FIELD
    )))
}
