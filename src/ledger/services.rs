use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use anyhow::Context;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::repos::{DynLedgerRepo, UnitOfWork};

use super::{
    domain::{
        balance::{Balance, BalanceOverflow, InsufficientBalance},
        categories::{Category, NewCategory},
        transactions::{InvalidTransaction, NewTransactionData, Transaction, TransactionDetails},
    },
    import::{self, ReadRowsError},
};

/// Every persisted transaction along with the balance they add up to.
pub struct Ledger {
    pub transactions: Vec<Transaction>,
    pub balance: Balance,
}

#[derive(Debug, Error)]
pub enum CreateTransactionError {
    #[error("invalid transaction: {0}")]
    Invalid(#[from] InvalidTransaction),

    #[error(transparent)]
    InsufficientBalance(#[from] InsufficientBalance),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ImportTransactionsError {
    #[error(transparent)]
    Unreadable(csv::Error),

    #[error(transparent)]
    InsufficientBalance(#[from] InsufficientBalance),

    #[error(transparent)]
    BalanceOverflow(#[from] BalanceOverflow),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ReadRowsError> for ImportTransactionsError {
    fn from(error: ReadRowsError) -> Self {
        match error {
            ReadRowsError::Unreadable { source, .. } => Self::Unreadable(source),
            other => Self::Other(other.into()),
        }
    }
}

/// A service object providing functionality relating to transactions and
/// the categories they are filed under.
#[derive(Clone)]
pub struct LedgerService {
    ledger_repo: DynLedgerRepo,
    enforce_import_balance: bool,
}

impl LedgerService {
    /// Create a new ledger service.
    ///
    /// # Arguments
    ///
    /// * `ledger_repo` - The repository used to persist and query transactions
    ///   and categories.
    pub fn new(ledger_repo: DynLedgerRepo) -> Self {
        Self {
            ledger_repo,
            enforce_import_balance: false,
        }
    }

    /// Require imported outcome transactions to be covered by the balance,
    /// the same way transactions created one at a time are.
    pub fn with_import_balance_check(mut self, enforce: bool) -> Self {
        self.enforce_import_balance = enforce;
        self
    }

    pub async fn list_transactions(&self) -> anyhow::Result<Ledger> {
        let transactions = self.ledger_repo.list_transactions().await?;
        let balance = self.ledger_repo.balance().await?;

        Ok(Ledger {
            transactions,
            balance,
        })
    }

    /// Create a single transaction.
    ///
    /// An outcome transaction is only accepted if its value is covered by the
    /// current balance. The category is looked up by title and created if it
    /// doesn't exist yet. Nothing is persisted unless the whole operation
    /// succeeds.
    ///
    /// # Arguments
    ///
    /// * `data` - The new transaction's information.
    pub async fn create_transaction(
        &self,
        data: NewTransactionData,
    ) -> Result<Transaction, CreateTransactionError> {
        let details = TransactionDetails::try_from(&data)?;

        let mut unit_of_work = self.ledger_repo.begin_unit_of_work().await?;

        let balance = unit_of_work.balance().await?;
        balance.check(details.kind(), details.value())?;

        let category = find_or_create_category(unit_of_work.as_mut(), &data.category).await?;

        let transaction = unit_of_work
            .persist_transactions(vec![details.categorize(category)])
            .await?
            .pop()
            .context("No transaction was returned after persisting.")?;

        unit_of_work.commit().await?;

        info!(id = %transaction.id, kind = %transaction.kind, "Created transaction.");

        Ok(transaction)
    }

    /// Import transactions from a CSV file, then delete the file.
    ///
    /// Malformed rows are skipped. All categories referenced by the file are
    /// resolved in one batch, creating those that don't exist yet, and every
    /// transaction is persisted in one batch. The file is only removed once
    /// the import has been committed. Failing to remove it is logged but does
    /// not fail the import.
    ///
    /// # Arguments
    ///
    /// * `path` - The location of the CSV file to import.
    ///
    /// # Returns
    ///
    /// The persisted transactions, in the order they appear in the file.
    pub async fn import_transactions(
        &self,
        path: &Path,
    ) -> Result<Vec<Transaction>, ImportTransactionsError> {
        let rows = import::read_rows(path).await?;

        let transactions = if rows.is_empty() {
            debug!(?path, "Import file has no valid rows.");

            vec![]
        } else {
            let mut unit_of_work = self.ledger_repo.begin_unit_of_work().await?;

            if self.enforce_import_balance {
                let mut balance = unit_of_work.balance().await?;

                for row in &rows {
                    balance.check(row.details.kind(), row.details.value())?;
                    balance.record(row.details.kind(), row.details.value())?;
                }
            }

            let categories = resolve_categories(
                unit_of_work.as_mut(),
                rows.iter().map(|row| row.category.as_str()),
            )
            .await?;

            let new_transactions = rows
                .into_iter()
                .map(|row| {
                    let category = categories
                        .get(&row.category)
                        .cloned()
                        .with_context(|| format!("Category {:?} was not resolved.", row.category))?;

                    Ok(row.details.categorize(category))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;

            let transactions = unit_of_work.persist_transactions(new_transactions).await?;
            unit_of_work.commit().await?;

            transactions
        };

        if let Err(error) = tokio::fs::remove_file(path).await {
            warn!(?path, %error, "Failed to remove import file.");
        }

        info!(count = transactions.len(), "Imported transactions.");

        Ok(transactions)
    }
}

/// Look up a category by title, creating it if it doesn't exist.
async fn find_or_create_category(
    unit_of_work: &mut dyn UnitOfWork,
    title: &str,
) -> anyhow::Result<Category> {
    if let Some(category) = unit_of_work.find_category_by_title(title).await? {
        return Ok(category);
    }

    debug!(title, "Creating new category.");

    unit_of_work
        .persist_categories(vec![NewCategory::new(title)])
        .await?
        .pop()
        .context("No category was returned after persisting.")
}

/// Resolve every referenced category title to a persisted category, creating
/// the ones that don't exist yet in a single batch.
///
/// # Returns
///
/// A mapping of title to category containing exactly one entry per distinct
/// title in `titles`.
async fn resolve_categories<'a>(
    unit_of_work: &mut dyn UnitOfWork,
    titles: impl Iterator<Item = &'a str>,
) -> anyhow::Result<HashMap<String, Category>> {
    let mut seen_titles = HashSet::new();
    let unique_titles = titles
        .filter(|title| seen_titles.insert(*title))
        .map(str::to_owned)
        .collect::<Vec<_>>();

    let existing_categories = unit_of_work
        .find_categories_by_titles(&unique_titles)
        .await?;

    let missing_categories = {
        let existing_titles = existing_categories
            .iter()
            .map(|category| category.title.as_str())
            .collect::<HashSet<_>>();

        unique_titles
            .iter()
            .filter(|title| !existing_titles.contains(title.as_str()))
            .map(|title| NewCategory::new(title.as_str()))
            .collect::<Vec<_>>()
    };

    debug!(
        existing = existing_categories.len(),
        missing = missing_categories.len(),
        "Resolving import categories."
    );

    let new_categories = unit_of_work.persist_categories(missing_categories).await?;

    Ok(new_categories
        .into_iter()
        .chain(existing_categories)
        .map(|category| (category.title.clone(), category))
        .collect())
}
