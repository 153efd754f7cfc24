//! An in-memory ledger for exercising services without a database.

use std::sync::{Arc, Mutex};

use anyhow::bail;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::ledger::domain::{
    balance::Balance,
    categories::{Category, NewCategory},
    transactions::{NewTransaction, Transaction},
};

use super::{CategoryStore, LedgerRepo, TransactionStore, UnitOfWork};

#[derive(Clone, Default)]
struct LedgerState {
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
}

/// A ledger that keeps everything in memory. Units of work operate on a copy
/// of the state, which replaces the shared state on commit.
///
/// Reading the balance in a unit of work takes a lock that is held until the
/// unit of work is committed or dropped, and refreshes its copy of the state.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    state: Arc<Mutex<LedgerState>>,
    balance_lock: Arc<AsyncMutex<()>>,
    fail_transaction_writes: bool,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger whose units of work fail whenever transactions are persisted.
    pub fn failing_transaction_writes() -> Self {
        Self {
            fail_transaction_writes: true,
            ..Self::default()
        }
    }

    pub fn categories(&self) -> Vec<Category> {
        self.state.lock().unwrap().categories.clone()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.state.lock().unwrap().transactions.clone()
    }
}

pub struct InMemoryUnitOfWork {
    shared: Arc<Mutex<LedgerState>>,
    working: LedgerState,
    balance_lock: Arc<AsyncMutex<()>>,
    balance_guard: Option<OwnedMutexGuard<()>>,
    fail_transaction_writes: bool,
}

#[async_trait]
impl LedgerRepo for InMemoryLedger {
    async fn begin_unit_of_work(&self) -> anyhow::Result<Box<dyn UnitOfWork>> {
        let working = self.state.lock().unwrap().clone();

        Ok(Box::new(InMemoryUnitOfWork {
            shared: self.state.clone(),
            working,
            balance_lock: self.balance_lock.clone(),
            balance_guard: None,
            fail_transaction_writes: self.fail_transaction_writes,
        }))
    }

    async fn list_transactions(&self) -> anyhow::Result<Vec<Transaction>> {
        Ok(self.transactions())
    }

    async fn balance(&self) -> anyhow::Result<Balance> {
        Ok(Balance::from_transactions(&self.transactions())?)
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let InMemoryUnitOfWork {
            shared,
            working,
            balance_guard,
            ..
        } = *self;
        *shared.lock().unwrap() = working;
        drop(balance_guard);

        Ok(())
    }
}

#[async_trait]
impl CategoryStore for InMemoryUnitOfWork {
    async fn find_category_by_title(&mut self, title: &str) -> anyhow::Result<Option<Category>> {
        Ok(self
            .working
            .categories
            .iter()
            .find(|category| category.title == title)
            .cloned())
    }

    async fn find_categories_by_titles(
        &mut self,
        titles: &[String],
    ) -> anyhow::Result<Vec<Category>> {
        Ok(self
            .working
            .categories
            .iter()
            .filter(|category| titles.contains(&category.title))
            .cloned()
            .collect())
    }

    async fn persist_categories(
        &mut self,
        categories: Vec<NewCategory>,
    ) -> anyhow::Result<Vec<Category>> {
        let mut persisted = Vec::with_capacity(categories.len());

        for new_category in categories {
            let existing = self
                .working
                .categories
                .iter()
                .find(|category| category.title == new_category.title())
                .cloned();

            let category = match existing {
                Some(category) => category,
                None => {
                    let category = Category {
                        id: new_category.id(),
                        title: new_category.title().to_owned(),
                        created_at: Utc::now(),
                        updated_at: Utc::now(),
                    };
                    self.working.categories.push(category.clone());
                    category
                }
            };

            persisted.push(category);
        }

        Ok(persisted)
    }
}

#[async_trait]
impl TransactionStore for InMemoryUnitOfWork {
    async fn balance(&mut self) -> anyhow::Result<Balance> {
        if self.balance_guard.is_none() {
            self.balance_guard = Some(self.balance_lock.clone().lock_owned().await);
            self.working = self.shared.lock().unwrap().clone();
        }

        Ok(Balance::from_transactions(&self.working.transactions)?)
    }

    async fn persist_transactions(
        &mut self,
        transactions: Vec<NewTransaction>,
    ) -> anyhow::Result<Vec<Transaction>> {
        if self.fail_transaction_writes {
            bail!("Lost connection to the ledger.");
        }

        let persisted = transactions
            .into_iter()
            .map(|transaction| Transaction {
                id: transaction.id(),
                title: transaction.title().to_owned(),
                value: transaction.value(),
                kind: transaction.kind(),
                category: transaction.category().clone(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .collect::<Vec<_>>();

        self.working.transactions.extend(persisted.iter().cloned());

        Ok(persisted)
    }
}
