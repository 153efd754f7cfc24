//! Storage seams for the ledger.
//!
//! Services never talk to the database directly. Reads that only need a
//! snapshot go through [`LedgerRepo`], while anything that writes opens a
//! [`UnitOfWork`] so that every read and write of one operation happens in a
//! single database transaction.

mod categories;
#[cfg(test)]
pub mod memory;
mod postgres;
mod transactions;

use std::sync::Arc;

use async_trait::async_trait;

use crate::ledger::domain::{balance::Balance, transactions::Transaction};

pub use categories::CategoryStore;
pub use postgres::PostgresUnitOfWork;
pub use transactions::TransactionStore;

pub type DynLedgerRepo = Arc<dyn LedgerRepo + Send + Sync>;

/// A scoped set of reads and writes against the ledger.
///
/// Changes only become visible to others once [`Self::commit()`] is called.
/// Dropping a unit of work without committing discards its changes.
#[async_trait]
pub trait UnitOfWork: CategoryStore + TransactionStore + Send {
    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
}

#[async_trait]
pub trait LedgerRepo {
    /// Start a new unit of work.
    async fn begin_unit_of_work(&self) -> anyhow::Result<Box<dyn UnitOfWork>>;

    /// List every persisted transaction in the order they were inserted.
    async fn list_transactions(&self) -> anyhow::Result<Vec<Transaction>>;

    /// Compute the balance over every persisted transaction.
    async fn balance(&self) -> anyhow::Result<Balance>;
}
