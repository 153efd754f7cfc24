use async_trait::async_trait;
use sqlx::Postgres;
use tracing::debug;

use crate::{
    database::PostgresConnection,
    ledger::domain::{balance::Balance, transactions::Transaction},
};

use super::{transactions, LedgerRepo, UnitOfWork};

/// A unit of work backed by a Postgres transaction. If it is dropped before
/// being committed, the transaction is rolled back.
pub struct PostgresUnitOfWork(pub(super) sqlx::Transaction<'static, Postgres>);

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let unit_of_work = *self;
        unit_of_work.0.commit().await?;

        debug!("Committed unit of work.");

        Ok(())
    }
}

#[async_trait]
impl LedgerRepo for PostgresConnection {
    async fn begin_unit_of_work(&self) -> anyhow::Result<Box<dyn UnitOfWork>> {
        let tx = self.begin().await?;

        Ok(Box::new(PostgresUnitOfWork(tx)))
    }

    async fn list_transactions(&self) -> anyhow::Result<Vec<Transaction>> {
        transactions::query_transactions(&**self).await
    }

    async fn balance(&self) -> anyhow::Result<Balance> {
        transactions::query_balance(&**self).await
    }
}
