use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{Executor, Postgres, QueryBuilder};
use tracing::{info, trace};

use crate::{
    ledger::domain::{
        balance::Balance,
        transactions::{NewTransaction, Transaction},
    },
    models,
};

use super::PostgresUnitOfWork;

/// Advisory lock taken by units of work that read the balance.
const BALANCE_LOCK_KEY: i64 = 0x6c65_6467_6572;

#[async_trait]
pub trait TransactionStore {
    /// Compute the balance over every transaction visible to the store.
    ///
    /// Stores that can be written concurrently lock the balance until the
    /// store is done, so that two writers checking the balance can't both
    /// spend the same money.
    async fn balance(&mut self) -> anyhow::Result<Balance>;

    /// Persist a batch of new transactions. The categories they reference
    /// must already be persisted.
    ///
    /// # Returns
    ///
    /// The persisted transactions in the same order as `transactions`.
    async fn persist_transactions(
        &mut self,
        transactions: Vec<NewTransaction>,
    ) -> anyhow::Result<Vec<Transaction>>;
}

pub(super) async fn query_balance<'e, E>(executor: E) -> anyhow::Result<Balance>
where
    E: Executor<'e, Database = Postgres>,
{
    trace!("Computing balance.");

    let balance = sqlx::query_as::<_, models::ledger::Balance>(
        r#"
        SELECT
            COALESCE(SUM(value) FILTER (WHERE "type" = 'income'), 0) AS income,
            COALESCE(SUM(value) FILTER (WHERE "type" = 'outcome'), 0) AS outcome
        FROM "transaction"
        "#,
    )
    .fetch_one(executor)
    .await?;

    Ok(balance.into())
}

pub(super) async fn query_transactions<'e, E>(executor: E) -> anyhow::Result<Vec<Transaction>>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, models::ledger::TransactionWithCategory>(
        r#"
        SELECT
            t.id, t.title, t.value, t."type", t.category_id, t.created_at, t.updated_at,
            c.title AS category_title,
            c.created_at AS category_created_at,
            c.updated_at AS category_updated_at
        FROM "transaction" t
            JOIN category c ON c.id = t.category_id
        ORDER BY t.insertion_order
        "#,
    )
    .fetch_all(executor)
    .await?
    .into_iter()
    .map(Transaction::try_from)
    .collect()
}

#[async_trait]
impl TransactionStore for PostgresUnitOfWork {
    async fn balance(&mut self) -> anyhow::Result<Balance> {
        // Released when the transaction commits or rolls back.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(BALANCE_LOCK_KEY)
            .execute(&mut self.0)
            .await?;

        query_balance(&mut self.0).await
    }

    async fn persist_transactions(
        &mut self,
        transactions: Vec<NewTransaction>,
    ) -> anyhow::Result<Vec<Transaction>> {
        if transactions.is_empty() {
            return Ok(vec![]);
        }

        let mut query_builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            r#"INSERT INTO "transaction" (id, title, value, "type", category_id) "#,
        );

        query_builder.push_values(&transactions, |mut b, transaction| {
            b.push_bind(transaction.id())
                .push_bind(transaction.title().to_owned())
                .push_bind(transaction.value())
                .push_bind(transaction.kind().as_str())
                .push_bind(transaction.category().id);
        });

        query_builder.push(
            r#"
            RETURNING id, title, value, "type", category_id, created_at, updated_at
            "#,
        );

        let mut persisted = query_builder
            .build_query_as::<models::ledger::Transaction>()
            .fetch_all(&mut self.0)
            .await?
            .into_iter()
            .map(|model| (model.id, model))
            .collect::<HashMap<_, _>>();

        info!(count = persisted.len(), "Persisted transactions.");

        transactions
            .into_iter()
            .map(|transaction| {
                persisted
                    .remove(&transaction.id())
                    .with_context(|| {
                        format!(
                            "Transaction {} was not returned after insert.",
                            transaction.id()
                        )
                    })?
                    .try_into_domain(transaction.category().clone())
            })
            .collect()
    }
}
