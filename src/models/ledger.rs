use std::convert::TryFrom;

use anyhow::Context;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::ledger::domain;

/// A category row.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for domain::categories::Category {
    fn from(model: Category) -> Self {
        Self {
            id: model.id,
            title: model.title,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A transaction row without its category.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub title: String,
    pub value: Decimal,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Convert the row into a domain object, attaching the category the row
    /// references.
    pub fn try_into_domain(
        self,
        category: domain::categories::Category,
    ) -> anyhow::Result<domain::transactions::Transaction> {
        anyhow::ensure!(
            category.id == self.category_id,
            "Transaction {} references category {} but was given category {}.",
            self.id,
            self.category_id,
            category.id
        );

        Ok(domain::transactions::Transaction {
            id: self.id,
            title: self.title,
            value: self.value,
            kind: self
                .kind
                .parse()
                .with_context(|| format!("Transaction {} has an invalid type.", self.id))?,
            category,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// A transaction row joined with the category it references.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct TransactionWithCategory {
    pub id: Uuid,
    pub title: String,
    pub value: Decimal,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category_title: String,
    pub category_created_at: DateTime<Utc>,
    pub category_updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionWithCategory> for domain::transactions::Transaction {
    type Error = anyhow::Error;

    fn try_from(model: TransactionWithCategory) -> Result<Self, Self::Error> {
        let category = domain::categories::Category {
            id: model.category_id,
            title: model.category_title,
            created_at: model.category_created_at,
            updated_at: model.category_updated_at,
        };

        Transaction {
            id: model.id,
            title: model.title,
            value: model.value,
            kind: model.kind,
            category_id: model.category_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
        .try_into_domain(category)
    }
}

/// Sums of transaction values grouped by type.
#[derive(Clone, Copy, Debug, sqlx::FromRow)]
pub struct Balance {
    pub income: Decimal,
    pub outcome: Decimal,
}

impl From<Balance> for domain::balance::Balance {
    fn from(model: Balance) -> Self {
        Self::new(model.income, model.outcome)
    }
}
