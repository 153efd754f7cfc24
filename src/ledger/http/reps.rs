use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::ledger::{
    domain::{self, transactions::TransactionType},
    services,
};

#[derive(Clone, Debug, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&domain::categories::Category> for Category {
    fn from(category: &domain::categories::Category) -> Self {
        Self {
            id: category.id,
            title: category.title.clone(),
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub title: String,
    pub value: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: Category,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&domain::transactions::Transaction> for Transaction {
    fn from(transaction: &domain::transactions::Transaction) -> Self {
        Self {
            id: transaction.id,
            title: transaction.title.clone(),
            value: transaction.value,
            kind: transaction.kind,
            category: (&transaction.category).into(),
            created_at: transaction.created_at,
            updated_at: transaction.updated_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Balance {
    pub income: Decimal,
    pub outcome: Decimal,
    pub total: Decimal,
}

impl From<&domain::balance::Balance> for Balance {
    fn from(balance: &domain::balance::Balance) -> Self {
        Self {
            income: balance.income(),
            outcome: balance.outcome(),
            total: balance.total(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Ledger {
    pub transactions: Vec<Transaction>,
    pub balance: Balance,
}

impl From<&services::Ledger> for Ledger {
    fn from(ledger: &services::Ledger) -> Self {
        Self {
            transactions: ledger.transactions.iter().map(Into::into).collect(),
            balance: (&ledger.balance).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serialize_transaction() -> anyhow::Result<()> {
        let now = Utc::now();
        let category = domain::categories::Category {
            id: Uuid::new_v4(),
            title: "Food".to_owned(),
            created_at: now,
            updated_at: now,
        };
        let transaction = domain::transactions::Transaction {
            id: Uuid::new_v4(),
            title: "Coffee".to_owned(),
            value: Decimal::new(450, 2),
            kind: TransactionType::Outcome,
            category,
            created_at: now,
            updated_at: now,
        };

        let rep = serde_json::to_value(Transaction::from(&transaction))?;

        assert_eq!(json!("outcome"), rep["type"]);
        assert_eq!(json!("4.50"), rep["value"]);
        assert_eq!(json!("Food"), rep["category"]["title"]);

        Ok(())
    }

    #[test]
    fn serialize_balance_includes_total() -> anyhow::Result<()> {
        let balance = domain::balance::Balance::new(Decimal::new(1000, 0), Decimal::new(500, 0));

        let rep = serde_json::to_value(Balance::from(&balance))?;

        assert_eq!(
            json!({"income": "1000", "outcome": "500", "total": "500"}),
            rep
        );

        Ok(())
    }
}
