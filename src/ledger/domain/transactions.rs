use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::categories::Category;

/// Transaction values must be strictly smaller than this. Keeping single
/// values bounded keeps every sum of them representable as a [`Decimal`].
pub const VALUE_LIMIT: u64 = 10_000_000_000_000_000;

/// The direction of a transaction. Income increases the balance and outcome
/// decreases it.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Outcome,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Outcome => "outcome",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown transaction type: {0:?}")]
pub struct UnknownTransactionType(pub String);

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "outcome" => Ok(Self::Outcome),
            other => Err(UnknownTransactionType(other.to_owned())),
        }
    }
}

/// Data for a new transaction provided by a user.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewTransactionData {
    /// A short description of the transaction.
    pub title: String,

    /// The magnitude of the transaction. The sign is given by `kind`.
    pub value: Decimal,

    /// Whether the transaction is income or outcome.
    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// The title of the category to file the transaction under. The category
    /// is created if it does not exist yet.
    pub category: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidTransaction {
    #[error("transaction title cannot be empty")]
    EmptyTitle,

    #[error("transaction value cannot be negative, got {0}")]
    NegativeValue(Decimal),

    #[error("transaction value must be less than {limit}, got {0}", limit = VALUE_LIMIT)]
    ValueTooLarge(Decimal),
}

/// The validated details of a transaction that has not been filed under a
/// category yet. This may only be constructed with [`Self::new()`], which
/// rejects blank titles, negative values and values of [`VALUE_LIMIT`] or
/// more.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionDetails {
    title: String,
    value: Decimal,
    kind: TransactionType,
}

impl TransactionDetails {
    /// Validate the details of a new transaction.
    ///
    /// # Arguments
    /// * `title` - A short description of the transaction. Must not be blank.
    /// * `value` - The magnitude of the transaction. Must not be negative and
    ///   must be less than [`VALUE_LIMIT`].
    /// * `kind` - Whether the transaction is income or outcome.
    pub fn new(
        title: impl Into<String>,
        value: Decimal,
        kind: TransactionType,
    ) -> Result<Self, InvalidTransaction> {
        let title = title.into();

        if title.trim().is_empty() {
            return Err(InvalidTransaction::EmptyTitle);
        }

        if value < Decimal::ZERO {
            return Err(InvalidTransaction::NegativeValue(value));
        }

        if value >= Decimal::from(VALUE_LIMIT) {
            return Err(InvalidTransaction::ValueTooLarge(value));
        }

        Ok(Self { title, value, kind })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    /// File the transaction under a persisted category, producing a
    /// transaction that is ready to be persisted.
    pub fn categorize(self, category: Category) -> NewTransaction {
        NewTransaction {
            id: Uuid::new_v4(),
            details: self,
            category,
        }
    }
}

impl TryFrom<&NewTransactionData> for TransactionDetails {
    type Error = InvalidTransaction;

    fn try_from(data: &NewTransactionData) -> Result<Self, Self::Error> {
        Self::new(data.title.clone(), data.value, data.kind)
    }
}

/// A transaction that has been filed under a category but not persisted yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTransaction {
    id: Uuid,
    details: TransactionDetails,
    category: Category,
}

impl NewTransaction {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        self.details.title()
    }

    pub fn value(&self) -> Decimal {
        self.details.value()
    }

    pub fn kind(&self) -> TransactionType {
        self.details.kind()
    }

    pub fn category(&self) -> &Category {
        &self.category
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub title: String,
    pub value: Decimal,
    pub kind: TransactionType,
    pub category: Category,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
