use rust_decimal::Decimal;
use thiserror::Error;

use super::transactions::{Transaction, TransactionType};

/// Sums of all income and outcome transactions. The balance is never stored,
/// it is derived from the persisted transactions whenever it is needed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Balance {
    income: Decimal,
    outcome: Decimal,
}

/// An outcome transaction was larger than the available balance.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("insufficient balance: {requested} requested but only {available} available")]
pub struct InsufficientBalance {
    pub requested: Decimal,
    pub available: Decimal,
}

/// Recording a transaction would make a sum larger than a [`Decimal`] can hold.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("balance cannot record another {kind} of {value}")]
pub struct BalanceOverflow {
    pub kind: TransactionType,
    pub value: Decimal,
}

impl Balance {
    pub fn new(income: Decimal, outcome: Decimal) -> Self {
        Self { income, outcome }
    }

    pub fn from_transactions<'a>(
        transactions: impl IntoIterator<Item = &'a Transaction>,
    ) -> Result<Self, BalanceOverflow> {
        transactions
            .into_iter()
            .try_fold(Self::default(), |mut balance, transaction| {
                balance.record(transaction.kind, transaction.value)?;
                Ok(balance)
            })
    }

    pub fn income(&self) -> Decimal {
        self.income
    }

    pub fn outcome(&self) -> Decimal {
        self.outcome
    }

    pub fn total(&self) -> Decimal {
        self.income - self.outcome
    }

    /// Add a transaction's value to the matching sum. The balance is left
    /// unchanged if the sum would overflow.
    pub fn record(&mut self, kind: TransactionType, value: Decimal) -> Result<(), BalanceOverflow> {
        let sum = match kind {
            TransactionType::Income => &mut self.income,
            TransactionType::Outcome => &mut self.outcome,
        };

        *sum = sum
            .checked_add(value)
            .ok_or(BalanceOverflow { kind, value })?;

        Ok(())
    }

    /// Check that a transaction can be recorded without the total going below
    /// zero. Income is always accepted.
    pub fn check(&self, kind: TransactionType, value: Decimal) -> Result<(), InsufficientBalance> {
        match kind {
            TransactionType::Outcome if value > self.total() => Err(InsufficientBalance {
                requested: value,
                available: self.total(),
            }),
            _ => Ok(()),
        }
    }
}
