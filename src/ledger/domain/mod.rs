pub mod balance;
pub mod categories;
pub mod transactions;
