//! A small bookkeeping API that records income and outcome transactions,
//! files them under categories and imports them in bulk from CSV files.

pub mod cli;
mod database;
mod http_err;
pub mod ledger;
mod models;
mod repos;
mod server;
