//! Transactions, the categories they are filed under, and the balance they
//! add up to.

pub mod domain;
pub mod http;
pub mod import;
pub mod services;
