//! Row models for the tables backing the application.
//!
//! Models mirror the database schema. Repositories convert them into domain
//! objects before handing them to services.

pub mod ledger;
