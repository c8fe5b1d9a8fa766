//! Async services shared by front ends

mod database;

pub use database::{DatabaseService, TableSummary};
