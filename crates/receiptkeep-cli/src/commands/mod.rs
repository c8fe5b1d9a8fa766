pub mod common;
pub mod config;
pub mod export;
pub mod import;
pub mod summary;
