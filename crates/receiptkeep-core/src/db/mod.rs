//! Database layer for receiptkeep

mod connection;
mod event;
pub mod migrations;
mod tables;

pub use connection::Database;
pub use event::{OperationFamily, TableEvent, WriteAction};
pub use migrations::{CURRENT_VERSION, DATABASE_VERSION_WITH_UUIDS};
pub use tables::{
    CategoryTable, ColumnTable, DistanceTable, PaymentMethodTable, ReceiptTable, Table, TripTable,
};
