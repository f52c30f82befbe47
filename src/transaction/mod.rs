//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - The store for saving, filtering and paging transactions
//! - The route handlers for the transaction endpoints

mod core;
mod handlers;
mod query;
mod store;

pub use core::{
    Transaction, TransactionBuilder, TransactionWithCategory, create_transaction,
    create_transaction_table, map_transaction_row, map_transaction_with_category_row,
};
pub use handlers::{
    create_transaction_endpoint, delete_transaction, get_transaction, get_transaction_periods,
    get_transactions, update_transaction,
};
pub use store::SQLiteTransactionStore;
