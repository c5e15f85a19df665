//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - View handlers for transaction-related web pages

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;
mod transactions_page;
mod view;

pub use core::{
    Category, MAX_AMOUNT, PaymentMethod, Transaction, TransactionBuilder, TransactionFilter, TransactionId,
    TransactionType, TransactionUpdate, count_transactions, create_transaction,
    create_transaction_table, delete_all_transactions, delete_transaction, get_transaction,
    list_transactions, update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_create_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use transactions_page::get_transactions_page;
pub use view::transactions_table;
