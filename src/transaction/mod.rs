//! Income and expense transactions.
//!
//! This module contains everything related to transactions:
//! - The `TransactionRecord` model and the database functions for it
//! - The filter engine that narrows a list of transactions by text and date
//! - The pages and endpoints for listing, adding and deleting transactions

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod filter;
mod form;
mod transactions_page;
mod view;

pub use core::{
    NewTransaction, TransactionId, TransactionKind, TransactionRecord, TransactionRow,
    create_transaction_table, format_date_key, get_transaction_rows, user_owns_image,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::{get_add_transaction_page, transaction_form};
pub use delete_endpoint::delete_transaction_endpoint;
pub use filter::{FilterCriteria, TransactionListState};
pub use form::{UploadedImage, read_transaction_multipart};
pub use transactions_page::get_transactions_page;
pub use view::transaction_table;

#[cfg(test)]
pub use core::create_transaction;

#[cfg(test)]
pub mod test_utils;
