//! Accounts that transactions are recorded against, and the endpoints for managing them.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;

pub use core::{
    Account, AccountId, DEFAULT_ACCOUNT_COLOR, NewAccount, create_account, create_account_table,
    get_account, get_accounts,
};
pub use create_endpoint::create_account_endpoint;
pub use delete_endpoint::delete_account_endpoint;
pub use edit_endpoint::edit_account_endpoint;
