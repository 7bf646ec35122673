//! Categories for grouping transactions, and the endpoints for managing them.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod options_endpoint;

pub use core::{
    Category, CategoryId, create_category_table, get_categories, get_category,
    seed_built_in_categories,
};
pub use create_endpoint::create_category_endpoint;
pub use delete_endpoint::delete_category_endpoint;
pub use edit_endpoint::edit_category_endpoint;
pub use options_endpoint::{category_options, get_category_options};

#[cfg(test)]
pub use core::{BUILT_IN_CATEGORIES, CategoryName, create_category};
