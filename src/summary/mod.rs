//! Totals and breakdowns of transactions, and the pages that show them.

mod aggregation;
mod charts;
mod home_page;
mod summary_page;

pub use aggregation::{OTHER_CATEGORY, Summary, summarize};
pub use home_page::get_home_page;
pub use summary_page::get_summary_page;
