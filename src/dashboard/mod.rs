//! Dashboard module
//!
//! Provides an overview page summarizing the user's finances: totals, the
//! balance, expenses grouped by category, and the most recent transactions.

mod aggregation;
mod page;

pub use page::get_dashboard_page;
