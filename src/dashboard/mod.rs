//! Dashboard module
//!
//! Summarises one month of a user's transactions: the balance, income and expenses
//! compared against the month before, a six month trend, expenses by category, and a
//! prediction for next month based on recurring transactions.

mod breakdown;
mod comparison;
mod handlers;
mod models;
mod prediction;
mod service;
mod store;
mod trend;

pub use handlers::get_dashboard_endpoint;
pub use store::SQLiteDashboardStore;
