//! Dashboard module
//!
//! Provides an overview page with the balance, invoices and spending of a month.

mod cards;
mod handlers;

pub use handlers::get_dashboard_page;
