//! Cash flow module
//!
//! Provides a page with the daily income, expenses and running balance of a month.

mod charts;
mod page;

pub use page::get_cash_flow_page;
