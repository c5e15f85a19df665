//! The emergency fund: a savings goal tracked separately from the transactions.

mod core;
mod handlers;
mod page;

pub use core::{
    EmergencyFund, EmergencyFundUpdate, create_emergency_fund_table,
    get_emergency_fund, update_emergency_fund,
};
pub use handlers::{contribute_endpoint, update_emergency_fund_endpoint};
pub use page::get_emergency_fund_page;
