//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/transactions/{transaction_id}', use [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page with the month overview.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying the transactions of a month.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page with the daily cash flow of a month.
pub const CASH_FLOW_VIEW: &str = "/cash-flow";
/// The page for the emergency fund savings goal.
pub const EMERGENCY_FUND_VIEW: &str = "/emergency-fund";
/// The page for chatting with the AI assistant.
pub const ASSISTANT_VIEW: &str = "/assistant";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to update the emergency fund goal.
pub const EMERGENCY_FUND_API: &str = "/api/emergency-fund";
/// The route to add money to the emergency fund.
pub const EMERGENCY_FUND_CONTRIBUTIONS: &str = "/api/emergency-fund/contributions";
/// The JSON route that relays a question and its context to the language model.
pub const CHAT_API: &str = "/api/chat";
/// The route the chat page posts messages to.
pub const ASSISTANT_MESSAGES: &str = "/api/assistant/messages";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/transactions/{transaction_id}', '{transaction_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: &str) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
