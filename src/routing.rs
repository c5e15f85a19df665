//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    assistant::{chat_endpoint, get_assistant_page, post_message_endpoint},
    cash_flow::get_cash_flow_page,
    dashboard::get_dashboard_page,
    emergency_fund::{contribute_endpoint, get_emergency_fund_page, update_emergency_fund_endpoint},
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_create_transaction_page, get_edit_transaction_page, get_transactions_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_create_transaction_page),
        )
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::CASH_FLOW_VIEW, get(get_cash_flow_page))
        .route(endpoints::EMERGENCY_FUND_VIEW, get(get_emergency_fund_page))
        .route(endpoints::ASSISTANT_VIEW, get(get_assistant_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let api_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::EMERGENCY_FUND_API,
            put(update_emergency_fund_endpoint),
        )
        .route(
            endpoints::EMERGENCY_FUND_CONTRIBUTIONS,
            post(contribute_endpoint),
        )
        .route(endpoints::CHAT_API, post(chat_endpoint))
        .route(endpoints::ASSISTANT_MESSAGES, post(post_message_endpoint));

    page_routes
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
