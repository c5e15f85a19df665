//! The page listing the transactions of a month.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    accounting::{total_credit_expense, total_debit_expense, total_income},
    endpoints,
    html::{CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_currency},
    month::{Month, MonthQuery, month_selector},
    navigation::NavBar,
    transaction::{
        Transaction, TransactionFilter, core::list_transactions, view::transactions_table,
    },
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

fn summary_item(label: &str, amount: String, class: &str) -> Markup {
    html! {
        div class="flex flex-col"
        {
            span class="text-xs uppercase text-gray-500 dark:text-gray-400" { (label) }
            span class={ "text-lg font-semibold tabular-nums " (class) } { (amount) }
        }
    }
}

fn transactions_view(month: Month, transactions: &[Transaction]) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl" id="transactions-content"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Create Transaction"
                    }
                }

                div class="flex justify-center" { (month_selector(endpoints::TRANSACTIONS_VIEW, month)) }

                div class={ (CARD_STYLE) " grid grid-cols-3 gap-4" }
                {
                    (summary_item(
                        "Income",
                        format_currency(total_income(transactions)),
                        "text-green-700 dark:text-green-300",
                    ))
                    (summary_item(
                        "Expenses",
                        format_currency(total_debit_expense(transactions)),
                        "text-red-700 dark:text-red-300",
                    ))
                    (summary_item(
                        "Credit card",
                        format_currency(total_credit_expense(transactions)),
                        "text-orange-700 dark:text-orange-300",
                    ))
                }

                section class="rounded bg-gray-50 dark:bg-gray-800 overflow-hidden"
                {
                    (transactions_table(transactions, true))
                }
            }
        }
    };

    base("Transactions", &[], &content)
}

/// Render the transactions of the month in the query string, newest first.
///
/// If the transactions cannot be loaded the page shows an empty list.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Query(query): Query<MonthQuery>,
) -> Result<Response, Error> {
    let month = query.resolve(&state.local_timezone)?;

    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        list_transactions(
            &TransactionFilter::between(month.first_day(), month.last_day()),
            &connection,
        )
        .inspect_err(|error| tracing::error!("could not list transactions for {month}: {error}"))
        .unwrap_or_default()
    };

    Ok(transactions_view(month, &transactions).into_response())
}
