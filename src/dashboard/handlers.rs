//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    accounting::{
        Invoice, balance_as_of, invoices, total_credit_expense, total_debit_expense, total_income,
    },
    dashboard::cards::{
        MonthSummary, category_card, emergency_fund_card, invoices_card, summary_cards_view,
    },
    emergency_fund::{EmergencyFund, get_emergency_fund},
    endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base, link},
    month::{Month, MonthQuery, month_selector},
    navigation::NavBar,
    transaction::{Transaction, TransactionFilter, list_transactions, transactions_table},
};

/// How many of the month's transactions to show on the dashboard.
const RECENT_TRANSACTION_COUNT: usize = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions and the emergency fund.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData<'a> {
    month: Month,
    summary: MonthSummary,
    invoices: Vec<Invoice>,
    month_transactions: &'a [Transaction],
    fund: EmergencyFund,
}

/// Display a page with an overview of the user's finances for a month.
///
/// Defaults to the current month when the query string has no month.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Query(query): Query<MonthQuery>,
) -> Result<Response, Error> {
    let month = query.resolve(&state.local_timezone)?;
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    let (transactions, fund) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let transactions =
            list_transactions(&TransactionFilter::until(month.last_day()), &connection)
                .inspect_err(|error| {
                    tracing::error!("could not get transactions up to {month}: {error}")
                })
                .unwrap_or_default();
        let fund = get_emergency_fund(&connection)
            .inspect_err(|error| tracing::error!("could not get the emergency fund: {error}"))
            .unwrap_or_default();

        (transactions, fund)
    };

    if transactions.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar, month).into_response());
    }

    // Transactions are ordered newest first, so the month is a prefix.
    let month_start = transactions
        .iter()
        .position(|transaction| transaction.date < month.first_day())
        .unwrap_or(transactions.len());
    let month_transactions = &transactions[..month_start];

    let data = DashboardData {
        month,
        summary: MonthSummary {
            balance: balance_as_of(&transactions, month.last_day()),
            income: total_income(month_transactions),
            debit_expense: total_debit_expense(month_transactions),
            credit_expense: total_credit_expense(month_transactions),
        },
        invoices: invoices(&transactions)
            .into_iter()
            .filter(|invoice| invoice.due_date >= month.first_day())
            .collect(),
        month_transactions,
        fund,
    };

    Ok(dashboard_view(nav_bar, &data).into_response())
}

/// Renders the dashboard page when there are no transactions up to the selected month.
fn dashboard_no_data_view(nav_bar: NavBar, month: Month) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "create a transaction");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center gap-4 px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            (month_selector(endpoints::DASHBOARD_VIEW, month))

            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Your balance and invoices will show up here once you "
                (new_transaction_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn dashboard_view(nav_bar: NavBar, data: &DashboardData) -> Markup {
    let nav_bar = nav_bar.into_html();
    let recent_transactions = &data.month_transactions
        [..data.month_transactions.len().min(RECENT_TRANSACTION_COUNT)];
    let month_transactions_url = format!(
        "{}?month={}",
        endpoints::TRANSACTIONS_VIEW,
        data.month
    );

    let content = html!(
        (nav_bar)

        main id="dashboard-content" class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-center gap-2"
                {
                    h1 class="text-xl font-bold" { "Dashboard" }
                    (month_selector(endpoints::DASHBOARD_VIEW, data.month))
                }

                (summary_cards_view(&data.summary))

                div class="grid grid-cols-1 lg:grid-cols-3 gap-4"
                {
                    (invoices_card(&data.invoices))
                    (category_card(data.month_transactions))
                    (emergency_fund_card(&data.fund))
                }

                section id="recent-transactions" class="rounded bg-gray-50 dark:bg-gray-800 overflow-hidden"
                {
                    div class="flex justify-between items-baseline px-6 pt-4"
                    {
                        h3 class="text-lg font-semibold" { "Recent Transactions" }
                        a href=(month_transactions_url) class=(LINK_STYLE) { "View all" }
                    }

                    (transactions_table(recent_transactions, false))
                }
            }
        }
    );

    base("Dashboard", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rust_decimal::Decimal;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        month::MonthQuery,
        test_utils::{
            assert_status_ok, assert_valid_html, get_test_connection, parse_html_document,
        },
        transaction::{PaymentMethod, Transaction, TransactionType, create_transaction},
    };

    use super::{DashboardState, get_dashboard_page};

    fn query(month: &str) -> Query<MonthQuery> {
        Query(MonthQuery {
            month: Some(month.to_owned()),
        })
    }

    fn state_with(transactions: Vec<crate::transaction::TransactionBuilder>) -> DashboardState {
        let conn = get_test_connection();
        for transaction in transactions {
            create_transaction(transaction, &conn).unwrap();
        }

        DashboardState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[track_caller]
    fn card_amount(document: &Html, id: &str) -> String {
        let selector = Selector::parse(&format!("#{id} p:nth-child(2)")).unwrap();
        document
            .select(&selector)
            .next()
            .unwrap_or_else(|| panic!("No card with id {id}"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[tokio::test]
    async fn shows_balance_and_month_totals() {
        let state = state_with(vec![
            Transaction::build(Decimal::new(100, 0), date!(2025 - 02 - 01), "Old salary")
                .transaction_type(TransactionType::Income),
            Transaction::build(Decimal::new(300, 0), date!(2025 - 03 - 01), "Salary")
                .transaction_type(TransactionType::Income),
            Transaction::build(Decimal::new(120, 0), date!(2025 - 03 - 05), "Rent"),
            Transaction::build(Decimal::new(4599, 2), date!(2025 - 03 - 10), "Dinner")
                .payment_method(PaymentMethod::Credit),
            Transaction::build(Decimal::new(500, 0), date!(2025 - 04 - 02), "Next month"),
        ]);

        let response = get_dashboard_page(State(state), query("2025-03"))
            .await
            .unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        assert_eq!(card_amount(&document, "balance"), "$280.00");
        assert_eq!(card_amount(&document, "income"), "$300.00");
        assert_eq!(card_amount(&document, "debit-expense"), "$120.00");
        assert_eq!(card_amount(&document, "credit-expense"), "$45.99");

        let invoice_text: Vec<String> = document
            .select(&Selector::parse("li[data-invoice]").unwrap())
            .map(|item| item.text().collect())
            .collect();
        assert_eq!(invoice_text.len(), 1);
        assert!(invoice_text[0].contains("Apr 10, 2025"), "got {invoice_text:?}");
    }

    #[tokio::test]
    async fn shows_at_most_five_recent_transactions() {
        let state = state_with(
            (1..=7u8)
                .map(|day| {
                    Transaction::build(
                        Decimal::ONE,
                        date!(2025 - 03 - 01).replace_day(day).unwrap(),
                        &format!("Day {day}"),
                    )
                })
                .collect(),
        );

        let response = get_dashboard_page(State(state), query("2025-03"))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        let descriptions: Vec<String> = document
            .select(
                &Selector::parse("#recent-transactions tr[data-transaction-row] td:nth-child(2)")
                    .unwrap(),
            )
            .map(|cell| cell.text().collect::<String>().trim().to_owned())
            .collect();
        assert_eq!(descriptions, ["Day 7", "Day 6", "Day 5", "Day 4", "Day 3"]);
    }

    #[tokio::test]
    async fn shows_no_data_view_without_transactions() {
        let state = state_with(vec![]);

        let response = get_dashboard_page(State(state), query("2025-03"))
            .await
            .unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let has_heading = document
            .select(&Selector::parse("h2").unwrap())
            .any(|heading| heading.text().collect::<String>().trim() == "Nothing here yet...");
        assert!(has_heading, "No empty dashboard heading found");
    }

    #[tokio::test]
    async fn invalid_month_is_bad_request() {
        let state = state_with(vec![]);

        let response = get_dashboard_page(State(state), query("March"))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn last_representable_month_is_bad_request() {
        let state = state_with(vec![]);

        let response = get_dashboard_page(State(state), query("9999-12"))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
