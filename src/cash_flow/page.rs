//! The page showing how the balance moves day by day over a month.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, Duration};

use crate::{
    AppState, Error,
    accounting::{DailyTotals, balance_as_of, daily_series, running_balances},
    cash_flow::charts::{
        CashFlowChart, ECHARTS_SCRIPT_URL, balance_chart, charts_script, charts_view,
        daily_flow_chart,
    },
    endpoints,
    html::{
        CARD_STYLE, HeadElement, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, format_currency,
    },
    month::{Month, MonthQuery, month_selector},
    navigation::NavBar,
    timezone::local_today,
    transaction::{TransactionFilter, list_transactions},
};

/// The state needed for the cash flow page.
#[derive(Debug, Clone)]
pub struct CashFlowState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CashFlowState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The figures shown on the cash flow page for one month.
#[derive(Debug, Clone, PartialEq)]
struct CashFlow {
    month: Month,
    today: Date,
    /// The balance including every transaction up to and including today.
    available_today: Decimal,
    /// The balance at the end of the day before the month starts.
    opening_balance: Decimal,
    series: Vec<DailyTotals>,
    /// The balance at the end of each day in `series`.
    balances: Vec<Decimal>,
}

impl CashFlow {
    fn closing_balance(&self) -> Decimal {
        self.balances
            .last()
            .copied()
            .unwrap_or(self.opening_balance)
    }
}

/// Display the daily income, expenses and running balance of the month in
/// the query string.
///
/// If the transactions cannot be loaded the page shows a month without any
/// transactions.
pub async fn get_cash_flow_page(
    State(state): State<CashFlowState>,
    Query(query): Query<MonthQuery>,
) -> Result<Response, Error> {
    let month = query.resolve(&state.local_timezone)?;
    let today = local_today(&state.local_timezone)?;

    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        list_transactions(
            &TransactionFilter::until(month.last_day().max(today)),
            &connection,
        )
        .inspect_err(|error| tracing::error!("could not get transactions for {month}: {error}"))
        .unwrap_or_default()
    };

    let opening_balance = balance_as_of(&transactions, month.first_day() - Duration::days(1));
    let series = daily_series(&transactions, month.first_day(), month.last_day());
    let balances = running_balances(opening_balance, &series);

    let cash_flow = CashFlow {
        month,
        today,
        available_today: balance_as_of(&transactions, today),
        opening_balance,
        series,
        balances,
    };

    Ok(cash_flow_view(&cash_flow).into_response())
}

fn balance_card(label: &str, amount: Decimal, id: &str) -> Markup {
    let class = if amount < Decimal::ZERO {
        "text-red-700 dark:text-red-300"
    } else {
        ""
    };

    html! {
        div class=(CARD_STYLE) id=(id)
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
            p class={ "text-2xl font-bold tabular-nums " (class) } { (format_currency(amount)) }
        }
    }
}

fn daily_table(cash_flow: &CashFlow) -> Markup {
    html! {
        div class="w-full overflow-x-auto"
        {
            table class="w-full my-2 text-sm text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class={ (TABLE_CELL_STYLE) " text-left" } { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Income" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Expenses" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Credit card" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Net" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Balance" }
                    }
                }

                tbody
                {
                    @for (day, balance) in cash_flow.series.iter().zip(&cash_flow.balances) {
                        @let is_today = day.date == cash_flow.today;
                        @let today_class = if is_today {
                            " font-semibold text-gray-900 dark:text-white"
                        } else {
                            ""
                        };
                        tr
                            class={ (TABLE_ROW_STYLE) (today_class) }
                            data-day=(day.date)
                            aria-current=[is_today.then_some("date")]
                        {
                            td class={ (TABLE_CELL_STYLE) " text-left" }
                            {
                                time datetime=(day.date) { (day.date) }
                            }
                            td class={ (TABLE_CELL_STYLE) " tabular-nums" } { (format_currency(day.income)) }
                            td class={ (TABLE_CELL_STYLE) " tabular-nums" } { (format_currency(day.debit_expense)) }
                            td class={ (TABLE_CELL_STYLE) " tabular-nums" } { (format_currency(day.credit_expense)) }
                            td class={ (TABLE_CELL_STYLE) " tabular-nums" } { (format_currency(day.net())) }
                            td class={ (TABLE_CELL_STYLE) " tabular-nums" } data-balance { (format_currency(*balance)) }
                        }
                    }
                }
            }
        }
    }
}

fn cash_flow_view(cash_flow: &CashFlow) -> Markup {
    let nav_bar = NavBar::new(endpoints::CASH_FLOW_VIEW).into_html();
    let charts = [
        CashFlowChart {
            id: "balance-chart",
            options: balance_chart(&cash_flow.series, &cash_flow.balances).to_string(),
        },
        CashFlowChart {
            id: "daily-flow-chart",
            options: daily_flow_chart(&cash_flow.series).to_string(),
        },
    ];

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-center gap-2"
                {
                    h1 class="text-xl font-bold" { "Cash Flow" }
                    (month_selector(endpoints::CASH_FLOW_VIEW, cash_flow.month))
                }

                section class="grid grid-cols-1 sm:grid-cols-3 gap-4"
                {
                    (balance_card("Available today", cash_flow.available_today, "available-today"))
                    (balance_card("Opening balance", cash_flow.opening_balance, "opening-balance"))
                    (balance_card("Closing balance", cash_flow.closing_balance(), "closing-balance"))
                }

                (charts_view(&charts))

                section class="rounded bg-gray-50 dark:bg-gray-800 overflow-hidden"
                {
                    (daily_table(cash_flow))
                }
            }
        }
    };

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT_URL.to_owned()),
        charts_script(&charts),
    ];

    base("Cash Flow", &scripts, &content)
}
