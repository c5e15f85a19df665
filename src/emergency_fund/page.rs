//! The page showing the progress of the emergency fund.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    emergency_fund::core::{EmergencyFund, get_emergency_fund},
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, format_currency, loading_spinner,
    },
    navigation::NavBar,
};

/// The state needed for the emergency fund page.
#[derive(Debug, Clone)]
pub struct EmergencyFundPageState {
    /// The database connection for reading the emergency fund.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EmergencyFundPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn months_to_goal_text(fund: &EmergencyFund) -> String {
    match fund.months_to_goal() {
        Some(0) => "Goal reached!".to_owned(),
        Some(1) => "1 month to go at your monthly contribution".to_owned(),
        Some(months) => format!("{months} months to go at your monthly contribution"),
        None => "Set a monthly contribution to estimate when you will reach your goal".to_owned(),
    }
}

fn amount_input(name: &str, label: &str, value: Option<String>, required: bool) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                name=(name)
                id=(name)
                type="number"
                step="0.01"
                min="0"
                placeholder="0.00"
                value=[value]
                required[required]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

fn emergency_fund_view(fund: &EmergencyFund) -> Markup {
    let nav_bar = NavBar::new(endpoints::EMERGENCY_FUND_VIEW).into_html();
    let progress = fund.progress_percent();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md space-y-6"
            {
                h1 class="text-xl font-bold" { "Emergency Fund" }

                div class=(CARD_STYLE) id="emergency-fund-progress"
                {
                    div class="flex justify-between items-end mb-2"
                    {
                        span class="text-2xl font-bold tabular-nums" data-current-amount
                        {
                            (format_currency(fund.current_amount))
                        }
                        span class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            "of " (format_currency(fund.goal_amount))
                        }
                    }

                    div
                        class="w-full h-3 rounded-full bg-gray-200 dark:bg-gray-700"
                        role="progressbar"
                        aria-valuemin="0"
                        aria-valuemax="100"
                        aria-valuenow=(progress)
                    {
                        div
                            class="h-3 rounded-full bg-green-600"
                            style={ "width: " (progress) "%" }
                        {}
                    }

                    p class="mt-2 text-sm" { (progress) "% saved, "
                        (format_currency(fund.remaining())) " to go" }
                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        (months_to_goal_text(fund))
                    }
                }

                form
                    hx-post=(endpoints::EMERGENCY_FUND_CONTRIBUTIONS)
                    hx-target-error="#alert-container"
                    class={ (CARD_STYLE) " space-y-4" }
                {
                    h2 class="text-lg font-semibold" { "Add Money" }

                    (amount_input("amount", "Amount", None, true))

                    button type="submit" class=(BUTTON_PRIMARY_STYLE)
                    {
                        span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                        " Add to Fund"
                    }
                }

                form
                    hx-put=(endpoints::EMERGENCY_FUND_API)
                    hx-target-error="#alert-container"
                    class={ (CARD_STYLE) " space-y-4" }
                {
                    h2 class="text-lg font-semibold" { "Settings" }

                    (amount_input(
                        "goal_amount",
                        "Goal",
                        Some(format!("{:.2}", fund.goal_amount)),
                        true,
                    ))
                    (amount_input(
                        "monthly_contribution",
                        "Monthly contribution",
                        Some(format!("{:.2}", fund.monthly_contribution)),
                        true,
                    ))
                    (amount_input(
                        "current_amount",
                        "Amount saved",
                        Some(format!("{:.2}", fund.current_amount)),
                        true,
                    ))

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }
                }
            }
        }
    };

    base("Emergency Fund", &[], &content)
}

/// Render the emergency fund page.
///
/// If the fund cannot be loaded the page shows the default fund.
pub async fn get_emergency_fund_page(
    State(state): State<EmergencyFundPageState>,
) -> Result<Response, Error> {
    let fund = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_emergency_fund(&connection)
            .inspect_err(|error| tracing::error!("could not get the emergency fund: {error}"))
            .unwrap_or_default()
    };

    Ok(emergency_fund_view(&fund).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rust_decimal::Decimal;
    use scraper::{Html, Selector};

    use crate::{
        emergency_fund::core::contribute,
        endpoints,
        test_utils::{
            assert_hx_endpoint, assert_status_ok, assert_valid_html, get_test_connection,
            parse_html_document,
        },
    };

    use super::{EmergencyFundPageState, get_emergency_fund_page};

    #[tokio::test]
    async fn shows_progress_and_forms() {
        let conn = get_test_connection();
        contribute(Decimal::new(2500, 0), &conn).unwrap();
        let state = EmergencyFundPageState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = get_emergency_fund_page(State(state)).await.unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        assert_progress(&document, "25.0");

        let forms: Vec<_> = document
            .select(&Selector::parse("form").unwrap())
            .collect();
        assert_eq!(forms.len(), 2);
        assert_hx_endpoint(&forms[0], endpoints::EMERGENCY_FUND_CONTRIBUTIONS, "hx-post");
        assert_hx_endpoint(&forms[1], endpoints::EMERGENCY_FUND_API, "hx-put");
    }

    #[tokio::test]
    async fn shows_defaults_for_new_database() {
        let state = EmergencyFundPageState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        };

        let response = get_emergency_fund_page(State(state)).await.unwrap();

        let document = parse_html_document(response).await;
        let current_amount = document
            .select(&Selector::parse("[data-current-amount]").unwrap())
            .next()
            .expect("No current amount found")
            .text()
            .collect::<String>();
        assert_eq!(current_amount.trim(), "$0.00");
    }

    #[track_caller]
    fn assert_progress(document: &Html, want: &str) {
        let progress = document
            .select(&Selector::parse("[role=progressbar]").unwrap())
            .next()
            .expect("No progress bar found");

        assert_eq!(progress.value().attr("aria-valuenow"), Some(want));
    }
}
