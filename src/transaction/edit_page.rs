//! Defines the route handler for the page for editing a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, loading_spinner},
    navigation::NavBar,
    transaction::{
        Transaction, TransactionId,
        core::get_transaction,
        form::{TransactionFormDefaults, transaction_form_fields},
    },
};

fn edit_transaction_view(transaction: &Transaction) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_TRANSACTION_VIEW).into_html();
    let spinner = loading_spinner();
    let update_endpoint = format_endpoint(endpoints::TRANSACTION, &transaction.id);
    let fields = transaction_form_fields(&TransactionFormDefaults::from_transaction(transaction));

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_endpoint)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Transaction" }

                (fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Update Transaction"
                }
            }
        }
    };

    base("Edit Transaction", &[], &content)
}

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    /// The database connection for accessing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing a transaction.
///
/// Responds with the 404 page if the transaction does not exist.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionPageState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let transaction = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transaction(&transaction_id, &connection).inspect_err(|error| {
            tracing::error!("Failed to retrieve transaction {transaction_id}: {error}")
        })?
    };

    Ok(edit_transaction_view(&transaction).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_status_ok,
            assert_valid_html, get_test_connection, must_get_form, parse_html_document,
        },
        transaction::{
            Transaction, create_transaction,
            edit_page::{EditTransactionPageState, get_edit_transaction_page},
        },
    };

    #[tokio::test]
    async fn edit_page_shows_current_values() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            Transaction::build(Decimal::new(4250, 2), date!(2025 - 05 - 02), "Pharmacy"),
            &conn,
        )
        .unwrap();
        let state = EditTransactionPageState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = get_edit_transaction_page(State(state), Path(transaction.id.clone()))
            .await
            .unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::TRANSACTION, &transaction.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "amount", "number", "42.50");
        assert_form_input_with_value(&form, "date", "date", "2025-05-02");
        assert_form_input_with_value(&form, "description", "text", "Pharmacy");
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let state = EditTransactionPageState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        };

        let response = get_edit_transaction_page(State(state), Path("missing".to_owned()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
