//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    month::Month,
    transaction::{core::create_transaction, form::TransactionForm},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new transaction.
///
/// Redirects to the transactions view for the month of the new transaction on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let month = Month::containing(form.date);
    let builder = form.into_builder();

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let transaction = match create_transaction(builder, &connection) {
        Ok(transaction) => transaction,
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            return error.into_alert_response();
        }
    };

    tracing::info!("created transaction {}", transaction.id);

    (
        HxRedirect(format!("{}?month={month}", endpoints::TRANSACTIONS_VIEW)),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode, response::IntoResponse};
    use axum_extra::extract::Form;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        test_utils::{assert_hx_redirect, get_test_connection},
        transaction::{
            Category, PaymentMethod, TransactionFilter, TransactionType,
            create_endpoint::{CreateTransactionState, create_transaction_endpoint},
            form::TransactionForm,
            list_transactions,
        },
    };

    fn get_test_state() -> CreateTransactionState {
        CreateTransactionState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        }
    }

    fn form(amount: Decimal, description: &str) -> TransactionForm {
        TransactionForm {
            transaction_type: TransactionType::Expense,
            amount,
            date: date!(2025 - 03 - 14),
            description: description.to_owned(),
            category: Category::Food,
            payment_method: Some(PaymentMethod::Credit),
            is_recurring: None,
            recurrence_day: None,
        }
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let state = get_test_state();

        let response = create_transaction_endpoint(
            State(state.clone()),
            Form(form(Decimal::new(1230, 2), "test transaction")),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, "/transactions?month=2025-03");

        let connection = state.db_connection.lock().unwrap();
        let transactions = list_transactions(&TransactionFilter::default(), &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, Decimal::new(1230, 2));
        assert_eq!(transactions[0].description, "test transaction");
        assert_eq!(transactions[0].payment_method, PaymentMethod::Credit);
    }

    #[tokio::test]
    async fn rejects_empty_description() {
        let state = get_test_state();

        let response =
            create_transaction_endpoint(State(state.clone()), Form(form(Decimal::ONE, "  ")))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let connection = state.db_connection.lock().unwrap();
        let transactions = list_transactions(&TransactionFilter::default(), &connection).unwrap();
        assert!(transactions.is_empty());
    }

    #[tokio::test]
    async fn rejects_negative_amount() {
        let state = get_test_state();

        let response = create_transaction_endpoint(
            State(state),
            Form(form(Decimal::new(-5, 0), "refund")),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
