//! Defines the endpoint for updating a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    month::Month,
    transaction::{TransactionId, core::update_transaction, form::TransactionForm},
};

/// The state needed to update a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating a transaction.
///
/// Redirects to the transactions view for the month of the transaction on success.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let transaction = match update_transaction(&transaction_id, form.into_update(), &connection) {
        Ok(transaction) => transaction,
        Err(error) => {
            tracing::error!("could not update transaction {transaction_id}: {error}");
            return error.into_alert_response();
        }
    };

    (
        HxRedirect(format!(
            "{}?month={}",
            endpoints::TRANSACTIONS_VIEW,
            Month::containing(transaction.date)
        )),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        test_utils::{assert_hx_redirect, get_test_connection},
        transaction::{
            Category, PaymentMethod, Transaction, TransactionType, create_transaction,
            edit_endpoint::{EditTransactionState, edit_transaction_endpoint},
            form::TransactionForm,
            get_transaction,
        },
    };

    fn form() -> TransactionForm {
        TransactionForm {
            transaction_type: TransactionType::Income,
            amount: Decimal::new(300000, 2),
            date: date!(2025 - 04 - 05),
            description: "Salary".to_owned(),
            category: Category::Salary,
            payment_method: Some(PaymentMethod::Credit),
            is_recurring: Some(true),
            recurrence_day: Some(5),
        }
    }

    #[tokio::test]
    async fn updates_transaction_and_keeps_id() {
        let conn = get_test_connection();
        let original = create_transaction(
            Transaction::build(Decimal::ONE, date!(2025 - 03 - 30), "typo"),
            &conn,
        )
        .unwrap();
        let state = EditTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = edit_transaction_endpoint(
            State(state.clone()),
            Path(original.id.clone()),
            Form(form()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, "/transactions?month=2025-04");
        let connection = state.db_connection.lock().unwrap();
        let updated = get_transaction(&original.id, &connection).unwrap();
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.description, "Salary");
        assert_eq!(updated.transaction_type, TransactionType::Income);
        assert_eq!(updated.payment_method, PaymentMethod::Debit);
        assert_eq!(updated.recurrence_day, Some(5));
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let state = EditTransactionState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        };

        let response =
            edit_transaction_endpoint(State(state), Path("missing".to_owned()), Form(form()))
                .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
