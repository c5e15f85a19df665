use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{Html, IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    transaction::{TransactionId, core::delete_transaction},
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction.
///
/// Responds with an empty body so that HTMX removes the table row, or an
/// alert if the transaction could not be deleted.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(&transaction_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(()) => Html("").into_response(),
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        Error,
        test_utils::{assert_status_ok, get_test_connection},
        transaction::{
            Transaction, create_transaction,
            delete_endpoint::{DeleteTransactionState, delete_transaction_endpoint},
            get_transaction,
        },
    };

    #[tokio::test]
    async fn deletes_transaction() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            Transaction::build(Decimal::ONE, date!(2025 - 01 - 01), "Bus fare"),
            &conn,
        )
        .unwrap();
        let state = DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response =
            delete_transaction_endpoint(State(state.clone()), Path(transaction.id.clone())).await;

        assert_status_ok(&response);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_transaction(&transaction.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let state = DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        };

        let response = delete_transaction_endpoint(State(state), Path("missing".to_owned())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
