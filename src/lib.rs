//! A web app for tracking personal finances.
//!
//! Users record income and expense transactions, see their balance and open
//! credit card invoice for a month, follow their daily cash flow, keep track
//! of an emergency fund and ask an AI assistant questions about their
//! transactions.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use rust_decimal::Decimal;
use time::Date;
use tokio::signal;

mod accounting;
mod alert;
mod app_state;
mod assistant;
mod cash_flow;
mod dashboard;
mod db;
mod emergency_fund;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod month;
mod navigation;
mod not_found;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use accounting::balance_as_of;
pub use app_state::AppState;
pub use assistant::{AssistantConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiClient};
pub use db::initialize as initialize_db;
pub use emergency_fund::{EmergencyFundUpdate, update_emergency_fund};
pub use logging::logging_middleware;
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use transaction::{
    Category, PaymentMethod, Transaction, TransactionBuilder, TransactionFilter, TransactionType,
    count_transactions, create_transaction, delete_all_transactions, list_transactions,
};

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response, transaction::MAX_AMOUNT,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// A month filter could not be parsed, it should look like "2025-03".
    #[error("invalid month \"{0}\", expected YYYY-MM")]
    InvalidMonth(String),

    /// Amounts are stored as magnitudes, the direction comes from the transaction type.
    #[error("{0} is negative, amounts must be zero or greater")]
    NegativeAmount(Decimal),

    /// Amounts are capped at [MAX_AMOUNT] so that totals over many of them stay
    /// within the range of [Decimal].
    #[error("{0} is larger than the maximum amount of {max}", max = MAX_AMOUNT)]
    AmountTooLarge(Decimal),

    /// A transaction date is in the last month that can be represented, so
    /// the month after it cannot be shown.
    #[error("{0} is too far in the future")]
    DateOutOfRange(Date),

    /// A transaction was submitted without a description.
    #[error("the description cannot be empty")]
    EmptyDescription,

    /// The day of the month for a recurring transaction must be between 1 and 31.
    #[error("{0} is not a valid day of the month")]
    InvalidRecurrenceDay(u8),

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// A question for the assistant was empty.
    #[error("the message cannot be empty")]
    EmptyMessage,

    /// The assistant was used without an API key for the language model.
    #[error("API Key not configured")]
    AssistantNotConfigured,

    /// The language model could not generate a response.
    ///
    /// The string holds the underlying cause and should only be logged.
    #[error("Failed to generate response: {0}")]
    AssistantRequestFailed(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::InvalidMonth(month) => (
                StatusCode::BAD_REQUEST,
                InternalServerError {
                    description: "Invalid month",
                    fix: &format!("\"{month}\" is not a month, use the format YYYY-MM."),
                }
                .into_html(),
            )
                .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => Alert::error(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            )
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
            Error::NegativeAmount(amount) => Alert::error(
                "Invalid amount",
                &format!(
                    "{amount} is negative. Enter the amount as a positive number and \
                    choose income or expense instead."
                ),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::AmountTooLarge(amount) => Alert::error(
                "Invalid amount",
                &format!("{amount} is too large, enter an amount of at most {MAX_AMOUNT}."),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::DateOutOfRange(date) => Alert::error(
                "Invalid date",
                &format!("{date} is too far in the future, choose an earlier date."),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::EmptyDescription => Alert::error(
                "Missing description",
                "Enter a description for the transaction.",
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::InvalidRecurrenceDay(day) => Alert::error(
                "Invalid recurrence day",
                &format!("{day} is not a day of the month, choose a day from 1 to 31."),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::EmptyMessage => Alert::error(
                "Missing question",
                "Type a question for the assistant before sending.",
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::UpdateMissingTransaction => Alert::error(
                "Could not update transaction",
                "The transaction could not be found.",
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::DeleteMissingTransaction => Alert::error(
                "Could not delete transaction",
                "The transaction could not be found. \
                Try refreshing the page to see if the transaction has already been deleted.",
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            _ => Alert::error(
                "Something went wrong",
                "An unexpected error occurred, check the server logs for more details.",
            )
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}
