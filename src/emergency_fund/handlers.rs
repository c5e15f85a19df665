//! The endpoints for adding money to the emergency fund and changing its goal.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    emergency_fund::core::{EmergencyFundUpdate, contribute, update_emergency_fund},
};

/// The state needed to change the emergency fund.
#[derive(Debug, Clone)]
pub struct EmergencyFundState {
    /// The database connection for managing the emergency fund.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EmergencyFundState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for adding money to the emergency fund.
#[derive(Debug, Deserialize)]
pub struct ContributionForm {
    /// How much money to add.
    pub amount: Decimal,
}

fn redirect_to_emergency_fund_view() -> Response {
    (
        HxRedirect(endpoints::EMERGENCY_FUND_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// A route handler for adding money to the emergency fund, redirects to the
/// emergency fund view on success.
pub async fn contribute_endpoint(
    State(state): State<EmergencyFundState>,
    Form(form): Form<ContributionForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match contribute(form.amount, &connection) {
        Ok(fund) => {
            tracing::info!(
                "added {} to the emergency fund, now at {}",
                form.amount,
                fund.current_amount
            );
            redirect_to_emergency_fund_view()
        }
        Err(error) => {
            tracing::error!("could not add to the emergency fund: {error}");
            error.into_alert_response()
        }
    }
}

/// A route handler for changing the goal, monthly contribution or current
/// amount of the emergency fund, redirects to the emergency fund view on success.
pub async fn update_emergency_fund_endpoint(
    State(state): State<EmergencyFundState>,
    Form(update): Form<EmergencyFundUpdate>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_emergency_fund(update, &connection) {
        Ok(_) => redirect_to_emergency_fund_view(),
        Err(error) => {
            tracing::error!("could not update the emergency fund: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rust_decimal::Decimal;

    use crate::{
        emergency_fund::core::{EmergencyFundUpdate, contribute, get_emergency_fund},
        test_utils::{assert_hx_redirect, get_test_connection},
        transaction::MAX_AMOUNT,
    };

    use super::{
        ContributionForm, EmergencyFundState, contribute_endpoint, update_emergency_fund_endpoint,
    };

    fn get_test_state() -> EmergencyFundState {
        EmergencyFundState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        }
    }

    #[tokio::test]
    async fn contribution_increases_current_amount() {
        let state = get_test_state();

        let response = contribute_endpoint(
            State(state.clone()),
            Form(ContributionForm {
                amount: Decimal::new(12550, 2),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, "/emergency-fund");
        let connection = state.db_connection.lock().unwrap();
        let fund = get_emergency_fund(&connection).unwrap();
        assert_eq!(fund.current_amount, Decimal::new(12550, 2));
    }

    #[tokio::test]
    async fn negative_contribution_is_bad_request() {
        let state = get_test_state();

        let response = contribute_endpoint(
            State(state),
            Form(ContributionForm {
                amount: Decimal::new(-10, 0),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn contribution_past_maximum_is_bad_request() {
        let state = get_test_state();
        let huge = Decimal::from_str("50000000000000000000000000000").unwrap();
        {
            let connection = state.db_connection.lock().unwrap();
            contribute(MAX_AMOUNT, &connection).unwrap();
        }

        let response = contribute_endpoint(
            State(state.clone()),
            Form(ContributionForm { amount: huge }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = contribute_endpoint(
            State(state.clone()),
            Form(ContributionForm {
                amount: Decimal::ONE,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        let fund = get_emergency_fund(&connection).unwrap();
        assert_eq!(fund.current_amount, MAX_AMOUNT);
    }

    #[tokio::test]
    async fn update_changes_goal() {
        let state = get_test_state();

        let response = update_emergency_fund_endpoint(
            State(state.clone()),
            Form(EmergencyFundUpdate {
                goal_amount: Some(Decimal::new(6000, 0)),
                monthly_contribution: Some(Decimal::new(250, 0)),
                ..Default::default()
            }),
        )
        .await;

        assert_hx_redirect(&response, "/emergency-fund");
        let connection = state.db_connection.lock().unwrap();
        let fund = get_emergency_fund(&connection).unwrap();
        assert_eq!(fund.goal_amount, Decimal::new(6000, 0));
        assert_eq!(fund.monthly_contribution, Decimal::new(250, 0));
        assert_eq!(fund.current_amount, Decimal::ZERO);
    }
}
