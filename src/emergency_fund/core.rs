//! The emergency fund savings goal and its database queries.

use rusqlite::{Connection, Row, types::Type};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::{Error, transaction::MAX_AMOUNT};

/// The emergency fund is a single row, it always has this ID.
const EMERGENCY_FUND_ID: i64 = 1;

/// Progress towards saving up an emergency fund.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyFund {
    /// How much has been saved so far.
    pub current_amount: Decimal,
    /// How much should be saved.
    pub goal_amount: Decimal,
    /// How much the user plans to save each month.
    pub monthly_contribution: Decimal,
}

impl Default for EmergencyFund {
    fn default() -> Self {
        Self {
            current_amount: Decimal::ZERO,
            goal_amount: Decimal::new(10_000, 0),
            monthly_contribution: Decimal::new(500, 0),
        }
    }
}

impl EmergencyFund {
    /// How far along the fund is as a percentage from 0 to 100.
    ///
    /// A fund with no goal is complete.
    pub fn progress_percent(&self) -> Decimal {
        if self.goal_amount <= Decimal::ZERO {
            return Decimal::ONE_HUNDRED;
        }

        (self.current_amount / self.goal_amount * Decimal::ONE_HUNDRED)
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
            .round_dp(1)
    }

    /// How much is left to save to reach the goal.
    pub fn remaining(&self) -> Decimal {
        (self.goal_amount - self.current_amount).max(Decimal::ZERO)
    }

    /// How many monthly contributions are needed to reach the goal, `None`
    /// if the goal can never be reached because nothing is contributed.
    pub fn months_to_goal(&self) -> Option<u32> {
        let remaining = self.remaining();

        if remaining.is_zero() {
            return Some(0);
        }

        if self.monthly_contribution <= Decimal::ZERO {
            return None;
        }

        (remaining / self.monthly_contribution)
            .round_dp_with_strategy(0, RoundingStrategy::AwayFromZero)
            .to_u32()
    }
}

/// The parts of the emergency fund to change, `None` keeps the current value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Deserialize)]
pub struct EmergencyFundUpdate {
    #[serde(default)]
    pub current_amount: Option<Decimal>,
    #[serde(default)]
    pub goal_amount: Option<Decimal>,
    #[serde(default)]
    pub monthly_contribution: Option<Decimal>,
}

fn validate_amount(amount: Decimal) -> Result<Decimal, Error> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::NegativeAmount(amount));
    }

    if amount > MAX_AMOUNT {
        return Err(Error::AmountTooLarge(amount));
    }

    Ok(amount.round_dp(2))
}

/// Get the emergency fund, creating it with the default values if it does not exist yet.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_emergency_fund(connection: &Connection) -> Result<EmergencyFund, Error> {
    let default = EmergencyFund::default();

    connection.execute(
        "INSERT OR IGNORE INTO emergency_fund \
            (id, current_amount, goal_amount, monthly_contribution) \
        VALUES (?1, ?2, ?3, ?4)",
        (
            EMERGENCY_FUND_ID,
            default.current_amount.to_string(),
            default.goal_amount.to_string(),
            default.monthly_contribution.to_string(),
        ),
    )?;

    let fund = connection.query_row(
        "SELECT current_amount, goal_amount, monthly_contribution \
        FROM emergency_fund WHERE id = ?1",
        [EMERGENCY_FUND_ID],
        map_emergency_fund_row,
    )?;

    Ok(fund)
}

fn save_emergency_fund(fund: &EmergencyFund, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "UPDATE emergency_fund \
        SET current_amount = ?1, goal_amount = ?2, monthly_contribution = ?3 \
        WHERE id = ?4",
        (
            fund.current_amount.to_string(),
            fund.goal_amount.to_string(),
            fund.monthly_contribution.to_string(),
            EMERGENCY_FUND_ID,
        ),
    )?;

    Ok(())
}

/// Change the fields of the emergency fund that are set in `update`.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if any of the new amounts are negative,
/// - [Error::AmountTooLarge] if any of the new amounts are more than [MAX_AMOUNT],
/// - or [Error::SqlError] if there is some SQL error.
pub fn update_emergency_fund(
    update: EmergencyFundUpdate,
    connection: &Connection,
) -> Result<EmergencyFund, Error> {
    let mut fund = get_emergency_fund(connection)?;

    if let Some(current_amount) = update.current_amount {
        fund.current_amount = validate_amount(current_amount)?;
    }
    if let Some(goal_amount) = update.goal_amount {
        fund.goal_amount = validate_amount(goal_amount)?;
    }
    if let Some(monthly_contribution) = update.monthly_contribution {
        fund.monthly_contribution = validate_amount(monthly_contribution)?;
    }

    save_emergency_fund(&fund, connection)?;

    Ok(fund)
}

/// Add `amount` to the money saved in the emergency fund.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if `amount` is negative,
/// - [Error::AmountTooLarge] if the fund would hold more than [MAX_AMOUNT],
/// - or [Error::SqlError] if there is some SQL error.
pub fn contribute(amount: Decimal, connection: &Connection) -> Result<EmergencyFund, Error> {
    let amount = validate_amount(amount)?;
    let mut fund = get_emergency_fund(connection)?;

    fund.current_amount = fund
        .current_amount
        .checked_add(amount)
        .filter(|total| *total <= MAX_AMOUNT)
        .ok_or(Error::AmountTooLarge(amount))?;
    save_emergency_fund(&fund, connection)?;

    Ok(fund)
}

/// Create the emergency fund table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_emergency_fund_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS emergency_fund (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                current_amount TEXT NOT NULL,
                goal_amount TEXT NOT NULL,
                monthly_contribution TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

fn get_decimal(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let text: String = row.get(index)?;

    text.parse::<Decimal>().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}

fn map_emergency_fund_row(row: &Row) -> Result<EmergencyFund, rusqlite::Error> {
    Ok(EmergencyFund {
        current_amount: get_decimal(row, 0)?,
        goal_amount: get_decimal(row, 1)?,
        monthly_contribution: get_decimal(row, 2)?,
    })
}
