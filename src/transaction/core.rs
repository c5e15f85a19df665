//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::{Error, month::Month};

// ============================================================================
// MODELS
// ============================================================================

/// The largest amount a transaction or the emergency fund may hold, one
/// quadrillion.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// The opaque, unique identifier of a transaction.
pub type TransactionId = String;

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

/// How an expense was paid.
///
/// Credit expenses are deferred to the card invoice and do not reduce the
/// balance. Income is always recorded as [PaymentMethod::Debit].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Debit,
    Credit,
}

/// The fixed set of categories a transaction can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Transport,
    Housing,
    Utilities,
    Health,
    Entertainment,
    Salary,
    Freelance,
    Investment,
    Other,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Debit => "Debit",
            Self::Credit => "Credit",
        }
    }
}

impl Category {
    /// Every category in display order.
    pub const ALL: [Category; 10] = [
        Self::Food,
        Self::Transport,
        Self::Housing,
        Self::Utilities,
        Self::Health,
        Self::Entertainment,
        Self::Salary,
        Self::Freelance,
        Self::Investment,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Housing => "housing",
            Self::Utilities => "utilities",
            Self::Health => "health",
            Self::Entertainment => "entertainment",
            Self::Salary => "salary",
            Self::Freelance => "freelance",
            Self::Investment => "investment",
            Self::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Housing => "Housing",
            Self::Utilities => "Utilities",
            Self::Health => "Health",
            Self::Entertainment => "Entertainment",
            Self::Salary => "Salary",
            Self::Freelance => "Freelance",
            Self::Investment => "Investment",
            Self::Other => "Other",
        }
    }
}

/// The string could not be converted into one of the transaction enums.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value \"{0}\"")]
pub struct UnknownVariant(String);

impl FromStr for TransactionType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(UnknownVariant(other.to_owned())),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            other => Err(UnknownVariant(other.to_owned())),
        }
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_owned()))
    }
}

/// Stores the enums as their lowercase names in TEXT columns.
macro_rules! impl_text_column {
    ($type:ty) => {
        impl Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ToSql for $type {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $type {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|error| FromSqlError::Other(Box::new(error)))
            }
        }
    };
}

impl_text_column!(TransactionType);
impl_text_column!(PaymentMethod);
impl_text_column!(Category);

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// The amount is always a non-negative magnitude, the direction is given by
/// `transaction_type`. To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned in this transaction.
    pub amount: Decimal,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// What the money was earned or spent on.
    pub category: Category,
    /// How an expense was paid.
    pub payment_method: PaymentMethod,
    /// Whether the transaction repeats every month.
    pub is_recurring: bool,
    /// The day of the month a recurring transaction repeats on.
    pub recurrence_day: Option<u8>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(amount: Decimal, date: Date, description: &str) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            date,
            description: description.to_owned(),
            transaction_type: TransactionType::Expense,
            category: Category::Other,
            payment_method: PaymentMethod::Debit,
            recurrence_day: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// Defaults to a debit expense in the "other" category that does not recur.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The magnitude of the transaction, must not be negative.
    pub amount: Decimal,
    /// The date when the transaction occurred.
    pub date: Date,
    /// A human-readable description of the transaction.
    pub description: String,
    /// Whether money was earned or spent.
    pub transaction_type: TransactionType,
    /// The category of the transaction.
    pub category: Category,
    /// How an expense was paid. Ignored for income.
    pub payment_method: PaymentMethod,
    /// `Some(day)` marks the transaction as recurring on `day` of each month.
    pub recurrence_day: Option<u8>,
}

impl TransactionBuilder {
    /// Set the transaction type.
    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    /// Set the category.
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Set the payment method.
    pub fn payment_method(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = payment_method;
        self
    }

    /// Mark the transaction as recurring on `day` of each month.
    pub fn recurring(mut self, day: u8) -> Self {
        self.recurrence_day = Some(day);
        self
    }
}

/// The fields of a transaction to change, `None` leaves a field as it is.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionUpdate {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub date: Option<Date>,
    pub transaction_type: Option<TransactionType>,
    pub category: Option<Category>,
    pub payment_method: Option<PaymentMethod>,
    /// Setting this to `false` also clears the recurrence day.
    pub is_recurring: Option<bool>,
    pub recurrence_day: Option<u8>,
}

impl Transaction {
    fn apply(mut self, update: TransactionUpdate) -> Self {
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(transaction_type) = update.transaction_type {
            self.transaction_type = transaction_type;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(payment_method) = update.payment_method {
            self.payment_method = payment_method;
        }
        if let Some(is_recurring) = update.is_recurring {
            self.is_recurring = is_recurring;

            if !is_recurring {
                self.recurrence_day = None;
            }
        }
        if let Some(day) = update.recurrence_day {
            self.recurrence_day = Some(day);
        }

        self
    }

    /// Round the amount to cents, trim the description, force income to debit
    /// and default the recurrence day to the day of the transaction date.
    fn normalize(mut self) -> Self {
        self.amount = self.amount.round_dp(2);
        self.description = self.description.trim().to_owned();

        if self.transaction_type == TransactionType::Income {
            self.payment_method = PaymentMethod::Debit;
        }

        if self.recurrence_day.is_some() {
            self.is_recurring = true;
        }

        if self.is_recurring && self.recurrence_day.is_none() {
            self.recurrence_day = Some(self.date.day());
        }

        self
    }

    fn validate(&self) -> Result<(), Error> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(Error::NegativeAmount(self.amount));
        }

        if self.amount > MAX_AMOUNT {
            return Err(Error::AmountTooLarge(self.amount));
        }

        if !Month::containing(self.date).is_supported() {
            return Err(Error::DateOutOfRange(self.date));
        }

        if self.description.is_empty() {
            return Err(Error::EmptyDescription);
        }

        match self.recurrence_day {
            Some(day) if !(1..=31).contains(&day) => Err(Error::InvalidRecurrenceDay(day)),
            _ => Ok(()),
        }
    }
}

/// Which transactions to list.
///
/// Both ends of the date range are inclusive and optional.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TransactionFilter {
    /// The earliest date to include.
    pub start: Option<Date>,
    /// The latest date to include.
    pub end: Option<Date>,
    /// The maximum number of transactions to return.
    pub limit: Option<u32>,
}

impl TransactionFilter {
    /// Transactions dated from `start` to `end`, inclusive.
    pub fn between(start: Date, end: Date) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            limit: None,
        }
    }

    /// Transactions dated on or before `end`.
    pub fn until(end: Date) -> Self {
        Self {
            start: None,
            end: Some(end),
            limit: None,
        }
    }

    /// Return at most `limit` transactions.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_COLUMNS: &str = "id, amount, description, date, type, category, payment_method, \
    is_recurring, recurrence_day";

/// Create a new transaction in the database from a builder.
///
/// A new unique ID is generated for the transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is less than zero,
/// - [Error::AmountTooLarge] if the amount is more than [MAX_AMOUNT],
/// - [Error::DateOutOfRange] if the date is in December 9999,
/// - [Error::EmptyDescription] if the description is blank,
/// - [Error::InvalidRecurrenceDay] if the recurrence day is not between 1 and 31,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = Transaction {
        id: Uuid::new_v4().to_string(),
        amount: builder.amount,
        description: builder.description,
        date: builder.date,
        transaction_type: builder.transaction_type,
        category: builder.category,
        payment_method: builder.payment_method,
        is_recurring: builder.recurrence_day.is_some(),
        recurrence_day: builder.recurrence_day,
    }
    .normalize();

    transaction.validate()?;

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" ({SELECT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING {SELECT_COLUMNS}"
        ))?
        .query_row(
            (
                &transaction.id,
                transaction.amount.to_string(),
                &transaction.description,
                transaction.date,
                transaction.transaction_type,
                transaction.category,
                transaction.payment_method,
                transaction.is_recurring,
                transaction.recurrence_day,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: &str, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// List the transactions matching `filter`, newest first.
///
/// Transactions on the same date are ordered from the most recently created.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn list_transactions(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    // A negative limit means no limit in SQLite.
    let limit = filter.limit.map(i64::from).unwrap_or(-1);

    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM \"transaction\"
             WHERE (:start IS NULL OR date >= :start) AND (:end IS NULL OR date <= :end)
             ORDER BY date DESC, rowid DESC
             LIMIT :limit"
        ))?
        .query_map(
            rusqlite::named_params! {
                ":start": filter.start,
                ":end": filter.end,
                ":limit": limit,
            },
            map_transaction_row,
        )?
        .map(|row| row.map_err(Error::from))
        .collect()
}

/// Change the fields of the transaction `id` that are set in `update`.
///
/// The ID of the transaction never changes.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction,
/// - a validation error if the updated transaction is invalid,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: &str,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let existing = match get_transaction(id, connection) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Err(Error::UpdateMissingTransaction),
        Err(error) => return Err(error),
    };

    let transaction = existing.apply(update).normalize();
    transaction.validate()?;

    connection.execute(
        "UPDATE \"transaction\"
        SET \
            amount = ?1, \
            description = ?2, \
            date = ?3, \
            type = ?4, \
            category = ?5, \
            payment_method = ?6, \
            is_recurring = ?7, \
            recurrence_day = ?8 \
        WHERE id = ?9;",
        rusqlite::params![
            transaction.amount.to_string(),
            transaction.description,
            transaction.date,
            transaction.transaction_type,
            transaction.category,
            transaction.payment_method,
            transaction.is_recurring,
            transaction.recurrence_day,
            transaction.id,
        ],
    )?;

    Ok(transaction)
}

/// Delete the transaction `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(id: &str, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM \"transaction\" WHERE id = :id", &[(":id", &id)])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Delete every transaction and return how many were deleted.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn delete_all_transactions(connection: &Connection) -> Result<usize, Error> {
    connection
        .execute("DELETE FROM \"transaction\"", ())
        .map_err(Error::from)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id TEXT PRIMARY KEY NOT NULL,
                amount TEXT NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                category TEXT NOT NULL,
                payment_method TEXT NOT NULL CHECK (payment_method IN ('debit', 'credit')),
                is_recurring INTEGER NOT NULL DEFAULT 0,
                recurrence_day INTEGER CHECK (recurrence_day BETWEEN 1 AND 31)
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_amount: String = row.get(1)?;
    let amount = raw_amount
        .parse::<Decimal>()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(error)))?;
    let description = row.get(2)?;
    let date = row.get(3)?;
    let transaction_type = row.get(4)?;
    let category = row.get(5)?;
    let payment_method = row.get(6)?;
    let is_recurring = row.get(7)?;
    let recurrence_day = row.get(8)?;

    Ok(Transaction {
        id,
        amount,
        description,
        date,
        transaction_type,
        category,
        payment_method,
        is_recurring,
        recurrence_day,
    })
}

// ============================================================================
// TESTS
// ============================================================================
