//! Balance, invoice and cash flow figures derived from a list of transactions.
//!
//! Everything here is a pure function of the transactions it is given. The
//! balance only counts income and debit expenses, credit card expenses are
//! deferred to the card invoice that they are billed to.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use time::{Date, Duration, Month};

use crate::transaction::{PaymentMethod, Transaction, TransactionType};

/// Purchases on or after this day of the month are billed to next month's invoice.
const INVOICE_CLOSING_DAY: u8 = 4;
/// The day of the month a credit card invoice is due.
const INVOICE_DUE_DAY: u8 = 10;

/// Whether `transaction` is an expense paid with the credit card.
pub fn is_credit_card_expense(transaction: &Transaction) -> bool {
    transaction.transaction_type == TransactionType::Expense
        && transaction.payment_method == PaymentMethod::Credit
}

fn is_debit_expense(transaction: &Transaction) -> bool {
    transaction.transaction_type == TransactionType::Expense
        && transaction.payment_method == PaymentMethod::Debit
}

fn is_income(transaction: &Transaction) -> bool {
    transaction.transaction_type == TransactionType::Income
}

/// The sum of all income.
pub fn total_income(transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .filter(|transaction| is_income(transaction))
        .map(|transaction| transaction.amount)
        .sum()
}

/// The sum of all expenses paid by debit.
pub fn total_debit_expense(transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .filter(|transaction| is_debit_expense(transaction))
        .map(|transaction| transaction.amount)
        .sum()
}

/// The sum of all expenses paid by credit card, i.e. the open invoice for the
/// transactions given.
pub fn total_credit_expense(transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .filter(|transaction| is_credit_card_expense(transaction))
        .map(|transaction| transaction.amount)
        .sum()
}

/// Income minus debit expenses. Credit card expenses do not affect the balance.
pub fn balance(transactions: &[Transaction]) -> Decimal {
    total_income(transactions) - total_debit_expense(transactions)
}

/// The [balance] of the transactions dated on or before `date`.
pub fn balance_as_of(transactions: &[Transaction], date: Date) -> Decimal {
    transactions
        .iter()
        .filter(|transaction| transaction.date <= date)
        .map(|transaction| match transaction.transaction_type {
            TransactionType::Income => transaction.amount,
            TransactionType::Expense if transaction.payment_method == PaymentMethod::Debit => {
                -transaction.amount
            }
            TransactionType::Expense => Decimal::ZERO,
        })
        .sum()
}

/// The date the credit card invoice for a purchase made on `purchase_date` is due.
///
/// The card closes on the 4th: purchases before the 4th are billed to the
/// current month's invoice, purchases from the 4th onwards to next month's.
/// Invoices are due on the 10th. Returns `None` if the due date is past the
/// last date that can be represented.
pub fn invoice_due_date(purchase_date: Date) -> Option<Date> {
    let (year, month) = if purchase_date.day() >= INVOICE_CLOSING_DAY {
        match purchase_date.month() {
            Month::December => (purchase_date.year() + 1, Month::January),
            month => (purchase_date.year(), month.next()),
        }
    } else {
        (purchase_date.year(), purchase_date.month())
    };

    Date::from_calendar_date(year, month, INVOICE_DUE_DAY).ok()
}

/// The total of the credit card expenses billed to one invoice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Invoice {
    pub due_date: Date,
    pub total: Decimal,
}

/// Group the credit card expenses by the invoice they are billed to.
///
/// The invoices are sorted by due date, oldest first.
pub fn invoices(transactions: &[Transaction]) -> Vec<Invoice> {
    let mut totals: BTreeMap<Date, Decimal> = BTreeMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| is_credit_card_expense(transaction))
    {
        let Some(due_date) = invoice_due_date(transaction.date) else {
            continue;
        };

        *totals.entry(due_date).or_default() += transaction.amount;
    }

    totals
        .into_iter()
        .map(|(due_date, total)| Invoice { due_date, total })
        .collect()
}

/// The income and expenses of a single day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyTotals {
    pub date: Date,
    pub income: Decimal,
    pub debit_expense: Decimal,
    pub credit_expense: Decimal,
}

impl DailyTotals {
    fn zero(date: Date) -> Self {
        Self {
            date,
            income: Decimal::ZERO,
            debit_expense: Decimal::ZERO,
            credit_expense: Decimal::ZERO,
        }
    }

    /// How much the balance changed on this day.
    pub fn net(&self) -> Decimal {
        self.income - self.debit_expense
    }
}

/// The totals for every day from `start` to `end` inclusive, in ascending order.
///
/// Days without transactions are included with zero totals, and transactions
/// outside of the range are ignored. Returns an empty series if `end` is
/// before `start`.
pub fn daily_series(transactions: &[Transaction], start: Date, end: Date) -> Vec<DailyTotals> {
    if end < start {
        return Vec::new();
    }

    let day_count = (end - start).whole_days() as usize + 1;
    let mut series: Vec<DailyTotals> = (0..day_count)
        .map(|offset| DailyTotals::zero(start + Duration::days(offset as i64)))
        .collect();

    for transaction in transactions {
        if transaction.date < start || transaction.date > end {
            continue;
        }

        let index = (transaction.date - start).whole_days() as usize;
        let totals = &mut series[index];

        match (transaction.transaction_type, transaction.payment_method) {
            (TransactionType::Income, _) => totals.income += transaction.amount,
            (TransactionType::Expense, PaymentMethod::Debit) => {
                totals.debit_expense += transaction.amount
            }
            (TransactionType::Expense, PaymentMethod::Credit) => {
                totals.credit_expense += transaction.amount
            }
        }
    }

    series
}

/// The balance at the end of each day, starting from `opening_balance`.
pub fn running_balances(opening_balance: Decimal, series: &[DailyTotals]) -> Vec<Decimal> {
    series
        .iter()
        .scan(opening_balance, |balance, totals| {
            *balance += totals.net();
            Some(*balance)
        })
        .collect()
}
