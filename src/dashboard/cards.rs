//! Card components for the dashboard.
//!
//! Provides cards showing:
//! - The balance, income and expenses of the month
//! - The credit card invoices due soon
//! - Expenses grouped by category
//! - Progress towards the emergency fund goal

use std::collections::HashMap;

use maud::{Markup, html};
use rust_decimal::Decimal;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    accounting::Invoice,
    emergency_fund::EmergencyFund,
    endpoints,
    html::{CARD_STYLE, LINK_STYLE, format_currency},
    transaction::{Category, Transaction, TransactionType},
};

const DUE_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[month repr:short] [day padding:none], [year]");

/// The figures shown at the top of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct MonthSummary {
    /// The balance at the end of the month, including earlier months.
    pub balance: Decimal,
    pub income: Decimal,
    pub debit_expense: Decimal,
    /// The credit card spending of the month.
    pub credit_expense: Decimal,
}

fn summary_card(label: &str, amount: Decimal, id: &str, class: &str) -> Markup {
    html! {
        div class=(CARD_STYLE) id=(id)
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
            p class={ "text-2xl font-bold tabular-nums " (class) } { (format_currency(amount)) }
        }
    }
}

pub(super) fn summary_cards_view(summary: &MonthSummary) -> Markup {
    let balance_class = if summary.balance < Decimal::ZERO {
        "text-red-700 dark:text-red-300"
    } else {
        ""
    };

    html! {
        section class="w-full grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4"
        {
            (summary_card("Balance", summary.balance, "balance", balance_class))
            (summary_card(
                "Income",
                summary.income,
                "income",
                "text-green-700 dark:text-green-300",
            ))
            (summary_card(
                "Expenses",
                summary.debit_expense,
                "debit-expense",
                "text-red-700 dark:text-red-300",
            ))
            (summary_card(
                "Credit card",
                summary.credit_expense,
                "credit-expense",
                "text-orange-700 dark:text-orange-300",
            ))
        }
    }
}

/// The credit card invoices with the due date formatted like "Apr 10, 2025".
pub(super) fn invoices_card(invoices: &[Invoice]) -> Markup {
    html! {
        div class=(CARD_STYLE) id="invoices"
        {
            h3 class="text-lg font-semibold mb-2" { "Credit Card Invoices" }

            @if invoices.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400" { "No credit card spending due." }
            } @else {
                ul class="divide-y divide-gray-200 dark:divide-gray-700"
                {
                    @for invoice in invoices {
                        li class="flex justify-between py-2" data-invoice
                        {
                            span
                            {
                                "Due "
                                time datetime=(invoice.due_date) { (format_due_date(invoice.due_date)) }
                            }
                            span class="tabular-nums" { (format_currency(invoice.total)) }
                        }
                    }
                }
            }
        }
    }
}

fn format_due_date(date: Date) -> String {
    date.format(DUE_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// The total expenses of each category, largest first.
///
/// Includes credit card expenses, the category shows what the money was
/// spent on regardless of how it was paid.
pub(super) fn expenses_by_category(transactions: &[Transaction]) -> Vec<(Category, Decimal)> {
    let mut totals: HashMap<Category, Decimal> = HashMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.transaction_type == TransactionType::Expense)
    {
        *totals.entry(transaction.category).or_default() += transaction.amount;
    }

    let mut totals: Vec<_> = totals.into_iter().collect();
    totals.sort_by(|(a_category, a_total), (b_category, b_total)| {
        b_total
            .cmp(a_total)
            .then_with(|| a_category.label().cmp(b_category.label()))
    });
    totals
}

pub(super) fn category_card(transactions: &[Transaction]) -> Markup {
    let totals = expenses_by_category(transactions);
    let total: Decimal = totals.iter().map(|(_, amount)| *amount).sum();

    html! {
        div class=(CARD_STYLE) id="expenses-by-category"
        {
            h3 class="text-lg font-semibold mb-2" { "Expenses by Category" }

            @if totals.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400" { "No expenses this month." }
            } @else {
                ul class="space-y-2"
                {
                    @for (category, amount) in &totals {
                        @let percent = (*amount / total * Decimal::ONE_HUNDRED).round_dp(0);
                        li data-category=(category.as_str())
                        {
                            div class="flex justify-between text-sm"
                            {
                                span { (category.label()) }
                                span class="tabular-nums" { (format_currency(*amount)) }
                            }
                            div class="w-full h-2 rounded-full bg-gray-200 dark:bg-gray-700"
                            {
                                div
                                    class="h-2 rounded-full bg-blue-600"
                                    style={ "width: " (percent) "%" }
                                {}
                            }
                        }
                    }
                }
            }
        }
    }
}

pub(super) fn emergency_fund_card(fund: &EmergencyFund) -> Markup {
    let progress = fund.progress_percent();

    html! {
        div class=(CARD_STYLE) id="emergency-fund"
        {
            div class="flex justify-between items-baseline mb-2"
            {
                h3 class="text-lg font-semibold" { "Emergency Fund" }
                a href=(endpoints::EMERGENCY_FUND_VIEW) class=(LINK_STYLE) { "Details" }
            }

            p class="tabular-nums"
            {
                (format_currency(fund.current_amount)) " of " (format_currency(fund.goal_amount))
            }

            div class="w-full h-3 mt-2 rounded-full bg-gray-200 dark:bg-gray-700"
            {
                div class="h-3 rounded-full bg-green-600" style={ "width: " (progress) "%" } {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        accounting::Invoice,
        transaction::{Category, PaymentMethod, Transaction, TransactionType},
    };

    use super::{expenses_by_category, invoices_card};

    fn expense(amount: i64, category: Category, payment_method: PaymentMethod) -> Transaction {
        Transaction {
            id: format!("{category}-{amount}"),
            amount: Decimal::new(amount, 0),
            description: "test".to_owned(),
            date: date!(2025 - 03 - 10),
            transaction_type: TransactionType::Expense,
            category,
            payment_method,
            is_recurring: false,
            recurrence_day: None,
        }
    }

    #[test]
    fn expenses_by_category_includes_credit_and_sorts_largest_first() {
        let transactions = vec![
            expense(10, Category::Food, PaymentMethod::Debit),
            expense(50, Category::Housing, PaymentMethod::Debit),
            expense(45, Category::Food, PaymentMethod::Credit),
            Transaction {
                transaction_type: TransactionType::Income,
                ..expense(1000, Category::Salary, PaymentMethod::Debit)
            },
        ];

        let totals = expenses_by_category(&transactions);

        assert_eq!(
            totals,
            vec![
                (Category::Food, Decimal::new(55, 0)),
                (Category::Housing, Decimal::new(50, 0)),
            ]
        );
    }

    #[test]
    fn invoices_card_lists_due_dates() {
        let invoices = [Invoice {
            due_date: date!(2025 - 04 - 10),
            total: Decimal::new(4599, 2),
        }];

        let html = Html::parse_fragment(&invoices_card(&invoices).into_string());

        let item = html
            .select(&Selector::parse("li[data-invoice]").unwrap())
            .next()
            .expect("No invoice found");
        let text = item.text().collect::<String>();
        assert!(text.contains("Apr 10, 2025"), "got {text:?}");
        assert!(text.contains("$45.99"), "got {text:?}");
    }
}
