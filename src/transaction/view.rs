//! HTML rendering for lists of transactions.

use maud::{Markup, html};
use rust_decimal::Decimal;

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        edit_delete_action_links, format_currency,
    },
    transaction::{PaymentMethod, Transaction, TransactionType},
};

/// The colour for an amount, expenses are red and income is green.
fn amount_class(transaction_type: TransactionType) -> &'static str {
    match transaction_type {
        TransactionType::Expense => "text-red-700 dark:text-red-300",
        TransactionType::Income => "text-green-700 dark:text-green-300",
    }
}

/// The amount with a sign showing which way the money went, e.g. "-$12.30".
pub fn signed_amount(transaction: &Transaction) -> String {
    match transaction.transaction_type {
        TransactionType::Income => format!("+{}", format_currency(transaction.amount)),
        TransactionType::Expense => format_currency(Decimal::ZERO - transaction.amount),
    }
}

fn payment_method_label(transaction: &Transaction) -> &'static str {
    match transaction.payment_method {
        PaymentMethod::Debit => "Debit",
        PaymentMethod::Credit => "Credit card",
    }
}

fn transaction_row_view(transaction: &Transaction, show_actions: bool) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, &transaction.id);
    let delete_url = format_endpoint(endpoints::TRANSACTION, &transaction.id);
    let confirm_message = format!(
        "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
        transaction.description
    );

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
        {
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(transaction.date) { (transaction.date) }
            }
            td class=(TABLE_CELL_STYLE)
            {
                (transaction.description)

                @if let Some(day) = transaction.recurrence_day {
                    " "
                    span class=(BADGE_STYLE) title={ "Repeats on day " (day) " of each month" }
                    {
                        "Monthly"
                    }
                }
            }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(BADGE_STYLE) { (transaction.category.label()) }
            }
            td class=(TABLE_CELL_STYLE) { (payment_method_label(transaction)) }
            td class={ "px-6 py-4 text-right tabular-nums " (amount_class(transaction.transaction_type)) }
            {
                (signed_amount(transaction))
            }

            @if show_actions {
                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(&edit_url, &delete_url, &confirm_message, "closest tr"))
                    }
                }
            }
        }
    }
}

/// A table of transactions, with edit and delete buttons if `show_actions` is set.
pub fn transactions_table(transactions: &[Transaction], show_actions: bool) -> Markup {
    let column_count = if show_actions { 6 } else { 5 };

    html! {
        div class="w-full overflow-x-auto"
        {
            table class="w-full my-2 text-sm text-left rtl:text-right
                text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Payment" }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }

                        @if show_actions {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        (transaction_row_view(transaction, show_actions))
                    }

                    @if transactions.is_empty() {
                        tr
                        {
                            td
                                colspan=(column_count)
                                data-empty-state="true"
                                class="px-6 py-4 text-center"
                            {
                                "No transactions in this month."
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::transaction::{Category, PaymentMethod, Transaction, TransactionType};

    use super::{signed_amount, transactions_table};

    fn transaction(transaction_type: TransactionType) -> Transaction {
        Transaction {
            id: "abc".to_owned(),
            amount: Decimal::new(1230, 2),
            description: "Lunch".to_owned(),
            date: date!(2025 - 02 - 14),
            transaction_type,
            category: Category::Food,
            payment_method: PaymentMethod::Debit,
            is_recurring: false,
            recurrence_day: None,
        }
    }

    #[test]
    fn expenses_are_negative_and_income_positive() {
        assert_eq!(signed_amount(&transaction(TransactionType::Expense)), "-$12.30");
        assert_eq!(signed_amount(&transaction(TransactionType::Income)), "+$12.30");
    }

    #[test]
    fn table_has_a_row_per_transaction() {
        let transactions = vec![
            transaction(TransactionType::Expense),
            transaction(TransactionType::Income),
        ];

        let html = Html::parse_fragment(&transactions_table(&transactions, true).into_string());

        let rows = html
            .select(&Selector::parse("tr[data-transaction-row]").unwrap())
            .count();
        assert_eq!(rows, 2);
        let delete_buttons = html
            .select(&Selector::parse("button[hx-delete='/api/transactions/abc']").unwrap())
            .count();
        assert_eq!(delete_buttons, 2);
    }

    #[test]
    fn empty_table_shows_message() {
        let html = Html::parse_fragment(&transactions_table(&[], false).into_string());

        let empty_state = html
            .select(&Selector::parse("td[data-empty-state]").unwrap())
            .next()
            .expect("No empty state found");
        assert_eq!(empty_state.value().attr("colspan"), Some("5"));
    }
}
