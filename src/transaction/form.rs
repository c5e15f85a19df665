//! The form for creating and editing transactions.

use maud::{Markup, html};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
    transaction::core::{
        Category, PaymentMethod, Transaction, TransactionBuilder, TransactionType,
        TransactionUpdate,
    },
};

/// The form data for creating or editing a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type_")]
    pub transaction_type: TransactionType,
    /// The value of the transaction in dollars.
    pub amount: Decimal,
    /// The date when the transaction ocurred.
    pub date: Date,
    /// Text detailing the transaction.
    pub description: String,
    /// What the money was spent on or earned from.
    pub category: Category,
    /// How an expense was paid, income forms do not send this.
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    /// Set when the recurring checkbox is ticked.
    #[serde(default)]
    pub is_recurring: Option<bool>,
    /// The day of the month the transaction repeats on.
    #[serde(default)]
    pub recurrence_day: Option<u8>,
}

impl TransactionForm {
    fn recurrence_day(&self) -> Option<u8> {
        if self.is_recurring.unwrap_or(false) {
            Some(self.recurrence_day.unwrap_or(self.date.day()))
        } else {
            None
        }
    }

    /// Convert the form into a builder for a new transaction.
    pub fn into_builder(self) -> TransactionBuilder {
        let recurrence_day = self.recurrence_day();

        let mut builder = Transaction::build(self.amount, self.date, &self.description)
            .transaction_type(self.transaction_type)
            .category(self.category)
            .payment_method(self.payment_method.unwrap_or(PaymentMethod::Debit));

        if let Some(day) = recurrence_day {
            builder = builder.recurring(day);
        }

        builder
    }

    /// Convert the form into an update that replaces every editable field.
    pub fn into_update(self) -> TransactionUpdate {
        let recurrence_day = self.recurrence_day();

        TransactionUpdate {
            amount: Some(self.amount),
            description: Some(self.description),
            date: Some(self.date),
            transaction_type: Some(self.transaction_type),
            category: Some(self.category),
            payment_method: Some(self.payment_method.unwrap_or(PaymentMethod::Debit)),
            is_recurring: Some(recurrence_day.is_some()),
            recurrence_day,
        }
    }
}

/// The values to fill the form fields with.
pub struct TransactionFormDefaults<'a> {
    pub transaction_type: TransactionType,
    pub amount: Option<Decimal>,
    pub date: Date,
    pub description: Option<&'a str>,
    pub category: Category,
    pub payment_method: PaymentMethod,
    pub recurrence_day: Option<u8>,
    pub autofocus_amount: bool,
}

impl<'a> TransactionFormDefaults<'a> {
    /// Defaults for a new debit expense dated `date`.
    pub fn new(date: Date) -> Self {
        Self {
            transaction_type: TransactionType::Expense,
            amount: None,
            date,
            description: None,
            category: Category::Other,
            payment_method: PaymentMethod::Debit,
            recurrence_day: None,
            autofocus_amount: true,
        }
    }

    /// Defaults that show the current values of `transaction`.
    pub fn from_transaction(transaction: &'a Transaction) -> Self {
        Self {
            transaction_type: transaction.transaction_type,
            amount: Some(transaction.amount),
            date: transaction.date,
            description: Some(&transaction.description),
            category: transaction.category,
            payment_method: transaction.payment_method,
            recurrence_day: transaction.recurrence_day,
            autofocus_amount: false,
        }
    }
}

fn radio_option(name: &str, value: &str, label: &str, checked: bool) -> Markup {
    let id = format!("{name}-{value}");

    html! {
        div class="flex items-center gap-3"
        {
            input
                name=(name)
                id=(id)
                type="radio"
                value=(value)
                checked[checked]
                required
                tabindex="0"
                class=(FORM_RADIO_INPUT_STYLE);

            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (label) }
        }
    }
}

pub fn transaction_form_fields(defaults: &TransactionFormDefaults<'_>) -> Markup {
    let is_expense = defaults.transaction_type == TransactionType::Expense;
    let amount_str = defaults.amount.map(|amount| format!("{:.2}", amount));
    let description_placeholder = defaults.description.unwrap_or("Description");
    let recurrence_day = defaults.recurrence_day.map(|day| day.to_string());

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Transaction type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                (radio_option("type_", TransactionType::Expense.as_str(), "Expense", is_expense))
                (radio_option("type_", TransactionType::Income.as_str(), "Income", !is_expense))
            }
        }

        div
        {
            label
                for="amount"
                class=(FORM_LABEL_STYLE)
            {
                "Amount"
            }

            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    placeholder="0.00"
                    min="0"
                    required
                    value=[amount_str.as_deref()]
                    autofocus[defaults.autofocus_amount]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label
                for="date"
                class=(FORM_LABEL_STYLE)
            {
                "Date"
            }

            input
                name="date"
                id="date"
                type="date"
                value=(defaults.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="description"
                class=(FORM_LABEL_STYLE)
            {
                "Description"
            }

            input
                name="description"
                id="description"
                type="text"
                placeholder=(description_placeholder)
                value=[defaults.description]
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="category"
                class=(FORM_LABEL_STYLE)
            {
                "Category"
            }

            select
                name="category"
                id="category"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                @for category in Category::ALL {
                    option
                        value=(category.as_str())
                        selected[category == defaults.category]
                    {
                        (category.label())
                    }
                }
            }
        }

        // Income is always paid into the debit account.
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Payment method" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                (radio_option(
                    "payment_method",
                    PaymentMethod::Debit.as_str(),
                    "Debit",
                    defaults.payment_method == PaymentMethod::Debit,
                ))
                (radio_option(
                    "payment_method",
                    PaymentMethod::Credit.as_str(),
                    "Credit card",
                    defaults.payment_method == PaymentMethod::Credit,
                ))
            }
        }

        div class="flex items-center gap-3"
        {
            input
                name="is_recurring"
                id="is_recurring"
                type="checkbox"
                value="true"
                checked[defaults.recurrence_day.is_some()]
                class="w-4 h-4 rounded";

            label for="is_recurring" class="text-sm font-medium" { "Repeats every month" }
        }

        div
        {
            label
                for="recurrence_day"
                class=(FORM_LABEL_STYLE)
            {
                "Day of the month"
            }

            input
                name="recurrence_day"
                id="recurrence_day"
                type="number"
                min="1"
                max="31"
                placeholder="Same day as the date"
                value=[recurrence_day.as_deref()]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}
