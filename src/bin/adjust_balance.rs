use std::error::Error;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use finance_tracker::{
    Category, PaymentMethod, Transaction, TransactionFilter, TransactionType, balance_as_of,
    create_transaction, get_local_offset, initialize_db, list_transactions,
};

/// The smallest difference worth correcting.
const MIN_ADJUSTMENT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Add a transaction so that today's balance matches the balance in your bank account.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The balance you want the app to show for today, e.g. "200.00".
    #[arg(long, allow_hyphen_values = true)]
    target: Decimal,

    /// The canonical name of the local timezone, e.g. "Pacific/Auckland".
    #[arg(long, env = "TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let Some(local_offset) = get_local_offset(&args.timezone) else {
        eprintln!("\"{}\" is not a valid timezone.", args.timezone);
        exit(1);
    };
    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();

    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    println!("Calculating the balance as of {today}...");

    let transactions = list_transactions(&TransactionFilter::until(today), &conn)?;
    let current_balance = balance_as_of(&transactions, today);
    let target = args.target.round_dp(2);
    let Some(difference) = target.checked_sub(current_balance) else {
        eprintln!("The target {target:.2} is too far from the current balance.");
        exit(1);
    };

    println!("Current balance: {current_balance:.2}");

    if difference.abs() < MIN_ADJUSTMENT {
        println!("The balance is already correct.");
        return Ok(());
    }

    let transaction_type = if difference.is_sign_positive() {
        TransactionType::Income
    } else {
        TransactionType::Expense
    };

    println!(
        "Adjusting by {}{:.2}...",
        if difference.is_sign_positive() { "+" } else { "-" },
        difference.abs()
    );

    create_transaction(
        Transaction::build(
            difference.abs(),
            today,
            &format!("Manual balance adjustment to {target:.2}"),
        )
        .transaction_type(transaction_type)
        .category(Category::Other)
        .payment_method(PaymentMethod::Debit),
        &conn,
    )?;

    println!("The balance is now {target:.2}.");

    Ok(())
}
