use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, Duration, OffsetDateTime, error::ComponentRange};

use finance_tracker::{
    Category, EmergencyFundUpdate, PaymentMethod, Transaction, TransactionBuilder,
    TransactionType, create_transaction, initialize_db, update_emergency_fund,
};

/// A utility for creating a test database for the finance_tracker server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// How many months of sample transactions to create, ending this month.
    #[arg(long, short, default_value_t = 3)]
    months: u8,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating sample transactions...");

    let today = OffsetDateTime::now_utc().date();
    let mut month_start = today.replace_day(1)?;
    let mut count = 0;

    for _ in 0..args.months {
        for transaction in sample_month(month_start)? {
            if transaction.date <= today {
                create_transaction(transaction, &conn)?;
                count += 1;
            }
        }

        month_start = (month_start - Duration::days(1)).replace_day(1)?;
    }

    println!("Created {count} transactions.");

    println!("Setting up the emergency fund...");

    update_emergency_fund(
        EmergencyFundUpdate {
            current_amount: Some(Decimal::new(3_250, 0)),
            goal_amount: Some(Decimal::new(12_000, 0)),
            monthly_contribution: Some(Decimal::new(400, 0)),
        },
        &conn,
    )?;

    println!("Success!");

    Ok(())
}

/// A month of typical income and spending starting on `month_start`.
fn sample_month(month_start: Date) -> Result<Vec<TransactionBuilder>, ComponentRange> {
    let day = |day: u8| month_start.replace_day(day);

    Ok(vec![
        Transaction::build(Decimal::new(4_200, 0), day(1)?, "Salary")
            .transaction_type(TransactionType::Income)
            .category(Category::Salary)
            .recurring(1),
        Transaction::build(Decimal::new(1_350, 0), day(2)?, "Rent")
            .category(Category::Housing)
            .recurring(2),
        Transaction::build(Decimal::new(8_945, 2), day(3)?, "Supermarket")
            .category(Category::Food),
        Transaction::build(Decimal::new(6_480, 2), day(5)?, "Restaurant")
            .category(Category::Food)
            .payment_method(PaymentMethod::Credit),
        Transaction::build(Decimal::new(12_099, 2), day(8)?, "Electricity and water")
            .category(Category::Utilities)
            .recurring(8),
        Transaction::build(Decimal::new(4_500, 2), day(12)?, "Bus pass")
            .category(Category::Transport),
        Transaction::build(Decimal::new(650, 0), day(15)?, "Website project")
            .transaction_type(TransactionType::Income)
            .category(Category::Freelance),
        Transaction::build(Decimal::new(3_999, 2), day(18)?, "Streaming subscriptions")
            .category(Category::Entertainment)
            .payment_method(PaymentMethod::Credit)
            .recurring(18),
        Transaction::build(Decimal::new(7_500, 2), day(22)?, "Pharmacy")
            .category(Category::Health)
            .payment_method(PaymentMethod::Credit),
        Transaction::build(Decimal::new(10_312, 2), day(26)?, "Supermarket")
            .category(Category::Food),
    ])
}
