use std::error::Error;
use std::io::{self, Write};

use clap::Parser;
use rusqlite::Connection;

use finance_tracker::{count_transactions, delete_all_transactions, initialize_db};

/// Delete every transaction, leaving the emergency fund as it is.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// Skip the confirmation prompt.
    #[arg(long, short)]
    yes: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    let count = count_transactions(&conn)?;

    if count == 0 {
        println!("There are no transactions to delete.");
        return Ok(());
    }

    if !args.yes && !confirm(&args.db_path, count)? {
        println!("Nothing was deleted.");
        return Ok(());
    }

    println!("Wiping all transactions...");
    let count = delete_all_transactions(&conn)?;
    println!("Deleted {count} transactions. The balance is now 0.");

    Ok(())
}

fn confirm(db_path: &str, count: u32) -> io::Result<bool> {
    print!("Delete all {count} transactions in {db_path}? This cannot be undone. [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;

    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
