//! Creates the tables for the application's database.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error, emergency_fund::create_emergency_fund_table,
    transaction::create_transaction_table,
};

/// Create the tables for all of the domain models.
///
/// Tables that already exist are left untouched, so it is safe to call this
/// every time the server starts.
///
/// # Errors
/// Returns an [Error::SqlError] if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;
    create_emergency_fund_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).unwrap();

        assert!(initialize(&conn).is_ok());
    }

    #[test]
    fn creates_tables() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).unwrap();

        let table_count: u32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master \
                WHERE type = 'table' AND name IN ('transaction', 'emergency_fund')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(table_count, 2);
    }
}
