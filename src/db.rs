//! Database initialization for the application's SQLite schema.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    budget::create_budget_table, category::create_category_table,
    transaction::create_transaction_table, user::create_user_table, Error,
};

/// An alias for the integer type used for database primary keys.
pub type DatabaseID = i64;

/// Create the application's tables if they do not exist.
///
/// Table creation runs inside a single exclusive transaction so that a
/// partially created schema is never left behind.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Foreign key enforcement is off by default in SQLite and is a
    // per-connection setting, so it must be enabled before anything else.
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
