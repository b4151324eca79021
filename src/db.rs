//! Database initialization for the application.

use rusqlite::Connection;

use crate::{
    category::create_category_table, transaction::create_transaction_table,
    user::create_user_table,
};

/// Create the tables for the application's domain models.
///
/// Foreign key enforcement is switched on for the connection so that the
/// `ON DELETE` clauses on the category and user references take effect.
///
/// # Errors
///
/// This function will return an error if any of the SQL queries fail.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    create_user_table(connection)?;
    create_category_table(connection)?;
    create_transaction_table(connection)?;

    Ok(())
}
