//! Core transaction types and database operations.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, UserId,
    category::{CategoryKind, CategoryName},
    database_id::{CategoryId, TransactionId},
};

/// Whether a transaction adds to or subtracts from the user's balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

impl TransactionKind {
    /// The kind as the lowercase string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Parse the kind from its database representation.
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }

    /// The category kind that matches this transaction kind exactly.
    pub fn category_kind(&self) -> CategoryKind {
        match self {
            TransactionKind::Income => CategoryKind::Income,
            TransactionKind::Expense => CategoryKind::Expense,
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An income or expense belonging to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// The value of the transaction in dollars, always positive.
    pub amount: Decimal,
    /// The date when the transaction occurred.
    pub date: Date,
    /// Text detailing the transaction.
    pub description: String,
    pub kind: TransactionKind,
    /// The category labelling this transaction, if any.
    pub category_id: Option<CategoryId>,
}

/// The data for creating a new transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub amount: Decimal,
    pub date: Date,
    pub description: String,
    pub kind: TransactionKind,
    pub category_id: Option<CategoryId>,
    pub user_id: UserId,
}

/// A transaction joined with the name of its category for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionWithCategory {
    pub transaction: Transaction,
    pub category_name: Option<CategoryName>,
}

/// Create a transaction and return it with its generated ID.
///
/// The amount is rounded to two decimal places.
///
/// # Errors
///
/// Returns a:
/// - [Error::NonPositiveAmount] if the amount is zero or negative,
/// - [Error::InvalidCategory] if the category doesn't exist, belongs to
///   another user, or can't be used for this kind of transaction,
/// - or [Error::SqlError] if an SQL related error occurred.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if new_transaction.amount <= Decimal::ZERO {
        return Err(Error::NonPositiveAmount);
    }

    if let Some(category_id) = new_transaction.category_id {
        validate_category(
            category_id,
            new_transaction.kind,
            new_transaction.user_id,
            connection,
        )?;
    }

    let amount = new_transaction.amount.round_dp(2);

    connection.execute(
        "INSERT INTO \"transaction\" (user_id, category_id, amount, kind, description, date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            new_transaction.user_id.as_i64(),
            new_transaction.category_id,
            amount.to_string(),
            new_transaction.kind.as_str(),
            &new_transaction.description,
            new_transaction.date,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Transaction {
        id,
        amount,
        date: new_transaction.date,
        description: new_transaction.description,
        kind: new_transaction.kind,
        category_id: new_transaction.category_id,
    })
}

/// Check that a category can label a transaction of `kind` for `user_id`.
fn validate_category(
    category_id: CategoryId,
    kind: TransactionKind,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let raw_kind: String = connection
        .prepare("SELECT kind FROM category WHERE id = :id AND user_id = :user_id")?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            |row| row.get(0),
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::InvalidCategory(Some(category_id)),
            error => error.into(),
        })?;

    let category_kind = CategoryKind::from_str(&raw_kind)
        .ok_or(Error::InvalidCategory(Some(category_id)))?;

    if category_kind == CategoryKind::Both || category_kind == kind.category_kind() {
        Ok(())
    } else {
        Err(Error::InvalidCategory(Some(category_id)))
    }
}

/// Retrieve a user's transactions of `kind` with their category names,
/// newest first (by date, then by ID).
pub fn get_transactions_by_kind(
    kind: TransactionKind,
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<TransactionWithCategory>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.amount, t.date, t.description, t.kind, t.category_id, c.name
             FROM \"transaction\" t
             LEFT JOIN category c ON c.id = t.category_id
             WHERE t.user_id = :user_id AND t.kind = :kind
             ORDER BY t.date DESC, t.id DESC",
        )?
        .query_map(
            &[
                (":user_id", &user_id.as_i64().to_string()),
                (":kind", &kind.as_str().to_string()),
            ],
            map_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Retrieve all of a user's transactions with their category names,
/// newest first (by date, then by ID).
pub fn get_all_transactions(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<TransactionWithCategory>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.amount, t.date, t.description, t.kind, t.category_id, c.name
             FROM \"transaction\" t
             LEFT JOIN category c ON c.id = t.category_id
             WHERE t.user_id = :user_id
             ORDER BY t.date DESC, t.id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Delete a transaction by ID, scoped to `user_id` and `kind`.
///
/// The kind scoping means the expense delete endpoint can't delete incomes
/// and vice versa.
///
/// # Errors
///
/// Returns [Error::NotFound] if the transaction doesn't exist, belongs to
/// another user, or has a different kind.
pub fn delete_transaction(
    transaction_id: TransactionId,
    kind: TransactionKind,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2 AND kind = ?3",
        (transaction_id, user_id.as_i64(), kind.as_str()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Initialize the transaction table and indexes.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            category_id INTEGER REFERENCES category(id) ON DELETE SET NULL,
            amount TEXT NOT NULL,
            kind TEXT NOT NULL,
            description TEXT NOT NULL,
            date TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_id ON \"transaction\"(user_id);
        CREATE INDEX IF NOT EXISTS idx_transaction_category_id ON \"transaction\"(category_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<TransactionWithCategory, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_amount: String = row.get(1)?;
    let amount = raw_amount.parse().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            Box::new(error),
        )
    })?;
    let date = row.get(2)?;
    let description = row.get(3)?;
    let raw_kind: String = row.get(4)?;
    let kind = TransactionKind::from_str(&raw_kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown transaction kind {raw_kind:?}").into(),
        )
    })?;
    let category_id = row.get(5)?;
    let raw_category_name: Option<String> = row.get(6)?;
    let category_name = raw_category_name
        .as_deref()
        .map(CategoryName::new_unchecked);

    Ok(TransactionWithCategory {
        transaction: Transaction {
            id,
            amount,
            date,
            description,
            kind,
            category_id,
        },
        category_name,
    })
}

#[cfg(test)]
pub(crate) fn new_test_transaction(
    amount: &str,
    kind: TransactionKind,
    category_id: Option<CategoryId>,
    user_id: UserId,
) -> NewTransaction {
    use time::macros::date;

    NewTransaction {
        amount: amount.parse().expect("Could not parse test amount"),
        date: date!(2026 - 05 - 14),
        description: "test transaction".to_owned(),
        kind,
        category_id,
        user_id,
    }
}
