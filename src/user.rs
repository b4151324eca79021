//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The user's email address, used as the login identifier.
    pub email: EmailAddress,
    /// The name the user goes by in the app.
    pub username: String,
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// The data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// The user's email address, used as the login identifier.
    pub email: EmailAddress,
    /// The name the user goes by in the app.
    pub username: String,
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Create the user table and its indexes.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            password TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_user_email ON user(email);",
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if a user with the same email already exists,
/// - or [Error::SqlError] if an SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (email, username, first_name, last_name, password)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            new_user.email.as_str(),
            &new_user.username,
            &new_user.first_name,
            &new_user.last_name,
            new_user.password_hash.as_ref(),
        ),
    )?;

    let id = UserId::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email: new_user.email,
        username: new_user.username,
        first_name: new_user.first_name,
        last_name: new_user.last_name,
        password_hash: new_user.password_hash,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user,
/// - or there was an error trying to access the database.
pub fn get_user_by_id(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, email, username, first_name, last_name, password
             FROM user WHERE id = :id",
        )?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with an email equal to `email`.
///
/// # Errors
///
/// This function will return an error if:
/// - `email` does not belong to a registered user,
/// - or there was an error trying to access the database.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, email, username, first_name, last_name, password
             FROM user WHERE email = :email",
        )?
        .query_row(&[(":email", &email)], map_user_row)
        .map_err(|error| error.into())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let raw_email: String = row.get(1)?;
    let email = raw_email.parse().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            Box::new(error),
        )
    })?;
    let username = row.get(2)?;
    let first_name = row.get(3)?;
    let last_name = row.get(4)?;
    let raw_password_hash: String = row.get(5)?;

    Ok(User {
        id: UserId::new(raw_id),
        email,
        username,
        first_name,
        last_name,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}

#[cfg(test)]
pub(crate) fn new_test_user(email: &str, connection: &Connection) -> User {
    create_user(
        NewUser {
            email: email.parse().expect("Could not parse test email"),
            username: "test".to_owned(),
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            password_hash: PasswordHash::new_unchecked(
                // "okon"
                "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm",
            ),
        },
        connection,
    )
    .expect("Could not create test user")
}
