//! Database operations for categories.
//!
//! Every query is scoped to a user so that one user can never see or modify
//! another user's categories.

use rusqlite::{Connection, Row};

use crate::{
    Error, UserId,
    category::{Category, CategoryKind, CategoryName, NewCategory},
    database_id::CategoryId,
};

/// Create a category and return it with its generated ID.
pub fn create_category(new_category: NewCategory, connection: &Connection) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (user_id, name, kind, icon, color) VALUES (?1, ?2, ?3, ?4, ?5);",
        (
            new_category.user_id.as_i64(),
            new_category.name.as_ref(),
            new_category.kind.as_str(),
            &new_category.icon,
            &new_category.color,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name: new_category.name,
        kind: new_category.kind,
        icon: new_category.icon,
        color: new_category.color,
    })
}

/// Retrieve all of a user's categories ordered alphabetically by name.
pub fn get_categories(user_id: UserId, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, icon, color FROM category
             WHERE user_id = :user_id ORDER BY name ASC;",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a user's categories usable for transactions of `kind`.
///
/// This includes categories of the matching kind and categories usable for
/// both kinds, ordered alphabetically by name.
pub fn get_categories_by_kind(
    kind: CategoryKind,
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, icon, color FROM category
             WHERE user_id = :user_id AND kind IN (:kind, 'both')
             ORDER BY name ASC;",
        )?
        .query_map(
            &[
                (":user_id", &user_id.as_i64().to_string()),
                (":kind", &kind.as_str().to_string()),
            ],
            map_row,
        )?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Count the categories a user owns.
pub fn count_categories(user_id: UserId, connection: &Connection) -> Result<u32, Error> {
    connection
        .prepare("SELECT COUNT(1) FROM category WHERE user_id = :user_id;")?
        .query_row(&[(":user_id", &user_id.as_i64())], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Delete a category by ID, scoped to `user_id`.
///
/// Transactions that reference the category keep existing with their category
/// cleared, via the ON DELETE SET NULL foreign key.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category doesn't exist or belongs to
/// another user.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            icon TEXT NOT NULL,
            color TEXT NOT NULL,
            UNIQUE(user_id, name)
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_id ON category(user_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);
    let raw_kind: String = row.get(2)?;
    let kind = CategoryKind::from_str(&raw_kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown category kind {raw_kind:?}").into(),
        )
    })?;
    let icon = row.get(3)?;
    let color = row.get(4)?;

    Ok(Category {
        id,
        name,
        kind,
        icon,
        color,
    })
}

#[cfg(test)]
mod category_name_tests {
    use crate::{Error, category::CategoryName};

    #[test]
    fn new_fails_on_empty_string() {
        let category_name = CategoryName::new("");

        assert_eq!(category_name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        let category_name = CategoryName::new("\n\t \r");

        assert_eq!(category_name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_succeeds_on_non_empty_string() {
        let category_name = CategoryName::new("🔥");

        assert!(category_name.is_ok())
    }
}

#[cfg(test)]
mod category_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error, User,
        category::{
            CategoryKind, CategoryName, NewCategory, create_category, get_categories,
            get_categories_by_kind,
            domain::{DEFAULT_COLOR, DEFAULT_ICON},
        },
        db::initialize,
        transaction::{
            TransactionKind, create_transaction, get_all_transactions, new_test_transaction,
        },
        user::new_test_user,
    };

    use super::{count_categories, delete_category};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn new_category(name: &str, kind: CategoryKind, user: &User) -> NewCategory {
        NewCategory {
            name: CategoryName::new_unchecked(name),
            kind,
            icon: DEFAULT_ICON.to_owned(),
            color: DEFAULT_COLOR.to_owned(),
            user_id: user.id,
        }
    }

    #[test]
    fn create_category_succeeds() {
        let connection = get_test_db_connection();
        let user = new_test_user("test@example.com", &connection);
        let name = CategoryName::new("Groceries").unwrap();

        let category = create_category(
            new_category("Groceries", CategoryKind::Expense, &user),
            &connection,
        );

        let got_category = category.expect("Could not create category");
        assert!(got_category.id > 0);
        assert_eq!(got_category.name, name);
        assert_eq!(got_category.kind, CategoryKind::Expense);
    }

    #[test]
    fn create_category_fails_on_duplicate_name_for_same_user() {
        let connection = get_test_db_connection();
        let user = new_test_user("test@example.com", &connection);
        create_category(
            new_category("Groceries", CategoryKind::Expense, &user),
            &connection,
        )
        .expect("Could not create test category");

        let result = create_category(
            new_category("Groceries", CategoryKind::Both, &user),
            &connection,
        );

        assert_eq!(result, Err(Error::DuplicateCategoryName));
    }

    #[test]
    fn create_category_succeeds_on_duplicate_name_for_other_user() {
        let connection = get_test_db_connection();
        let user = new_test_user("test@example.com", &connection);
        let other_user = new_test_user("other@example.com", &connection);
        create_category(
            new_category("Groceries", CategoryKind::Expense, &user),
            &connection,
        )
        .expect("Could not create test category");

        let result = create_category(
            new_category("Groceries", CategoryKind::Expense, &other_user),
            &connection,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn get_categories_only_returns_own_categories() {
        let connection = get_test_db_connection();
        let user = new_test_user("test@example.com", &connection);
        let other_user = new_test_user("other@example.com", &connection);
        let own_category = create_category(
            new_category("Foo", CategoryKind::Expense, &user),
            &connection,
        )
        .expect("Could not create test category");
        create_category(
            new_category("Bar", CategoryKind::Expense, &other_user),
            &connection,
        )
        .expect("Could not create test category");

        let categories = get_categories(user.id, &connection).expect("Could not get categories");

        assert_eq!(categories, vec![own_category]);
    }

    #[test]
    fn get_categories_by_kind_includes_both() {
        let connection = get_test_db_connection();
        let user = new_test_user("test@example.com", &connection);
        let food = create_category(
            new_category("Food", CategoryKind::Expense, &user),
            &connection,
        )
        .expect("Could not create test category");
        let misc = create_category(
            new_category("Misc", CategoryKind::Both, &user),
            &connection,
        )
        .expect("Could not create test category");
        create_category(
            new_category("Salary", CategoryKind::Income, &user),
            &connection,
        )
        .expect("Could not create test category");

        let categories = get_categories_by_kind(CategoryKind::Expense, user.id, &connection)
            .expect("Could not get categories");

        assert_eq!(categories, vec![food, misc]);
    }

    #[test]
    fn delete_category_succeeds() {
        let connection = get_test_db_connection();
        let user = new_test_user("test@example.com", &connection);
        let category = create_category(
            new_category("ToDelete", CategoryKind::Expense, &user),
            &connection,
        )
        .expect("Could not create test category");

        let result = delete_category(category.id, user.id, &connection);

        assert!(result.is_ok());
        let categories = get_categories(user.id, &connection).expect("Could not get categories");
        assert!(categories.is_empty());
    }

    #[test]
    fn delete_category_clears_category_from_transactions() {
        let connection = get_test_db_connection();
        let user = new_test_user("test@example.com", &connection);
        let category = create_category(
            new_category("Groceries", CategoryKind::Expense, &user),
            &connection,
        )
        .expect("Could not create test category");
        let transaction = create_transaction(
            new_test_transaction("19.99", TransactionKind::Expense, Some(category.id), user.id),
            &connection,
        )
        .expect("Could not create test transaction");

        delete_category(category.id, user.id, &connection).expect("Could not delete category");

        let transactions =
            get_all_transactions(user.id, &connection).expect("Could not get transactions");
        assert_eq!(transactions.len(), 1);
        let with_category = &transactions[0];
        assert_eq!(with_category.transaction.id, transaction.id);
        assert_eq!(with_category.transaction.category_id, None);
        assert_eq!(with_category.category_name, None);
    }

    #[test]
    fn delete_category_of_other_user_returns_not_found() {
        let connection = get_test_db_connection();
        let user = new_test_user("test@example.com", &connection);
        let other_user = new_test_user("other@example.com", &connection);
        let category = create_category(
            new_category("Foo", CategoryKind::Expense, &user),
            &connection,
        )
        .expect("Could not create test category");

        let result = delete_category(category.id, other_user.id, &connection);

        assert_eq!(result, Err(Error::NotFound));
        let categories = get_categories(user.id, &connection).expect("Could not get categories");
        assert_eq!(categories, vec![category]);
    }

    #[test]
    fn count_categories_is_scoped_to_user() {
        let connection = get_test_db_connection();
        let user = new_test_user("test@example.com", &connection);
        let other_user = new_test_user("other@example.com", &connection);
        create_category(
            new_category("Foo", CategoryKind::Expense, &user),
            &connection,
        )
        .expect("Could not create test category");

        assert_eq!(count_categories(user.id, &connection), Ok(1));
        assert_eq!(count_categories(other_user.id, &connection), Ok(0));
    }
}
