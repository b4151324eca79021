//! The starter categories seeded for a user on their first dashboard visit.

use rusqlite::Connection;

use crate::{
    Error, UserId,
    category::{CategoryKind, CategoryName, NewCategory, count_categories, create_category},
};

/// The starter set: five expense categories and three income categories.
const DEFAULT_CATEGORIES: [(&str, CategoryKind, &str, &str); 8] = [
    ("Food", CategoryKind::Expense, "fa-solid fa-utensils", "#e74c3c"),
    ("Transport", CategoryKind::Expense, "fa-solid fa-bus", "#3498db"),
    ("Housing", CategoryKind::Expense, "fa-solid fa-house", "#9b59b6"),
    ("Health", CategoryKind::Expense, "fa-solid fa-heart-pulse", "#1abc9c"),
    ("Leisure", CategoryKind::Expense, "fa-solid fa-gamepad", "#f39c12"),
    ("Salary", CategoryKind::Income, "fa-solid fa-money-bill-wave", "#2ecc71"),
    ("Freelance", CategoryKind::Income, "fa-solid fa-laptop-code", "#16a085"),
    ("Investments", CategoryKind::Income, "fa-solid fa-chart-line", "#27ae60"),
];

/// Seed the starter categories for `user_id` if they have no categories yet.
///
/// A user who deleted all of their categories gets the starter set again on
/// their next dashboard visit.
///
/// # Errors
///
/// This function will return an error if there was an error trying to access
/// the database.
pub fn ensure_default_categories(user_id: UserId, connection: &Connection) -> Result<(), Error> {
    if count_categories(user_id, connection)? > 0 {
        return Ok(());
    }

    tracing::info!("Seeding default categories for user {user_id}");

    for (name, kind, icon, color) in DEFAULT_CATEGORIES {
        create_category(
            NewCategory {
                name: CategoryName::new_unchecked(name),
                kind,
                icon: icon.to_owned(),
                color: color.to_owned(),
                user_id,
            },
            connection,
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod default_category_tests {
    use rusqlite::Connection;

    use crate::{
        category::{CategoryKind, create_category, get_categories},
        db::initialize,
        user::new_test_user,
    };

    use super::ensure_default_categories;

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn seeds_eight_categories_for_new_user() {
        let connection = get_test_db_connection();
        let user = new_test_user("test@example.com", &connection);

        ensure_default_categories(user.id, &connection).expect("Could not seed categories");

        let categories = get_categories(user.id, &connection).expect("Could not get categories");
        assert_eq!(categories.len(), 8);

        let expense_count = categories
            .iter()
            .filter(|category| category.kind == CategoryKind::Expense)
            .count();
        let income_count = categories
            .iter()
            .filter(|category| category.kind == CategoryKind::Income)
            .count();
        assert_eq!(expense_count, 5);
        assert_eq!(income_count, 3);
    }

    #[test]
    fn does_not_seed_twice() {
        let connection = get_test_db_connection();
        let user = new_test_user("test@example.com", &connection);

        ensure_default_categories(user.id, &connection).expect("Could not seed categories");
        ensure_default_categories(user.id, &connection).expect("Could not seed categories");

        let categories = get_categories(user.id, &connection).expect("Could not get categories");
        assert_eq!(categories.len(), 8);
    }

    #[test]
    fn does_not_seed_when_user_has_a_category() {
        let connection = get_test_db_connection();
        let user = new_test_user("test@example.com", &connection);
        create_category(
            crate::category::NewCategory {
                name: crate::category::CategoryName::new_unchecked("Pets"),
                kind: CategoryKind::Expense,
                icon: "fa-solid fa-paw".to_owned(),
                color: "#e67e22".to_owned(),
                user_id: user.id,
            },
            &connection,
        )
        .expect("Could not create test category");

        ensure_default_categories(user.id, &connection).expect("Could not seed categories");

        let categories = get_categories(user.id, &connection).expect("Could not get categories");
        assert_eq!(categories.len(), 1);
    }

    #[test]
    fn seeding_is_scoped_to_user() {
        let connection = get_test_db_connection();
        let user = new_test_user("test@example.com", &connection);
        let other_user = new_test_user("other@example.com", &connection);

        ensure_default_categories(user.id, &connection).expect("Could not seed categories");

        let other_categories =
            get_categories(other_user.id, &connection).expect("Could not get categories");
        assert!(other_categories.is_empty());
    }
}
