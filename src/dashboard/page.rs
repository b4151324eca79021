//! The dashboard page, the landing page after logging in.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    AppState, Error, UserId,
    category::ensure_default_categories,
    endpoints,
    flash::{Flash, take_flash},
    html::{
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency,
    },
    navigation::NavBar,
    transaction::{TransactionKind, TransactionWithCategory, get_all_transactions},
    user::get_user_by_id,
};

use super::aggregation::{DashboardSummary, summarize};

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub cookie_key: Key,
}

impl FromRef<AppState> for DashboardPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            cookie_key: state.cookie_key.clone(),
        }
    }
}

impl FromRef<DashboardPageState> for Key {
    fn from_ref(state: &DashboardPageState) -> Self {
        state.cookie_key.clone()
    }
}

/// Render the dashboard page.
///
/// Seeds the user's default categories on their first visit, so a fresh
/// account starts with something to label transactions with.
pub async fn get_dashboard_page(
    State(state): State<DashboardPageState>,
    Extension(user_id): Extension<UserId>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let (jar, flash) = take_flash(jar);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    ensure_default_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to seed default categories: {error}"))?;

    let user = get_user_by_id(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve user: {error}"))?;
    let transactions = get_all_transactions(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;

    let summary = summarize(&transactions);

    Ok((jar, dashboard_view(&user.username, &summary, flash)).into_response())
}

fn dashboard_view(username: &str, summary: &DashboardSummary, flash: Option<Flash>) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl"
            {
                h1 class="text-2xl font-bold mb-6"
                {
                    "Hello, " (username)
                }

                div class="grid grid-cols-1 md:grid-cols-3 gap-4 mb-8"
                {
                    (summary_card("Total Income", summary.total_income, "text-green-600 dark:text-green-400"))
                    (summary_card("Total Expenses", summary.total_expenses, "text-red-600 dark:text-red-400"))

                    @let balance_style = if summary.balance.is_sign_negative() {
                        "text-red-600 dark:text-red-400"
                    } else {
                        "text-green-600 dark:text-green-400"
                    };
                    (summary_card("Balance", summary.balance, balance_style))
                }

                div class="grid grid-cols-1 lg:grid-cols-2 gap-8"
                {
                    (expenses_by_category_view(summary))
                    (recent_transactions_view(&summary.recent_transactions))
                }
            }
        }
    };

    base("Dashboard", flash, &content)
}

fn summary_card(label: &str, amount: Decimal, amount_style: &str) -> Markup {
    html! {
        div class="p-6 bg-white rounded-lg shadow dark:bg-gray-800"
        {
            p class="text-sm text-gray-500 dark:text-gray-400 uppercase" { (label) }
            p class={ "text-2xl font-bold " (amount_style) } { (format_currency(amount)) }
        }
    }
}

fn expenses_by_category_view(summary: &DashboardSummary) -> Markup {
    html! {
        div
        {
            h2 class="text-xl font-bold mb-4" { "Expenses by Category" }

            @if summary.expenses_by_category.is_empty()
            {
                p class="text-gray-500 dark:text-gray-400" { "No categorized expenses yet." }
            }
            @else
            {
                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                        }
                    }

                    tbody
                    {
                        @for (name, total) in &summary.expenses_by_category
                        {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (name) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(*total)) }
                            }
                        }
                    }
                }
            }

            @match summary.largest_expense_category() {
                Some((name, total)) => {
                    p class="mt-4 text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Biggest spending: " (name) " (" (format_currency(*total)) ")"
                    }
                }
                None => {
                    p class="mt-4 text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Biggest spending: " (format_currency(Decimal::ZERO))
                    }
                }
            }

            @if let Some((name, total)) = summary.smallest_expense_category()
            {
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Smallest spending: " (name) " (" (format_currency(*total)) ")"
                }
            }
        }
    }
}

fn recent_transactions_view(recent: &[TransactionWithCategory]) -> Markup {
    html! {
        div
        {
            h2 class="text-xl font-bold mb-4" { "Recent Transactions" }

            @if recent.is_empty()
            {
                p class="text-gray-500 dark:text-gray-400" { "No transactions recorded yet." }
            }
            @else
            {
                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        }
                    }

                    tbody
                    {
                        @for with_category in recent
                        {
                            @let transaction = &with_category.transaction;

                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (transaction.date) }
                                td class=(TABLE_CELL_STYLE) { (transaction.description) }

                                td class=(TABLE_CELL_STYLE)
                                {
                                    @match &with_category.category_name {
                                        Some(name) => { (name) }
                                        None => { "—" }
                                    }
                                }

                                td class=(TABLE_CELL_STYLE)
                                {
                                    @match transaction.kind {
                                        TransactionKind::Income => {
                                            span class="text-green-600 dark:text-green-400"
                                            {
                                                (format_currency(transaction.amount))
                                            }
                                        }
                                        TransactionKind::Expense => {
                                            span class="text-red-600 dark:text-red-400"
                                            {
                                                (format_currency(transaction.amount))
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod dashboard_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::Response};
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::get_categories,
        db::initialize,
        transaction::{TransactionKind, create_transaction, new_test_transaction},
        user::{User, new_test_user},
    };

    use super::{DashboardPageState, get_dashboard_page};

    fn new_test_state() -> DashboardPageState {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory");
        initialize(&connection).expect("Could not initialize database");

        DashboardPageState {
            db_connection: Arc::new(Mutex::new(connection)),
            cookie_key: Key::generate(),
        }
    }

    fn must_create_user(state: &DashboardPageState, email: &str) -> User {
        let connection = state.db_connection.lock().unwrap();
        new_test_user(email, &connection)
    }

    async fn must_get_page(state: &DashboardPageState, user: &User) -> Response {
        get_dashboard_page(
            State(state.clone()),
            Extension(user.id),
            PrivateCookieJar::new(state.cookie_key.clone()),
        )
        .await
        .expect("Could not render dashboard page")
    }

    async fn must_get_page_text(state: &DashboardPageState, user: &User) -> String {
        let response = must_get_page(state, user).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not read response body");

        String::from_utf8(body.to_vec()).expect("Response body was not valid UTF-8")
    }

    #[tokio::test]
    async fn first_visit_seeds_default_categories() {
        let state = new_test_state();
        let user = must_create_user(&state, "seed@test.com");

        must_get_page(&state, &user).await;

        let connection = state.db_connection.lock().unwrap();
        let categories =
            get_categories(user.id, &connection).expect("Could not retrieve categories");
        assert_eq!(categories.len(), 8);
    }

    #[tokio::test]
    async fn second_visit_does_not_seed_again() {
        let state = new_test_state();
        let user = must_create_user(&state, "seed@test.com");

        must_get_page(&state, &user).await;
        must_get_page(&state, &user).await;

        let connection = state.db_connection.lock().unwrap();
        let categories =
            get_categories(user.id, &connection).expect("Could not retrieve categories");
        assert_eq!(categories.len(), 8);
    }

    #[tokio::test]
    async fn page_greets_user_by_username() {
        let state = new_test_state();
        let user = must_create_user(&state, "greeting@test.com");

        let text = must_get_page_text(&state, &user).await;

        assert!(
            text.contains(&format!("Hello, {}", user.username)),
            "dashboard did not greet the user: {text}"
        );
    }

    #[tokio::test]
    async fn page_shows_totals_and_balance() {
        let state = new_test_state();
        let user = must_create_user(&state, "totals@test.com");

        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                new_test_transaction("100.00", TransactionKind::Income, None, user.id),
                &connection,
            )
            .expect("Could not create income");
            create_transaction(
                new_test_transaction("40.00", TransactionKind::Expense, None, user.id),
                &connection,
            )
            .expect("Could not create expense");
        }

        let text = must_get_page_text(&state, &user).await;

        assert!(text.contains("$100.00"), "missing total income: {text}");
        assert!(text.contains("$40.00"), "missing total expenses: {text}");
        assert!(text.contains("$60.00"), "missing balance: {text}");
    }

    #[tokio::test]
    async fn page_only_shows_own_transactions() {
        let state = new_test_state();
        let user = must_create_user(&state, "mine@test.com");
        let other_user = must_create_user(&state, "theirs@test.com");

        {
            let connection = state.db_connection.lock().unwrap();
            let mut other_transaction = new_test_transaction(
                "999.00",
                TransactionKind::Expense,
                None,
                other_user.id,
            );
            other_transaction.description = "other user's purchase".to_owned();
            create_transaction(other_transaction, &connection)
                .expect("Could not create transaction");
        }

        let text = must_get_page_text(&state, &user).await;

        assert!(
            !text.contains("other user's purchase"),
            "dashboard leaked another user's transaction: {text}"
        );
        assert!(!text.contains("$999.00"));
    }

    #[tokio::test]
    async fn page_lists_recent_transactions() {
        let state = new_test_state();
        let user = must_create_user(&state, "recent@test.com");

        {
            let connection = state.db_connection.lock().unwrap();
            let mut transaction = new_test_transaction(
                "12.34",
                TransactionKind::Expense,
                None,
                user.id,
            );
            transaction.description = "weekly groceries".to_owned();
            transaction.date = date!(2026 - 06 - 01);
            create_transaction(transaction, &connection).expect("Could not create transaction");
        }

        let text = must_get_page_text(&state, &user).await;

        assert!(text.contains("weekly groceries"), "{text}");
        assert!(text.contains("2026-06-01"), "{text}");
    }
}
