//! Expense and income listing pages and their creation endpoints.
//!
//! Both pages share the same layout and behaviour, differing only in the
//! transaction kind they show and the endpoints their forms post to, so the
//! handlers delegate to shared functions parameterized over a [ListingConfig].

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, UserId,
    category::{Category, get_categories_by_kind},
    database_id::CategoryId,
    endpoints,
    flash::{Flash, flash_redirect, take_flash},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    transaction::{
        NewTransaction, TransactionKind, TransactionWithCategory, create_transaction,
        get_transactions_by_kind,
    },
};

/// The state needed for the transaction listing pages.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub cookie_key: Key,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            cookie_key: state.cookie_key.clone(),
        }
    }
}

impl FromRef<TransactionsPageState> for Key {
    fn from_ref(state: &TransactionsPageState) -> Self {
        state.cookie_key.clone()
    }
}

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionFormData {
    /// The value of the transaction in dollars.
    pub amount: Decimal,
    /// The date when the transaction occurred.
    pub date: Date,
    /// Text detailing the transaction.
    pub description: String,
    /// The ID of the category to label this transaction with.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

/// The static configuration that differs between the expenses and incomes
/// pages.
struct ListingConfig {
    kind: TransactionKind,
    endpoint: &'static str,
    delete_endpoint: &'static str,
    title: &'static str,
    form_title: &'static str,
    total_label: &'static str,
    created_message: &'static str,
}

const EXPENSES_CONFIG: ListingConfig = ListingConfig {
    kind: TransactionKind::Expense,
    endpoint: endpoints::EXPENSES,
    delete_endpoint: endpoints::DELETE_EXPENSE,
    title: "Expenses",
    form_title: "New Expense",
    total_label: "Total Expenses",
    created_message: "Expense created.",
};

const INCOMES_CONFIG: ListingConfig = ListingConfig {
    kind: TransactionKind::Income,
    endpoint: endpoints::INCOMES,
    delete_endpoint: endpoints::DELETE_INCOME,
    title: "Incomes",
    form_title: "New Income",
    total_label: "Total Incomes",
    created_message: "Income created.",
};

/// Render the expenses page.
pub async fn get_expenses_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserId>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    get_listing_page(&EXPENSES_CONFIG, state, user_id, jar)
}

/// Render the incomes page.
pub async fn get_incomes_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserId>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    get_listing_page(&INCOMES_CONFIG, state, user_id, jar)
}

/// Handle expense creation form submission.
pub async fn create_expense_endpoint(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserId>,
    jar: PrivateCookieJar,
    Form(form): Form<TransactionFormData>,
) -> Response {
    create_listing_transaction(&EXPENSES_CONFIG, state, user_id, jar, form)
}

/// Handle income creation form submission.
pub async fn create_income_endpoint(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserId>,
    jar: PrivateCookieJar,
    Form(form): Form<TransactionFormData>,
) -> Response {
    create_listing_transaction(&INCOMES_CONFIG, state, user_id, jar, form)
}

fn get_listing_page(
    config: &ListingConfig,
    state: TransactionsPageState,
    user_id: UserId,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let (jar, flash) = take_flash(jar);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions_by_kind(config.kind, user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;
    let categories = get_categories_by_kind(config.kind.category_kind(), user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok((jar, listing_view(config, &transactions, &categories, flash, "")).into_response())
}

fn create_listing_transaction(
    config: &ListingConfig,
    state: TransactionsPageState,
    user_id: UserId,
    jar: PrivateCookieJar,
    form: TransactionFormData,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let render_error = |error_message: &str| {
        let transactions = get_transactions_by_kind(config.kind, user_id, &connection);
        let categories = get_categories_by_kind(config.kind.category_kind(), user_id, &connection);

        match (transactions, categories) {
            (Ok(transactions), Ok(categories)) => {
                listing_view(config, &transactions, &categories, None, error_message)
                    .into_response()
            }
            (Err(error), _) | (_, Err(error)) => error.into_response(),
        }
    };

    let new_transaction = NewTransaction {
        amount: form.amount,
        date: form.date,
        description: form.description,
        kind: config.kind,
        category_id: form.category_id,
        user_id,
    };

    match create_transaction(new_transaction, &connection) {
        Ok(_) => flash_redirect(jar, Flash::success(config.created_message), config.endpoint),
        Err(error @ (Error::NonPositiveAmount | Error::InvalidCategory(_))) => {
            render_error(&format!("Error: {error}"))
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a transaction: {error}");
            error.into_response()
        }
    }
}

fn listing_view(
    config: &ListingConfig,
    transactions: &[TransactionWithCategory],
    categories: &[Category],
    flash: Option<Flash>,
    form_error: &str,
) -> Markup {
    let nav_bar = NavBar::new(config.endpoint).into_html();
    let total: Decimal = transactions
        .iter()
        .map(|with_category| with_category.transaction.amount)
        .sum();

    let table_row = |with_category: &TransactionWithCategory| {
        let transaction = &with_category.transaction;
        let delete_url =
            endpoints::format_endpoint(config.delete_endpoint, transaction.id);

        html!(
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

                td class=(TABLE_CELL_STYLE) { (format_currency(transaction.amount)) }

                td class=(TABLE_CELL_STYLE)
                {
                    form
                        method="post"
                        action=(delete_url)
                        onsubmit="return confirm(\"Delete this transaction?\")"
                    {
                        button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { (config.title) }

                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        (config.total_label) ": " (format_currency(total))
                    }
                }

                section class="dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for with_category in transactions {
                                (table_row(with_category))
                            }

                            @if transactions.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions recorded yet."
                                    }
                                }
                            }
                        }
                    }
                }

                (new_transaction_form_view(config, categories, form_error))
            }
        }
    );

    base(config.title, flash, &content)
}

fn new_transaction_form_view(
    config: &ListingConfig,
    categories: &[Category],
    error_message: &str,
) -> Markup {
    html! {
        form
            method="post"
            action=(config.endpoint)
            class="w-full space-y-4 md:space-y-6 max-w-md"
        {
            h2 class="text-lg font-bold" { (config.form_title) }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                input
                    id="amount"
                    type="number"
                    name="amount"
                    step="0.01"
                    min="0.01"
                    placeholder="0.00"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    id="date"
                    type="date"
                    name="date"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    id="description"
                    type="text"
                    name="description"
                    placeholder="Description"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category_id" name="category_id" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "No category" }

                    @for category in categories {
                        option value=(category.id) { (category.name) }
                    }
                }
            }

            @if !error_message.is_empty() {
                p class=(FORM_ERROR_STYLE)
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (config.form_title) }
        }
    }
}

#[cfg(test)]
mod listing_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use rusqlite::Connection;
    use sha2::{Digest, Sha512};

    use crate::{
        category::{CategoryKind, CategoryName, NewCategory, create_category},
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_endpoint, assert_form_input, assert_form_select,
            assert_form_submit_button, assert_valid_html, must_get_form, parse_html_document,
        },
        transaction::{TransactionKind, core::new_test_transaction},
        user::new_test_user,
    };

    use super::{TransactionsPageState, get_expenses_page, get_incomes_page};

    fn get_test_state() -> TransactionsPageState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        let hash = Sha512::digest(b"foobar");

        TransactionsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
            cookie_key: Key::from(&hash),
        }
    }

    fn get_jar(state: &TransactionsPageState) -> PrivateCookieJar {
        PrivateCookieJar::new(state.cookie_key.clone())
    }

    #[tokio::test]
    async fn expenses_page_renders_form_with_scoped_categories() {
        let state = get_test_state();
        let user = {
            let connection = state.db_connection.lock().unwrap();
            let user = new_test_user("test@example.com", &connection);

            for (name, kind) in [
                ("Food", CategoryKind::Expense),
                ("Misc", CategoryKind::Both),
                ("Salary", CategoryKind::Income),
            ] {
                create_category(
                    NewCategory {
                        name: CategoryName::new_unchecked(name),
                        kind,
                        icon: "fa-solid fa-tag".to_owned(),
                        color: "#007bff".to_owned(),
                        user_id: user.id,
                    },
                    &connection,
                )
                .expect("Could not create test category");
            }

            user
        };
        let jar = get_jar(&state);

        let response = get_expenses_page(State(state), Extension(user.id), jar)
            .await
            .expect("Could not render expenses page")
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_form_endpoint(&form, endpoints::EXPENSES);
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "date", "date");
        assert_form_input(&form, "description", "text");
        // Income-only categories must not be selectable for an expense.
        assert_form_select(&form, "category_id", &["No category", "Food", "Misc"]);
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn incomes_page_lists_only_incomes() {
        let state = get_test_state();
        let user = {
            let connection = state.db_connection.lock().unwrap();
            let user = new_test_user("test@example.com", &connection);

            let mut expense =
                new_test_transaction("12.34", TransactionKind::Expense, None, user.id);
            expense.description = "the expense".to_owned();
            crate::transaction::create_transaction(expense, &connection).unwrap();

            let mut income = new_test_transaction("56.78", TransactionKind::Income, None, user.id);
            income.description = "the income".to_owned();
            crate::transaction::create_transaction(income, &connection).unwrap();

            user
        };
        let jar = get_jar(&state);

        let response = get_incomes_page(State(state), Extension(user.id), jar)
            .await
            .expect("Could not render incomes page")
            .into_response();

        let html = parse_html_document(response).await;
        let text = html.html();
        assert!(text.contains("the income"));
        assert!(text.contains("$56.78"));
        assert!(!text.contains("the expense"));
    }
}
