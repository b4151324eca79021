//! Categories listing page and creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserId, endpoints,
    category::{
        Category, CategoryFormData, CategoryName, DEFAULT_COLOR, DEFAULT_ICON, NewCategory,
        create_category, get_categories,
    },
    flash::{Flash, flash_redirect, take_flash},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
};

/// The state needed for the categories page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub cookie_key: Key,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            cookie_key: state.cookie_key.clone(),
        }
    }
}

impl FromRef<CategoriesPageState> for Key {
    fn from_ref(state: &CategoriesPageState) -> Self {
        state.cookie_key.clone()
    }
}

/// Render the categories page with the user's categories and a creation form.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
    Extension(user_id): Extension<UserId>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let (jar, flash) = take_flash(jar);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok((jar, categories_view(&categories, flash, "")).into_response())
}

/// Handle category creation form submission.
///
/// On success the user is redirected back to the categories page with a flash
/// message. On a validation error the page is re-rendered with the error next
/// to the form.
pub async fn create_category_endpoint(
    State(state): State<CategoriesPageState>,
    Extension(user_id): Extension<UserId>,
    jar: PrivateCookieJar,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let render_error = |error_message: &str| match get_categories(user_id, &connection) {
        Ok(categories) => categories_view(&categories, None, error_message).into_response(),
        Err(error) => error.into_response(),
    };

    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return render_error(&format!("Error: {error}")),
    };

    let icon = if form.icon.trim().is_empty() {
        DEFAULT_ICON.to_owned()
    } else {
        form.icon.trim().to_owned()
    };
    let color = if form.color.trim().is_empty() {
        DEFAULT_COLOR.to_owned()
    } else {
        form.color.trim().to_owned()
    };

    let new_category = NewCategory {
        name,
        kind: form.kind,
        icon,
        color,
        user_id,
    };

    match create_category(new_category, &connection) {
        Ok(category) => flash_redirect(
            jar,
            Flash::success(&format!("Category '{}' created.", category.name)),
            endpoints::CATEGORIES,
        ),
        Err(Error::DuplicateCategoryName) => {
            render_error("Error: a category with this name already exists")
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");
            error.into_response()
        }
    }
}

fn categories_view(categories: &[Category], flash: Option<Flash>, form_error: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES).into_html();

    let table_row = |category: &Category| {
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_CATEGORY, category.id);
        let confirm_message = format!(
            "Are you sure you want to delete '{}'? Its transactions will be kept without a category.",
            category.name
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    i class=(category.icon) style=(format!("color: {}", category.color)) {}
                }

                td class=(TABLE_CELL_STYLE) { (category.name) }

                td class=(TABLE_CELL_STYLE) { (category.kind) }

                td class=(TABLE_CELL_STYLE)
                {
                    form
                        method="post"
                        action=(delete_url)
                        onsubmit=(format!("return confirm(\"{confirm_message}\")"))
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
                h1 class="text-xl font-bold" { "Categories" }

                section class="dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Icon" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Kind" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for category in categories {
                                (table_row(category))
                            }

                            @if categories.is_empty() {
                                tr
                                {
                                    td
                                        colspan="4"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No categories created yet."
                                    }
                                }
                            }
                        }
                    }
                }

                (new_category_form_view(form_error))
            }
        }
    );

    base("Categories", flash, &content)
}

fn new_category_form_view(error_message: &str) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::CATEGORIES)
            class="w-full space-y-4 md:space-y-6 max-w-md"
        {
            h2 class="text-lg font-bold" { "New Category" }

            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Category Name"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="kind" class=(FORM_LABEL_STYLE) { "Kind" }

                select id="kind" name="kind" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="expense" { "expense" }
                    option value="income" { "income" }
                    option value="both" { "both" }
                }
            }

            div
            {
                label for="icon" class=(FORM_LABEL_STYLE) { "Icon (optional)" }

                input
                    id="icon"
                    type="text"
                    name="icon"
                    placeholder=(crate::category::DEFAULT_ICON)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="color" class=(FORM_LABEL_STYLE) { "Color" }

                input
                    id="color"
                    type="color"
                    name="color"
                    value=(crate::category::DEFAULT_COLOR)
                    class="block h-10 w-full rounded border border-gray-300 dark:border-gray-600";
            }

            @if !error_message.is_empty() {
                p class=(FORM_ERROR_STYLE)
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Category" }
        }
    }
}
