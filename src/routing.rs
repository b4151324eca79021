//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::auth_guard,
    category::{create_category_endpoint, delete_category_endpoint, get_categories_page},
    dashboard::get_dashboard_page,
    endpoints,
    log_in::{get_log_in_page, post_log_in},
    log_out::get_log_out,
    not_found::get_404_not_found,
    sign_up::{get_sign_up_page, post_sign_up},
    transaction::{
        create_expense_endpoint, create_income_endpoint, delete_expense_endpoint,
        delete_income_endpoint, get_expenses_page, get_incomes_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN, get(get_log_in_page).post(post_log_in))
        .route(endpoints::SIGN_UP, get(get_sign_up_page).post(post_sign_up))
        .route(endpoints::LOG_OUT, get(get_log_out));

    let protected_routes = Router::new()
        .route(
            endpoints::DASHBOARD,
            get(get_dashboard_page).post(get_dashboard_page),
        )
        .route(
            endpoints::EXPENSES,
            get(get_expenses_page).post(create_expense_endpoint),
        )
        .route(endpoints::DELETE_EXPENSE, post(delete_expense_endpoint))
        .route(
            endpoints::INCOMES,
            get(get_incomes_page).post(create_income_endpoint),
        )
        .route(endpoints::DELETE_INCOME, post(delete_income_endpoint))
        .route(
            endpoints::CATEGORIES,
            get(get_categories_page).post(create_category_endpoint),
        )
        .route(endpoints::DELETE_CATEGORY, post(delete_category_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}
