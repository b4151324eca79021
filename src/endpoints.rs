//! The application's route URIs.
//!
//! For endpoints that take a parameter, e.g., '/despesas/delete/{transaction_id}/',
//! use [format_endpoint].

/// The landing page for logged in users, showing totals and recent activity.
pub const DASHBOARD: &str = "/";
/// The route for the log in page and log in form submissions.
pub const LOG_IN: &str = "/accounts/login/";
/// The route for the signup page and signup form submissions.
pub const SIGN_UP: &str = "/accounts/signup/";
/// The route for logging out the current user.
pub const LOG_OUT: &str = "/accounts/logout/";
/// The page for listing and creating expense transactions.
pub const EXPENSES: &str = "/despesas/";
/// The route to delete an expense transaction.
pub const DELETE_EXPENSE: &str = "/despesas/delete/{transaction_id}/";
/// The page for listing and creating income transactions.
pub const INCOMES: &str = "/receitas/";
/// The route to delete an income transaction.
pub const DELETE_INCOME: &str = "/receitas/delete/{transaction_id}/";
/// The page for listing and creating categories.
pub const CATEGORIES: &str = "/categorias/";
/// The route to delete a category.
pub const DELETE_CATEGORY: &str = "/categorias/delete/{category_id}/";
/// The route for static files.
pub const STATIC: &str = "/static";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/categorias/delete/{category_id}/',
/// '{category_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::DASHBOARD);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN);
        assert_endpoint_is_valid_uri(endpoints::SIGN_UP);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::EXPENSES);
        assert_endpoint_is_valid_uri(endpoints::DELETE_EXPENSE);
        assert_endpoint_is_valid_uri(endpoints::INCOMES);
        assert_endpoint_is_valid_uri(endpoints::DELETE_INCOME);
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES);
        assert_endpoint_is_valid_uri(endpoints::DELETE_CATEGORY);
        assert_endpoint_is_valid_uri(endpoints::STATIC);
    }

    #[test]
    fn format_endpoint_replaces_parameter() {
        let got = format_endpoint(endpoints::DELETE_EXPENSE, 42);

        assert_eq!(got, "/despesas/delete/42/");
    }

    #[test]
    fn format_endpoint_without_parameter_returns_path_unchanged() {
        let got = format_endpoint(endpoints::EXPENSES, 42);

        assert_eq!(got, endpoints::EXPENSES);
    }
}
