//! The log-in page and handler for log-in requests.
//!
//! The auth module handles the lower level authentication and cookie logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{invalidate_auth_cookie, set_auth_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        link, log_in_register, password_input,
    },
    user::{User, get_user_by_email},
};

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";

/// The state needed to perform a log-in.
#[derive(Debug, Clone)]
pub struct LogInState {
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the log-in form.
///
/// The email and password are stored as plain strings. There is no need for
/// validation here since they will be compared against the email and password
/// in the database, which have been verified.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: String,
    /// Password entered during log-in.
    pub password: String,
}

/// Display the log-in page.
pub async fn get_log_in_page() -> Response {
    log_in_view("", "").into_response()
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in the auth cookie is set and the client is redirected
/// to the dashboard page. Otherwise, the form is re-rendered with an error
/// message explaining the problem.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let email = &user_data.email;
    let user: User = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match get_user_by_email(email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => {
                return log_in_view(email, INVALID_CREDENTIALS_ERROR_MSG).into_response();
            }
            Err(error) => {
                tracing::error!("Unhandled error while verifying credentials: {error}");
                return log_in_view(email, "An internal error occurred. Please try again later.")
                    .into_response();
            }
        }
    };

    let is_password_valid = match user.password_hash.verify(&user_data.password) {
        Ok(is_password_valid) => is_password_valid,
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_view(email, "An internal error occurred. Please try again later.")
                .into_response();
        }
    };

    if !is_password_valid {
        return log_in_view(email, INVALID_CREDENTIALS_ERROR_MSG).into_response();
    }

    match set_auth_cookie(jar.clone(), user.id, state.cookie_duration) {
        Ok(updated_jar) => {
            (updated_jar, Redirect::to(endpoints::DASHBOARD)).into_response()
        }
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (invalidate_auth_cookie(jar), error.into_response()).into_response()
        }
    }
}

fn log_in_view(email: &str, error_message: &str) -> Markup {
    let form = html! {
        form method="post" action=(endpoints::LOG_IN) class="space-y-4 md:space-y-6"
        {
            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                input
                    type="email"
                    name="email"
                    id="email"
                    placeholder="you@example.com"
                    value=(email)
                    class=(FORM_TEXT_INPUT_STYLE)
                    required;
            }

            (password_input("password", "Password", 0, None))

            @if !error_message.is_empty()
            {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Log in" }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account yet? "
                (link(endpoints::SIGN_UP, "Sign up"))
            }
        }
    };

    base("Log in", None, &log_in_register("Log in to your account", &form))
}
