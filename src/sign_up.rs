//! The sign-up page for creating a new user account.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::set_auth_cookie,
    endpoints,
    flash::{Flash, flash_redirect},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        link, log_in_register, password_input,
    },
    user::{NewUser, create_user},
};

/// The minimum number of characters the password should have to be considered
/// valid on the client side (server-side validation is done on top of this).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 8;

pub const PASSWORDS_DO_NOT_MATCH_ERROR_MSG: &str = "Passwords do not match.";
pub const INVALID_EMAIL_ERROR_MSG: &str = "Please enter a valid email address.";

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct SignUpState {
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SignUpState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SignUpState> for Key {
    fn from_ref(state: &SignUpState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the sign-up form.
#[derive(Clone, Deserialize)]
pub struct SignUpFormData {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password_confirmation: String,
}

impl SignUpFormData {
    fn empty() -> Self {
        Self {
            email: String::new(),
            username: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            password: String::new(),
            password_confirmation: String::new(),
        }
    }
}

/// Where in the sign-up form an error message should be rendered.
enum SignUpError<'a> {
    None,
    Email(&'a str),
    Username(&'a str),
    Password(&'a str),
    PasswordConfirmation(&'a str),
}

/// Display the sign-up page.
pub async fn get_sign_up_page() -> Response {
    sign_up_view(&SignUpFormData::empty(), SignUpError::None).into_response()
}

/// Handler for sign-up requests via the POST method.
///
/// On success the new user is logged in and redirected to the dashboard.
/// Otherwise, the form is re-rendered with an error message next to the field
/// that caused the problem, keeping everything else the user entered.
pub async fn post_sign_up(
    State(state): State<SignUpState>,
    jar: PrivateCookieJar,
    Form(form): Form<SignUpFormData>,
) -> Response {
    let email: EmailAddress = match form.email.trim().parse() {
        Ok(email) => email,
        Err(_) => {
            return sign_up_view(&form, SignUpError::Email(INVALID_EMAIL_ERROR_MSG))
                .into_response();
        }
    };

    let username = form.username.trim();
    if username.is_empty() {
        return sign_up_view(&form, SignUpError::Username("Please choose a username."))
            .into_response();
    }

    let validated_password = match ValidatedPassword::new(&form.password) {
        Ok(password) => password,
        Err(error) => {
            return sign_up_view(&form, SignUpError::Password(&error.to_string()))
                .into_response();
        }
    };

    if form.password != form.password_confirmation {
        return sign_up_view(
            &form,
            SignUpError::PasswordConfirmation(PASSWORDS_DO_NOT_MATCH_ERROR_MSG),
        )
        .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return error.into_response();
        }
    };

    let new_user = NewUser {
        email,
        username: username.to_owned(),
        first_name: form.first_name.trim().to_owned(),
        last_name: form.last_name.trim().to_owned(),
        password_hash,
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match create_user(new_user, &connection) {
            Ok(user) => user,
            Err(Error::DuplicateEmail) => {
                return sign_up_view(
                    &form,
                    SignUpError::Email(&Error::DuplicateEmail.to_string()),
                )
                .into_response();
            }
            Err(error) => {
                tracing::error!("An unhandled error occurred while inserting a new user: {error}");
                return error.into_response();
            }
        }
    };

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => flash_redirect(
            jar,
            Flash::success(&format!("Welcome, {}!", user.username)),
            endpoints::DASHBOARD,
        ),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");
            error.into_response()
        }
    }
}

fn text_input(
    name: &str,
    label: &str,
    type_: &str,
    value: &str,
    error_message: Option<&str>,
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                type=(type_)
                name=(name)
                id=(name)
                value=(value)
                class=(FORM_TEXT_INPUT_STYLE)
                required;

            @if let Some(error_message) = error_message
            {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }
        }
    }
}

fn sign_up_view(form: &SignUpFormData, error: SignUpError) -> Markup {
    let (email_error, username_error, password_error, confirmation_error) = match error {
        SignUpError::None => (None, None, None, None),
        SignUpError::Email(message) => (Some(message), None, None, None),
        SignUpError::Username(message) => (None, Some(message), None, None),
        SignUpError::Password(message) => (None, None, Some(message), None),
        SignUpError::PasswordConfirmation(message) => (None, None, None, Some(message)),
    };

    let form = html! {
        form method="post" action=(endpoints::SIGN_UP) class="space-y-4 md:space-y-6"
        {
            (text_input("email", "Email", "email", &form.email, email_error))
            (text_input("username", "Username", "text", &form.username, username_error))
            (text_input("first_name", "First name", "text", &form.first_name, None))
            (text_input("last_name", "Last name", "text", &form.last_name, None))

            (password_input("password", "Password", PASSWORD_INPUT_MIN_LENGTH, password_error))
            (password_input(
                "password_confirmation",
                "Confirm password",
                PASSWORD_INPUT_MIN_LENGTH,
                confirmation_error,
            ))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Sign up" }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN, "Log in here"))
            }
        }
    };

    base("Sign up", None, &log_in_register("Create your account", &form))
}

#[cfg(test)]
mod sign_up_page_tests {
    use axum::http::StatusCode;

    use crate::{
        endpoints,
        test_utils::{
            assert_form_endpoint, assert_form_input, assert_form_submit_button,
            assert_valid_html, must_get_form, parse_html_document,
        },
    };

    use super::get_sign_up_page;

    #[tokio::test]
    async fn sign_up_page_displays_form() {
        let response = get_sign_up_page().await;

        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form = must_get_form(&document);
        assert_form_endpoint(&form, endpoints::SIGN_UP);
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "username", "text");
        assert_form_input(&form, "first_name", "text");
        assert_form_input(&form, "last_name", "text");
        assert_form_input(&form, "password", "password");
        assert_form_input(&form, "password_confirmation", "password");
        assert_form_submit_button(&form);
    }
}
