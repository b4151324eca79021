//! One-shot flash messages stored in a private cookie.
//!
//! Handlers set a flash before redirecting, and the next page view takes and
//! displays it. Taking the flash removes the cookie so the message is only
//! shown once.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use maud::{Markup, html};

pub(crate) const FLASH_COOKIE: &str = "flash";

/// How a flash message should be presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    /// The operation succeeded.
    Success,
    /// The operation failed.
    Error,
}

impl FlashLevel {
    fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }

    fn from_str(value: &str) -> Option<Self> {
        match value {
            "success" => Some(FlashLevel::Success),
            "error" => Some(FlashLevel::Error),
            _ => None,
        }
    }
}

/// A one-shot message to display on the next page view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    /// How the message should be presented.
    pub level: FlashLevel,
    /// The message text.
    pub message: String,
}

impl Flash {
    /// Create a success flash.
    pub fn success(message: &str) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.to_owned(),
        }
    }

    /// Create an error flash.
    pub fn error(message: &str) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.to_owned(),
        }
    }

    /// Render the flash as a dismissable banner.
    pub fn into_banner(self) -> Markup {
        let style = match self.level {
            FlashLevel::Success => "mb-4 rounded-lg bg-green-100 p-4 text-sm text-green-800",
            FlashLevel::Error => "mb-4 rounded-lg bg-red-100 p-4 text-sm text-red-800",
        };

        html! {
            p class=(style) { (self.message) }
        }
    }
}

/// Add a flash message to the cookie jar to be shown on the next page view.
///
/// Returns the cookie jar with the flash cookie added.
pub(crate) fn set_flash(jar: PrivateCookieJar, flash: Flash) -> PrivateCookieJar {
    jar.add(
        Cookie::build((
            FLASH_COOKIE,
            format!("{}:{}", flash.level.as_str(), flash.message),
        ))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true),
    )
}

/// Set a flash message and redirect to `to`.
///
/// This is the usual way for form handlers to finish after a successful
/// mutation.
pub(crate) fn flash_redirect(jar: PrivateCookieJar, flash: Flash, to: &str) -> Response {
    (set_flash(jar, flash), Redirect::to(to)).into_response()
}

/// Take the flash message out of the cookie jar, if one was set.
///
/// Returns the cookie jar with the flash cookie removed, so the message is
/// only displayed once.
pub(crate) fn take_flash(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };

    let flash = cookie
        .value_trimmed()
        .split_once(':')
        .and_then(|(level, message)| {
            FlashLevel::from_str(level).map(|level| Flash {
                level,
                message: message.to_owned(),
            })
        });

    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));

    (jar, flash)
}

#[cfg(test)]
mod flash_tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};

    use super::{FLASH_COOKIE, Flash, set_flash, take_flash};

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    #[test]
    fn take_flash_returns_none_without_cookie() {
        let (_, flash) = take_flash(get_jar());

        assert_eq!(flash, None);
    }

    #[test]
    fn take_flash_returns_message_and_removes_cookie() {
        let jar = set_flash(get_jar(), Flash::success("Expense created."));

        let (jar, flash) = take_flash(jar);

        assert_eq!(flash, Some(Flash::success("Expense created.")));
        assert!(jar.get(FLASH_COOKIE).is_none());
    }

    #[test]
    fn flash_message_may_contain_separator() {
        let jar = set_flash(get_jar(), Flash::error("Error: could not delete category."));

        let (_, flash) = take_flash(jar);

        assert_eq!(
            flash,
            Some(Flash::error("Error: could not delete category."))
        );
    }
}
