//! Cookie-based authentication and the middleware that enforces it.

mod cookie;
mod middleware;

pub(crate) use cookie::{
    DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie,
};
#[cfg(test)]
pub(crate) use cookie::{COOKIE_EXPIRY, COOKIE_USER_ID};
pub(crate) use middleware::auth_guard;
