//! Category deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserId,
    category::delete_category,
    database_id::CategoryId,
    endpoints,
    flash::{Flash, flash_redirect},
};

/// The state needed for deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub cookie_key: Key,
}

impl FromRef<AppState> for DeleteCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            cookie_key: state.cookie_key.clone(),
        }
    }
}

impl FromRef<DeleteCategoryEndpointState> for Key {
    fn from_ref(state: &DeleteCategoryEndpointState) -> Self {
        state.cookie_key.clone()
    }
}

/// Handle category deletion.
///
/// Deleting a category keeps its transactions, which simply lose their
/// category label. Requesting deletion of a category that doesn't exist or
/// that belongs to another user renders the 404 page.
pub async fn delete_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<DeleteCategoryEndpointState>,
    Extension(user_id): Extension<UserId>,
    jar: PrivateCookieJar,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_category(category_id, user_id, &connection) {
        Ok(_) => flash_redirect(
            jar,
            Flash::success("Category deleted."),
            endpoints::CATEGORIES,
        ),
        Err(Error::NotFound) => Error::NotFound.into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting category {category_id}: {error}"
            );
            error.into_response()
        }
    }
}
