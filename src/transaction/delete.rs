//! Expense and income deletion endpoints.

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
    database_id::TransactionId,
    endpoints,
    flash::{Flash, flash_redirect},
    transaction::{TransactionKind, core::delete_transaction},
};

/// The state needed for deleting a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub cookie_key: Key,
}

impl FromRef<AppState> for DeleteTransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            cookie_key: state.cookie_key.clone(),
        }
    }
}

impl FromRef<DeleteTransactionEndpointState> for Key {
    fn from_ref(state: &DeleteTransactionEndpointState) -> Self {
        state.cookie_key.clone()
    }
}

/// Handle expense deletion.
///
/// Requesting deletion of a transaction that doesn't exist, that belongs to
/// another user, or that is an income renders the 404 page.
pub async fn delete_expense_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<DeleteTransactionEndpointState>,
    Extension(user_id): Extension<UserId>,
    jar: PrivateCookieJar,
) -> Response {
    delete_listing_transaction(
        TransactionKind::Expense,
        endpoints::EXPENSES,
        "Expense deleted.",
        transaction_id,
        state,
        user_id,
        jar,
    )
}

/// Handle income deletion, with the same scoping rules as
/// [delete_expense_endpoint].
pub async fn delete_income_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<DeleteTransactionEndpointState>,
    Extension(user_id): Extension<UserId>,
    jar: PrivateCookieJar,
) -> Response {
    delete_listing_transaction(
        TransactionKind::Income,
        endpoints::INCOMES,
        "Income deleted.",
        transaction_id,
        state,
        user_id,
        jar,
    )
}

fn delete_listing_transaction(
    kind: TransactionKind,
    redirect_to: &str,
    deleted_message: &str,
    transaction_id: TransactionId,
    state: DeleteTransactionEndpointState,
    user_id: UserId,
    jar: PrivateCookieJar,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_transaction(transaction_id, kind, user_id, &connection) {
        Ok(_) => flash_redirect(jar, Flash::success(deleted_message), redirect_to),
        Err(Error::NotFound) => Error::NotFound.into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting transaction {transaction_id}: {error}"
            );
            error.into_response()
        }
    }
}
