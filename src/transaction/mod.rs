//! Income and expense transactions.

mod core;
mod delete;
mod listing;

pub use core::{
    NewTransaction, TransactionKind, TransactionWithCategory, create_transaction,
    create_transaction_table, get_all_transactions, get_transactions_by_kind,
};
pub use delete::{delete_expense_endpoint, delete_income_endpoint};

#[cfg(test)]
pub(crate) use core::{Transaction, new_test_transaction};
pub use listing::{
    create_expense_endpoint, create_income_endpoint, get_expenses_page, get_incomes_page,
};
