//! Pure aggregation over a user's transactions for the dashboard.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::transaction::{TransactionKind, TransactionWithCategory};

/// How many transactions the dashboard shows in its recent activity list.
pub(super) const RECENT_TRANSACTION_COUNT: usize = 5;

/// The numbers displayed on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct DashboardSummary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    /// Total income minus total expenses, may be negative.
    pub balance: Decimal,
    /// Expense totals per category name, largest first. Categories are tied
    /// broken alphabetically so the ordering is deterministic.
    pub expenses_by_category: Vec<(String, Decimal)>,
    /// The most recent transactions, newest first (by date, then by ID).
    pub recent_transactions: Vec<TransactionWithCategory>,
}

impl DashboardSummary {
    /// The expense category with the highest total, if there are any expenses.
    pub fn largest_expense_category(&self) -> Option<&(String, Decimal)> {
        self.expenses_by_category.first()
    }

    /// The expense category with the lowest total, if there are any expenses.
    pub fn smallest_expense_category(&self) -> Option<&(String, Decimal)> {
        self.expenses_by_category.last()
    }
}

/// Compute the dashboard numbers from a user's transactions.
pub(super) fn summarize(transactions: &[TransactionWithCategory]) -> DashboardSummary {
    let total_income: Decimal = transactions
        .iter()
        .filter(|with_category| with_category.transaction.kind == TransactionKind::Income)
        .map(|with_category| with_category.transaction.amount)
        .sum();
    let total_expenses: Decimal = transactions
        .iter()
        .filter(|with_category| with_category.transaction.kind == TransactionKind::Expense)
        .map(|with_category| with_category.transaction.amount)
        .sum();

    DashboardSummary {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
        expenses_by_category: group_expenses_by_category(transactions),
        recent_transactions: most_recent_transactions(transactions),
    }
}

/// Group expense totals by category name, largest first.
///
/// Expenses without a category are left out of the grouping. Ties are broken
/// alphabetically by name.
fn group_expenses_by_category(
    transactions: &[TransactionWithCategory],
) -> Vec<(String, Decimal)> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();

    for with_category in transactions
        .iter()
        .filter(|with_category| with_category.transaction.kind == TransactionKind::Expense)
    {
        let Some(name) = &with_category.category_name else {
            continue;
        };

        *totals.entry(name.as_ref()).or_insert(Decimal::ZERO) += with_category.transaction.amount;
    }

    let mut grouped: Vec<(String, Decimal)> = totals
        .into_iter()
        .map(|(label, total)| (label.to_owned(), total))
        .collect();
    grouped.sort_by(|(left_name, left_total), (right_name, right_total)| {
        right_total
            .cmp(left_total)
            .then_with(|| left_name.cmp(right_name))
    });

    grouped
}

/// The [RECENT_TRANSACTION_COUNT] most recent transactions, newest first.
///
/// Transactions on the same date are ordered by ID descending, so the most
/// recently entered one comes first.
fn most_recent_transactions(
    transactions: &[TransactionWithCategory],
) -> Vec<TransactionWithCategory> {
    let mut sorted = transactions.to_vec();
    sorted.sort_by(|left, right| {
        right
            .transaction
            .date
            .cmp(&left.transaction.date)
            .then_with(|| right.transaction.id.cmp(&left.transaction.id))
    });
    sorted.truncate(RECENT_TRANSACTION_COUNT);

    sorted
}
