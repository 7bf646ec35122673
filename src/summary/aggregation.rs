//! Reduces a list of transactions to totals and breakdowns.
//!
//! Nothing is rounded here. Amounts are rounded for display when they are rendered.

use crate::{
    account::Account,
    transaction::{TransactionKind, TransactionRow},
};

/// The colours given to categories in order of first appearance.
pub const CATEGORY_PALETTE: [&str; 8] = [
    "#f97316", "#ef4444", "#ec4899", "#a855f7", "#6366f1", "#3b82f6", "#06b6d4", "#14b8a6",
];

/// How many categories the breakdowns show by default.
pub const DEFAULT_CATEGORY_LIMIT: usize = 5;

/// The name of the group for expenses without a category.
pub const OTHER_CATEGORY: &str = "Other";

/// Income and expense totals of a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    /// The sum of all income.
    pub total_income: f64,
    /// The sum of all expenses.
    pub total_expense: f64,
    /// Income minus expenses, negative when more was spent than earned.
    pub balance: f64,
}

/// Add up the income and expenses in `rows`.
pub fn summarize(rows: &[TransactionRow]) -> Summary {
    let mut summary = Summary::default();

    for row in rows {
        match row.record.kind {
            TransactionKind::Income => summary.total_income += row.record.amount,
            TransactionKind::Expense => summary.total_expense += row.record.amount,
        }
    }

    summary.balance = summary.total_income - summary.total_expense;
    summary
}

/// The money spent in one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryExpense {
    /// The category name, or [OTHER_CATEGORY].
    pub name: String,
    /// The sum of the category's expenses.
    pub amount: f64,
    /// The category's share of all expenses from 0 to 100.
    pub percentage: f64,
    /// The colour from [CATEGORY_PALETTE] used to draw the category.
    pub color: &'static str,
}

/// Group the expenses in `rows` by category and return the `limit` largest groups,
/// largest first.
///
/// Expenses without a category, or whose category was deleted, are grouped
/// under [OTHER_CATEGORY]. Percentages are relative to all expenses, including
/// groups that are cut off by `limit`. Groups with equal amounts keep the order
/// in which they first appear in `rows`.
pub fn category_expenses(rows: &[TransactionRow], limit: usize) -> Vec<CategoryExpense> {
    // Keyed by category ID. `None` is the "Other" group, which also takes
    // expenses whose category no longer exists.
    let mut groups: Vec<(Option<i64>, &str, f64)> = Vec::new();

    for row in rows
        .iter()
        .filter(|row| row.record.kind == TransactionKind::Expense)
    {
        let (key, name) = match (row.record.category_id, row.category_name.as_deref()) {
            (Some(id), Some(name)) => (Some(id), name),
            _ => (None, OTHER_CATEGORY),
        };

        match groups.iter_mut().find(|(group, _, _)| *group == key) {
            Some((_, _, amount)) => *amount += row.record.amount,
            None => groups.push((key, name, row.record.amount)),
        }
    }

    let total_expense: f64 = groups.iter().map(|(_, _, amount)| amount).sum();

    let mut expenses: Vec<CategoryExpense> = groups
        .into_iter()
        .enumerate()
        .map(|(index, (_, name, amount))| CategoryExpense {
            name: name.to_owned(),
            amount,
            percentage: if total_expense > 0.0 {
                amount / total_expense * 100.0
            } else {
                0.0
            },
            color: CATEGORY_PALETTE[index % CATEGORY_PALETTE.len()],
        })
        .collect();

    // `sort_by` is stable, so ties keep their first-seen order.
    expenses.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    expenses.truncate(limit);

    expenses
}

/// The balance of one account.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountBalance {
    /// The account.
    pub account: Account,
    /// Income minus expenses recorded against the account.
    pub balance: f64,
}

/// The balance of each account in `accounts` over `rows`, in the order of `accounts`.
pub fn account_balances(accounts: &[Account], rows: &[TransactionRow]) -> Vec<AccountBalance> {
    accounts
        .iter()
        .map(|account| {
            let balance = rows
                .iter()
                .filter(|row| row.record.account_id == account.id)
                .map(|row| match row.record.kind {
                    TransactionKind::Income => row.record.amount,
                    TransactionKind::Expense => -row.record.amount,
                })
                .sum();

            AccountBalance {
                account: account.clone(),
                balance,
            }
        })
        .collect()
}
