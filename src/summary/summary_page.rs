//! The summary page: totals over every transaction, account balances and the
//! biggest expense categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    account::get_accounts,
    endpoints,
    html::{CARD_STYLE, PAGE_CONTAINER_STYLE, amount_card, base, format_amount},
    navigation::NavBar,
    summary::aggregation::{
        AccountBalance, CategoryExpense, DEFAULT_CATEGORY_LIMIT, account_balances,
        category_expenses, summarize,
    },
    transaction::{get_transaction_rows, transaction_table},
};

/// How many of the latest transactions the summary page lists.
const RECENT_TRANSACTION_COUNT: usize = 5;

/// The state needed for the summary page.
#[derive(Debug, Clone)]
pub struct SummaryPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SummaryPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn account_balances_view(balances: &[AccountBalance]) -> Markup {
    html! {
        section class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold mb-2" { "Accounts" }

            @if balances.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "No accounts yet." }
            }

            ul class="space-y-2"
            {
                @for balance in balances {
                    li class="flex justify-between items-center"
                    {
                        span class="flex items-center gap-2"
                        {
                            span
                                class="inline-block w-3 h-3 rounded-full"
                                style={ "background-color: " (balance.account.color) }
                            {}
                            (balance.account.name)
                        }
                        span class="font-semibold" { (format_amount(balance.balance)) }
                    }
                }
            }
        }
    }
}

fn category_expenses_view(expenses: &[CategoryExpense]) -> Markup {
    html! {
        section class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold mb-2" { "Top expense categories" }

            @if expenses.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "No expenses yet." }
            }

            ul class="space-y-3"
            {
                @for expense in expenses {
                    li
                    {
                        div class="flex justify-between text-sm"
                        {
                            span { (expense.name) }
                            span
                            {
                                (format_amount(expense.amount))
                                " (" (format!("{:.0}", expense.percentage)) "%)"
                            }
                        }
                        div class="w-full h-2 rounded bg-gray-200 dark:bg-gray-700"
                        {
                            div
                                class="h-2 rounded"
                                style={
                                    "width: " (format!("{:.1}", expense.percentage)) "%; "
                                    "background-color: " (expense.color)
                                }
                            {}
                        }
                    }
                }
            }
        }
    }
}

/// Renders the summary of all of the user's transactions.
pub async fn get_summary_page(
    State(state): State<SummaryPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let (accounts, rows) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let accounts = get_accounts(user_id, &connection)
            .inspect_err(|error| tracing::error!("Could not get accounts: {error}"))?;
        let rows = get_transaction_rows(user_id, &connection)
            .inspect_err(|error| tracing::error!("Could not get transactions: {error}"))?;

        (accounts, rows)
    };

    let summary = summarize(&rows);
    let balances = account_balances(&accounts, &rows);
    let expenses = category_expenses(&rows, DEFAULT_CATEGORY_LIMIT);
    let recent = &rows[..rows.len().min(RECENT_TRANSACTION_COUNT)];

    let balance_style = if summary.balance < 0.0 {
        "text-orange-700 dark:text-orange-300"
    } else {
        "text-blue-700 dark:text-blue-300"
    };

    let nav_bar = NavBar::new(endpoints::SUMMARY_VIEW).into_html();
    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-3xl space-y-4"
            {
                h1 class="text-xl font-bold" { "Summary" }

                div class="grid grid-cols-2 gap-2"
                {
                    (amount_card("Income", summary.total_income, "text-green-700 dark:text-green-300"))
                    (amount_card("Expenses", summary.total_expense, "text-red-700 dark:text-red-300"))
                    div class="col-span-2"
                    {
                        (amount_card("Balance", summary.balance, balance_style))
                    }
                }

                (account_balances_view(&balances))
                (category_expenses_view(&expenses))

                section class="space-y-2"
                {
                    h2 class="text-lg font-semibold" { "Recent transactions" }
                    (transaction_table(recent, false))
                }
            }
        }
    };

    Ok(base("Summary", &[], &content).into_response())
}
