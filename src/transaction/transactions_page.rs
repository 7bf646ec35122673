//! The page for searching a user's transactions by text and date range.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID, endpoints,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, amount_card, base},
    navigation::NavBar,
    transaction::{
        core::get_transaction_rows,
        filter::{FilterCriteria, TransactionListState},
        view::transaction_table,
    },
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn filter_form(criteria: &FilterCriteria) -> Markup {
    html! {
        // Each keystroke aborts the request for the previous one, so results
        // never arrive out of order.
        form
            id="filter-form"
            hx-get=(endpoints::TRANSACTIONS_VIEW)
            hx-trigger="input changed delay:300ms, search"
            hx-target="#transaction-results"
            hx-select="#transaction-results"
            hx-swap="outerHTML"
            hx-push-url="true"
            hx-sync="this:replace"
            class="w-full space-y-4"
        {
            div
            {
                label for="search" class="sr-only" { "Search" }

                input
                    type="search"
                    name="search"
                    id="search"
                    placeholder="Search notes, accounts and categories"
                    value=(criteria.search)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="grid grid-cols-2 gap-4"
            {
                div
                {
                    label for="date_from" class=(FORM_LABEL_STYLE) { "From" }

                    input
                        type="date"
                        name="date_from"
                        id="date_from"
                        value=[criteria.date_from.as_deref()]
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="date_to" class=(FORM_LABEL_STYLE) { "To" }

                    input
                        type="date"
                        name="date_to"
                        id="date_to"
                        value=[criteria.date_to.as_deref()]
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }
        }
    }
}

fn transactions_view(list: &TransactionListState) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let summary = list.summary();
    let balance_style = if summary.balance < 0.0 {
        "text-red-700 dark:text-red-300"
    } else {
        "text-indigo-700 dark:text-indigo-300"
    };

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-3xl space-y-4"
            {
                h1 class="text-xl font-bold" { "Transactions" }

                (filter_form(list.criteria()))

                div id="transaction-results" class="space-y-4"
                {
                    div class="grid grid-cols-3 gap-2"
                    {
                        (amount_card("Income", summary.total_income, "text-green-700 dark:text-green-300"))
                        (amount_card("Expenses", summary.total_expense, "text-red-700 dark:text-red-300"))
                        (amount_card("Balance", summary.balance, balance_style))
                    }

                    (transaction_table(list.filtered(), true))
                }
            }
        }
    };

    base("Transactions", &[], &content)
}

/// Renders the transactions page with the rows matching the query.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserID>,
    Query(criteria): Query<FilterCriteria>,
) -> Result<Response, Error> {
    let rows = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transaction_rows(user_id, &connection)
            .inspect_err(|error| tracing::error!("Could not get transactions: {error}"))?
    };

    let list = TransactionListState::new(rows, criteria);

    Ok(transactions_view(&list).into_response())
}
