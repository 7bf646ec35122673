//! The home page: a month at a glance.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, Month};

use crate::{
    AppState, Error, UserID, endpoints,
    html::{CARD_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, amount_card, base, link},
    navigation::NavBar,
    summary::{
        aggregation::{DEFAULT_CATEGORY_LIMIT, category_expenses},
        charts::{chart_container, chart_head_elements},
    },
    timezone::local_now,
    transaction::{
        FilterCriteria, TransactionListState, format_date_key, get_transaction_rows,
        transaction_table,
    },
};

/// How many of the latest transactions the home page lists.
const RECENT_TRANSACTION_COUNT: usize = 10;

/// How many years either side of the current year the year selector offers.
const YEAR_SPAN: i32 = 2;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// The state needed for the home page.
#[derive(Debug, Clone)]
pub struct HomePageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for HomePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The month to show. Missing values default to the current month.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    /// The month number from 1 to 12.
    pub month: Option<u8>,
    pub year: Option<i32>,
}

/// The first and last day of a month as date keys, e.g. ("2024-02-01", "2024-02-29").
fn month_bounds(year: i32, month: Month) -> Result<(String, String), Error> {
    let invalid_date = |error: time::error::ComponentRange| Error::InvalidDate(error.to_string());

    let first_day = Date::from_calendar_date(year, month, 1).map_err(invalid_date)?;
    let next_month_year = if month == Month::December {
        year + 1
    } else {
        year
    };
    let last_day = Date::from_calendar_date(next_month_year, month.next(), 1)
        .map_err(invalid_date)?
        .previous_day()
        .ok_or_else(|| Error::InvalidDate(format!("{year}-{month}")))?;

    Ok((
        format_date_key(first_day, None)?,
        format_date_key(last_day, None)?,
    ))
}

fn month_selector(selected_year: i32, selected_month: Month, current_year: i32) -> Markup {
    let selected_month = u8::from(selected_month);

    html! {
        form
            method="get"
            action=(endpoints::HOME_VIEW)
            class="flex gap-2 w-full"
        {
            label for="month" class="sr-only" { "Month" }
            select
                id="month"
                name="month"
                onchange="this.form.requestSubmit()"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                @for (index, name) in MONTH_NAMES.iter().enumerate() {
                    @let number = index as u8 + 1;
                    option value=(number) selected[number == selected_month] { (name) }
                }
            }

            label for="year" class="sr-only" { "Year" }
            select
                id="year"
                name="year"
                onchange="this.form.requestSubmit()"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                @for year in (current_year - YEAR_SPAN)..=(current_year + YEAR_SPAN) {
                    option value=(year) selected[year == selected_year] { (year) }
                }
            }

            noscript
            {
                button type="submit" class=(FORM_TEXT_INPUT_STYLE) { "Show" }
            }
        }
    }
}

/// Renders the home page for the month in the query, the current month by default.
pub async fn get_home_page(
    State(state): State<HomePageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<MonthQuery>,
) -> Result<Response, Error> {
    let now = local_now(&state.local_timezone)
        .inspect_err(|error| tracing::error!("Could not get the local time: {error}"))?;
    let year = query.year.unwrap_or(now.year());
    let month = match query.month {
        Some(number) => {
            Month::try_from(number).map_err(|error| Error::InvalidDate(error.to_string()))?
        }
        None => now.month(),
    };

    let rows = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transaction_rows(user_id, &connection)
            .inspect_err(|error| tracing::error!("Could not get transactions: {error}"))?
    };

    let (date_from, date_to) = month_bounds(year, month)?;
    let mut list = TransactionListState::new(rows, FilterCriteria::default());
    let recent: Vec<_> = list
        .filtered()
        .iter()
        .take(RECENT_TRANSACTION_COUNT)
        .cloned()
        .collect();

    list.set_criteria(FilterCriteria {
        search: String::new(),
        date_from: Some(date_from),
        date_to: Some(date_to),
    });
    let summary = list.summary();
    let expenses = category_expenses(list.filtered(), DEFAULT_CATEGORY_LIMIT);

    let nav_bar = NavBar::new(endpoints::HOME_VIEW).into_html();
    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-3xl space-y-4"
            {
                h1 class="text-xl font-bold" { "Home" }

                (month_selector(year, month, now.year()))

                div class="grid grid-cols-2 gap-2"
                {
                    (amount_card("Income", summary.total_income, "text-green-700 dark:text-green-300"))
                    (amount_card("Expenses", summary.total_expense, "text-red-700 dark:text-red-300"))
                }

                section class=(CARD_STYLE)
                {
                    (chart_container(&expenses))
                }

                section class="space-y-2"
                {
                    div class="flex justify-between items-center"
                    {
                        h2 class="text-lg font-semibold" { "Recent transactions" }
                        (link(endpoints::TRANSACTIONS_VIEW, "View all"))
                    }

                    (transaction_table(&recent, false))
                }
            }
        }
    };

    Ok(base("Home", &chart_head_elements(&expenses), &content).into_response())
}
