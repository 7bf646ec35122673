//! The profile page, where users manage their accounts and categories.

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
    account::{Account, DEFAULT_ACCOUNT_COLOR, get_accounts},
    auth::get_user_by_id,
    category::{Category, get_categories},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, link,
    },
    navigation::NavBar,
    transaction::TransactionKind,
};

const SMALL_BUTTON_STYLE: &str = "px-3 py-2 text-sm rounded text-white bg-indigo-500 \
    hover:bg-indigo-600 dark:bg-indigo-600 dark:hover:bg-indigo-700";

/// The state needed for the profile page.
#[derive(Debug, Clone)]
pub struct ProfilePageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfilePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn kind_select(id: &str, selected: TransactionKind) -> Markup {
    html! {
        select name="kind" id=(id) class=(FORM_TEXT_INPUT_STYLE)
        {
            @for (kind, label) in [
                (TransactionKind::Expense, "Expense"),
                (TransactionKind::Income, "Income"),
            ] {
                option value=(kind) selected[kind == selected] { (label) }
            }
        }
    }
}

fn account_row(account: &Account) -> Markup {
    let endpoint = format_endpoint(endpoints::ACCOUNT, account.id);

    html! {
        li class="flex gap-2 items-center"
        {
            form
                hx-put=(endpoint)
                hx-target-error="#alert-container"
                class="flex flex-1 gap-2 items-center"
            {
                input
                    type="color"
                    name="color"
                    aria-label="Colour"
                    value=(account.color)
                    class="h-9 w-9 rounded";
                input
                    type="text"
                    name="name"
                    aria-label="Name"
                    value=(account.name)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
                button type="submit" class=(SMALL_BUTTON_STYLE) { "Save" }
            }

            button
                hx-delete=(endpoint)
                hx-confirm={ "Delete the account \"" (account.name) "\"?" }
                hx-target="closest li"
                hx-swap="delete"
                hx-target-error="#alert-container"
                class=(BUTTON_DELETE_STYLE)
            {
                "Delete"
            }
        }
    }
}

fn accounts_section(accounts: &[Account]) -> Markup {
    html! {
        section id="accounts" class={ (CARD_STYLE) " space-y-4" }
        {
            h2 class="text-lg font-semibold" { "Accounts" }

            ul class="space-y-2"
            {
                @for account in accounts {
                    (account_row(account))
                }
            }

            form
                hx-post=(endpoints::ACCOUNTS_API)
                hx-target-error="#alert-container"
                class="flex gap-2 items-center"
            {
                input
                    type="color"
                    name="color"
                    aria-label="Colour"
                    value=(DEFAULT_ACCOUNT_COLOR)
                    class="h-9 w-9 rounded";
                input
                    type="text"
                    name="name"
                    placeholder="New account, e.g. Wallet"
                    aria-label="Name"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
                button type="submit" class=(SMALL_BUTTON_STYLE) { "Add" }
            }
        }
    }
}

fn category_row(category: &Category) -> Markup {
    if category.is_built_in() {
        return html! {
            li class="flex justify-between items-center py-1"
            {
                span { (category.name) }
                span class="text-xs text-gray-500 dark:text-gray-400"
                {
                    (category.kind.as_str()) " · built-in"
                }
            }
        };
    }

    let endpoint = format_endpoint(endpoints::CATEGORY, category.id);
    let kind_id = format!("category-kind-{}", category.id);

    html! {
        li class="flex gap-2 items-center"
        {
            form
                hx-put=(endpoint)
                hx-target-error="#alert-container"
                class="flex flex-1 gap-2 items-center"
            {
                input
                    type="text"
                    name="name"
                    aria-label="Name"
                    value=(category.name)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
                (kind_select(&kind_id, category.kind))
                button type="submit" class=(SMALL_BUTTON_STYLE) { "Save" }
            }

            button
                hx-delete=(endpoint)
                hx-confirm={ "Delete the category \"" (category.name) "\"?" }
                hx-target="closest li"
                hx-swap="delete"
                hx-target-error="#alert-container"
                class=(BUTTON_DELETE_STYLE)
            {
                "Delete"
            }
        }
    }
}

fn categories_section(categories: &[Category]) -> Markup {
    html! {
        section id="categories" class={ (CARD_STYLE) " space-y-4" }
        {
            h2 class="text-lg font-semibold" { "Categories" }

            ul class="space-y-2"
            {
                @for category in categories {
                    (category_row(category))
                }
            }

            form
                hx-post=(endpoints::CATEGORIES_API)
                hx-target-error="#alert-container"
                class="flex gap-2 items-center"
            {
                input
                    type="text"
                    name="name"
                    placeholder="New category, e.g. Coffee"
                    aria-label="Name"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
                (kind_select("new-category-kind", TransactionKind::Expense))
                button type="submit" class=(SMALL_BUTTON_STYLE) { "Add" }
            }
        }
    }
}

fn profile_view(email: &str, accounts: &[Account], categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::PROFILE_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-3xl space-y-4"
            {
                h1 class="text-xl font-bold" { "Profile" }

                section class=(CARD_STYLE)
                {
                    p class="text-sm text-gray-500 dark:text-gray-400" { "Signed in as" }
                    p id="email" class="font-semibold" { (email) }
                    p class="mt-2" { (link(endpoints::LOG_OUT, "Log out")) }
                }

                (accounts_section(accounts))
                (categories_section(categories))

                a href=(endpoints::ADD_TRANSACTION_VIEW) class=(BUTTON_PRIMARY_STYLE)
                {
                    "Add a transaction"
                }
            }
        }
    };

    base("Profile", &[], &content)
}

/// Renders the profile page with the user's accounts and categories.
pub async fn get_profile_page(
    State(state): State<ProfilePageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get user {user_id}: {error}"))?;
    let accounts = get_accounts(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get accounts: {error}"))?;
    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get categories: {error}"))?;

    Ok(profile_view(&user.email, &accounts, &categories).into_response())
}
