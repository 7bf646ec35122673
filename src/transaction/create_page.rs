//! The page for recording a new transaction, and the entry form it shows.
//!
//! The form is also returned by the receipt endpoint after the fields read
//! from a receipt have been filled in.

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
    account::{Account, get_accounts},
    category::{Category, category_options, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, link, loading_spinner,
    },
    navigation::NavBar,
    receipt::TransactionFormState,
    timezone::local_now,
    transaction::{TransactionKind, core::format_date_key},
};

/// Render the transaction entry form filled in with `form`.
///
/// `notice` is shown above the fields, e.g. when a receipt could not be read.
pub fn transaction_form(
    form: &TransactionFormState,
    accounts: &[Account],
    categories: &[Category],
    ocr_enabled: bool,
    notice: Option<&str>,
) -> Markup {
    html! {
        form
            id="transaction-form"
            hx-post=(endpoints::TRANSACTIONS_API)
            hx-encoding="multipart/form-data"
            hx-target-error="#alert-container"
            hx-disabled-elt="#submit-button"
            class="w-full space-y-4"
        {
            h2 class="text-xl font-bold" { "New Transaction" }

            @if let Some(notice) = notice
            {
                p id="ocr-notice" class="text-sm text-amber-600 dark:text-amber-400" { (notice) }
            }

            div class="flex gap-2"
            {
                @for (kind, label) in [
                    (TransactionKind::Expense, "Expense"),
                    (TransactionKind::Income, "Income"),
                ]
                {
                    label class="flex-1 flex"
                    {
                        input
                            type="radio"
                            name="kind"
                            value=(kind)
                            class=(FORM_RADIO_INPUT_STYLE)
                            checked[form.kind == kind]
                            hx-get=(endpoints::CATEGORY_OPTIONS)
                            hx-target="#category_id"
                            hx-include="#category_id"
                            hx-sync="this:replace";

                        span class=(FORM_RADIO_LABEL_STYLE) { (label) }
                    }
                }
            }

            div class="grid grid-cols-2 gap-4"
            {
                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    input
                        name="amount"
                        id="amount"
                        type="number"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        value=(form.amount)
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="account_id" class=(FORM_LABEL_STYLE) { "Account" }

                    select name="account_id" id="account_id" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" selected[form.account_id.is_none()] { "Select an account" }

                        @for account in accounts
                        {
                            option value=(account.id) selected[form.account_id == Some(account.id)]
                            {
                                (account.name)
                            }
                        }
                    }
                }
            }

            @if accounts.is_empty()
            {
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "You have no accounts yet. "
                    (link(endpoints::PROFILE_VIEW, "Add one on your profile"))
                    " first."
                }
            }

            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select name="category_id" id="category_id" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    (category_options(categories, form.kind, form.category_id))
                }
            }

            div class="grid grid-cols-2 gap-4"
            {
                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        name="date"
                        id="date"
                        type="date"
                        value=(form.date)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="time" class=(FORM_LABEL_STYLE) { "Time" }

                    input
                        name="time"
                        id="time"
                        type="time"
                        value=(form.time)
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="note" class=(FORM_LABEL_STYLE) { "Note" }

                input
                    name="note"
                    id="note"
                    type="text"
                    placeholder="What was it for?"
                    value=(form.note)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="image" class=(FORM_LABEL_STYLE)
                {
                    "Receipt"

                    @if ocr_enabled
                    {
                        span id="ocr-indicator" class="htmx-indicator ms-2 text-gray-500"
                        {
                            "Reading receipt..."
                        }
                    }
                }

                // hx-preserve keeps the chosen file when the receipt endpoint
                // swaps in the prefilled form.
                input
                    name="image"
                    id="image"
                    type="file"
                    accept="image/*"
                    capture="environment"
                    hx-preserve
                    hx-post=[ocr_enabled.then_some(endpoints::RECEIPT_API)]
                    hx-trigger=[ocr_enabled.then_some("change")]
                    hx-target=[ocr_enabled.then_some("#transaction-form")]
                    hx-swap=[ocr_enabled.then_some("outerHTML")]
                    hx-sync=[ocr_enabled.then_some("closest form:replace")]
                    hx-indicator=[ocr_enabled.then_some("#ocr-indicator")]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="inline htmx-indicator"
                {
                    (loading_spinner())
                }
                " Save"
            }
        }
    }
}

fn add_transaction_view(
    form: &TransactionFormState,
    accounts: &[Account],
    categories: &[Category],
    ocr_enabled: bool,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::ADD_TRANSACTION_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            (transaction_form(form, accounts, categories, ocr_enabled, None))
        }
    };

    base("Add Transaction", &[], &content)
}

/// The state needed for the page for adding a transaction.
#[derive(Debug, Clone)]
pub struct AddTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
    /// Whether receipts are read when an image is chosen.
    pub ocr_enabled: bool,
}

impl FromRef<AppState> for AddTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
            ocr_enabled: state.ocr_service.is_some(),
        }
    }
}

/// Renders the page for adding a transaction.
///
/// The form starts as an expense in the user's first account, dated now.
pub async fn get_add_transaction_page(
    State(state): State<AddTransactionPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let (accounts, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let accounts = get_accounts(user_id, &connection)?;
        let categories = get_categories(user_id, &connection)?;

        (accounts, categories)
    };

    let now = local_now(&state.local_timezone)?;

    let form = TransactionFormState {
        account_id: accounts.first().map(|account| account.id),
        date: format_date_key(now.date(), None)?,
        time: format!("{:02}:{:02}", now.hour(), now.minute()),
        ..Default::default()
    };

    Ok(add_transaction_view(&form, &accounts, &categories, state.ocr_enabled).into_response())
}
