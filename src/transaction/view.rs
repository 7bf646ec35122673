//! Shared rendering of transaction rows for the transactions, home and summary pages.

use maud::{Markup, html};
use time::{Date, Month, format_description::BorrowedFormatItem, macros::format_description};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    endpoints::{self, format_endpoint},
    html::{BUTTON_DELETE_STYLE, LINK_STYLE, format_amount},
    summary::OTHER_CATEGORY,
    transaction::{TransactionKind, TransactionRow, core::split_date_key},
};

/// The max number of graphemes to display in the transaction table rows before
/// truncating and displaying ellipses.
const MAX_NOTE_GRAPHEMES: usize = 32;

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

fn amount_class(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Expense => "text-red-700 dark:text-red-300",
        TransactionKind::Income => "text-green-700 dark:text-green-300",
    }
}

/// The amount with a sign for its direction, e.g. "-$12.50" for an expense.
pub fn signed_amount(kind: TransactionKind, amount: f64) -> String {
    match kind {
        TransactionKind::Expense => format!("-{}", format_amount(amount)),
        TransactionKind::Income => format!("+{}", format_amount(amount)),
    }
}

/// Format a date key for display, e.g. "15-Mar-24 09:30".
///
/// Keys that are not valid dates are shown as they are.
pub fn format_date_label(date_key: &str) -> String {
    let (date, time) = split_date_key(date_key);

    let Ok(date) = Date::parse(date, DATE_FORMAT) else {
        return date_key.to_owned();
    };

    let month = match date.month() {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    };
    let label = format!("{:02}-{month}-{:02}", date.day(), date.year().rem_euclid(100));

    match time {
        Some(time) => format!("{label} {time}"),
        None => label,
    }
}

fn format_note(note: &str) -> (String, Option<&str>) {
    let note_length = note.graphemes(true).count();

    if note_length <= MAX_NOTE_GRAPHEMES {
        (note.to_owned(), None)
    } else {
        let truncated: String = note.graphemes(true).take(MAX_NOTE_GRAPHEMES - 3).collect();
        (truncated + "...", Some(note))
    }
}

/// The URL of the receipt image stored under `key`.
pub fn receipt_url(key: &str) -> String {
    match serde_urlencoded::to_string([("path", key)]) {
        Ok(query) => format!("{}?{query}", endpoints::IMAGE_API),
        Err(error) => {
            tracing::error!("Could not encode receipt key {key}: {error}");
            endpoints::IMAGE_API.to_owned()
        }
    }
}

fn transaction_row(row: &TransactionRow, show_actions: bool) -> Markup {
    let record = &row.record;
    let (note, full_note) = format_note(record.note.as_deref().unwrap_or_default());
    let category = row.category_name.as_deref().unwrap_or(OTHER_CATEGORY);

    html! {
        tr class="border-b border-gray-200 dark:border-gray-700"
        {
            td class="px-4 py-2 whitespace-nowrap" { (format_date_label(&record.date)) }

            td class="px-4 py-2" title=[full_note]
            {
                div class="font-medium" { (note) }
                div class="text-xs text-gray-500 dark:text-gray-400"
                {
                    (category)

                    @if let Some(account_name) = &row.account_name
                    {
                        " · "
                        span
                            class="inline-block w-2 h-2 rounded-full me-1"
                            style={ "background-color: " (row.account_color.as_deref().unwrap_or_default()) }
                        {}
                        (account_name)
                    }
                }
            }

            td class={ "px-4 py-2 text-right whitespace-nowrap " (amount_class(record.kind)) }
            {
                (signed_amount(record.kind, record.amount))
            }

            @if show_actions
            {
                td class="px-4 py-2 text-right whitespace-nowrap space-x-2"
                {
                    @if let Some(image_url) = &record.image_url
                    {
                        a href=(receipt_url(image_url)) target="_blank" class=(LINK_STYLE) { "Receipt" }
                    }

                    button
                        hx-delete=(format_endpoint(endpoints::TRANSACTION, record.id))
                        hx-confirm="Delete this transaction?"
                        hx-target="closest tr"
                        hx-swap="delete"
                        hx-target-error="#alert-container"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}

/// A table of transactions, newest first as given.
///
/// `show_actions` adds the receipt link and the delete button to each row.
pub fn transaction_table(rows: &[TransactionRow], show_actions: bool) -> Markup {
    html! {
        div class="overflow-x-auto w-full"
        {
            table class="w-full text-sm text-left text-gray-700 dark:text-gray-300"
            {
                tbody
                {
                    @for row in rows
                    {
                        (transaction_row(row, show_actions))
                    }

                    @if rows.is_empty()
                    {
                        tr
                        {
                            td class="px-4 py-6 text-center text-gray-500" colspan="4"
                            {
                                "No transactions found."
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::transaction::{
        TransactionKind,
        test_utils::{RowExt, expense, income},
    };

    use super::{format_date_label, format_note, receipt_url, signed_amount, transaction_table};

    #[test]
    fn formats_date_labels() {
        assert_eq!(format_date_label("2024-03-05"), "05-Mar-24");
        assert_eq!(format_date_label("2024-12-31 18:05"), "31-Dec-24 18:05");
        assert_eq!(format_date_label("not a date"), "not a date");
    }

    #[test]
    fn signs_amounts_by_kind() {
        assert_eq!(signed_amount(TransactionKind::Expense, 12.5), "-$12.50");
        assert_eq!(signed_amount(TransactionKind::Income, 1000.0), "+$1,000.00");
    }

    #[test]
    fn truncates_long_notes_by_grapheme() {
        let note = "🍕".repeat(40);

        let (truncated, full) = format_note(&note);

        assert_eq!(truncated, format!("{}...", "🍕".repeat(29)));
        assert_eq!(full, Some(note.as_str()));
        assert_eq!(format_note("Coffee"), ("Coffee".to_owned(), None));
    }

    #[test]
    fn receipt_url_encodes_key() {
        assert_eq!(receipt_url("1/1710460800000.jpg"), "/api/image?path=1%2F1710460800000.jpg");
    }

    #[test]
    fn table_shows_other_for_missing_category() {
        let rows = [
            expense(3.0).id(1).note("Coffee").category(1, "Food"),
            income(10.0).id(2).note("Refund"),
        ];

        let html = Html::parse_fragment(&transaction_table(&rows, false).into_string());

        let text: String = html.root_element().text().collect();
        assert!(text.contains("Food"));
        assert!(text.contains("Other"));
        assert_eq!(html.select(&Selector::parse("button").unwrap()).count(), 0);
    }

    #[test]
    fn actions_have_delete_buttons() {
        let rows = [expense(3.0).id(7)];

        let html = Html::parse_fragment(&transaction_table(&rows, true).into_string());

        let button = html
            .select(&Selector::parse("button[hx-delete]").unwrap())
            .next()
            .unwrap();
        assert_eq!(button.value().attr("hx-delete"), Some("/api/transactions/7"));
        assert_eq!(button.value().attr("hx-swap"), Some("delete"));
    }

    #[test]
    fn empty_table_says_so() {
        let html = Html::parse_fragment(&transaction_table(&[], true).into_string());

        let text: String = html.root_element().text().collect();
        assert!(text.contains("No transactions found."));
    }
}
