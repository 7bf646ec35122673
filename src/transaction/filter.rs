//! Narrows a list of transactions down by free text search and a date range.

use serde::Deserialize;

use crate::{
    summary::{Summary, summarize},
    transaction::TransactionRow,
};

/// What to look for in a list of transactions.
///
/// Every criterion that is set must match. Empty strings count as not set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FilterCriteria {
    /// Text to find in the note, account name or category name, ignoring case.
    #[serde(default)]
    pub search: String,
    /// The earliest date key to keep, inclusive.
    pub date_from: Option<String>,
    /// The latest date key to keep, inclusive.
    pub date_to: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|haystack| haystack.to_lowercase().contains(needle))
}

fn matches_search(row: &TransactionRow, needle: &str) -> bool {
    contains_ignore_case(row.record.note.as_deref(), needle)
        || contains_ignore_case(row.account_name.as_deref(), needle)
        || contains_ignore_case(row.category_name.as_deref(), needle)
}

/// Date keys compare chronologically as strings. A date-only upper bound
/// covers the whole day, so only as much of the key as the bound is long is compared.
fn is_on_or_before(date_key: &str, date_to: &str) -> bool {
    let date_key = date_key.get(..date_to.len()).unwrap_or(date_key);

    date_key <= date_to
}

/// Return the rows that match every criterion in `criteria`, in their original order.
pub fn filter_transactions(
    rows: &[TransactionRow],
    criteria: &FilterCriteria,
) -> Vec<TransactionRow> {
    let needle = criteria.search.trim().to_lowercase();
    let date_from = non_empty(&criteria.date_from);
    let date_to = non_empty(&criteria.date_to);

    rows.iter()
        .filter(|row| needle.is_empty() || matches_search(row, &needle))
        .filter(|row| date_from.is_none_or(|from| row.record.date.as_str() >= from))
        .filter(|row| date_to.is_none_or(|to| is_on_or_before(&row.record.date, to)))
        .cloned()
        .collect()
}

/// A list of transactions with the current filter and the values derived from it.
///
/// The rows are fetched once per request. Changing the criteria recomputes the
/// filtered rows and their summary straight away, so they always agree with each other.
#[derive(Debug, Clone, Default)]
pub struct TransactionListState {
    rows: Vec<TransactionRow>,
    criteria: FilterCriteria,
    filtered: Vec<TransactionRow>,
    summary: Summary,
}

impl TransactionListState {
    pub fn new(rows: Vec<TransactionRow>, criteria: FilterCriteria) -> Self {
        let mut state = Self {
            rows,
            criteria,
            ..Default::default()
        };
        state.recompute();

        state
    }

    /// Change the filter.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.filtered = filter_transactions(&self.rows, &self.criteria);
        self.summary = summarize(&self.filtered);
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// The rows that match the criteria.
    pub fn filtered(&self) -> &[TransactionRow] {
        &self.filtered
    }

    /// The totals of the filtered rows.
    pub fn summary(&self) -> Summary {
        self.summary
    }
}

#[cfg(test)]
mod filter_tests {
    use crate::transaction::{
        TransactionKind, TransactionRow,
        filter::{FilterCriteria, filter_transactions},
        test_utils::{RowExt, expense, income, row},
    };

    fn sample_rows() -> Vec<TransactionRow> {
        vec![
            expense(4.5)
                .id(1)
                .note("Morning Coffee")
                .account(1, "Wallet")
                .date("2024-03-15 08:30"),
            expense(80.0)
                .id(2)
                .note("Weekly shop")
                .account(1, "Wallet")
                .category(1, "Groceries")
                .date("2024-02-28"),
            income(2500.0)
                .id(3)
                .account(2, "Bank")
                .category(8, "Salary")
                .date("2024-03-31 18:00"),
            row(TransactionKind::Expense, 12.0, "2024-04-01")
                .id(4)
                .account(2, "Bank"),
        ]
    }

    fn ids(rows: &[TransactionRow]) -> Vec<i64> {
        rows.iter().map(|row| row.record.id).collect()
    }

    fn search(text: &str) -> FilterCriteria {
        FilterCriteria {
            search: text.to_owned(),
            ..Default::default()
        }
    }

    fn date_range(from: Option<&str>, to: Option<&str>) -> FilterCriteria {
        FilterCriteria {
            date_from: from.map(ToOwned::to_owned),
            date_to: to.map(ToOwned::to_owned),
            ..Default::default()
        }
    }

    #[test]
    fn empty_criteria_keeps_everything() {
        let rows = sample_rows();

        assert_eq!(filter_transactions(&rows, &FilterCriteria::default()), rows);
    }

    #[test]
    fn filtering_is_idempotent() {
        let rows = sample_rows();
        let criteria_list = [
            search("wallet"),
            date_range(Some("2024-03-01"), Some("2024-03-31")),
            FilterCriteria {
                search: "b".to_owned(),
                date_from: Some("2024-03-01".to_owned()),
                date_to: None,
            },
        ];

        for criteria in criteria_list {
            let once = filter_transactions(&rows, &criteria);
            let twice = filter_transactions(&once, &criteria);

            assert_eq!(once, twice, "criteria {criteria:?}");
        }
    }

    #[test]
    fn search_matches_note_ignoring_case() {
        let got = filter_transactions(&sample_rows(), &search("coffee"));

        assert_eq!(ids(&got), [1]);
    }

    #[test]
    fn search_without_match_returns_nothing() {
        let rows = [expense(1.0).note("Lunch").account(1, "Wallet").category(1, "Food")];

        assert!(filter_transactions(&rows, &search("coffee")).is_empty());
    }

    #[test]
    fn search_matches_account_and_category_names() {
        assert_eq!(ids(&filter_transactions(&sample_rows(), &search("BANK"))), [3, 4]);
        assert_eq!(ids(&filter_transactions(&sample_rows(), &search("gRoC"))), [2]);
    }

    #[test]
    fn whitespace_search_does_not_filter() {
        let rows = sample_rows();

        assert_eq!(filter_transactions(&rows, &search("   ")), rows);
    }

    #[test]
    fn date_range_is_inclusive() {
        let got = filter_transactions(
            &sample_rows(),
            &date_range(Some("2024-03-01"), Some("2024-03-31")),
        );

        assert_eq!(ids(&got), [1, 3]);
    }

    #[test]
    fn date_range_excludes_earlier_and_includes_middle() {
        let rows = [
            expense(1.0).id(1).date("2024-02-28"),
            expense(1.0).id(2).date("2024-03-15"),
        ];

        let got = filter_transactions(&rows, &date_range(Some("2024-03-01"), Some("2024-03-31")));

        assert_eq!(ids(&got), [2]);
    }

    #[test]
    fn malformed_dates_fall_outside_a_range() {
        let rows = [
            expense(1.0).id(1).date(""),
            expense(1.0).id(2).date("garbage"),
            expense(1.0).id(3).date("2024-03-15"),
        ];

        let got = filter_transactions(&rows, &date_range(Some("2024-03-01"), Some("2024-03-31")));

        assert_eq!(ids(&got), [3]);
    }

    #[test]
    fn single_bounds_work_alone() {
        let rows = sample_rows();

        assert_eq!(
            ids(&filter_transactions(&rows, &date_range(Some("2024-03-16"), None))),
            [3, 4]
        );
        assert_eq!(
            ids(&filter_transactions(&rows, &date_range(None, Some("2024-03-15")))),
            [1, 2]
        );
    }

    #[test]
    fn empty_bounds_are_ignored() {
        let rows = sample_rows();

        assert_eq!(
            filter_transactions(&rows, &date_range(Some(""), Some(" "))),
            rows
        );
    }

    #[test]
    fn criteria_are_combined() {
        let criteria = FilterCriteria {
            search: "wallet".to_owned(),
            date_from: Some("2024-03-01".to_owned()),
            date_to: None,
        };

        assert_eq!(ids(&filter_transactions(&sample_rows(), &criteria)), [1]);
    }
}
