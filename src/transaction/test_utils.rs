use scraper::ElementRef;

use crate::transaction::{TransactionKind, TransactionRecord, TransactionRow};

/// A transaction row with no note, account or category.
pub fn row(kind: TransactionKind, amount: f64, date: &str) -> TransactionRow {
    TransactionRow {
        record: TransactionRecord {
            id: 0,
            kind,
            amount,
            date: date.to_owned(),
            account_id: 1,
            category_id: None,
            note: None,
            image_url: None,
        },
        account_name: None,
        account_color: None,
        category_name: None,
    }
}

pub fn expense(amount: f64) -> TransactionRow {
    row(TransactionKind::Expense, amount, "2024-03-15")
}

pub fn income(amount: f64) -> TransactionRow {
    row(TransactionKind::Income, amount, "2024-03-15")
}

/// Builder style setters for test rows.
pub trait RowExt {
    fn id(self, id: i64) -> Self;
    fn note(self, note: &str) -> Self;
    fn account(self, id: i64, name: &str) -> Self;
    fn category(self, id: i64, name: &str) -> Self;
    fn date(self, date: &str) -> Self;
}

impl RowExt for TransactionRow {
    fn id(mut self, id: i64) -> Self {
        self.record.id = id;
        self
    }

    fn note(mut self, note: &str) -> Self {
        self.record.note = Some(note.to_owned());
        self
    }

    fn account(mut self, id: i64, name: &str) -> Self {
        self.record.account_id = id;
        self.account_name = Some(name.to_owned());
        self
    }

    fn category(mut self, id: i64, name: &str) -> Self {
        self.record.category_id = Some(id);
        self.category_name = Some(name.to_owned());
        self
    }

    fn date(mut self, date: &str) -> Self {
        self.record.date = date.to_owned();
        self
    }
}

#[track_caller]
pub fn assert_transaction_kind_inputs(form: &ElementRef, checked_kind: Option<&str>) {
    let selector = scraper::Selector::parse("input[type=radio][name=kind]").unwrap();
    let inputs = form.select(&selector).collect::<Vec<_>>();
    assert_eq!(
        inputs.len(),
        2,
        "want 2 transaction kind inputs, got {}",
        inputs.len()
    );

    let mut values = inputs
        .iter()
        .filter_map(|input| input.value().attr("value"))
        .collect::<Vec<_>>();
    values.sort_unstable();
    assert_eq!(
        values,
        vec!["expense", "income"],
        "want transaction kind values to be expense/income, got {values:?}"
    );

    let checked_count = inputs
        .iter()
        .filter(|input| input.value().attr("checked").is_some())
        .count();
    assert_eq!(
        checked_count, 1,
        "want exactly one transaction kind input checked, got {checked_count}"
    );

    if let Some(checked_kind) = checked_kind {
        let expected_checked = inputs.iter().any(|input| {
            input.value().attr("value") == Some(checked_kind)
                && input.value().attr("checked").is_some()
        });
        assert!(
            expected_checked,
            "want {checked_kind} to be checked, but it was not"
        );
    }
}
