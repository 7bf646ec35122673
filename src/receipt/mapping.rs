//! Fills the transaction entry form with the fields read from a receipt.

use crate::{
    account::AccountId,
    category::{Category, CategoryId},
    receipt::OcrResult,
    transaction::TransactionKind,
};

/// The values of the transaction entry form, as the user sees them.
///
/// Text fields hold exactly what was typed, so that an invalid value can be
/// shown back to the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFormState {
    pub kind: TransactionKind,
    pub amount: String,
    pub account_id: Option<AccountId>,
    pub category_id: Option<CategoryId>,
    pub note: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
}

/// Copy every usable field of `ocr` into `form`.
///
/// Missing, empty and zero values are skipped, so a field the receipt did not
/// show keeps whatever the user already entered. The category is matched
/// against `candidates` with [match_category].
pub fn apply_ocr_result(form: &mut TransactionFormState, ocr: &OcrResult, candidates: &[Category]) {
    if let Some(amount) = ocr.amount.filter(|amount| *amount != 0.0) {
        form.amount = amount.to_string();
    }

    if let Some(date) = ocr.date.as_deref().filter(|date| !date.is_empty()) {
        form.date = date.to_owned();
    }

    if let Some(note) = ocr.note.as_deref().filter(|note| !note.is_empty()) {
        form.note = note.to_owned();
    }

    if let Some(category) = ocr
        .category
        .as_deref()
        .filter(|category| !category.is_empty())
        .and_then(|category| match_category(form.kind, category, candidates))
    {
        form.category_id = Some(category.id);
    }
}

/// Find the first category of `kind` whose name contains `suggestion`, or is
/// contained in it, ignoring case.
///
/// Names that are substrings of each other can match the wrong category, e.g.
/// "Car" matches "Car Insurance" if that comes first.
pub fn match_category<'a>(
    kind: TransactionKind,
    suggestion: &str,
    candidates: &'a [Category],
) -> Option<&'a Category> {
    let suggestion = suggestion.to_lowercase();

    candidates
        .iter()
        .filter(|category| category.kind == kind)
        .find(|category| {
            let name = category.name.to_lowercase();
            name.contains(&suggestion) || suggestion.contains(&name)
        })
}

#[cfg(test)]
mod tests {
    use crate::{
        UserID,
        category::Category,
        receipt::OcrResult,
        transaction::TransactionKind,
    };

    use super::{TransactionFormState, apply_ocr_result, match_category};

    fn category(id: i64, name: &str, kind: TransactionKind) -> Category {
        Category {
            id,
            name: name.to_owned(),
            kind,
            user_id: Some(UserID::new(1)),
        }
    }

    fn candidates() -> Vec<Category> {
        vec![
            category(1, "Food & Dining", TransactionKind::Expense),
            category(2, "Transport", TransactionKind::Expense),
            category(3, "Salary", TransactionKind::Income),
        ]
    }

    fn filled_form() -> TransactionFormState {
        TransactionFormState {
            kind: TransactionKind::Expense,
            amount: "5".to_owned(),
            account_id: Some(1),
            category_id: Some(2),
            note: "typed by hand".to_owned(),
            date: "2024-03-01".to_owned(),
            time: "12:00".to_owned(),
        }
    }

    #[test]
    fn fills_every_field() {
        let mut form = TransactionFormState {
            kind: TransactionKind::Expense,
            ..Default::default()
        };
        let ocr = OcrResult {
            amount: Some(42.5),
            date: Some("2024-03-15".to_owned()),
            note: Some("Corner Cafe".to_owned()),
            category: Some("food".to_owned()),
        };

        apply_ocr_result(&mut form, &ocr, &candidates());

        assert_eq!(form.amount, "42.5");
        assert_eq!(form.date, "2024-03-15");
        assert_eq!(form.note, "Corner Cafe");
        assert_eq!(form.category_id, Some(1));
    }

    #[test]
    fn all_null_leaves_form_unchanged() {
        let mut form = filled_form();

        apply_ocr_result(&mut form, &OcrResult::default(), &candidates());

        assert_eq!(form, filled_form());
    }

    #[test]
    fn empty_and_zero_values_leave_form_unchanged() {
        let mut form = filled_form();
        let ocr = OcrResult {
            amount: Some(0.0),
            date: Some(String::new()),
            note: Some(String::new()),
            category: Some(String::new()),
        };

        apply_ocr_result(&mut form, &ocr, &candidates());

        assert_eq!(form, filled_form());
    }

    #[test]
    fn unmatched_category_keeps_current_category() {
        let mut form = filled_form();
        let ocr = OcrResult {
            category: Some("Pets".to_owned()),
            ..Default::default()
        };

        apply_ocr_result(&mut form, &ocr, &candidates());

        assert_eq!(form.category_id, Some(2));
    }

    #[test]
    fn matches_name_containing_suggestion() {
        let candidates = candidates();

        let got = match_category(TransactionKind::Expense, "food", &candidates);

        assert_eq!(got.map(|category| category.id), Some(1));
    }

    #[test]
    fn matches_name_contained_in_suggestion() {
        let candidates = candidates();

        let got = match_category(TransactionKind::Expense, "Public TRANSPORT fare", &candidates);

        assert_eq!(got.map(|category| category.id), Some(2));
    }

    #[test]
    fn only_matches_categories_of_the_same_kind() {
        let candidates = candidates();

        assert_eq!(
            match_category(TransactionKind::Expense, "salary", &candidates),
            None
        );
        assert_eq!(
            match_category(TransactionKind::Income, "salary", &candidates).map(|c| c.id),
            Some(3)
        );
    }

    #[test]
    fn first_match_in_list_order_wins() {
        let candidates = vec![
            category(1, "Car Insurance", TransactionKind::Expense),
            category(2, "Car", TransactionKind::Expense),
        ];

        let got = match_category(TransactionKind::Expense, "car", &candidates);

        assert_eq!(got.map(|category| category.id), Some(1));
    }
}
