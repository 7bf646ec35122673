//! The `<option>` list for the category select of the transaction form.
//!
//! Only categories of the selected transaction kind are offered, so the list
//! is re-fetched when the user switches between income and expense.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
// axum_extra's Query reads the empty value of an unselected category as None.
use axum_extra::extract::Query;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error, UserID,
    category::{
        core::{Category, CategoryId, get_categories},
        create_endpoint::CategoryState,
    },
    transaction::TransactionKind,
};

/// Render the options for the categories of `kind`, marking `selected` as chosen.
pub fn category_options(
    categories: &[Category],
    kind: TransactionKind,
    selected: Option<CategoryId>,
) -> Markup {
    html! {
        option value="" selected[selected.is_none()] { "Select a category" }

        @for category in categories.iter().filter(|category| category.kind == kind) {
            option value=(category.id) selected[selected == Some(category.id)] {
                (category.name)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryOptionsQuery {
    #[serde(default)]
    pub kind: TransactionKind,
    pub category_id: Option<CategoryId>,
}

/// A route handler that returns the category options for a transaction kind.
pub async fn get_category_options(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<CategoryOptionsQuery>,
) -> Response {
    let categories = match state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| get_categories(user_id, &connection))
    {
        Ok(categories) => categories,
        Err(error) => {
            tracing::error!("Could not get categories for user {user_id}: {error}");
            return error.into_alert_response();
        }
    };

    // A category of the other kind is dropped from the selection.
    let selected = query.category_id.filter(|id| {
        categories
            .iter()
            .any(|category| category.id == *id && category.kind == query.kind)
    });

    category_options(&categories, query.kind, selected).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{Extension, extract::State};
    use axum_extra::extract::Query;
    use scraper::Selector;

    use crate::{
        category::{
            get_category_options, options_endpoint::CategoryOptionsQuery, test_state::get_state,
        },
        test_utils::parse_html_fragment,
        transaction::TransactionKind,
    };

    async fn get_option_names(query: CategoryOptionsQuery) -> Vec<String> {
        let (state, user_id) = get_state();
        let response = get_category_options(State(state), Extension(user_id), Query(query)).await;

        let html = parse_html_fragment(response).await;
        html.select(&Selector::parse("option").unwrap())
            .map(|option| option.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn returns_only_categories_of_kind() {
        let names = get_option_names(CategoryOptionsQuery {
            kind: TransactionKind::Income,
            category_id: None,
        })
        .await;

        assert_eq!(names, ["Select a category", "Salary", "Bonus", "Investment"]);
    }

    #[tokio::test]
    async fn keeps_selection_of_same_kind() {
        let (state, user_id) = get_state();
        let query = CategoryOptionsQuery {
            kind: TransactionKind::Expense,
            category_id: Some(2),
        };

        let response = get_category_options(State(state), Extension(user_id), Query(query)).await;

        let html = parse_html_fragment(response).await;
        let selected: Vec<_> = html
            .select(&Selector::parse("option[selected]").unwrap())
            .map(|option| option.value().attr("value").unwrap_or_default().to_owned())
            .collect();
        assert_eq!(selected, ["2"]);
    }

    #[tokio::test]
    async fn drops_selection_of_other_kind() {
        let (state, user_id) = get_state();
        let query = CategoryOptionsQuery {
            kind: TransactionKind::Income,
            category_id: Some(1),
        };

        let response = get_category_options(State(state), Extension(user_id), Query(query)).await;

        let html = parse_html_fragment(response).await;
        let selected: Vec<_> = html
            .select(&Selector::parse("option[selected]").unwrap())
            .map(|option| option.value().attr("value").unwrap_or_default().to_owned())
            .collect();
        assert_eq!(selected, [""]);
    }
}
