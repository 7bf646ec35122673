//! Defines the endpoint for renaming a category.

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    Error, UserID,
    category::{
        core::{CategoryId, CategoryName, update_category},
        create_endpoint::{CategoryForm, CategoryState},
    },
    endpoints,
};

/// A route handler for updating one of the user's categories, redirects to the profile view on success.
///
/// Built-in categories are read-only.
pub async fn edit_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_category(category_id, &name, form.kind, user_id, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::PROFILE_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::debug!("Could not update category {category_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        category::{
            CategoryName, create_category,
            create_endpoint::CategoryForm,
            edit_category_endpoint, get_category,
            test_state::get_state,
        },
        transaction::TransactionKind,
    };

    #[tokio::test]
    async fn can_rename_own_category() {
        let (state, user_id) = get_state();
        let category = create_category(
            &CategoryName::new("Coffee").unwrap(),
            TransactionKind::Expense,
            user_id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        let form = CategoryForm {
            name: "Tea".to_owned(),
            kind: TransactionKind::Expense,
        };

        let response = edit_category_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(category.id),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let got =
            get_category(category.id, user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(got.name, "Tea");
    }

    #[tokio::test]
    async fn cannot_edit_built_in_category() {
        let (state, user_id) = get_state();
        let form = CategoryForm {
            name: "Groceries".to_owned(),
            kind: TransactionKind::Expense,
        };

        let response =
            edit_category_endpoint(State(state.clone()), Extension(user_id), Path(1), Form(form))
                .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let got = get_category(1, user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(got.name, "Food");
    }
}
