//! Defines the endpoint for creating a new category.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, UserID,
    category::core::{CategoryName, create_category},
    endpoints,
    transaction::TransactionKind,
};

/// The state needed to manage categories.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating or editing a category.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    /// The display name of the category.
    pub name: String,
    /// Whether the category is for income or expenses.
    pub kind: TransactionKind,
}

/// A route handler for creating a new category, redirects to the profile view on success.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
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

    if let Err(error) = create_category(&name, form.kind, user_id, &connection) {
        tracing::error!("Could not create category with {form:?}: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::PROFILE_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
