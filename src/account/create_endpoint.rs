//! Defines the endpoint for creating a new account.
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
    account::core::{DEFAULT_ACCOUNT_COLOR, NewAccount, create_account},
    endpoints,
};

/// The state needed to create or edit an account.
#[derive(Debug, Clone)]
pub struct AccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating or editing an account.
#[derive(Debug, Deserialize)]
pub struct AccountForm {
    /// The display name of the account.
    pub name: String,
    /// The hex colour of the account, the default colour if not given.
    pub color: Option<String>,
}

impl AccountForm {
    pub(super) fn to_new_account(&self) -> NewAccount {
        NewAccount::new(&self.name).color(
            self.color
                .as_deref()
                .filter(|color| !color.is_empty())
                .unwrap_or(DEFAULT_ACCOUNT_COLOR),
        )
    }
}

/// A route handler for creating a new account, redirects to the profile view on success.
pub async fn create_account_endpoint(
    State(state): State<AccountState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<AccountForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = create_account(&form.to_new_account(), user_id, &connection) {
        tracing::debug!("Could not create account with {form:?}: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::PROFILE_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
