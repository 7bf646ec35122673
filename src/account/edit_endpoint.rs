//! Defines the endpoint for renaming or recolouring an account.

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    Error, UserID,
    account::{
        core::{AccountId, update_account},
        create_endpoint::{AccountForm, AccountState},
    },
    endpoints,
};

/// A route handler for updating an account, redirects to the profile view on success.
pub async fn edit_account_endpoint(
    State(state): State<AccountState>,
    Extension(user_id): Extension<UserID>,
    Path(account_id): Path<AccountId>,
    Form(form): Form<AccountForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_account(account_id, &form.to_new_account(), user_id, &connection) {
        Ok(0) => Error::UpdateMissingAccount.into_alert_response(),
        Ok(_) => (
            HxRedirect(endpoints::PROFILE_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::debug!("Could not update account {account_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;

    use crate::{
        PasswordHash, UserID,
        account::{
            NewAccount, create_account,
            create_endpoint::{AccountForm, AccountState},
            edit_account_endpoint, get_account,
        },
        auth::create_user,
        db::initialize,
    };

    fn get_state() -> (AccountState, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user("a@b.c", PasswordHash::new_unchecked("hunter2"), &conn).unwrap();

        (
            AccountState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn can_rename_account() {
        let (state, user_id) = get_state();
        let account = create_account(
            &NewAccount::new("Wallet"),
            user_id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        let form = AccountForm {
            name: "Purse".to_owned(),
            color: Some("#00FF00".to_owned()),
        };

        let response = edit_account_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(account.id),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let got = get_account(account.id, user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(got.name, "Purse");
        assert_eq!(got.color, "#00FF00");
    }

    #[tokio::test]
    async fn cannot_edit_another_users_account() {
        let (state, user_id) = get_state();
        let account = create_account(
            &NewAccount::new("Wallet"),
            user_id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        let form = AccountForm {
            name: "Stolen".to_owned(),
            color: None,
        };

        let response = edit_account_endpoint(
            State(state.clone()),
            Extension(UserID::new(user_id.as_i64() + 1)),
            Path(account.id),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let got = get_account(account.id, user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(got.name, "Wallet");
    }
}
