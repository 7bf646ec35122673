//! Defines the endpoint for deleting a transaction.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    Error, UserID,
    alert::Alert,
    transaction::{
        TransactionId,
        core::{delete_transaction, get_transaction},
        create_endpoint::CreateTransactionState,
    },
};

/// Delete the transaction and return the key of its receipt image, if it had one.
fn delete_record(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Option<String>, Error> {
    let transaction = match get_transaction(transaction_id, user_id, connection) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Err(Error::DeleteMissingTransaction),
        Err(error) => return Err(error),
    };

    match delete_transaction(transaction_id, user_id, connection)? {
        0 => Err(Error::DeleteMissingTransaction),
        _ => Ok(transaction.image_url),
    }
}

/// A route handler for deleting a transaction, responds with an alert.
///
/// The receipt image of the transaction is deleted as well.
pub async fn delete_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let deleted = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| delete_record(transaction_id, user_id, &connection));

    let image_key = match deleted {
        Ok(image_key) => image_key,
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            return error.into_alert_response();
        }
    };

    if let Some(key) = image_key
        && let Err(error) = state.blob_store.delete(&key).await
    {
        tracing::error!("Could not delete receipt image {key}: {error}");
    }

    // The status code has to be 200 OK or HTMX will not delete the table row.
    Alert::SuccessSimple {
        message: "Transaction deleted successfully".to_owned(),
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash, UserID,
        account::{NewAccount, create_account},
        auth::create_user,
        db::initialize,
        receipt::{BlobStore, MemoryBlobStore},
        transaction::{
            TransactionKind, TransactionRecord,
            core::{create_transaction, get_transaction},
            create_endpoint::CreateTransactionState,
            delete_endpoint::delete_transaction_endpoint,
        },
    };

    fn get_state() -> (CreateTransactionState, Arc<MemoryBlobStore>, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        create_account(&NewAccount::new("Wallet"), user.id, &connection).unwrap();
        let blob_store = Arc::new(MemoryBlobStore::default());

        (
            CreateTransactionState {
                db_connection: Arc::new(Mutex::new(connection)),
                blob_store: blob_store.clone(),
            },
            blob_store,
            user.id,
        )
    }

    #[tokio::test]
    async fn deletes_transaction_and_receipt() {
        let (state, blob_store, user_id) = get_state();
        let key = format!("{user_id}/1.jpg");
        blob_store.put(&key, vec![1]).await.unwrap();
        let transaction = create_transaction(
            TransactionRecord::build(TransactionKind::Expense, 5.0, "2024-03-15", 1)
                .image_url(Some(key)),
            user_id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(transaction.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            get_transaction(transaction.id, user_id, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
        assert!(blob_store.keys().is_empty());
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let (state, _, user_id) = get_state();

        let response =
            delete_transaction_endpoint(State(state), Extension(user_id), Path(42)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cannot_delete_other_users_transaction() {
        let (state, _, user_id) = get_state();
        let transaction = create_transaction(
            TransactionRecord::build(TransactionKind::Income, 5.0, "2024-03-15", 1),
            user_id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Extension(UserID::new(user_id.as_i64() + 1)),
            Path(transaction.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(
            get_transaction(transaction.id, user_id, &state.db_connection.lock().unwrap())
                .is_ok()
        );
    }
}
