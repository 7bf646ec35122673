//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error, UserID,
    account::get_account,
    category::get_category,
    endpoints,
    receipt::{BlobStore, TransactionFormState, receipt_key},
    transaction::{
        NewTransaction, TransactionRecord,
        core::{create_transaction, parse_date_key},
        form::{parse_amount, read_transaction_multipart},
    },
};

/// The state needed to create a transaction.
#[derive(Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Where receipt images are saved.
    pub blob_store: Arc<dyn BlobStore>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            blob_store: state.blob_store.clone(),
        }
    }
}

fn not_found_as(error: Error, replacement: Error) -> Error {
    match error {
        Error::NotFound => replacement,
        error => error,
    }
}

/// Check the entry form and turn it into a transaction for `user_id`.
///
/// Fields are checked in the order the user sees the messages: amount,
/// account, category, then the date.
///
/// # Errors
/// Returns [Error::InvalidAmount], [Error::MissingAccount],
/// [Error::MissingCategory], [Error::InvalidDate] or
/// [Error::CategoryKindMismatch] for invalid input.
fn validate_form(
    form: &TransactionFormState,
    user_id: UserID,
    connection: &Connection,
) -> Result<NewTransaction, Error> {
    let amount = parse_amount(&form.amount)?;
    let account_id = form.account_id.ok_or(Error::MissingAccount)?;
    let category_id = form.category_id.ok_or(Error::MissingCategory)?;
    let date = parse_date_key(&form.date, &form.time)?;

    get_account(account_id, user_id, connection)
        .map_err(|error| not_found_as(error, Error::MissingAccount))?;
    let category = get_category(category_id, user_id, connection)
        .map_err(|error| not_found_as(error, Error::MissingCategory))?;

    if category.kind != form.kind {
        return Err(Error::CategoryKindMismatch);
    }

    let note = form.note.trim();

    Ok(
        TransactionRecord::build(form.kind, amount, &date, account_id)
            .category_id(Some(category_id))
            .note((!note.is_empty()).then_some(note)),
    )
}

/// A route handler for creating a new transaction, redirects to transactions view on success.
///
/// The receipt image, if any, is saved before the transaction. It is deleted
/// again if the transaction cannot be saved.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    multipart: Multipart,
) -> Response {
    let submission = match read_transaction_multipart(multipart).await {
        Ok(submission) => submission,
        Err(error) => {
            tracing::warn!("Could not read transaction form: {error}");
            return error.into_alert_response();
        }
    };

    if let Some(Err(error)) = submission.image.as_ref().map(|image| image.validate()) {
        return error.into_alert_response();
    }

    let validated = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| validate_form(&submission.form, user_id, &connection));

    let transaction = match validated {
        Ok(transaction) => transaction,
        Err(error) => {
            tracing::debug!("Rejected transaction form {:?}: {error}", submission.form);
            return error.into_alert_response();
        }
    };

    let image_key = match submission.image {
        Some(image) => {
            let key = receipt_key(user_id, &image.file_name, OffsetDateTime::now_utc());

            if let Err(error) = state.blob_store.put(&key, image.bytes.to_vec()).await {
                tracing::error!("Could not save receipt image {key}: {error}");
                return error.into_alert_response();
            }

            Some(key)
        }
        None => None,
    };

    let created = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| {
            create_transaction(transaction.image_url(image_key.clone()), user_id, &connection)
        });

    match created {
        Ok(record) => {
            tracing::info!("User {user_id} created transaction {}", record.id);

            (
                HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not create transaction: {error}");

            if let Some(key) = image_key
                && let Err(delete_error) = state.blob_store.delete(&key).await
            {
                tracing::error!("Could not delete orphaned receipt image {key}: {delete_error}");
            }

            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, http::StatusCode, routing::post};
    use axum_test::{
        TestServer,
        multipart::{MultipartForm, Part},
    };
    use rusqlite::Connection;

    use crate::{
        PasswordHash, UserID,
        account::{AccountId, NewAccount, create_account},
        auth::create_user,
        db::initialize,
        endpoints,
        receipt::MemoryBlobStore,
        transaction::{
            TransactionKind,
            core::get_transaction_rows,
            create_endpoint::{CreateTransactionState, create_transaction_endpoint},
        },
    };

    /// The built-in "Food" expense category.
    const FOOD: &str = "1";
    /// The built-in "Salary" income category.
    const SALARY: &str = "8";

    struct Fixture {
        server: TestServer,
        state: CreateTransactionState,
        blob_store: Arc<MemoryBlobStore>,
        user_id: UserID,
        account_id: AccountId,
    }

    fn fixture() -> Fixture {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let account = create_account(&NewAccount::new("Wallet"), user.id, &connection).unwrap();

        let blob_store = Arc::new(MemoryBlobStore::default());
        let state = CreateTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            blob_store: blob_store.clone(),
        };

        let app = Router::new()
            .route(endpoints::TRANSACTIONS_API, post(create_transaction_endpoint))
            .layer(Extension(user.id))
            .with_state(state.clone());

        Fixture {
            server: TestServer::try_new(app).expect("Could not create test server."),
            state,
            blob_store,
            user_id: user.id,
            account_id: account.id,
        }
    }

    fn valid_form(account_id: AccountId) -> MultipartForm {
        MultipartForm::new()
            .add_text("kind", "expense")
            .add_text("amount", "12.50")
            .add_text("account_id", account_id.to_string())
            .add_text("category_id", FOOD)
            .add_text("date", "2024-03-15")
            .add_text("time", "09:30")
            .add_text("note", " Morning coffee ")
    }

    fn count_rows(fixture: &Fixture) -> usize {
        let connection = fixture.state.db_connection.lock().unwrap();
        get_transaction_rows(fixture.user_id, &connection)
            .unwrap()
            .len()
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let fixture = fixture();

        let response = fixture
            .server
            .post(endpoints::TRANSACTIONS_API)
            .multipart(valid_form(fixture.account_id))
            .await;

        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(response.header("hx-redirect"), endpoints::TRANSACTIONS_VIEW);

        let connection = fixture.state.db_connection.lock().unwrap();
        let rows = get_transaction_rows(fixture.user_id, &connection).unwrap();
        assert_eq!(rows.len(), 1);
        let record = &rows[0].record;
        assert_eq!(record.kind, TransactionKind::Expense);
        assert_eq!(record.amount, 12.5);
        assert_eq!(record.date, "2024-03-15 09:30");
        assert_eq!(record.note.as_deref(), Some("Morning coffee"));
        assert_eq!(record.category_id, Some(1));
        assert_eq!(record.image_url, None);
    }

    #[tokio::test]
    async fn saves_receipt_image() {
        let fixture = fixture();
        let form = valid_form(fixture.account_id).add_part(
            "image",
            Part::bytes(vec![0xFF, 0xD8, 0xFF])
                .file_name("receipt.jpg")
                .mime_type("image/jpeg"),
        );

        let response = fixture
            .server
            .post(endpoints::TRANSACTIONS_API)
            .multipart(form)
            .await;

        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        let keys = fixture.blob_store.keys();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with(&format!("{}/", fixture.user_id)));
        assert!(keys[0].ends_with(".jpg"));

        let connection = fixture.state.db_connection.lock().unwrap();
        let rows = get_transaction_rows(fixture.user_id, &connection).unwrap();
        assert_eq!(rows[0].record.image_url.as_deref(), Some(keys[0].as_str()));
    }

    #[tokio::test]
    async fn rejects_invalid_fields_without_saving() {
        let fixture = fixture();
        let account_id = fixture.account_id.to_string();
        let cases = [
            ("amount", "0"),
            ("amount", ""),
            ("account_id", ""),
            ("account_id", "999"),
            ("category_id", ""),
            ("category_id", SALARY),
            ("date", "15/03/2024"),
        ];

        for (field, value) in cases {
            let mut form = MultipartForm::new();
            for (name, default) in [
                ("kind", "expense"),
                ("amount", "12.50"),
                ("account_id", account_id.as_str()),
                ("category_id", FOOD),
                ("date", "2024-03-15"),
            ] {
                form = form.add_text(name, if name == field { value } else { default });
            }

            let response = fixture
                .server
                .post(endpoints::TRANSACTIONS_API)
                .multipart(form)
                .await;

            assert_eq!(
                response.status_code(),
                StatusCode::UNPROCESSABLE_ENTITY,
                "{field}={value:?}"
            );
        }

        assert_eq!(count_rows(&fixture), 0);
    }

    #[tokio::test]
    async fn rejects_other_files_than_images() {
        let fixture = fixture();
        let form = valid_form(fixture.account_id).add_part(
            "image",
            Part::bytes(b"%PDF-1.4".to_vec())
                .file_name("receipt.pdf")
                .mime_type("application/pdf"),
        );

        let response = fixture
            .server
            .post(endpoints::TRANSACTIONS_API)
            .multipart(form)
            .await;

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(fixture.blob_store.keys().is_empty());
        assert_eq!(count_rows(&fixture), 0);
    }

    #[tokio::test]
    async fn deletes_image_when_insert_fails() {
        let fixture = fixture();
        fixture
            .state
            .db_connection
            .lock()
            .unwrap()
            .execute("DROP TABLE \"transaction\"", ())
            .unwrap();
        let form = valid_form(fixture.account_id).add_part(
            "image",
            Part::bytes(vec![1, 2, 3])
                .file_name("receipt.png")
                .mime_type("image/png"),
        );

        let response = fixture
            .server
            .post(endpoints::TRANSACTIONS_API)
            .multipart(form)
            .await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(fixture.blob_store.keys().is_empty());
    }
}
