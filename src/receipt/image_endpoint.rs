//! Serves receipt images to the user that uploaded them.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, Error, UserID, receipt::BlobStore, transaction::user_owns_image};

/// How long browsers may cache a receipt image, in seconds.
const CACHE_MAX_AGE: u32 = 3600;

/// The state needed to serve receipt images.
#[derive(Clone)]
pub struct ImageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub blob_store: Arc<dyn BlobStore>,
}

impl FromRef<AppState> for ImageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            blob_store: state.blob_store.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    /// The blob store key of the image.
    pub path: Option<String>,
}

fn json_error(status_code: StatusCode, message: &str) -> Response {
    (status_code, Json(json!({ "error": message }))).into_response()
}

/// Whether `key` is one of `user_id`'s receipts.
fn is_owner(key: &str, user_id: UserID, connection: &Connection) -> Result<bool, Error> {
    if !key.starts_with(&format!("{user_id}/")) {
        return Ok(false);
    }

    user_owns_image(key, user_id, connection)
}

/// A route handler that responds with the receipt image stored under the `path` query parameter.
///
/// Images of other users are reported as missing.
pub async fn get_image_endpoint(
    State(state): State<ImageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ImageQuery>,
) -> Response {
    let Some(key) = query.path.filter(|path| !path.is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "Path required");
    };

    let owned = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| is_owner(&key, user_id, &connection));

    match owned {
        Ok(true) => {}
        Ok(false) => return json_error(StatusCode::NOT_FOUND, "File not found"),
        Err(error) => {
            tracing::error!("Could not check the owner of receipt {key}: {error}");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Could not load the file");
        }
    }

    match state.blob_store.get(&key).await {
        Ok(Some(blob)) => (
            [
                (header::CONTENT_TYPE, blob.content_type),
                (
                    header::CACHE_CONTROL,
                    format!("private, max-age={CACHE_MAX_AGE}"),
                ),
            ],
            blob.bytes,
        )
            .into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "File not found"),
        Err(error) => {
            tracing::error!("Could not read receipt {key}: {error}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Could not load the file")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        PasswordHash, UserID,
        account::{NewAccount, create_account},
        auth::create_user,
        db::initialize,
        endpoints,
        receipt::{BlobStore, MemoryBlobStore, image_endpoint::ImageState},
        transaction::{TransactionKind, TransactionRecord, create_transaction},
    };

    use super::get_image_endpoint;

    const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];

    async fn get_server() -> (TestServer, UserID, String) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let account = create_account(&NewAccount::new("Wallet"), user.id, &connection).unwrap();

        let key = format!("{}/1710495000000.jpg", user.id);
        let blob_store = Arc::new(MemoryBlobStore::default());
        blob_store.put(&key, JPEG_BYTES.to_vec()).await.unwrap();
        create_transaction(
            TransactionRecord::build(TransactionKind::Expense, 12.5, "2024-03-15", account.id)
                .image_url(Some(key.clone())),
            user.id,
            &connection,
        )
        .unwrap();

        let state = ImageState {
            db_connection: Arc::new(Mutex::new(connection)),
            blob_store,
        };

        (
            TestServer::try_new(
                Router::new()
                    .route(endpoints::IMAGE_API, get(get_image_endpoint))
                    .layer(Extension(user.id))
                    .with_state(state),
            )
            .unwrap(),
            user.id,
            key,
        )
    }

    #[tokio::test]
    async fn serves_own_receipt() {
        let (server, _, key) = get_server().await;

        let response = server
            .get(endpoints::IMAGE_API)
            .add_query_param("path", &key)
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "image/jpeg");
        assert_eq!(response.header("cache-control"), "private, max-age=3600");
        assert_eq!(response.as_bytes().as_ref(), JPEG_BYTES);
    }

    #[tokio::test]
    async fn missing_path_is_bad_request() {
        let (server, _, _) = get_server().await;

        let response = server.get(endpoints::IMAGE_API).await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_key_is_not_found() {
        let (server, user_id, _) = get_server().await;

        let response = server
            .get(endpoints::IMAGE_API)
            .add_query_param("path", format!("{user_id}/404.jpg"))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn other_users_receipt_is_not_found() {
        let (server, user_id, _) = get_server().await;
        let other_key = format!("{}/1710495000000.jpg", user_id.as_i64() + 1);

        let response = server
            .get(endpoints::IMAGE_API)
            .add_query_param("path", &other_key)
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}
