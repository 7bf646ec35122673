//! Defines the endpoint for deleting a category.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    Error, UserID,
    alert::Alert,
    category::{
        core::{CategoryId, delete_category},
        create_endpoint::CategoryState,
    },
};

/// A route handler for deleting one of the user's categories, responds with an alert.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_category(category_id, user_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the row.
        Ok(()) => Alert::SuccessSimple {
            message: "Category deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::debug!("Could not delete category {category_id}: {error}");
            error.into_alert_response()
        }
    }
}
