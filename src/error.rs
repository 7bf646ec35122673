//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth cookie is missing from the cookie jar in the request.
    #[error("no auth cookie in the cookie jar")]
    CookieMissing,

    /// The auth cookie could not be parsed or has expired.
    #[error("invalid auth token: {0}")]
    InvalidToken(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string used to register a user is not an email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// A user with the email address is already registered.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// The transaction amount was missing, not a number, or not greater than zero.
    #[error("the amount must be a number greater than zero")]
    InvalidAmount,

    /// No account was chosen for a transaction.
    #[error("an account must be chosen")]
    MissingAccount,

    /// No category was chosen for a transaction.
    #[error("a category must be chosen")]
    MissingCategory,

    /// A transaction date or time was not in the `YYYY-MM-DD` and `HH:MM` formats.
    #[error("invalid date or time \"{0}\"")]
    InvalidDate(String),

    /// An empty string was used to name an account or category.
    #[error("name cannot be empty")]
    EmptyName,

    /// A display colour was not a hex colour such as `#6366F1`.
    #[error("\"{0}\" is not a hex colour")]
    InvalidColor(String),

    /// The category chosen for a transaction is for the other transaction type,
    /// e.g. an income category on an expense.
    #[error("the category does not match the transaction type")]
    CategoryKindMismatch,

    /// Tried to edit or delete one of the built-in categories.
    #[error("built-in categories cannot be changed")]
    BuiltInCategory,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The multipart form could not be read.
    #[error("could not parse multipart form: {0}")]
    MultipartError(String),

    /// The uploaded file is not an image.
    #[error("file is not an image: {0}")]
    InvalidImage(String),

    /// The uploaded image is larger than the upload limit.
    #[error("image is larger than {0} bytes")]
    ImageTooLarge(usize),

    /// A blob key was empty, absolute or tried to leave the blob store root.
    #[error("invalid blob key \"{0}\"")]
    InvalidBlobKey(String),

    /// The blob store could not read or write a blob.
    #[error("blob storage failed: {0}")]
    BlobStorage(String),

    /// No OCR API key was configured.
    #[error("the OCR service is not configured")]
    OcrNotConfigured,

    /// The OCR service could not be reached or returned an error status.
    #[error("the OCR request failed: {0}")]
    OcrRequest(String),

    /// The OCR service replied with something other than a JSON object.
    #[error("the OCR response could not be understood: {0}")]
    OcrResponseInvalid(String),

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update an account that does not exist
    #[error("tried to update an account that is not in the database")]
    UpdateMissingAccount,

    /// Tried to delete an account that does not exist
    #[error("tried to delete an account that is not in the database")]
    DeleteMissingAccount,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidAmount => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::ErrorSimple {
                    message: "Please enter an amount greater than zero".to_owned(),
                },
            ),
            Error::MissingAccount => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::ErrorSimple {
                    message: "Please choose an account".to_owned(),
                },
            ),
            Error::MissingCategory => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::ErrorSimple {
                    message: "Please choose a category".to_owned(),
                },
            ),
            Error::InvalidDate(value) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Invalid date".to_owned(),
                    details: format!(
                        "\"{value}\" is not a valid date and time. \
                        Use a date like 2024-03-15 and a time like 09:30."
                    ),
                },
            ),
            Error::CategoryKindMismatch => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Category does not match".to_owned(),
                    details: "Choose an income category for income and an expense category \
                        for expenses."
                        .to_owned(),
                },
            ),
            Error::EmptyName => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::ErrorSimple {
                    message: "Name cannot be empty".to_owned(),
                },
            ),
            Error::InvalidColor(color) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Invalid colour".to_owned(),
                    details: format!("\"{color}\" is not a hex colour like #6366F1."),
                },
            ),
            Error::InvalidImage(content_type) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Not an image".to_owned(),
                    details: format!(
                        "The uploaded file has the type \"{content_type}\". \
                        Choose a photo or image file instead."
                    ),
                },
            ),
            Error::ImageTooLarge(limit) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Alert::Error {
                    message: "Image too large".to_owned(),
                    details: format!(
                        "Images must be no larger than {} MiB.",
                        limit / (1024 * 1024)
                    ),
                },
            ),
            Error::MultipartError(_) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not read the form".to_owned(),
                    details: "The submitted form was incomplete. Try again.".to_owned(),
                },
            ),
            Error::BuiltInCategory => (
                StatusCode::FORBIDDEN,
                Alert::Error {
                    message: "Built-in category".to_owned(),
                    details: "Built-in categories cannot be edited or deleted.".to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The account or category could not be found. \
                        Try refreshing the page."
                        .to_owned(),
                },
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete transaction".to_owned(),
                    details: "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingAccount => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update account".to_owned(),
                    details: "The account could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingAccount => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete account".to_owned(),
                    details: "The account could not be found. \
                    Try refreshing the page to see if the account has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingCategory => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update category".to_owned(),
                    details: "The category could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingCategory => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete category".to_owned(),
                    details: "The category could not be found. \
                    Try refreshing the page to see if the category has already been deleted."
                        .to_owned(),
                },
            ),
            Error::OcrNotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Receipt scanning is unavailable".to_owned(),
                    details: "No OCR API key has been configured on the server. \
                        Fill in the form by hand."
                        .to_owned(),
                },
            ),
            error @ (Error::OcrRequest(_) | Error::OcrResponseInvalid(_)) => {
                tracing::error!("OCR failed: {error}");
                (
                    StatusCode::BAD_GATEWAY,
                    Alert::Error {
                        message: "Could not read the receipt".to_owned(),
                        details: "The receipt could not be read. \
                            Fill in the form by hand or try another photo."
                            .to_owned(),
                    },
                )
            }
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
