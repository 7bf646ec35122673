//! Endpoints that read receipts with the OCR service.
//!
//! `POST /api/ocr` returns the raw fields as JSON. `POST /api/receipt` takes
//! the entry form with a receipt photo and returns the form filled in with the
//! fields read from the photo.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::{HxReswap, SwapOption};
use base64::{Engine, prelude::BASE64_STANDARD};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error, UserID,
    account::get_accounts,
    category::{Category, get_categories},
    generation::RequestGenerations,
    receipt::{OcrResult, OcrService, apply_ocr_result},
    transaction::{
        TransactionKind, UploadedImage, read_transaction_multipart, transaction_form,
    },
};

/// The state needed to read receipts.
#[derive(Clone)]
pub struct OcrState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// `None` when no OCR service is configured.
    pub ocr_service: Option<Arc<dyn OcrService>>,
    pub ocr_generations: Arc<RequestGenerations>,
}

impl FromRef<AppState> for OcrState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            ocr_service: state.ocr_service.clone(),
            ocr_generations: state.ocr_generations.clone(),
        }
    }
}

/// The body of a request to `POST /api/ocr`.
#[derive(Debug, Deserialize)]
pub struct OcrImageRequest {
    /// A base64 encoded image, optionally as a data URL.
    pub image: Option<String>,
}

/// The names of the categories of `kind`, offered to the OCR service as suggestions.
fn category_names(categories: &[Category], kind: TransactionKind) -> Vec<String> {
    categories
        .iter()
        .filter(|category| category.kind == kind)
        .map(|category| category.name.clone())
        .collect()
}

/// A route handler that reads the receipt in the JSON body and responds with
/// the extracted fields as JSON.
pub async fn ocr_endpoint(
    State(state): State<OcrState>,
    Extension(user_id): Extension<UserID>,
    Json(request): Json<OcrImageRequest>,
) -> Response {
    let Some(image) = request.image.filter(|image| !image.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No image provided" })),
        )
            .into_response();
    };

    let Some(ocr_service) = state.ocr_service else {
        tracing::error!("Receipt scanning requested but no OCR API key is configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "API key not configured" })),
        )
            .into_response();
    };

    let names = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| get_categories(user_id, &connection))
        .map(|categories| category_names(&categories, TransactionKind::Expense))
        .unwrap_or_else(|error| {
            tracing::warn!("Could not load category suggestions for OCR: {error}");
            Vec::new()
        });

    match ocr_service.extract(&image, &names).await {
        Ok(result) => Json(result).into_response(),
        Err(error) => {
            tracing::error!("OCR failed: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "OCR failed", "details": error.to_string() })),
            )
                .into_response()
        }
    }
}

/// Check the uploaded receipt photo and read it with `ocr_service`.
async fn read_receipt(
    ocr_service: Option<&dyn OcrService>,
    image: Option<UploadedImage>,
    category_names: &[String],
) -> Result<OcrResult, Error> {
    let image =
        image.ok_or_else(|| Error::MultipartError("no receipt image was uploaded".to_owned()))?;
    image.validate()?;
    let ocr_service = ocr_service.ok_or(Error::OcrNotConfigured)?;

    ocr_service
        .extract(&BASE64_STANDARD.encode(&image.bytes), category_names)
        .await
}

/// The message shown above the entry form when a receipt could not be read.
fn ocr_notice(error: &Error) -> &'static str {
    match error {
        Error::MultipartError(_) => "Choose a photo of the receipt to scan.",
        Error::OcrNotConfigured => "Receipt scanning is not set up. Fill in the form by hand.",
        Error::InvalidImage(_) => "The chosen file is not an image.",
        Error::ImageTooLarge(_) => "The chosen image is too large to scan.",
        _ => "Could not read the receipt. Fill in the form by hand or try another photo.",
    }
}

/// A route handler that reads the receipt photo in the entry form and responds
/// with the form filled in with what was read.
///
/// The fields the user already filled in are kept unless the receipt has a
/// value for them. If the receipt cannot be read the form is returned as it
/// was, with a notice. If the user chose another photo while this one was
/// being read, the reply is dropped so that it cannot overwrite the newer one.
pub async fn read_receipt_endpoint(
    State(state): State<OcrState>,
    Extension(user_id): Extension<UserID>,
    multipart: Multipart,
) -> Response {
    let submission = match read_transaction_multipart(multipart).await {
        Ok(submission) => submission,
        Err(error) => {
            tracing::warn!("Could not read receipt form: {error}");
            return error.into_alert_response();
        }
    };
    let generation = state.ocr_generations.begin(user_id);

    let loaded = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| {
            Ok((
                get_accounts(user_id, &connection)?,
                get_categories(user_id, &connection)?,
            ))
        });
    let (accounts, categories) = match loaded {
        Ok(loaded) => loaded,
        Err(error) => {
            tracing::error!("Could not load accounts and categories: {error}");
            return error.into_alert_response();
        }
    };

    let mut form = submission.form;
    let names = category_names(&categories, form.kind);
    let extracted = read_receipt(state.ocr_service.as_deref(), submission.image, &names).await;

    if !state.ocr_generations.is_latest(user_id, generation) {
        tracing::debug!("Dropping OCR reply {generation} for user {user_id}, a newer one is pending");
        return (HxReswap(SwapOption::None), StatusCode::NO_CONTENT).into_response();
    }

    let notice = match extracted {
        Ok(result) => {
            apply_ocr_result(&mut form, &result, &categories);
            None
        }
        Err(error) => {
            tracing::warn!("Could not read receipt: {error}");
            Some(ocr_notice(&error))
        }
    };

    transaction_form(
        &form,
        &accounts,
        &categories,
        state.ocr_service.is_some(),
        notice,
    )
    .into_response()
}
