//! Spendwise is a web app for recording income and expenses, organising them
//! by account and category, and viewing summaries of where the money went.
//!
//! This library provides a REST API that directly serves HTML pages.
//! Receipts can be photographed and the amount, date, note and category are
//! read from the image by an OCR service and filled into the entry form.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod account;
mod alert;
mod app_state;
mod auth;
mod category;
mod config;
mod db;
mod endpoints;
mod error;
mod generation;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod profile;
mod receipt;
mod routing;
mod summary;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use account::{NewAccount, create_account};
pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID, ValidatedPassword, create_user};
pub use config::OcrConfig;
pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::logging_middleware;
pub use receipt::{Blob, BlobStore, GeminiOcr, LocalBlobStore, OcrResult, OcrService};
pub use routing::build_router;
pub use timezone::is_valid_timezone;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
