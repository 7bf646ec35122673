//! Reads the multipart transaction form, which carries the form fields and an
//! optional photo of the receipt.

use axum::{body::Bytes, extract::Multipart};

use crate::{Error, receipt::TransactionFormState, transaction::TransactionKind};

/// The largest receipt image accepted, 10 MiB.
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// A receipt image sent with the transaction form.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedImage {
    /// The name of the file on the user's device.
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedImage {
    /// Check the upload is an image no larger than [MAX_IMAGE_SIZE].
    ///
    /// # Errors
    /// Returns [Error::InvalidImage] or [Error::ImageTooLarge].
    pub fn validate(&self) -> Result<(), Error> {
        if !self.content_type.starts_with("image/") {
            return Err(Error::InvalidImage(self.content_type.clone()));
        }

        if self.bytes.len() > MAX_IMAGE_SIZE {
            return Err(Error::ImageTooLarge(MAX_IMAGE_SIZE));
        }

        Ok(())
    }
}

/// The fields of a submitted transaction form.
#[derive(Debug, Default)]
pub struct TransactionSubmission {
    pub form: TransactionFormState,
    /// `None` when no file was chosen.
    pub image: Option<UploadedImage>,
}

fn parse_id(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

/// Read the transaction form from a multipart body.
///
/// Unknown fields are ignored. An ID that is empty or not a number is read as
/// `None`, so that validation reports it as not chosen.
///
/// # Errors
/// Returns [Error::MultipartError] if the body cannot be read.
pub async fn read_transaction_multipart(
    mut multipart: Multipart,
) -> Result<TransactionSubmission, Error> {
    let mut submission = TransactionSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_owned();

        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let content_type = field.content_type().unwrap_or_default().to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|error| Error::MultipartError(error.to_string()))?;

            if !bytes.is_empty() {
                submission.image = Some(UploadedImage {
                    file_name,
                    content_type,
                    bytes,
                });
            }

            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|error| Error::MultipartError(error.to_string()))?;
        let form = &mut submission.form;

        match name.as_str() {
            "kind" => form.kind = text.parse().unwrap_or(TransactionKind::Expense),
            "amount" => form.amount = text,
            "account_id" => form.account_id = parse_id(&text),
            "category_id" => form.category_id = parse_id(&text),
            "note" => form.note = text,
            "date" => form.date = text,
            "time" => form.time = text,
            _ => {}
        }
    }

    Ok(submission)
}

/// Parse the amount typed into the form.
///
/// # Errors
/// Returns [Error::InvalidAmount] unless the amount is a number greater than zero.
pub fn parse_amount(amount: &str) -> Result<f64, Error> {
    amount
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount > 0.0)
        .ok_or(Error::InvalidAmount)
}
