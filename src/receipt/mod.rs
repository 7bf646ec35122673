//! Receipt photos: where they are kept, how they are read, and how what was
//! read is filled into the transaction entry form.

mod blob;
mod gemini;
mod image_endpoint;
mod mapping;
mod ocr;
mod ocr_endpoint;

pub use blob::{Blob, BlobStore, LocalBlobStore, receipt_key};
pub use gemini::GeminiOcr;
pub use image_endpoint::get_image_endpoint;
pub use mapping::{TransactionFormState, apply_ocr_result};
pub use ocr::{OcrResult, OcrService};
pub use ocr_endpoint::{ocr_endpoint, read_receipt_endpoint};

#[cfg(test)]
pub use blob::MemoryBlobStore;
