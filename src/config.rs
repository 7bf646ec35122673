//! Settings for the receipt OCR service read from the environment.

/// The Gemini model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// How to reach the OCR service.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrConfig {
    /// The API key sent with every request.
    pub api_key: String,
    /// The name of the model that reads the receipts.
    pub model: String,
}

impl OcrConfig {
    /// Read `GEMINI_API_KEY` and `GEMINI_MODEL`.
    ///
    /// Returns `None` if no API key is set, which disables OCR.
    pub fn from_env() -> Option<Self> {
        Self::from_values(
            std::env::var("GEMINI_API_KEY").ok(),
            std::env::var("GEMINI_MODEL").ok(),
        )
    }

    fn from_values(api_key: Option<String>, model: Option<String>) -> Option<Self> {
        let api_key = api_key.filter(|key| !key.trim().is_empty())?;
        let model = model
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_owned());

        Some(Self { api_key, model })
    }
}
