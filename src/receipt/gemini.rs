//! An [OcrService] backed by the Gemini `generateContent` REST API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    Error, OcrConfig,
    receipt::ocr::{OcrResult, OcrService, parse_model_reply, strip_data_url_prefix},
};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Reads receipts with a Gemini model.
#[derive(Clone)]
pub struct GeminiOcr {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiOcr {
    /// Create a client for the model and API key in `config`.
    pub fn new(config: OcrConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key,
            model: config.model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_API_URL}/{}:generateContent", self.model)
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 2],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    InlineData {
        #[serde(rename = "mimeType")]
        mime_type: &'a str,
        data: &'a str,
    },
    Text(String),
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// The text of the first candidate, joined across its parts.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();

        (!text.trim().is_empty()).then_some(text)
    }
}

fn build_prompt(category_names: &[String]) -> String {
    let mut prompt = "Extract transaction information from this receipt or image. \
        Return ONLY a JSON object with: amount (number), date (YYYY-MM-DD format), \
        note (merchant or description), category (suggest a category based on the merchant name"
        .to_owned();

    if category_names.is_empty() {
        prompt.push(')');
    } else {
        prompt.push_str(": ");
        prompt.push_str(&category_names.join(", "));
        prompt.push(')');
    }

    prompt.push_str(". If a field cannot be extracted, return null for that field.");

    prompt
}

#[async_trait]
impl OcrService for GeminiOcr {
    async fn extract(
        &self,
        image_base64: &str,
        category_names: &[String],
    ) -> Result<OcrResult, Error> {
        let body = GenerateContentRequest {
            contents: [Content {
                parts: [
                    Part::InlineData {
                        mime_type: "image/jpeg",
                        data: strip_data_url_prefix(image_base64),
                    },
                    Part::Text(build_prompt(category_names)),
                ],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|error| Error::OcrRequest(error.to_string()))?;

        let reply: GenerateContentResponse = response
            .json()
            .await
            .map_err(|error| Error::OcrResponseInvalid(error.to_string()))?;

        let text = reply
            .text()
            .ok_or_else(|| Error::OcrResponseInvalid("the model returned no text".to_owned()))?;

        tracing::debug!("OCR reply: {text}");

        parse_model_reply(&text)
    }
}
