//! The fields read from a photo of a receipt, and the trait for services that read them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;

/// The transaction details found on a receipt.
///
/// Each field is `None` when the service could not read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    /// The total paid.
    pub amount: Option<f64>,
    /// The date of the purchase as `YYYY-MM-DD`.
    pub date: Option<String>,
    /// The merchant or a short description.
    pub note: Option<String>,
    /// A suggested category name.
    pub category: Option<String>,
}

/// Reads transaction details from receipt images.
#[async_trait]
pub trait OcrService: Send + Sync {
    /// Read the receipt in `image_base64`, a base64 encoded JPEG.
    ///
    /// `category_names` are offered to the service as suggestions for the category.
    async fn extract(
        &self,
        image_base64: &str,
        category_names: &[String],
    ) -> Result<OcrResult, Error>;
}

/// Remove the `data:image/jpeg;base64,` part of a data URL, leaving the base64 data.
///
/// Plain base64 is returned unchanged.
pub fn strip_data_url_prefix(image: &str) -> &str {
    image.split_once(',').map_or(image, |(_, data)| data)
}

/// Read an [OcrResult] from the text a language model replied with.
///
/// Models like to wrap JSON in prose or code fences, so everything from the
/// first `{` to the last `}` is parsed. Fields with the wrong type are read as
/// `None`. Amounts given as numeric strings, e.g. `"12.50"`, are accepted.
///
/// # Errors
/// Returns [Error::OcrResponseInvalid] if the reply does not contain a JSON object.
pub fn parse_model_reply(reply: &str) -> Result<OcrResult, Error> {
    let (Some(start), Some(end)) = (reply.find('{'), reply.rfind('}')) else {
        return Err(Error::OcrResponseInvalid(
            "the reply does not contain a JSON object".to_owned(),
        ));
    };

    if end < start {
        return Err(Error::OcrResponseInvalid(
            "the reply does not contain a JSON object".to_owned(),
        ));
    }

    let value: Value = serde_json::from_str(&reply[start..=end])
        .map_err(|error| Error::OcrResponseInvalid(error.to_string()))?;

    let Value::Object(fields) = value else {
        return Err(Error::OcrResponseInvalid(
            "the reply is not a JSON object".to_owned(),
        ));
    };

    Ok(OcrResult {
        amount: read_amount(&fields),
        date: read_string(&fields, "date"),
        note: read_string(&fields, "note"),
        category: read_string(&fields, "category"),
    })
}

fn read_amount(fields: &Map<String, Value>) -> Option<f64> {
    match fields.get("amount")? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn read_string(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(text) => Some(text.clone()),
        _ => None,
    }
}


#[cfg(test)]
mod parse_model_reply_tests {
    use crate::Error;

    use super::{OcrResult, parse_model_reply};

    #[test]
    fn reads_fenced_json() {
        let reply = "Here you go:\n```json\n{\"amount\": 12.5, \"date\": \"2024-03-15\", \
            \"note\": \"Cafe\", \"category\": \"Food\"}\n```";

        let got = parse_model_reply(reply).unwrap();

        assert_eq!(
            got,
            OcrResult {
                amount: Some(12.5),
                date: Some("2024-03-15".to_owned()),
                note: Some("Cafe".to_owned()),
                category: Some("Food".to_owned()),
            }
        );
    }

    #[test]
    fn nulls_are_none() {
        let got = parse_model_reply(
            r#"{"amount": null, "date": null, "note": null, "category": null}"#,
        )
        .unwrap();

        assert_eq!(got, OcrResult::default());
    }

    #[test]
    fn accepts_numeric_string_amount() {
        let got = parse_model_reply(r#"{"amount": " 99.90 "}"#).unwrap();

        assert_eq!(got.amount, Some(99.9));
    }

    #[test]
    fn wrong_types_are_none() {
        let got = parse_model_reply(r#"{"amount": "lots", "date": 20240315, "note": ["a"]}"#)
            .unwrap();

        assert_eq!(got, OcrResult::default());
    }

    #[test]
    fn rejects_reply_without_object() {
        assert!(matches!(
            parse_model_reply("I could not read this receipt."),
            Err(Error::OcrResponseInvalid(_))
        ));
        assert!(matches!(
            parse_model_reply("} nothing here {"),
            Err(Error::OcrResponseInvalid(_))
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            parse_model_reply("{amount: 12}"),
            Err(Error::OcrResponseInvalid(_))
        ));
    }
}
