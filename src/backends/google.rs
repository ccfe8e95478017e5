//! Google Translate backend.
//!
//! Uses the keyless `translate_a/single` web endpoint. The response is a nested
//! JSON array whose first element lists translated segments; their first
//! fields concatenate to the full translation.

use super::Translate;
use crate::error::{Error, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Longest input the endpoint accepts, in characters.
pub const MAX_CHARS: usize = 5000;

#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
    source: String,
    target: String,
}

impl GoogleTranslator {
    pub fn new(endpoint: &str, source: &str, target: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            source: source.to_string(),
            target: target.to_string(),
        })
    }
}

impl Translate for GoogleTranslator {
    #[instrument(level = "debug", skip_all, fields(chars = text.chars().count()))]
    async fn translate(&self, text: &str) -> Result<String> {
        let chars = text.chars().count();
        if chars > MAX_CHARS {
            return Err(Error::Translator(format!(
                "text has {chars} characters; the limit is {MAX_CHARS}"
            )));
        }

        let body = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source.as_str()),
                ("tl", self.target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let translated = parse_translation(&body)?;
        debug!(chars_out = translated.chars().count(), "Translated text");
        Ok(translated)
    }
}

/// Concatenate the translated segments of a `translate_a/single` response.
pub fn parse_translation(body: &str) -> Result<String> {
    let value: Value = serde_json::from_str(body)?;
    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Translator("response has no translation segments".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(Error::Translator("response contained an empty translation".to_string()));
    }
    Ok(translated)
}
