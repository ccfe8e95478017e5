//! Hugging Face inference backend for abstractive summarization.
//!
//! Sends a whole batch in one request:
//!
//! ```text
//! POST {endpoint}
//! {"inputs": ["...", "..."],
//!  "parameters": {"min_length": 30, "max_length": 80, "do_sample": false,
//!                 "truncation": "only_first"},
//!  "options": {"wait_for_model": true}}
//! ```
//!
//! and expects `[{"summary_text": "..."}, ...]` back, one entry per input.

use super::Summarize;
use crate::error::{Error, Result};
use crate::models::GenerationParams;
use crate::utils::truncate_for_log;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

#[derive(Debug, Serialize)]
struct SummarizationRequest<'a> {
    inputs: &'a [String],
    parameters: Parameters,
    options: Options,
}

/// Inputs past the model's position limit are cut on the server.
const TRUNCATION: &str = "only_first";

#[derive(Debug, Serialize)]
struct Parameters {
    min_length: usize,
    max_length: usize,
    do_sample: bool,
    truncation: &'static str,
}

impl From<&GenerationParams> for Parameters {
    fn from(params: &GenerationParams) -> Self {
        Self {
            min_length: params.min_length,
            max_length: params.max_length,
            do_sample: !params.deterministic,
            truncation: TRUNCATION,
        }
    }
}

#[derive(Debug, Serialize)]
struct Options {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

pub struct HfSummarizer {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl std::fmt::Debug for HfSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfSummarizer")
            .field("endpoint", &self.endpoint)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HfSummarizer {
    pub fn new(endpoint: &str, api_token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_token,
        })
    }
}

impl Summarize for HfSummarizer {
    #[instrument(level = "info", skip_all, fields(batch = texts.len()))]
    async fn summarize_batch(
        &self,
        texts: &[String],
        params: &GenerationParams,
    ) -> Result<Vec<String>> {
        let t0 = Instant::now();
        let request = SummarizationRequest {
            inputs: texts,
            parameters: Parameters::from(params),
            options: Options {
                wait_for_model: true,
            },
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        let dt = t0.elapsed();

        if !status.is_success() {
            error!(%status, elapsed_ms = dt.as_millis() as u64, "Summarization request failed");
            return Err(Error::Summarizer(format!(
                "{status}: {}",
                truncate_for_log(&body, 300)
            )));
        }

        let summaries = parse_summaries(&body, texts.len())?;
        info!(elapsed_ms = dt.as_millis() as u64, "Summarized batch");
        Ok(summaries)
    }
}

/// Decode a summarization response, insisting on one summary per input.
pub fn parse_summaries(body: &str, expected: usize) -> Result<Vec<String>> {
    let outputs: Vec<SummaryOutput> = serde_json::from_str(body)?;
    if outputs.len() != expected {
        return Err(Error::Summarizer(format!(
            "expected {expected} summaries, got {}",
            outputs.len()
        )));
    }
    Ok(outputs.into_iter().map(|o| o.summary_text).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summaries_in_order() {
        let body = r#"[{"summary_text": "first"}, {"summary_text": "second"}]"#;
        assert_eq!(parse_summaries(body, 2).unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_parse_summaries_count_mismatch_is_fatal() {
        let body = r#"[{"summary_text": "only one"}]"#;
        let err = parse_summaries(body, 2).unwrap_err();
        assert!(matches!(err, Error::Summarizer(_)));
    }

    #[test]
    fn test_parse_summaries_error_payload() {
        assert!(parse_summaries(r#"{"error": "Model is loading"}"#, 1).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let inputs = vec!["a".to_string(), "b".to_string()];
        let request = SummarizationRequest {
            inputs: &inputs,
            parameters: Parameters::from(&GenerationParams {
                min_length: 30,
                max_length: 80,
                deterministic: true,
            }),
            options: Options {
                wait_for_model: true,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["inputs"][1], "b");
        assert_eq!(json["parameters"]["max_length"], 80);
        assert_eq!(json["parameters"]["do_sample"], false);
        assert_eq!(json["parameters"]["truncation"], "only_first");
    }

    #[test]
    fn test_oversized_input_is_truncated_server_side() {
        let params = GenerationParams {
            min_length: 30,
            max_length: 80,
            deterministic: false,
        };
        let parameters = Parameters::from(&params);
        assert!(parameters.do_sample);
        assert_eq!(parameters.truncation, "only_first");
    }

    #[test]
    fn test_debug_redacts_token() {
        let s = HfSummarizer::new("http://localhost", Some("secret".into()), Duration::from_secs(1))
            .unwrap();
        let debug = format!("{s:?}");
        assert!(!debug.contains("secret"));
    }
}
