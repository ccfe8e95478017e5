//! Summarization through an OpenAI-compatible chat model.
//!
//! The endpoint, model and API key are read from the `awful_aj` `config.yaml`;
//! the system prompt from a named `awful_aj` chat template. Chat models do not
//! batch, so each text in a batch becomes its own request, sent in order:
//!
//! ```text
//! POST {api_base}/chat/completions
//! {"model": "...",
//!  "messages": [{"role": "system", ...}, {"role": "user", ...}],
//!  "max_tokens": 80, "temperature": 0.0}
//! ```
//!
//! `max_tokens` enforces the upper length bound; the lower bound can only be
//! asked for in the prompt. Deterministic parameters pin `temperature` to 0.

use super::Summarize;
use super::retry::Backoff;
use crate::error::{Error, Result};
use crate::models::GenerationParams;
use crate::utils::truncate_for_log;
use awful_aj::{config_dir, template};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

/// The parts of an `awful_aj` `config.yaml` this backend needs.
///
/// Other keys in the file are ignored.
#[derive(Clone, Deserialize)]
pub struct ChatEndpoint {
    pub api_base: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
}

impl std::fmt::Debug for ChatEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEndpoint")
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .finish()
    }
}

impl ChatEndpoint {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug)]
pub struct LlmSummarizer {
    client: reqwest::Client,
    endpoint: ChatEndpoint,
    system_prompt: String,
    backoff: Backoff,
}

impl LlmSummarizer {
    pub fn new(endpoint: ChatEndpoint, system_prompt: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            system_prompt,
            backoff: Backoff::default(),
        })
    }

    /// Read the endpoint settings and the named chat template.
    ///
    /// Without `config_path`, `config.yaml` in the `awful_aj` config directory is used.
    #[instrument(level = "info", skip_all, fields(%template_name))]
    pub async fn load(
        config_path: Option<&str>,
        template_name: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path.into(),
            None => config_dir()
                .map_err(|e| Error::Config(format!("no awful_aj config directory: {e}")))?
                .join("config.yaml"),
        };

        let yaml = tokio::fs::read_to_string(&config_path).await.map_err(|e| {
            Error::Config(format!("{}: {e}", config_path.display()))
        })?;
        let endpoint = ChatEndpoint::from_yaml(&yaml)?;
        info!(
            config_path = %config_path.display(),
            api_base = %endpoint.api_base,
            model = %endpoint.model,
            "Loaded LLM configuration"
        );

        let template = template::load_template(template_name)
            .await
            .map_err(|e| Error::Config(format!("template {template_name}: {e}")))?;
        info!("Loaded summarization template");

        Self::new(endpoint, template.system_prompt, timeout)
    }

    fn request<'a>(&'a self, prompt: &'a str, params: &GenerationParams) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.endpoint.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: params.max_length,
            temperature: params.deterministic.then_some(0.0),
        }
    }

    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let t0 = Instant::now();
        let mut builder = self
            .client
            .post(self.endpoint.completions_url())
            .json(&self.request(prompt, params));
        if let Some(key) = &self.endpoint.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        if !status.is_success() {
            error!(%status, elapsed_ms, "Chat completion failed");
            return Err(Error::Summarizer(format!(
                "{status}: {}",
                truncate_for_log(&body, 300)
            )));
        }
        parse_completion(&body)
    }
}

/// Instruction sent ahead of each paragraph.
pub fn summary_prompt(text: &str, params: &GenerationParams) -> String {
    format!(
        "Summarize the following paragraph in English in {min} to {max} tokens. \
         Reply with the summary only.\n\n{text}",
        min = params.min_length,
        max = params.max_length,
    )
}

/// Pull the assistant reply out of a chat completion response.
pub fn parse_completion(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Summarizer("empty chat completion".to_string()))
}

impl Summarize for LlmSummarizer {
    #[instrument(level = "info", skip_all, fields(batch = texts.len(), model = %self.endpoint.model))]
    async fn summarize_batch(
        &self,
        texts: &[String],
        params: &GenerationParams,
    ) -> Result<Vec<String>> {
        let mut summaries = Vec::with_capacity(texts.len());
        for (i, text) in texts.iter().enumerate() {
            let prompt = summary_prompt(text, params);
            let prompt = prompt.as_str();
            let summary = self
                .backoff
                .retry("chat completion", move || self.complete(prompt, params))
                .await?;
            info!(text = i + 1, "Summarized paragraph");
            summaries.push(summary);
        }
        Ok(summaries)
    }
}
