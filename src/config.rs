//! Annotator configuration.
//!
//! Every field has a default, so an empty (or absent) YAML file yields the
//! stock pipeline: 40-word threshold, 1024-token input budget, 30–80 token
//! summaries in batches of 4, English to Simplified Chinese.

use crate::error::{Error, Result};
use crate::models::GenerationParams;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};

/// Tunables for the annotate pipeline, loadable from `config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Paragraphs need strictly more alphabetic words than this to be summarized.
    pub min_words: usize,
    /// Input-token budget of the summarization model.
    pub max_input_tokens: usize,
    pub summary_min_length: usize,
    pub summary_max_length: usize,
    pub batch_size: usize,
    pub display_font: String,
    pub font_size_pt: u32,
    /// Printed in front of every appended summary.
    pub summary_label: String,
    /// Appended to the input file stem to name the output document.
    pub output_suffix: String,
    pub source_language: String,
    pub target_language: String,
    /// Hosted inference URL of the summarization model.
    pub hf_endpoint: String,
    /// Hub id whose `tokenizer.json` measures the input budget.
    pub tokenizer_model: String,
    pub translate_endpoint: String,
    /// Name of the `awful_aj` chat template used by the `llm` backend.
    pub llm_template: String,
    pub summarize_timeout_secs: u64,
    pub translate_timeout_secs: u64,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            min_words: 40,
            max_input_tokens: 1024,
            summary_min_length: 30,
            summary_max_length: 80,
            batch_size: 4,
            display_font: "Microsoft YaHei".to_string(),
            font_size_pt: 11,
            summary_label: "段落总结：".to_string(),
            output_suffix: "_zh".to_string(),
            source_language: "en".to_string(),
            target_language: "zh-CN".to_string(),
            hf_endpoint: "https://router.huggingface.co/hf-inference/models/facebook/bart-large-cnn"
                .to_string(),
            tokenizer_model: "facebook/bart-large-cnn".to_string(),
            translate_endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            llm_template: "news_summarizer".to_string(),
            summarize_timeout_secs: 120,
            translate_timeout_secs: 30,
        }
    }
}

impl AnnotatorConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file deserializes to unit, not to an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or fall back to defaults when no path is given.
    #[instrument(level = "info", skip_all)]
    pub async fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => {
                let yaml = tokio::fs::read_to_string(path).await?;
                let config = Self::from_yaml(&yaml)?;
                info!(config_path = %path, "Loaded annotator configuration");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".to_string()));
        }
        if self.max_input_tokens == 0 {
            return Err(Error::Config("max_input_tokens must be at least 1".to_string()));
        }
        if self.summary_min_length > self.summary_max_length {
            return Err(Error::Config(format!(
                "summary_min_length ({}) exceeds summary_max_length ({})",
                self.summary_min_length, self.summary_max_length
            )));
        }
        Ok(())
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            min_length: self.summary_min_length,
            max_length: self.summary_max_length,
            deterministic: true,
        }
    }

    pub fn summarize_timeout(&self) -> Duration {
        Duration::from_secs(self.summarize_timeout_secs)
    }

    pub fn translate_timeout(&self) -> Duration {
        Duration::from_secs(self.translate_timeout_secs)
    }
}
