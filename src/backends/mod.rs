//! Translation and summarization backends.
//!
//! The annotate pipeline only talks to the [`Summarize`] and [`Translate`]
//! traits. Concrete backends are constructed once in `main` and passed by
//! reference into the pipeline, so tests can substitute their own.
//!
//! # Backends
//!
//! | Concern | Module | Service |
//! |---------|--------|---------|
//! | Translation | [`google`] | Google Translate web endpoint |
//! | Summarization | [`huggingface`] | Hosted `facebook/bart-large-cnn` inference |
//! | Summarization | [`llm`] | OpenAI-compatible chat model configured through `awful_aj` |
//!
//! [`retry`] holds the backoff policy for the chat model requests.

pub mod google;
pub mod huggingface;
pub mod llm;
pub mod retry;

use crate::error::Result;
use crate::models::{GenerationParams, Translation};
use crate::utils::truncate_for_log;
use tracing::warn;

/// Batch text summarization.
pub trait Summarize {
    /// Summarize each input, returning exactly one summary per input, in order.
    async fn summarize_batch(
        &self,
        texts: &[String],
        params: &GenerationParams,
    ) -> Result<Vec<String>>;
}

/// Single-text translation with fixed source and target languages.
pub trait Translate {
    async fn translate(&self, text: &str) -> Result<String>;
}

/// Translate `text`, keeping the original when the backend fails.
///
/// Blank input short-circuits to an empty translation without a backend call.
pub async fn translate_or_passthrough<T: Translate>(translator: &T, text: &str) -> Translation {
    if text.trim().is_empty() {
        return Translation::Translated(String::new());
    }
    match translator.translate(text).await {
        Ok(translated) => Translation::Translated(translated),
        Err(e) => {
            warn!(
                error = %e,
                text_preview = %truncate_for_log(text, 80),
                "Translation failed; keeping original text"
            );
            Translation::Passthrough {
                original: text.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

/// The summarizer selected on the command line.
#[derive(Debug)]
pub enum SummarizerBackend {
    HuggingFace(huggingface::HfSummarizer),
    Llm(llm::LlmSummarizer),
}

impl Summarize for SummarizerBackend {
    async fn summarize_batch(
        &self,
        texts: &[String],
        params: &GenerationParams,
    ) -> Result<Vec<String>> {
        match self {
            SummarizerBackend::HuggingFace(s) => s.summarize_batch(texts, params).await,
            SummarizerBackend::Llm(s) => s.summarize_batch(texts, params).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::Cell;

    struct Upper {
        calls: Cell<usize>,
    }

    impl Translate for Upper {
        async fn translate(&self, text: &str) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            Ok(text.to_uppercase())
        }
    }

    struct Broken;

    impl Translate for Broken {
        async fn translate(&self, _text: &str) -> Result<String> {
            Err(Error::Translator("service unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_successful_translation() {
        let t = Upper { calls: Cell::new(0) };
        let out = translate_or_passthrough(&t, "hello").await;
        assert_eq!(out, Translation::Translated("HELLO".to_string()));
        assert_eq!(t.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_blank_text_skips_backend() {
        let t = Upper { calls: Cell::new(0) };
        let out = translate_or_passthrough(&t, "  \n ").await;
        assert_eq!(out, Translation::Translated(String::new()));
        assert_eq!(t.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_failure_becomes_passthrough() {
        let out = translate_or_passthrough(&Broken, "hello").await;
        assert!(out.is_passthrough());
        assert_eq!(out.text(), "hello");
        match out {
            Translation::Passthrough { reason, .. } => assert!(reason.contains("service unavailable")),
            Translation::Translated(_) => unreachable!(),
        }
    }
}
