//! Word counting, sentence splitting and token-bounded truncation.
//!
//! The summarization model accepts a bounded number of input tokens. Paragraphs
//! over that budget are cut at a sentence boundary before they are submitted;
//! a sentence is never split in the middle.

use crate::error::{Error, Result};
use crate::models::TruncationOutcome;
use std::fmt;
use tracing::{info, instrument, warn};
use unicode_segmentation::UnicodeSegmentation;

/// Appended to text that lost trailing sentences to the token budget.
pub const TRUNCATION_MARKER: &str = "...";

/// Anything that can tell how many model tokens a piece of text costs.
pub trait TokenCount {
    fn count_tokens(&self, text: &str) -> usize;
}

/// Token counter used by the annotate pipeline.
pub enum Tokenizer {
    /// The summarization model's own BPE vocabulary, loaded from `tokenizer.json`.
    Bpe(Box<tokenizers::Tokenizer>),
    /// Unicode word and punctuation segments. Undercounts BPE tokens on rare
    /// and long words; only used when the model's vocabulary is unavailable.
    WordBounds,
}

impl Tokenizer {
    pub fn from_file(path: &str) -> Result<Self> {
        tokenizers::Tokenizer::from_file(path)
            .map(|t| Tokenizer::Bpe(Box::new(t)))
            .map_err(|e| Error::Tokenizer(format!("{path}: {e}")))
    }

    /// The tokenizer for `path` if given, otherwise `model` from the Hugging Face hub.
    ///
    /// A local file that cannot be read is an error. A hub download that fails
    /// falls back to [`Tokenizer::WordBounds`] with a warning.
    #[instrument(level = "info", skip_all, fields(%model))]
    pub async fn load(path: Option<&str>, model: &str) -> Result<Self> {
        if let Some(path) = path {
            let tokenizer = Self::from_file(path)?;
            info!(tokenizer_path = %path, "Loaded tokenizer from file");
            return Ok(tokenizer);
        }

        let identifier = model.to_string();
        let downloaded = tokio::task::spawn_blocking(move || {
            tokenizers::Tokenizer::from_pretrained(&identifier, None).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| e.to_string())
        .and_then(|res| res);

        match downloaded {
            Ok(tokenizer) => {
                info!("Loaded tokenizer from the Hugging Face hub");
                Ok(Tokenizer::Bpe(Box::new(tokenizer)))
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "Tokenizer download failed; estimating token counts from word boundaries"
                );
                Ok(Tokenizer::WordBounds)
            }
        }
    }
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tokenizer::Bpe(_) => f.write_str("Tokenizer::Bpe"),
            Tokenizer::WordBounds => f.write_str("Tokenizer::WordBounds"),
        }
    }
}

impl TokenCount for Tokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        match self {
            Tokenizer::Bpe(tokenizer) => match tokenizer.encode(text, false) {
                Ok(encoding) => encoding.len(),
                Err(e) => {
                    warn!(error = %e, "BPE encoding failed; estimating from word bounds");
                    word_bound_tokens(text)
                }
            },
            Tokenizer::WordBounds => word_bound_tokens(text),
        }
    }
}

fn word_bound_tokens(text: &str) -> usize {
    text.split_word_bounds()
        .filter(|segment| !segment.trim().is_empty())
        .count()
}

/// Number of words made up solely of alphabetic characters.
///
/// Numbers and words with digits, apostrophes or other marks do not count;
/// punctuation is never a word to begin with.
pub fn alphabetic_word_count(text: &str) -> usize {
    text.unicode_words()
        .filter(|word| word.chars().all(char::is_alphabetic))
        .count()
}

/// Split text into trimmed, non-empty sentences.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split_sentence_bounds()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Keep whole leading sentences while their summed token count fits `max_tokens`.
///
/// Returns the kept sentences joined by single spaces plus [`TRUNCATION_MARKER`].
/// When the first sentence alone is over budget the original text comes back
/// unchanged, flagged as [`TruncationOutcome::Oversized`].
pub fn truncate_by_sentences<K: TokenCount + ?Sized>(
    text: &str,
    tokenizer: &K,
    max_tokens: usize,
) -> (String, TruncationOutcome) {
    let mut used = 0usize;
    let mut kept = Vec::new();

    for sentence in split_sentences(text) {
        let tokens = tokenizer.count_tokens(sentence);
        if used + tokens > max_tokens {
            break;
        }
        kept.push(sentence);
        used += tokens;
    }

    if kept.is_empty() {
        warn!(
            max_tokens,
            "First sentence alone exceeds the token budget; submitting paragraph untruncated"
        );
        return (text.to_string(), TruncationOutcome::Oversized);
    }

    (
        format!("{}{}", kept.join(" "), TRUNCATION_MARKER),
        TruncationOutcome::Truncated,
    )
}

/// Text to hand to the summarizer: untouched when within budget, truncated otherwise.
pub fn fit_to_budget<K: TokenCount + ?Sized>(
    text: &str,
    tokenizer: &K,
    max_tokens: usize,
) -> (String, TruncationOutcome) {
    if tokenizer.count_tokens(text) > max_tokens {
        truncate_by_sentences(text, tokenizer, max_tokens)
    } else {
        (text.to_string(), TruncationOutcome::Untouched)
    }
}
