//! The annotate pipeline: Chinese translations and summaries for a `.docx`.
//!
//! For each input document:
//!
//! 1. **Selection**: paragraphs with more than `min_words` alphabetic words become
//!    candidates, truncated by sentence to the model's input budget
//! 2. **Summarization**: candidates are summarized in batches and each summary translated
//! 3. **Merge**: every non-blank paragraph gets its translation appended, then
//!    the bold summary where one exists
//! 4. **Output**: the result is saved next to the input as `<stem>_zh.docx`
//!
//! Backends are borrowed, never owned, so one set of clients serves every file.

pub mod candidates;
pub mod merge;
pub mod summarize;

use crate::backends::{Summarize, Translate};
use crate::config::AnnotatorConfig;
use crate::docx::Document;
use crate::error::Result;
use crate::models::{Candidate, TruncationOutcome};
use crate::text::TokenCount;
use crate::utils::{annotated_path, has_docx_extension};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

pub use candidates::select_candidates;
pub use merge::{MergeStats, merge_annotations};
pub use summarize::batch_summarize;

/// Why an input path was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotFound,
    NotDocx,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotFound => f.write_str("file not found"),
            SkipReason::NotDocx => f.write_str("not a .docx file"),
        }
    }
}

/// Result of annotating one input path.
#[derive(Debug)]
pub enum FileOutcome {
    Written(PathBuf),
    Skipped(SkipReason),
    Failed(crate::error::Error),
}

/// Check an input path before any work is spent on it.
pub fn check_input(path: &Path) -> std::result::Result<(), SkipReason> {
    if !path.is_file() {
        return Err(SkipReason::NotFound);
    }
    if !has_docx_extension(path) {
        return Err(SkipReason::NotDocx);
    }
    Ok(())
}

/// Runs the pipeline with a fixed set of backends and settings.
pub struct Annotator<'a, S, T, K: ?Sized> {
    summarizer: &'a S,
    translator: &'a T,
    tokenizer: &'a K,
    config: &'a AnnotatorConfig,
}

impl<'a, S, T, K> Annotator<'a, S, T, K>
where
    S: Summarize,
    T: Translate,
    K: TokenCount + ?Sized,
{
    pub fn new(
        summarizer: &'a S,
        translator: &'a T,
        tokenizer: &'a K,
        config: &'a AnnotatorConfig,
    ) -> Self {
        Self {
            summarizer,
            translator,
            tokenizer,
            config,
        }
    }

    /// Annotate a loaded document in place.
    ///
    /// Fails only when summarization fails; translation problems degrade to
    /// the original text.
    pub async fn annotate_document(&self, doc: &mut Document) -> Result<MergeStats> {
        let texts: Vec<&str> = doc.paragraphs().iter().map(|p| p.text()).collect();
        let mut candidates: Vec<Candidate> = select_candidates(
            &texts,
            self.tokenizer,
            self.config.min_words,
            self.config.max_input_tokens,
        );
        let truncated = candidates
            .iter()
            .filter(|c| c.truncation != TruncationOutcome::Untouched)
            .count();
        info!(
            paragraphs = texts.len(),
            candidates = candidates.len(),
            truncated,
            "Selected paragraphs for summarization"
        );

        batch_summarize(
            &mut candidates,
            self.summarizer,
            self.translator,
            &self.config.generation_params(),
            self.config.batch_size,
        )
        .await?;

        Ok(merge_annotations(doc, &candidates, self.translator, self.config).await)
    }

    /// Annotate one file and save the result beside it.
    ///
    /// # Returns
    ///
    /// The path of the written document.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn process_file(&self, path: &Path) -> Result<PathBuf> {
        let mut doc = Document::open(path).await?;
        let stats = self.annotate_document(&mut doc).await?;

        let out = annotated_path(path, &self.config.output_suffix);
        doc.save(&out).await?;
        info!(
            output = %out.display(),
            summaries = stats.summaries,
            "Saved annotated document"
        );
        Ok(out)
    }

    /// Annotate every file in order, continuing past skipped and failed inputs.
    pub async fn annotate_files(&self, files: &[PathBuf]) -> Vec<(PathBuf, FileOutcome)> {
        let mut outcomes = Vec::with_capacity(files.len());

        for path in files {
            let outcome = match check_input(path) {
                Err(reason) => {
                    warn!(path = %path.display(), %reason, "Skipping input");
                    FileOutcome::Skipped(reason)
                }
                Ok(()) => match self.process_file(path).await {
                    Ok(out) => FileOutcome::Written(out),
                    Err(e) => {
                        error!(path = %path.display(), error = %e, "Annotation failed");
                        FileOutcome::Failed(e)
                    }
                },
            };
            outcomes.push((path.clone(), outcome));
        }

        outcomes
    }
}
