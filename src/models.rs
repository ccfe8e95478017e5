//! Data models shared by the fetch and annotate pipelines.
//!
//! - [`Article`]: a scraped news article, ready to be exported as a document
//! - [`Candidate`]: a paragraph picked for summarization and its result
//! - [`Translation`]: the outcome of a translation request
//! - [`GenerationParams`]: output bounds handed to a summarization backend

/// A news article as extracted from its HTML page.
///
/// Built once by the scraper and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// The headline, or `"Untitled"` when the page has none.
    pub title: String,
    /// Publication date (`YYYY-MM-DD` when taken from a `<time>` element).
    pub date: Option<String>,
    /// Body paragraphs in page order.
    pub paragraphs: Vec<String>,
}

impl Article {
    /// Name of the document file this article is saved under, before sanitizing.
    pub fn file_stem(&self) -> String {
        format!(
            "{}-{}.docx",
            self.date.as_deref().unwrap_or("undated"),
            self.title
        )
    }
}

/// How the source text of a [`Candidate`] relates to the paragraph it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationOutcome {
    /// The paragraph fit the token budget and was passed through.
    Untouched,
    /// Trailing sentences were dropped and the truncation marker appended.
    Truncated,
    /// Not even the first sentence fit, so the original text was kept as is.
    Oversized,
}

/// A paragraph selected for summarization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Position of the paragraph in the document at selection time.
    pub index: usize,
    /// Text submitted to the summarizer.
    pub text: String,
    pub truncation: TruncationOutcome,
    /// Translated summary, filled in once by the batch summarizer.
    pub summary: Option<Translation>,
}

impl Candidate {
    pub fn new(index: usize, text: String, truncation: TruncationOutcome) -> Self {
        Self {
            index,
            text,
            truncation,
            summary: None,
        }
    }

    /// Summary text to show under the paragraph, if there is one worth showing.
    pub fn summary_text(&self) -> Option<&str> {
        self.summary
            .as_ref()
            .map(Translation::text)
            .filter(|s| !s.is_empty())
    }
}

/// Result of sending text through the translation backend.
///
/// A failed translation is not an error for the pipeline: the original text
/// is carried forward and the failure reason kept for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Translated(String),
    Passthrough { original: String, reason: String },
}

impl Translation {
    /// The text to use downstream, whichever path was taken.
    pub fn text(&self) -> &str {
        match self {
            Translation::Translated(text) => text,
            Translation::Passthrough { original, .. } => original,
        }
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, Translation::Passthrough { .. })
    }
}

/// Generation bounds for a summarization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationParams {
    pub min_length: usize,
    pub max_length: usize,
    /// Greedy decoding when `true`; summaries are reproducible.
    pub deterministic: bool,
}
