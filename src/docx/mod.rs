//! Minimal Word (`.docx`) document support.
//!
//! A `.docx` file is a zip package; the text lives in `word/document.xml`.
//! This module reads the body-level paragraphs from that part, lets callers
//! append formatted runs to them, and writes the package back with every
//! other part (styles, relationships, media) carried through byte for byte.
//!
//! # Submodules
//!
//! - [`package`]: zip container reading and writing
//! - [`xml`]: paragraph scanning and run rendering for `document.xml`
//! - [`builder`]: fresh documents for exported articles

pub mod builder;
pub mod package;
pub mod xml;

use crate::error::{Error, Result};
use package::Part;
use std::path::Path;
use tracing::{debug, instrument};
use xml::ParagraphSpan;

pub use builder::DocumentBuilder;

/// Path of the main document part inside the package.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Character formatting for an appended run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Run {
    /// Text of the run; `\n` becomes a line break and `\t` a tab.
    pub text: String,
    /// Applied to Latin and East Asian scripts alike.
    pub font: Option<String>,
    pub bold: bool,
    pub size_pt: Option<u32>,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn size(mut self, size_pt: u32) -> Self {
        self.size_pt = Some(size_pt);
        self
    }
}

/// A body-level paragraph of a loaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    text: String,
    span: ParagraphSpan,
    appended: Vec<Run>,
}

impl Paragraph {
    /// Text the paragraph had when the document was loaded.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Runs added since loading, in order.
    pub fn appended(&self) -> &[Run] {
        &self.appended
    }

    pub fn add_run(&mut self, run: Run) {
        self.appended.push(run);
    }
}

/// A loaded `.docx` package.
#[derive(Debug, Clone)]
pub struct Document {
    parts: Vec<Part>,
    body: String,
    paragraphs: Vec<Paragraph>,
}

impl Document {
    /// Parse a package from its raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let parts = package::read_parts(bytes)?;
        Self::from_parts(parts)
    }

    pub(crate) fn from_parts(parts: Vec<Part>) -> Result<Self> {
        let body = parts
            .iter()
            .find(|p| p.name == DOCUMENT_PART)
            .ok_or_else(|| Error::InvalidDocx(format!("missing {DOCUMENT_PART}")))
            .and_then(|p| {
                String::from_utf8(p.data.clone())
                    .map_err(|e| Error::InvalidDocx(format!("{DOCUMENT_PART} is not UTF-8: {e}")))
            })?;

        let paragraphs = xml::scan_paragraphs(&body)?
            .into_iter()
            .map(|(text, span)| Paragraph {
                text,
                span,
                appended: Vec::new(),
            })
            .collect();

        Ok(Self {
            parts,
            body,
            paragraphs,
        })
    }

    /// Serialize the package, writing appended runs into the document part.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let edits: Vec<(ParagraphSpan, &[Run])> = self
            .paragraphs
            .iter()
            .filter(|p| !p.appended.is_empty())
            .map(|p| (p.span, p.appended.as_slice()))
            .collect();
        let body = xml::apply_runs(&self.body, &edits);

        let parts: Vec<Part> = self
            .parts
            .iter()
            .map(|part| {
                if part.name == DOCUMENT_PART {
                    Part {
                        name: part.name.clone(),
                        data: body.clone().into_bytes(),
                    }
                } else {
                    part.clone()
                }
            })
            .collect();

        package::write_parts(&parts)
    }

    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        let doc = Self::from_bytes(&bytes)?;
        debug!(paragraphs = doc.paragraphs.len(), "Loaded document");
        Ok(doc)
    }

    /// Write the document to `path`, creating parent directories as needed.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = self.to_bytes()?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraphs_mut(&mut self) -> &mut [Paragraph] {
        &mut self.paragraphs
    }
}
