//! Word document export for fetched articles.
//!
//! Layout: the title as a level-1 heading, a left-aligned publication date
//! line when the date is known, then one paragraph per body paragraph.

use crate::docx::{Document, DocumentBuilder};
use crate::error::Result;
use crate::models::Article;
use crate::utils::sanitize_filename;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Prefix of the publication date line ("Publication date: ").
pub const DATE_LABEL: &str = "发布日期：";

/// Lay out an article as a new document.
pub fn article_document(article: &Article) -> Result<Document> {
    let mut builder = DocumentBuilder::new();
    builder.add_heading(&article.title, 1);

    if let Some(date) = article.date.as_deref().filter(|d| !d.is_empty()) {
        builder.add_left_aligned_paragraph(&format!("{DATE_LABEL}{date}"));
    }

    for paragraph in &article.paragraphs {
        builder.add_paragraph(paragraph);
    }

    builder.build()
}

/// Write an article to `out_dir`, named after its date and title.
///
/// # Returns
///
/// The path of the written file.
#[instrument(level = "info", skip_all, fields(out_dir = %out_dir.display(), title = %article.title))]
pub async fn write_article(article: &Article, out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(sanitize_filename(&article.file_stem()));
    let document = article_document(article)?;
    document.save(&path).await?;
    info!(path = %path.display(), "Saved article document");
    Ok(path)
}
