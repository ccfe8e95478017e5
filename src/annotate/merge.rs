//! Writing translations and summaries back into the document.

use crate::backends::{Translate, translate_or_passthrough};
use crate::config::AnnotatorConfig;
use crate::docx::{Document, Run};
use crate::models::{Candidate, Translation};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// What [`merge_annotations`] added to a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Non-blank paragraphs visited.
    pub paragraphs: usize,
    pub translations: usize,
    /// Paragraphs whose translation failed and carry the original text instead.
    pub passthroughs: usize,
    pub summaries: usize,
}

/// Append a translation run to every non-blank paragraph, followed by a bold
/// summary run for paragraphs that have a summary.
///
/// Paragraphs are never added or removed, and existing runs are left alone.
#[instrument(level = "info", skip_all, fields(paragraphs = doc.paragraphs().len()))]
pub async fn merge_annotations<T: Translate>(
    doc: &mut Document,
    candidates: &[Candidate],
    translator: &T,
    config: &AnnotatorConfig,
) -> MergeStats {
    let summaries: HashMap<usize, &str> = candidates
        .iter()
        .filter_map(|c| c.summary_text().map(|s| (c.index, s)))
        .collect();

    let total = doc.paragraphs().len();
    let mut stats = MergeStats::default();

    for (index, paragraph) in doc.paragraphs_mut().iter_mut().enumerate() {
        let text = paragraph.text().trim().to_string();
        if text.is_empty() {
            continue;
        }
        stats.paragraphs += 1;
        debug!(paragraph = index + 1, total, "Translating paragraph");

        let translation = translate_or_passthrough(translator, &text).await;
        if let Translation::Passthrough { reason, .. } = &translation {
            debug!(paragraph = index + 1, %reason, "Keeping original text for paragraph");
            stats.passthroughs += 1;
        }
        if !translation.text().is_empty() {
            paragraph.add_run(
                Run::new(format!("\n{}", translation.text()))
                    .font(&config.display_font)
                    .bold(false)
                    .size(config.font_size_pt),
            );
            stats.translations += 1;
        }

        if let Some(summary) = summaries.get(&index) {
            paragraph.add_run(
                Run::new(format!("\n{}{}", config.summary_label, summary))
                    .font(&config.display_font)
                    .bold(true)
                    .size(config.font_size_pt),
            );
            stats.summaries += 1;
        }
    }

    info!(
        paragraphs = stats.paragraphs,
        translated = stats.translations,
        passthrough = stats.passthroughs,
        summarized = stats.summaries,
        "Merged annotations"
    );
    stats
}
