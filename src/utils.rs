//! Utility functions for file naming, path handling and log formatting.
//!
//! - Filename sanitization for exported articles
//! - Output naming and extension checks for annotated documents
//! - String truncation for log previews
//! - File system validation for output directories

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs as stdfs;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

static FORBIDDEN_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[\\/:*?"<>|]"#).unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Make `text` safe to use as a file name on common file systems.
///
/// Characters reserved on Windows become `_`, whitespace runs collapse to a
/// single `_`, and leading/trailing underscores are stripped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(sanitize_filename("2025-05-06-Iran: Stop it.docx"), "2025-05-06-Iran__Stop_it.docx");
/// ```
pub fn sanitize_filename(text: &str) -> String {
    let text = FORBIDDEN_CHARS.replace_all(text, "_");
    let text = WHITESPACE_RUN.replace_all(&text, "_");
    text.trim_matches('_').to_string()
}

/// `true` when the path has a `.docx` extension, in any letter case.
pub fn has_docx_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"))
}

/// Sibling path of `input` with `suffix` added to the file stem.
///
/// `reports/article.docx` with suffix `_zh` becomes `reports/article_zh.docx`.
pub fn annotated_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{suffix}.docx"))
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a character boundary)
/// with an ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a scratch file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable
/// (permission denied, read-only file system, etc.).
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path).await?;
    // A small sync write keeps the error surface simple.
    let scratch_path = path.join("..__write_check__");
    stdfs::File::create(&scratch_path)?;
    let _ = stdfs::remove_file(&scratch_path);
    info!("Output directory is writable");
    Ok(())
}
