//! # Awful News Docx
//!
//! Two small pipelines around Word documents:
//!
//! - **fetch**: download news article pages, extract the headline, publication
//!   date and body paragraphs, and save each article as a `.docx` file
//! - **annotate**: read `.docx` files, append a Chinese translation under every
//!   paragraph and a bold Chinese summary under every long one, and save the
//!   result beside the input as `<stem>_zh.docx`
//!
//! ## Usage
//!
//! ```sh
//! awful_news_docx fetch -o ./articles https://www.amnesty.org/en/latest/news/2025/05/some-article/
//! awful_news_docx annotate ./articles/*.docx
//! ```
//!
//! ## Architecture
//!
//! Annotation runs in four steps per file:
//! 1. **Selection**: paragraphs over the word threshold, truncated to the model's token budget
//! 2. **Summarization**: ordered batches through the selected backend, then translation
//! 3. **Merge**: translation and summary runs appended to the original paragraphs
//! 4. **Output**: the annotated package written next to the input
//!
//! Everything runs sequentially; backends are built once and shared by reference.

use clap::Parser;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod annotate;
mod backends;
mod cli;
mod config;
mod docx;
mod error;
mod models;
mod outputs;
mod scrapers;
mod text;
mod utils;

use annotate::{Annotator, FileOutcome};
use backends::google::GoogleTranslator;
use backends::huggingface::HfSummarizer;
use backends::llm::LlmSummarizer;
use backends::SummarizerBackend;
use cli::{Backend, Cli, Command};
use config::AnnotatorConfig;
use text::Tokenizer;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    let args = Cli::parse();

    let result = match args.command {
        Command::Fetch { urls, outdir } => run_fetch(&urls, &outdir).await,
        Command::Annotate {
            files,
            config,
            backend,
            tokenizer,
            hf_api_token,
            llm_config,
        } => {
            run_annotate(
                &files,
                config.as_deref(),
                backend,
                tokenizer.as_deref(),
                hf_api_token,
                llm_config.as_deref(),
            )
            .await
        }
    };

    info!(
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "awful_news_docx finished"
    );
    result
}

/// Download every URL in order and save each article under `outdir`.
///
/// A URL that fails to download is logged and skipped.
#[instrument(level = "info", skip_all, fields(urls = urls.len(), outdir = %outdir.display()))]
async fn run_fetch(urls: &[String], outdir: &Path) -> Result<(), Box<dyn Error>> {
    // Early check: fail before any download if nothing can be written
    if let Err(e) = ensure_writable_dir(outdir).await {
        error!(
            path = %outdir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let client = scrapers::http_client()?;
    let client = &client;

    let results: Vec<Option<PathBuf>> = stream::iter(urls)
        .then(|url| async move {
            match save_article(client, url, outdir).await {
                Ok(path) => Some(path),
                Err(e) => {
                    error!(%url, error = %e, "Failed to fetch article; skipping");
                    None
                }
            }
        })
        .collect()
        .await;

    let mut saved = 0usize;
    for path in results.iter().flatten() {
        saved += 1;
        println!("{}", path.display());
    }
    info!(saved, failed = urls.len() - saved, "Fetch complete");
    Ok(())
}

async fn save_article(
    client: &reqwest::Client,
    url: &str,
    outdir: &Path,
) -> error::Result<PathBuf> {
    let article = scrapers::amnesty::fetch_article(client, url).await?;
    if article.paragraphs.is_empty() {
        warn!(%url, "No body paragraphs found; saving title and date only");
    }
    outputs::word::write_article(&article, outdir).await
}

/// Build the backends once, then annotate every file in order.
///
/// Returns an error when any file failed, after all files have been tried.
#[instrument(level = "info", skip_all, fields(files = files.len(), ?backend))]
async fn run_annotate(
    files: &[PathBuf],
    config_path: Option<&str>,
    backend: Backend,
    tokenizer_path: Option<&str>,
    hf_api_token: Option<String>,
    llm_config: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let config = AnnotatorConfig::load(config_path).await?;

    let tokenizer = Tokenizer::load(tokenizer_path, &config.tokenizer_model).await?;

    let summarizer = match backend {
        Backend::Hf => {
            if hf_api_token.is_none() {
                warn!("No Hugging Face API token; anonymous requests may be rate limited");
            }
            SummarizerBackend::HuggingFace(HfSummarizer::new(
                &config.hf_endpoint,
                hf_api_token,
                config.summarize_timeout(),
            )?)
        }
        Backend::Llm => {
            SummarizerBackend::Llm(
                LlmSummarizer::load(llm_config, &config.llm_template, config.summarize_timeout())
                    .await?,
            )
        }
    };

    let translator = GoogleTranslator::new(
        &config.translate_endpoint,
        &config.source_language,
        &config.target_language,
        config.translate_timeout(),
    )?;

    let annotator = Annotator::new(&summarizer, &translator, &tokenizer, &config);
    let outcomes = annotator.annotate_files(files).await;

    let mut written = 0usize;
    let mut skipped = 0usize;
    let mut failed: Vec<&PathBuf> = Vec::new();
    for (path, outcome) in &outcomes {
        match outcome {
            FileOutcome::Written(out) => {
                written += 1;
                println!("{}", out.display());
            }
            FileOutcome::Skipped(_) => skipped += 1,
            FileOutcome::Failed(e) => {
                debug!(path = %path.display(), error = ?e, "Failure detail");
                failed.push(path);
            }
        }
    }

    info!(written, skipped, failed = failed.len(), "Annotation complete");

    if !failed.is_empty() {
        return Err(format!(
            "annotation failed for: {}",
            failed.iter().map(|p| p.display()).join(", ")
        )
        .into());
    }
    Ok(())
}
