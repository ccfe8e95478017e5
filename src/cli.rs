//! Command-line interface definitions.
//!
//! Two subcommands, one per pipeline. Secrets and model paths can come from
//! environment variables instead of flags.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Download news articles to Word documents, then annotate them with
/// Chinese translations and paragraph summaries.
///
/// # Examples
///
/// ```sh
/// # Save two articles into ./articles
/// awful_news_docx fetch -o ./articles https://www.amnesty.org/en/latest/news/2025/05/a/ https://www.amnesty.org/en/latest/news/2025/05/b/
///
/// # Annotate them with the hosted BART model
/// HF_API_TOKEN=hf_xxx awful_news_docx annotate ./articles/*.docx
///
/// # Annotate with a local OpenAI-compatible model instead
/// awful_news_docx annotate --backend llm --llm-config ~/.config/aj/config.yaml report.docx
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch article pages and save each as a .docx file
    Fetch {
        /// Article URLs
        #[arg(required = true, num_args = 1..)]
        urls: Vec<String>,

        /// Directory the documents are written to
        #[arg(short, long, default_value = ".")]
        outdir: PathBuf,
    },

    /// Append Chinese translations and summaries to .docx files
    Annotate {
        /// Documents to annotate; each result is saved as <stem>_zh.docx beside it
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Optional path to the annotator config.yaml
        #[arg(short, long)]
        config: Option<String>,

        /// Summarization backend
        #[arg(long, value_enum, default_value_t = Backend::Hf)]
        backend: Backend,

        /// BART tokenizer.json used to measure the input budget (downloaded from the hub when omitted)
        #[arg(long, env = "BART_TOKENIZER")]
        tokenizer: Option<String>,

        /// Hugging Face API token for the hosted summarization model
        #[arg(long, env = "HF_API_TOKEN", hide_env_values = true)]
        hf_api_token: Option<String>,

        /// awful_aj config.yaml for the llm backend (defaults to the awful_aj config directory)
        #[arg(long)]
        llm_config: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// Hosted facebook/bart-large-cnn inference
    Hf,
    /// OpenAI-compatible chat model through awful_aj
    Llm,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_parsing() {
        let cli = Cli::parse_from([
            "awful_news_docx",
            "fetch",
            "-o",
            "/tmp/out",
            "https://example.org/a",
            "https://example.org/b",
        ]);

        match cli.command {
            Command::Fetch { urls, outdir } => {
                assert_eq!(urls, vec!["https://example.org/a", "https://example.org/b"]);
                assert_eq!(outdir, PathBuf::from("/tmp/out"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_fetch_outdir_defaults_to_cwd() {
        let cli = Cli::parse_from(["awful_news_docx", "fetch", "https://example.org/a"]);
        match cli.command {
            Command::Fetch { outdir, .. } => assert_eq!(outdir, PathBuf::from(".")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_fetch_requires_a_url() {
        assert!(Cli::try_parse_from(["awful_news_docx", "fetch"]).is_err());
        assert!(Cli::try_parse_from(["awful_news_docx", "fetch", "-o", "out"]).is_err());
    }

    #[test]
    fn test_annotate_parsing() {
        let cli = Cli::parse_from([
            "awful_news_docx",
            "annotate",
            "--backend",
            "llm",
            "-c",
            "annotator.yaml",
            "--tokenizer",
            "tokenizer.json",
            "a.docx",
            "b.docx",
        ]);

        match cli.command {
            Command::Annotate {
                files,
                config,
                backend,
                tokenizer,
                ..
            } => {
                assert_eq!(files, vec![PathBuf::from("a.docx"), PathBuf::from("b.docx")]);
                assert_eq!(config.as_deref(), Some("annotator.yaml"));
                assert_eq!(backend, Backend::Llm);
                assert_eq!(tokenizer.as_deref(), Some("tokenizer.json"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_annotate_defaults_to_hf_backend() {
        let cli = Cli::parse_from(["awful_news_docx", "annotate", "a.docx"]);
        match cli.command {
            Command::Annotate { backend, .. } => assert_eq!(backend, Backend::Hf),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(
            Cli::try_parse_from(["awful_news_docx", "annotate", "--backend", "gpt", "a.docx"])
                .is_err()
        );
    }
}
