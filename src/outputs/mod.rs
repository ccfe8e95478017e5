//! Output generation for fetched articles.
//!
//! # Submodules
//!
//! - [`word`]: Writes an [`Article`](crate::models::Article) to an A4 Word document
//!
//! # Output Structure
//!
//! ```text
//! outdir/
//! ├── 2025-05-06-Iran__Halt_executions.docx
//! └── undated-Untitled.docx
//! ```

pub mod word;
