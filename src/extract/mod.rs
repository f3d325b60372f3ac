//! Content Extraction
//!
//! Turns an uploaded file into a single block of text that can be pasted into
//! a prompt. The format is chosen purely from the filename suffix
//! (case-sensitive), never from the bytes themselves:
//!
//! ```text
//! .zip          → expand, walk every file (see `archive`)
//! .csv          → indexed text table
//! .txt / .md    → UTF-8 text, invalid sequences dropped
//! .docx         → paragraphs, one per line
//! .xls / .xlsx  → "Sheet: <name>" + cell dump per sheet
//! .pdf          → "Page <n>:" + text per page
//! .json         → pretty printed, 2-space indent
//! anything else → best-effort UTF-8 text
//! ```
//!
//! Every result starts with a label naming the detected type so the model can
//! tell the sections apart.

pub mod archive;
pub mod formats;
pub mod scratch;
pub mod table;

pub use archive::DirectoryWalker;
pub use scratch::{ScratchSpace, UploadedFile};

use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

/// Returned verbatim when a top-level `.zip` upload cannot be opened
pub const INVALID_ZIP_MESSAGE: &str = "Invalid ZIP file format";

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("No columns to parse from file")]
    EmptyCsv,

    #[error("{0}")]
    Docx(String),

    #[error("{0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("{0}")]
    Pdf(#[from] lopdf::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Formats the extractor knows how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Archive,
    Csv,
    Text,
    Markdown,
    Docx,
    Spreadsheet,
    Pdf,
    Json,
    Unknown,
}

impl FileKind {
    pub fn from_name(name: &str) -> Self {
        if name.ends_with(".zip") {
            FileKind::Archive
        } else if name.ends_with(".csv") {
            FileKind::Csv
        } else if name.ends_with(".txt") {
            FileKind::Text
        } else if name.ends_with(".docx") {
            FileKind::Docx
        } else if name.ends_with(".md") {
            FileKind::Markdown
        } else if name.ends_with(".xls") || name.ends_with(".xlsx") {
            FileKind::Spreadsheet
        } else if name.ends_with(".pdf") {
            FileKind::Pdf
        } else if name.ends_with(".json") {
            FileKind::Json
        } else {
            FileKind::Unknown
        }
    }

    /// Name used in the "<label> content:" heading
    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Archive => "Archive",
            FileKind::Csv => "CSV",
            FileKind::Text => "Text",
            FileKind::Markdown => "Markdown",
            FileKind::Docx => "DOCX",
            FileKind::Spreadsheet => "Excel",
            FileKind::Pdf => "PDF",
            FileKind::Json => "JSON",
            FileKind::Unknown => "unknown format",
        }
    }

    /// Name used in "Error reading <name> ..." lines
    pub fn error_label(&self) -> &'static str {
        match self {
            FileKind::Archive => "ZIP",
            FileKind::Text => "text file",
            _ => self.label(),
        }
    }

    pub(crate) fn heading(&self, body: &str) -> String {
        match self {
            FileKind::Unknown => format!("Content of file (unknown format):\n{}", body),
            _ => format!("{} content:\n{}", self.label(), body),
        }
    }

    pub(crate) fn heading_for(&self, rel_path: &str, body: &str) -> String {
        match self {
            FileKind::Unknown => format!("Content of {} (unknown format):\n{}", rel_path, body),
            _ => format!("{} content of {}:\n{}", self.label(), rel_path, body),
        }
    }
}

/// What to do when a single, non-archive upload fails to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Replace the content with an "Error reading <type>: <message>" line
    #[default]
    Isolate,
    /// Return the error to the caller (docx, spreadsheet, pdf, json, text)
    Propagate,
}

#[derive(Debug, Clone, Default)]
pub struct ContentExtractor {
    policy: FailurePolicy,
    scratch_root: Option<PathBuf>,
}

impl ContentExtractor {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            scratch_root: None,
        }
    }

    /// Stage uploads under `root` instead of the system temp directory
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    fn scratch(&self) -> io::Result<ScratchSpace> {
        ScratchSpace::new(self.scratch_root.as_deref())
    }

    /// Extract the text of an upload. The file is staged in a scratch
    /// directory which is removed when this returns, whatever the outcome.
    pub fn extract(&self, upload: &UploadedFile) -> Result<String, ExtractionError> {
        let scratch = self.scratch()?;
        let path = scratch.write_upload(upload)?;
        let kind = FileKind::from_name(&upload.filename);

        info!(
            filename = %upload.filename,
            kind = ?kind,
            size = upload.data.len(),
            "Extracting uploaded file"
        );

        match kind {
            FileKind::Archive => {
                let target = scratch.child_dir("extracted")?;
                if let Err(e) = archive::expand(&path, &target) {
                    warn!(filename = %upload.filename, error = %e, "Upload is not a valid ZIP archive");
                    return Ok(INVALID_ZIP_MESSAGE.to_string());
                }
                Ok(DirectoryWalker::new()
                    .with_scratch_root(self.scratch_root.clone())
                    .walk(&target))
            }
            FileKind::Unknown => match formats::read_text(&path) {
                Ok(text) => Ok(kind.heading(&text)),
                Err(_) => Ok(format!("Unable to read file {}", upload.filename)),
            },
            // CSV failures were always reported inline
            FileKind::Csv => Ok(self.isolated(kind, &path)),
            _ => match self.policy {
                FailurePolicy::Isolate => Ok(self.isolated(kind, &path)),
                FailurePolicy::Propagate => {
                    let body = formats::parse(kind, &path)?;
                    Ok(kind.heading(&body))
                }
            },
        }
    }

    fn isolated(&self, kind: FileKind, path: &Path) -> String {
        match formats::parse(kind, path) {
            Ok(body) => kind.heading(&body),
            Err(e) => {
                warn!(kind = ?kind, error = %e, "Failed to parse uploaded file");
                format!("Error reading {}: {}", kind.error_label(), e)
            }
        }
    }
}
