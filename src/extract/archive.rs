//! Archive expansion and the directory walker.
//!
//! Every file under the expanded tree is dispatched on its own suffix. A file
//! that fails to parse becomes an "Error reading <type> <path>: <message>"
//! segment and the walk carries on, so one bad file never sinks the archive.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

use super::{formats, ExtractionError, FileKind, ScratchSpace, INVALID_ZIP_MESSAGE};

/// Archives nested deeper than this are listed but not expanded
pub const MAX_ARCHIVE_DEPTH: usize = 4;

/// Unpack the zip at `archive` into `target`
pub fn expand(archive: &Path, target: &Path) -> Result<(), ExtractionError> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file)?;
    debug!(entries = zip.len(), target = %target.display(), "Expanding archive");
    zip.extract(target)?;
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct DirectoryWalker {
    depth: usize,
    scratch_root: Option<PathBuf>,
}

impl DirectoryWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand nested archives under `root` instead of the system temp directory
    pub fn with_scratch_root(mut self, root: Option<PathBuf>) -> Self {
        self.scratch_root = root;
        self
    }

    /// Visit every file under `root` in traversal order (not sorted) and join
    /// the per-file segments with blank lines.
    pub fn walk(&self, root: &Path) -> String {
        let mut segments = Vec::new();

        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let rel_path = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .into_owned();
            let name = entry.file_name().to_string_lossy();

            segments.push(self.describe(FileKind::from_name(&name), path, &rel_path));
        }

        segments.join("\n\n")
    }

    fn describe(&self, kind: FileKind, path: &Path, rel_path: &str) -> String {
        match kind {
            FileKind::Archive => self.nested(path, rel_path),
            FileKind::Unknown => match formats::read_text(path) {
                Ok(text) => kind.heading_for(rel_path, &text),
                Err(_) => format!("Unable to read file {}", rel_path),
            },
            _ => match formats::parse(kind, path) {
                Ok(body) => kind.heading_for(rel_path, &body),
                Err(e) => {
                    warn!(path = %rel_path, kind = ?kind, error = %e, "Failed to read archived file");
                    format!("Error reading {} {}: {}", kind.error_label(), rel_path, e)
                }
            },
        }
    }

    fn nested(&self, path: &Path, rel_path: &str) -> String {
        if self.depth + 1 >= MAX_ARCHIVE_DEPTH {
            return format!("Skipped nested archive {}: nesting limit reached", rel_path);
        }

        // Expanded beside, never inside, the tree being walked
        let scratch = match ScratchSpace::new(self.scratch_root.as_deref()) {
            Ok(scratch) => scratch,
            Err(e) => return format!("Error reading ZIP {}: {}", rel_path, e),
        };
        if let Err(e) = expand(path, scratch.path()) {
            warn!(path = %rel_path, error = %e, "Nested archive is not a valid ZIP");
            return format!("Error reading ZIP {}: {}", rel_path, INVALID_ZIP_MESSAGE);
        }

        let inner = DirectoryWalker {
            depth: self.depth + 1,
            scratch_root: self.scratch_root.clone(),
        };
        FileKind::Archive.heading_for(rel_path, &inner.walk(scratch.path()))
    }
}
