// Scoped temporary storage for a single request

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tempfile::TempDir;

/// Bytes and name of a file received with a request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }

    /// Name safe to join onto a directory: the last path component only
    pub fn safe_name(&self) -> String {
        Path::new(&self.filename)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("upload")
            .to_string()
    }
}

/// Temporary directory that is removed, with everything in it, on drop
#[derive(Debug)]
pub struct ScratchSpace {
    dir: TempDir,
}

impl ScratchSpace {
    /// Create under `root`, or the system temp directory when `None`
    pub fn new(root: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("docqa-");
        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the upload into the scratch root and return its path
    pub fn write_upload(&self, upload: &UploadedFile) -> io::Result<PathBuf> {
        let path = self.dir.path().join(upload.safe_name());
        fs::write(&path, &upload.data)?;
        Ok(path)
    }

    /// Create (or reuse) a directory under the scratch root
    pub fn child_dir(&self, name: &str) -> io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::create_dir_all(&path)?;
        Ok(path)
    }
}
