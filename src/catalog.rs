//! Document catalog backed by a directory on disk
//!
//! Every call re-scans the directory, so files added or removed by an
//! operator are visible on the next listing.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while scanning the catalog directory
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Directory exists but could not be read
    #[error("Failed to read catalog directory {path}: {source}")]
    Io {
        /// Directory that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Lists and resolves documents stored in a single directory
#[derive(Debug, Clone)]
pub struct FileCatalog {
    dir: PathBuf,
    suffix: String,
}

impl FileCatalog {
    /// Creates a catalog over `dir` accepting files that end with `extension`
    ///
    /// The extension is matched case-insensitively; a leading dot is optional.
    ///
    /// # Examples
    ///
    /// ```
    /// use resource_bot::catalog::FileCatalog;
    ///
    /// let catalog = FileCatalog::new("files", "PDF");
    /// assert!(catalog.accepts("Guide.pdf"));
    /// assert!(!catalog.accepts("notes.txt"));
    /// ```
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, extension: &str) -> Self {
        let ext = extension.trim().trim_start_matches('.').to_lowercase();
        Self {
            dir: dir.into(),
            suffix: format!(".{ext}"),
        }
    }

    /// Directory scanned by this catalog
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns true if `file_name` carries the accepted extension
    #[must_use]
    pub fn accepts(&self, file_name: &str) -> bool {
        file_name.to_lowercase().ends_with(&self.suffix)
    }

    /// Lists the documents currently available, sorted by name
    ///
    /// Only regular files with the accepted extension are returned. A missing
    /// directory yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the directory exists but cannot be read.
    pub async fn list_available(&self) -> Result<Vec<String>, CatalogError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(dir = %self.dir.display(), "Catalog directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| self.io_error(e))? {
            // Follows symlinks, like a plain `is_file` check on the joined path
            let is_file = tokio::fs::metadata(entry.path())
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                debug!(path = %entry.path().display(), "Skipping non UTF-8 file name");
                continue;
            };
            if self.accepts(&name) {
                files.push(name);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Resolves `file_name` to a path inside the catalog directory
    ///
    /// Returns `None` if the file does not exist as a regular file, lacks the
    /// accepted extension, or is anything other than a single plain path
    /// component.
    pub async fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        if !is_plain_file_name(file_name) || !self.accepts(file_name) {
            return None;
        }
        let path = self.dir.join(file_name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(path),
            _ => None,
        }
    }

    fn io_error(&self, source: std::io::Error) -> CatalogError {
        CatalogError::Io {
            path: self.dir.clone(),
            source,
        }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == std::ffi::OsStr::new(name)
    )
}
