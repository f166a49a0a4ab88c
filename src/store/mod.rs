//! Local upload store
//!
//! Uploaded images are committed to a single directory under generated names.
//! The same directory is served read-only, so a stored file's name is its
//! public handle. Files are only ever added; nothing here renames or deletes.

pub mod naming;

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::logger;

/// Redraws allowed when a generated name already exists on disk
const MAX_NAME_ATTEMPTS: usize = 4;

/// A file committed to the store
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub path: PathBuf,
    pub size: usize,
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
    tag: String,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>, tag: &str) -> Self {
        Self {
            dir: dir.into(),
            tag: tag.to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the storage directory if it does not exist yet
    pub async fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    /// Write `data` under a freshly generated name derived from `original_name`
    pub async fn commit(&self, original_name: &str, data: &[u8]) -> io::Result<StoredFile> {
        let mut last_err = None;

        for _ in 0..MAX_NAME_ATTEMPTS {
            let filename = naming::fresh(&self.tag, original_name);
            let path = self.dir.join(&filename);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(f) => f,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    logger::log_warning(&format!("Generated name collided, redrawing: {filename}"));
                    last_err = Some(e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            file.write_all(data).await?;
            file.flush().await?;

            return Ok(StoredFile {
                filename,
                path,
                size: data.len(),
            });
        }

        Err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::AlreadyExists, "could not allocate a unique filename")
        }))
    }

    /// Names of every entry currently in the directory, sorted
    pub async fn list(&self) -> io::Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    /// Resolve `name` to a file inside the store.
    ///
    /// Returns `None` for anything that is not a plain filename, does not
    /// exist, or resolves (through symlinks) outside the directory.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if !naming::is_plain_name(name) {
            return None;
        }

        let dir_canonical = match self.dir.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                logger::log_warning(&format!(
                    "Upload directory not found or inaccessible '{}': {e}",
                    self.dir.display()
                ));
                return None;
            }
        };

        // Missing files are the common 404 case, not worth a log line
        let file_canonical = self.dir.join(name).canonicalize().ok()?;
        if !file_canonical.starts_with(&dir_canonical) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {name} -> {}",
                file_canonical.display()
            ));
            return None;
        }
        file_canonical.is_file().then_some(file_canonical)
    }

    /// Read a stored file's bytes
    pub async fn read(&self, name: &str) -> Option<Vec<u8>> {
        let path = self.resolve(name)?;
        match fs::read(&path).await {
            Ok(c) => Some(c),
            Err(e) => {
                logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
                None
            }
        }
    }
}
