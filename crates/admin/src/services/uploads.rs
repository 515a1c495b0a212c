//! Transient upload files.
//!
//! An upload is staged on disk before it is parsed. [`UploadedFile`] owns that
//! file until it is discarded: [`UploadedFile::discard`] removes it on the
//! normal path, and `Drop` removes it if the owner goes away first (for
//! example when a request future is cancelled mid-upload).

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Longest stem kept from the client's file name.
const MAX_STEM_LENGTH: usize = 64;

/// A file on disk that is removed exactly once.
#[derive(Debug)]
pub struct UploadedFile {
    path: PathBuf,
    removed: bool,
}

impl UploadedFile {
    /// Take ownership of an existing file. It will be removed.
    #[must_use]
    pub const fn adopt(path: PathBuf) -> Self {
        Self {
            path,
            removed: false,
        }
    }

    /// Write `bytes` to a fresh, collision-free path in `dir`.
    ///
    /// The name keeps a sanitized version of `original_name` so the file is
    /// recognizable while it exists. A failed write leaves nothing behind.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from writing the file.
    pub async fn stage(dir: &Path, original_name: &str, bytes: &[u8]) -> io::Result<Self> {
        let file = Self::adopt(dir.join(staged_name(original_name)));
        tokio::fs::write(&file.path, bytes).await?;
        Ok(file)
    }

    /// Copy `source` into `dir` and own the copy, leaving `source` untouched.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from copying the file.
    pub async fn stage_copy(dir: &Path, source: &Path) -> io::Result<Self> {
        let original_name = source
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        let file = Self::adopt(dir.join(staged_name(original_name)));
        tokio::fs::copy(source, &file.path).await?;
        Ok(file)
    }

    /// Where the file lives.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file. A file that is already gone is not an error.
    ///
    /// # Errors
    ///
    /// Returns any other I/O error. The file is not retried on drop.
    pub async fn discard(mut self) -> io::Result<()> {
        let result = match tokio::fs::remove_file(&self.path).await {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        };
        self.removed = true;
        result
    }
}

impl Drop for UploadedFile {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => {
                tracing::warn!(
                    error = %err,
                    path = %self.path.display(),
                    "failed to remove abandoned upload"
                );
            }
            _ => {}
        }
    }
}

/// Build `<stem>-<uuid>.<ext>` from a client-supplied file name.
///
/// Path separators and anything outside `[A-Za-z0-9_-]` in the stem become
/// `_`, so the result is always a bare file name.
fn staged_name(original_name: &str) -> String {
    let base = Path::new(original_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let path = Path::new(base);

    let stem: String = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .chars()
        .take(MAX_STEM_LENGTH)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.is_empty() { "upload" } else { &stem };

    let id = Uuid::new_v4();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            format!("{stem}-{id}.{}", ext.to_ascii_lowercase())
        }
        _ => format!("{stem}-{id}"),
    }
}
