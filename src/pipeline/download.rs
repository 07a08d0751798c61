//! The host's file-save mechanism.

use crate::error::ExportError;
use async_trait::async_trait;
use mdpress_render_core::PdfFile;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Receipt for a delivered PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPdf {
    pub filename: String,
    /// Where the file landed, for sinks that write to disk.
    pub path: Option<PathBuf>,
    pub size: usize,
    pub page_count: usize,
}

#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn save(&self, file: PdfFile) -> Result<SavedPdf, ExportError>;

    fn name(&self) -> &'static str;
}

/// Writes each file into a directory, replacing any file of the same name.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn save(&self, file: PdfFile) -> Result<SavedPdf, ExportError> {
        // Only the final component is used so a name can never leave `dir`.
        let name = Path::new(&file.filename)
            .file_name()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("'{}' is not a file name", file.filename),
                )
            })?
            .to_owned();

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(name);
        tokio::fs::write(&path, &file.bytes).await?;
        log::info!("Saved {} ({} bytes).", path.display(), file.bytes.len());

        Ok(SavedPdf {
            filename: file.filename,
            path: Some(path),
            size: file.bytes.len(),
            page_count: file.page_count,
        })
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}

/// Keeps files in memory, for embedders that handle delivery themselves.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<Vec<PdfFile>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> Vec<PdfFile> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and returns everything saved so far.
    pub fn take(&self) -> Vec<PdfFile> {
        std::mem::take(&mut *self.files.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[async_trait]
impl DownloadSink for MemorySink {
    async fn save(&self, file: PdfFile) -> Result<SavedPdf, ExportError> {
        let saved = SavedPdf {
            filename: file.filename.clone(),
            path: None,
            size: file.bytes.len(),
            page_count: file.page_count,
        };
        self.files.lock().unwrap_or_else(PoisonError::into_inner).push(file);
        Ok(saved)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
