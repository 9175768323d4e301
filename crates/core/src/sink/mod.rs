//! Output sinks: print, PDF export and CSV export.
//!
//! Sinks are synchronous and work on already assembled data. Exports are returned as
//! [`Export`] values; writing them somewhere is the job of a [`DownloadSink`].

pub mod csv;
pub mod pdf;
pub mod print;
pub mod targets;

use crate::{PrintError, PrintResult};
use std::fs;
use std::path::{Path, PathBuf};

pub const PDF_MIME: &str = "application/pdf";
pub const CSV_MIME: &str = "text/csv;charset=utf-8";

/// A finished export, ready to be downloaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Export {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Destination for finished exports.
pub trait DownloadSink {
    /// Stores `export` and returns where it was written.
    fn deliver(&self, export: &Export) -> PrintResult<PathBuf>;
}

/// Writes exports into a directory, creating it on first use.
#[derive(Clone, Debug)]
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectoryDownloads {
    fn deliver(&self, export: &Export) -> PrintResult<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(PrintError::OutputDirCreation)?;
        let path = self.dir.join(&export.filename);
        fs::write(&path, &export.bytes).map_err(PrintError::FileWrite)?;
        tracing::info!(
            path = %path.display(),
            bytes = export.bytes.len(),
            mime = export.mime,
            "export written"
        );
        Ok(path)
    }
}
