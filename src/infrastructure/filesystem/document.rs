use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::ports::{DocumentSource, ModificationSignal};

/// Plain-text document on local disk.
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    path: PathBuf,
}

impl FsDocumentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentSource for FsDocumentSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn signal(&self) -> Option<ModificationSignal> {
        fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .ok()
            .map(ModificationSignal::from)
    }

    /// Invalid UTF-8 is replaced rather than rejected.
    fn read(&self) -> std::io::Result<String> {
        let bytes = fs::read(&self.path)?;
        Ok(String::from_utf8_lossy(&bytes).trim().to_string())
    }
}
