use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::errors::ReloadFailure;
use crate::domain::models::Policy;
use crate::domain::ports::{ModificationSignal, PolicySource};

/// Directory of policy documents, one policy per file.
#[derive(Debug, Clone)]
pub struct FsPolicySource {
    dir: PathBuf,
    extension: String,
}

impl FsPolicySource {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    /// Policy files sorted by name. A missing directory holds no policies.
    fn policy_files(&self) -> Result<Vec<PathBuf>, ReloadFailure> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(ReloadFailure::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| self.is_policy_file(path))
            .collect();
        files.sort();
        Ok(files)
    }

    fn is_policy_file(&self, path: &Path) -> bool {
        path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}

impl PolicySource for FsPolicySource {
    fn latest_signal(&self) -> Result<Option<ModificationSignal>, ReloadFailure> {
        let latest = self
            .policy_files()?
            .iter()
            // Files deleted between listing and stat are simply skipped.
            .filter_map(|path| fs::metadata(path).and_then(|meta| meta.modified()).ok())
            .max()
            .map(ModificationSignal::from);
        Ok(latest)
    }

    fn load(&self) -> Result<Vec<Policy>, ReloadFailure> {
        self.policy_files()?
            .into_iter()
            .map(|path| {
                let bytes = fs::read(&path).map_err(|source| ReloadFailure::Io {
                    path: path.clone(),
                    source,
                })?;
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let file_name = path
                    .file_name()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(Policy::from_file_stem(
                    &stem,
                    &file_name,
                    String::from_utf8_lossy(&bytes).into_owned(),
                ))
            })
            .collect()
    }
}
