//! Export sink writing bundles into a directory.

use chat_application::ports::export_sink::{ExportSink, ExportSinkError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Saves exports as files inside one directory.
///
/// An existing file is never overwritten; a numeric suffix is added
/// instead (`name-1.json`, `name-2.json`, ...).
pub struct FileExportSink {
    dir: PathBuf,
}

impl FileExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn free_path(&self, name: &str) -> Result<PathBuf, ExportSinkError> {
        let candidate = self.dir.join(name);
        if !candidate.exists() {
            return Ok(candidate);
        }

        let path = Path::new(name);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
        let ext = path.extension().and_then(|s| s.to_str());
        for n in 1..1000 {
            let file = match ext {
                Some(ext) => format!("{}-{}.{}", stem, n, ext),
                None => format!("{}-{}", stem, n),
            };
            let candidate = self.dir.join(file);
            if !candidate.exists() {
                return Ok(candidate);
            }
        }
        Err(ExportSinkError::Rejected(format!(
            "too many files named {} in {}",
            name,
            self.dir.display()
        )))
    }
}

impl ExportSink for FileExportSink {
    fn save(&self, bytes: &[u8], suggested_name: &str) -> Result<String, ExportSinkError> {
        if suggested_name.is_empty() || suggested_name.contains(['/', '\\']) {
            return Err(ExportSinkError::Rejected(format!(
                "invalid file name: {:?}",
                suggested_name
            )));
        }

        fs::create_dir_all(&self.dir)?;
        let path = self.free_path(suggested_name)?;
        fs::write(&path, bytes)?;
        debug!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path.display().to_string())
    }
}
