//! Port for delivering exported sessions to the user.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportSinkError {
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export rejected: {0}")]
    Rejected(String),
}

/// Accepts a serialized bundle plus a suggested file name and saves it
/// somewhere the user can find it.
pub trait ExportSink: Send + Sync {
    /// Returns a human-readable location of the saved file.
    fn save(&self, bytes: &[u8], suggested_name: &str) -> Result<String, ExportSinkError>;
}
