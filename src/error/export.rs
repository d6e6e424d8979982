// Export error types and constants

use crate::error::ErrorCode;
use std::fmt;

/// Export error code constants
///
/// Error code range: 3001
pub struct ExportErrorCodes {}

impl ExportErrorCodes {
    /// No records available to export
    pub const NO_RECORDS: i32 = 3001;
}

/// Export-related errors
///
/// Error code range: 3001
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// No records available to export; no file is produced
    NoRecords,
}

impl ErrorCode for ExportError {
    fn code(&self) -> i32 {
        match self {
            ExportError::NoRecords => ExportErrorCodes::NO_RECORDS,
        }
    }

    fn message(&self) -> String {
        match self {
            ExportError::NoRecords => "No records to export".to_string(),
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExportError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ExportError {}
