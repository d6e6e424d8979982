// Storage error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Storage error code constants
///
/// Error code range: 2001-2003
pub struct StorageErrorCodes {}

impl StorageErrorCodes {
    /// Failed to read from the backing store
    pub const READ_FAILED: i32 = 2001;

    /// Failed to write to the backing store
    pub const WRITE_FAILED: i32 = 2002;

    /// Failed to serialize the record collection
    pub const SERIALIZE_FAILED: i32 = 2003;
}

/// Log a storage error with structured context
pub fn log_storage_error(err: &StorageError, context: &str) {
    error!(
        "Storage error in {}: code={}, component=RecordStore, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Storage-related errors
///
/// These errors cover the key-value persistence port and the record
/// collection layered on top of it. Corrupt stored content is NOT an
/// error: the store recovers to an empty collection and reports it via
/// the load result instead.
///
/// Error code range: 2001-2003
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// Failed to read from the backing store
    ReadFailed { reason: String },

    /// Failed to write to the backing store
    WriteFailed { reason: String },

    /// Failed to serialize the record collection
    SerializeFailed { reason: String },
}

impl ErrorCode for StorageError {
    fn code(&self) -> i32 {
        match self {
            StorageError::ReadFailed { .. } => StorageErrorCodes::READ_FAILED,
            StorageError::WriteFailed { .. } => StorageErrorCodes::WRITE_FAILED,
            StorageError::SerializeFailed { .. } => StorageErrorCodes::SERIALIZE_FAILED,
        }
    }

    fn message(&self) -> String {
        match self {
            StorageError::ReadFailed { reason } => format!("Store read failed: {}", reason),
            StorageError::WriteFailed { reason } => format!("Store write failed: {}", reason),
            StorageError::SerializeFailed { reason } => {
                format!("Record serialization failed: {}", reason)
            }
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StorageError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for StorageError {}
