//! Error types
//!
//! Two typed boundaries exist in the core:
//! - `StoreError` for the local cache slot (classified I/O failures with
//!   recovery suggestions)
//! - `FetchError` for content sources (transport, status, parse)
//!
//! Neither is surfaced to the site reader: the store swallows save failures
//! after logging them, and the sync engine substitutes fallbacks for failed
//! fetches.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing the cache slot
#[derive(Error, Debug)]
pub enum StoreError {
    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File not found (when expected to exist)
    #[error("File not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// State could not be serialized
    #[error("Failed to serialize site state: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    /// Create an error from an I/O error with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StoreError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => StoreError::NotFound { path },
            _ if is_disk_full_error(&error) => StoreError::DiskFull {
                path,
                source: error,
            },
            _ => StoreError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::DiskFull { .. } => Some("Free up disk space and try again."),
            StoreError::PermissionDenied { .. } => {
                Some("Check file and directory permissions of the data directory.")
            }
            StoreError::AtomicWriteFailed { .. } => {
                Some("The previous cache file is intact; the next mutation will retry the write.")
            }
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised at the content-source boundary
///
/// Transport and parse failures are treated identically by the sync engine:
/// both resolve to the resource's documented fallback.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network-level failure (DNS, connect, timeout, body read)
    #[error("Request for '{resource}' failed: {source}")]
    Transport {
        resource: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("'{resource}' returned HTTP {status}")]
    Status { resource: String, status: u16 },

    /// Resource does not exist in the source
    #[error("'{resource}' not found")]
    NotFound { resource: String },

    /// Local read failure
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Response body was not the expected JSON shape
    #[error("'{resource}' is not valid JSON: {source}")]
    Parse {
        resource: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Whether the resource is simply absent (as opposed to broken)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FetchError::NotFound { .. } | FetchError::Status { status: 404, .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_classification() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StoreError::from_io(io_err, PathBuf::from("/test/path"));

        assert!(matches!(err, StoreError::PermissionDenied { .. }));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_not_found_classification() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = StoreError::from_io(io_err, PathBuf::from("/missing/file"));

        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_disk_full_detection() {
        let io_err = io::Error::new(io::ErrorKind::Other, "No space left on device");
        let err = StoreError::from_io(io_err, PathBuf::from("/full/disk"));

        assert!(matches!(err, StoreError::DiskFull { .. }));
        assert_eq!(
            err.recovery_suggestion(),
            Some("Free up disk space and try again.")
        );
    }

    #[test]
    fn test_fetch_not_found() {
        let err = FetchError::Status {
            resource: "content/meta.json".to_string(),
            status: 404,
        };
        assert!(err.is_not_found());
        assert!(err.to_string().contains("HTTP 404"));

        let err = FetchError::Status {
            resource: "content/meta.json".to_string(),
            status: 500,
        };
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_parse_error_display() {
        let source = serde_json::from_str::<u64>("nope").unwrap_err();
        let err = FetchError::Parse {
            resource: "content/pages.json".to_string(),
            source,
        };
        assert!(err.to_string().contains("content/pages.json"));
        assert!(err.to_string().contains("not valid JSON"));
    }
}
