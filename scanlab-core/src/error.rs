//! Error handling for scanlab
//!
//! Every variant here is a setup-time failure: it is raised before a
//! stopwatch is started and the harness treats it as fatal. Rejected OS
//! advice is not an error, see [`crate::prefetch::AdviceOutcome`].

use core::fmt;
use std::io;
use std::path::PathBuf;

/// Common error type used throughout scanlab
#[derive(Debug)]
pub enum Error {
    /// The allocator could not provide `count` elements of `width` bytes
    AllocationFailure {
        /// Requested element count
        count: usize,
        /// Element width in bytes
        width: usize,
    },
    /// The file could not be opened read-only
    OpenFailure {
        /// Path that was opened
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// The file's byte length could not be determined
    StatFailure {
        /// Path that was queried
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// The read-only shared mapping could not be established
    MapFailure {
        /// Path that was mapped
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// A tunable is out of range
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AllocationFailure { count, width } => {
                write!(f, "Allocation failure: {} elements of {} bytes", count, width)
            }
            Error::OpenFailure { path, source } => {
                write!(f, "Open failure: {}: {}", path.display(), source)
            }
            Error::StatFailure { path, source } => {
                write!(f, "Stat failure: {}: {}", path.display(), source)
            }
            Error::MapFailure { path, source } => {
                write!(f, "Map failure: {}: {}", path.display(), source)
            }
            Error::InvalidConfig(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenFailure { source, .. }
            | Error::StatFailure { source, .. }
            | Error::MapFailure { source, .. } => Some(source),
            Error::AllocationFailure { .. } | Error::InvalidConfig(_) => None,
        }
    }
}

/// Result type for operations that can fail
pub type Result<T> = core::result::Result<T, Error>;

/// Creates a new configuration error
pub fn invalid_config(msg: &str) -> Error {
    Error::InvalidConfig(msg.to_string())
}
