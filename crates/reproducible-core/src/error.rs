//! Error types for reproducible archive operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Broad failure category an [`ArchiveError`] belongs to.
///
/// Every category is fatal: the current build or repack is aborted and no
/// retry is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Walking or reading the source tree failed.
    Traversal,
    /// Options are missing, conflicting, or out of range.
    Configuration,
    /// Unpacking a source archive during repack failed.
    Extraction,
    /// Writing the destination container failed.
    Serialization,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Traversal => "traversal",
            Self::Configuration => "configuration",
            Self::Extraction => "extraction",
            Self::Serialization => "serialization",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while building or repacking an archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// I/O operation on the output sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source directory does not exist.
    #[error("source not found: {path}")]
    SourceNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Walking the source tree failed.
    #[error("cannot traverse {path}: {reason}")]
    Traversal {
        /// Path being visited when the walk failed.
        path: PathBuf,
        /// Underlying failure.
        reason: String,
    },

    /// A path cannot be represented as an archive member name.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// The offending path.
        path: PathBuf,
    },

    /// A member name would resolve outside the archive root.
    #[error("archive path escapes the archive root: {path}")]
    PathEscapesRoot {
        /// The offending path.
        path: PathBuf,
    },

    /// Output format name is not recognized.
    #[error("unsupported output format: {name}")]
    UnsupportedFormat {
        /// The name that failed to parse.
        name: String,
    },

    /// Source archive type cannot be determined.
    #[error("unsupported archive type: {path}")]
    UnsupportedArchive {
        /// The archive path.
        path: PathBuf,
    },

    /// Compression level outside the valid range.
    #[error("invalid compression level {level}, must be 1-9")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u8,
    },

    /// Options are inconsistent or incomplete.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong.
        reason: String,
    },

    /// Unpacking a source archive failed.
    #[error("failed to extract {archive}: {reason}")]
    Extraction {
        /// The archive being unpacked.
        archive: PathBuf,
        /// Underlying failure.
        reason: String,
    },

    /// The container writer rejected an entry or failed to finalize.
    #[error("failed to write archive: {reason}")]
    Serialization {
        /// Underlying failure.
        reason: String,
    },
}

impl ArchiveError {
    /// Returns the taxonomy bucket of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use reproducible_core::ArchiveError;
    /// use reproducible_core::ErrorCategory;
    ///
    /// let err = ArchiveError::InvalidCompressionLevel { level: 12 };
    /// assert_eq!(err.category(), ErrorCategory::Configuration);
    /// ```
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::SourceNotFound { .. }
            | Self::Traversal { .. }
            | Self::NonUtf8Path { .. } => ErrorCategory::Traversal,
            Self::PathEscapesRoot { .. }
            | Self::UnsupportedFormat { .. }
            | Self::InvalidCompressionLevel { .. }
            | Self::InvalidConfig { .. } => ErrorCategory::Configuration,
            Self::UnsupportedArchive { .. } | Self::Extraction { .. } => {
                ErrorCategory::Extraction
            }
            Self::Io(_) | Self::Serialization { .. } => ErrorCategory::Serialization,
        }
    }

    /// Returns `true` if the source tree could not be walked or read.
    #[must_use]
    pub const fn is_traversal_error(&self) -> bool {
        matches!(self.category(), ErrorCategory::Traversal)
    }

    /// Returns `true` if the options were rejected before any I/O happened.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(self.category(), ErrorCategory::Configuration)
    }

    /// Returns a context string for this error, if available.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Traversal { reason, .. }
            | Self::InvalidConfig { reason }
            | Self::Extraction { reason, .. }
            | Self::Serialization { reason } => Some(reason),
            _ => None,
        }
    }

    pub(crate) fn traversal(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Traversal {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn serialization(reason: impl std::fmt::Display) -> Self {
        Self::Serialization {
            reason: reason.to_string(),
        }
    }
}

impl From<walkdir::Error> for ArchiveError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(PathBuf::from).unwrap_or_default();
        Self::traversal(path, err)
    }
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io_err) => Self::Io(io_err),
            other => Self::serialization(other),
        }
    }
}
