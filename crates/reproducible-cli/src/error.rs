//! Error conversion utilities for CLI.
//!
//! Turns reproducible-core's typed errors into contextual `anyhow` errors
//! with a `HINT:` line where the user can act on the failure.

use anyhow::anyhow;
use reproducible_core::ArchiveError;
use std::path::Path;

/// Converts `ArchiveError` to a user-facing error naming `subject`.
///
/// `subject` is the source directory or archive the command was given.
pub fn convert_archive_error(err: ArchiveError, subject: &Path) -> anyhow::Error {
    match err {
        ArchiveError::SourceNotFound { path } => anyhow!(
            "Source directory not found: {}\n\
             HINT: Pass an existing directory with -d, or an archive with -a.",
            path.display()
        ),
        ArchiveError::Traversal { path, reason } => anyhow!(
            "Cannot read '{}' while walking '{}': {reason}\n\
             HINT: Every entry under the source must be readable; exclude such files with -x.",
            path.display(),
            subject.display()
        ),
        ArchiveError::NonUtf8Path { path } => anyhow!(
            "Path is not valid UTF-8: {}\n\
             HINT: Rename the file or exclude it with -x.",
            path.display()
        ),
        ArchiveError::PathEscapesRoot { path } => anyhow!(
            "Member path escapes the archive root: {}\n\
             HINT: Check the --prepend value for '..' segments.",
            path.display()
        ),
        ArchiveError::UnsupportedArchive { path } => anyhow!(
            "Archive format not supported: {}\n\
             HINT: Supported inputs: tar, tar.gz, tar.bz2, tar.xz, tar.zst, zip",
            path.display()
        ),
        ArchiveError::Extraction { archive, reason } => anyhow!(
            "Failed to unpack '{}': {reason}\n\
             HINT: The archive may be corrupted or truncated.",
            archive.display()
        ),
        ArchiveError::InvalidCompressionLevel { level } => anyhow!(
            "Invalid compression level {level}\n\
             HINT: Use a level between 1 and 9."
        ),
        other => anyhow::Error::from(other)
            .context(format!("Error processing '{}'", subject.display())),
    }
}

/// Adds CLI context to a core result.
pub fn add_archive_context<T>(
    result: reproducible_core::Result<T>,
    subject: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_archive_error(e, subject))
}
