//! Configuration for reproducible archive builds.

use crate::ArchiveError;
use crate::Result;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Gzip compression level used for `tar-gz` when none is configured.
pub const DEFAULT_GZIP_LEVEL: u8 = 9;

/// Deflate level used for `zip-deflate` when none is configured.
pub const DEFAULT_DEFLATE_LEVEL: u8 = 6;

/// Options shared by every output format.
///
/// Nothing in here may introduce run-to-run variation: every field is either
/// user-declared input or a fixed default.
///
/// # Examples
///
/// ```
/// use reproducible_core::BuildOptions;
///
/// let options = BuildOptions::default()
///     .with_prepend_path(Some("pkg-1.0".into()))
///     .with_exclude(["target", ".git"])
///     .with_compression_level(Some(6));
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Path prepended to every member name.
    ///
    /// The joined name is normalized lexically; leading separators are
    /// dropped so member names stay relative.
    ///
    /// Default: `None`.
    pub prepend_path: Option<PathBuf>,

    /// Relative paths to include.
    ///
    /// When set, only entries whose relative path is a member survive.
    ///
    /// Default: `None` (everything).
    pub file_selector: Option<BTreeSet<PathBuf>>,

    /// Relative or absolute paths to omit.
    ///
    /// Evaluated after `file_selector`. Each path matches exactly one entry:
    /// excluding a directory omits only its own member, not its contents.
    ///
    /// Default: `None`.
    pub exclude_set: Option<BTreeSet<PathBuf>>,

    /// Compression level (1-9) for `tar-gz` and `zip-deflate`.
    ///
    /// `None` uses [`DEFAULT_GZIP_LEVEL`] or [`DEFAULT_DEFLATE_LEVEL`].
    pub compression_level: Option<u8>,

    /// Follow symlinks while walking the source tree.
    ///
    /// Default: `false` (tar stores symlinks as links).
    pub follow_symlinks: bool,

    /// File name embedded in the gzip header.
    ///
    /// `None` derives `<source dir name>.tar`.
    pub gzip_member_name: Option<String>,

    /// Directory for the zip scratch file.
    ///
    /// `None` uses the system temporary directory.
    pub scratch_dir: Option<PathBuf>,
}

impl BuildOptions {
    /// Creates options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the prefix prepended to every member name.
    #[must_use]
    pub fn with_prepend_path(mut self, prefix: Option<PathBuf>) -> Self {
        self.prepend_path = prefix;
        self
    }

    /// Restricts the build to the given relative paths.
    #[must_use]
    pub fn with_file_selector<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.file_selector = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Omits the given relative or absolute paths.
    #[must_use]
    pub fn with_exclude<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.exclude_set = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the compression level.
    #[must_use]
    pub fn with_compression_level(mut self, level: Option<u8>) -> Self {
        self.compression_level = level;
        self
    }

    /// Sets whether to follow symlinks.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Overrides the file name stored in the gzip header.
    #[must_use]
    pub fn with_gzip_member_name(mut self, name: Option<String>) -> Self {
        self.gzip_member_name = name;
        self
    }

    /// Sets the directory used for the zip scratch file.
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.scratch_dir = dir;
        self
    }

    /// Gzip level to use, falling back to [`DEFAULT_GZIP_LEVEL`].
    #[must_use]
    pub fn gzip_level(&self) -> u8 {
        self.compression_level.unwrap_or(DEFAULT_GZIP_LEVEL)
    }

    /// Deflate level to use, falling back to [`DEFAULT_DEFLATE_LEVEL`].
    #[must_use]
    pub fn deflate_level(&self) -> u8 {
        self.compression_level.unwrap_or(DEFAULT_DEFLATE_LEVEL)
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Compression level is set but not in range 1-9
    /// - The gzip member name is empty or contains a NUL byte
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.compression_level
            && !(1..=9).contains(&level)
        {
            return Err(ArchiveError::InvalidCompressionLevel { level });
        }
        if let Some(name) = &self.gzip_member_name
            && (name.is_empty() || name.contains('\0'))
        {
            return Err(ArchiveError::InvalidConfig {
                reason: format!("invalid gzip member name {name:?}"),
            });
        }
        Ok(())
    }
}
