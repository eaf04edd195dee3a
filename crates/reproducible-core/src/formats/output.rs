//! Output container formats.

use std::fmt;
use std::str::FromStr;

use crate::ArchiveError;

/// Container format produced by a build.
///
/// The textual names (`tar`, `tar-gz`, `zip-store`, `zip-deflate`) are the
/// ones accepted on the command line and by [`FromStr`].
///
/// # Examples
///
/// ```
/// use reproducible_core::OutputFormat;
///
/// let format: OutputFormat = "zip-deflate".parse()?;
/// assert!(format.is_zip());
/// assert!(format.is_compressed());
/// assert_eq!(OutputFormat::default(), OutputFormat::TarGz);
/// # Ok::<(), reproducible_core::ArchiveError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Uncompressed tar.
    Tar,
    /// Tar wrapped in a gzip envelope.
    #[default]
    TarGz,
    /// Zip with stored (uncompressed) members.
    ZipStore,
    /// Zip with deflated members.
    ZipDeflate,
}

impl OutputFormat {
    /// All formats, in declaration order.
    pub const ALL: [Self; 4] = [Self::Tar, Self::TarGz, Self::ZipStore, Self::ZipDeflate];

    /// Returns the command-line name of this format.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::TarGz => "tar-gz",
            Self::ZipStore => "zip-store",
            Self::ZipDeflate => "zip-deflate",
        }
    }

    /// Returns `true` for the zip container formats.
    #[must_use]
    pub const fn is_zip(self) -> bool {
        matches!(self, Self::ZipStore | Self::ZipDeflate)
    }

    /// Returns `true` when the payload is compressed.
    #[must_use]
    pub const fn is_compressed(self) -> bool {
        matches!(self, Self::TarGz | Self::ZipDeflate)
    }

    /// Returns the conventional file extension, without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
            Self::ZipStore | Self::ZipDeflate => "zip",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.name() == s)
            .ok_or_else(|| ArchiveError::UnsupportedFormat { name: s.to_string() })
    }
}
