//! Archive listing.
//!
//! Members are reported in stored order together with the metadata fields
//! a reproducible build pins, so the output can be used to check both.

use crate::Result;
use crate::extract::extraction_error;
use crate::extract::open_tar_stream;
use crate::formats::ArchiveType;
use crate::formats::detect::detect_archive;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const S_IFMT: u32 = 0o170_000;
const S_IFLNK: u32 = 0o120_000;

/// Kind of a listed member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Hard link (tar only).
    Hardlink,
    /// Device node, fifo, or other special member.
    Other,
}

impl MemberKind {
    /// One-character tag used in long listings.
    #[must_use]
    pub const fn tag(self) -> char {
        match self {
            Self::File => '-',
            Self::Directory => 'd',
            Self::Symlink => 'l',
            Self::Hardlink => 'h',
            Self::Other => '?',
        }
    }
}

/// Zip MS-DOS date-time, as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZipTimestamp {
    /// Year (1980-2107).
    pub year: u16,
    /// Month (1-12).
    pub month: u8,
    /// Day (1-31).
    pub day: u8,
    /// Hour (0-23).
    pub hour: u8,
    /// Minute (0-59).
    pub minute: u8,
    /// Second (0-58, even).
    pub second: u8,
}

impl fmt::Display for ZipTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

impl From<zip::DateTime> for ZipTimestamp {
    fn from(dt: zip::DateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
        }
    }
}

/// One listed member.
///
/// Tar-only fields are `None` for zip members and vice versa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Member name exactly as stored (directories keep a trailing `/`).
    pub path: String,
    /// Member kind.
    pub kind: MemberKind,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Permission bits, without file-type bits.
    pub mode: Option<u32>,
    /// Owner id (tar).
    pub uid: Option<u64>,
    /// Group id (tar).
    pub gid: Option<u64>,
    /// Owner name (tar).
    pub uname: Option<String>,
    /// Group name (tar).
    pub gname: Option<String>,
    /// Modification time in seconds since the epoch (tar).
    pub mtime: Option<u64>,
    /// Last-modified date-time (zip).
    pub zip_modified: Option<ZipTimestamp>,
    /// Link target for symlinks and hard links (tar).
    pub link_target: Option<String>,
}

/// Members of an archive, in stored order.
#[derive(Debug, Clone)]
pub struct ArchiveManifest {
    /// Detected archive type.
    pub archive_type: ArchiveType,
    /// Members in the order they appear in the archive.
    pub entries: Vec<ManifestEntry>,
}

impl ArchiveManifest {
    /// Member names in stored order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the archive has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of uncompressed member sizes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }
}

/// Lists the members of a tar-family or zip archive.
///
/// # Errors
///
/// Returns `UnsupportedArchive` if the type cannot be determined and
/// `Extraction` if the archive cannot be read.
///
/// # Examples
///
/// ```no_run
/// use reproducible_core::list_archive;
/// use std::path::Path;
///
/// let manifest = list_archive(Path::new("dist/pkg.tar.gz"))?;
/// for name in manifest.names() {
///     println!("{name}");
/// }
/// # Ok::<(), reproducible_core::ArchiveError>(())
/// ```
pub fn list_archive(archive: &Path) -> Result<ArchiveManifest> {
    let archive_type = detect_archive(archive).map_err(|err| match err {
        crate::ArchiveError::Io(e) => extraction_error(archive, e),
        other => other,
    })?;
    let entries = match archive_type {
        ArchiveType::Zip => list_zip(archive)?,
        tar_type => list_tar(archive, tar_type)?,
    };
    Ok(ArchiveManifest {
        archive_type,
        entries,
    })
}

fn list_tar(archive: &Path, archive_type: ArchiveType) -> Result<Vec<ManifestEntry>> {
    let mut tar = tar::Archive::new(open_tar_stream(archive, archive_type)?);
    let mut listed = Vec::new();

    for entry in tar.entries().map_err(|e| extraction_error(archive, e))? {
        let entry = entry.map_err(|e| extraction_error(archive, e))?;
        let header = entry.header();
        let kind = match header.entry_type() {
            tar::EntryType::Regular | tar::EntryType::Continuous => MemberKind::File,
            tar::EntryType::Directory => MemberKind::Directory,
            tar::EntryType::Symlink => MemberKind::Symlink,
            tar::EntryType::Link => MemberKind::Hardlink,
            _ => MemberKind::Other,
        };
        let link_target = entry
            .link_name_bytes()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());

        listed.push(ManifestEntry {
            path: String::from_utf8_lossy(&entry.path_bytes()).into_owned(),
            kind,
            size: entry.size(),
            mode: header.mode().ok().map(|m| m & 0o7777),
            uid: header.uid().ok(),
            gid: header.gid().ok(),
            uname: header.username().ok().flatten().map(str::to_string),
            gname: header.groupname().ok().flatten().map(str::to_string),
            mtime: header.mtime().ok(),
            zip_modified: None,
            link_target,
        });
    }
    Ok(listed)
}

fn list_zip(archive: &Path) -> Result<Vec<ManifestEntry>> {
    let file = File::open(archive).map_err(|e| extraction_error(archive, e))?;
    let mut zip =
        zip::ZipArchive::new(BufReader::new(file)).map_err(|e| extraction_error(archive, e))?;
    let mut listed = Vec::with_capacity(zip.len());

    for index in 0..zip.len() {
        let member = zip
            .by_index_raw(index)
            .map_err(|e| extraction_error(archive, e))?;
        let unix_mode = member.unix_mode();
        let kind = if member.is_dir() {
            MemberKind::Directory
        } else if unix_mode.is_some_and(|m| m & S_IFMT == S_IFLNK) {
            MemberKind::Symlink
        } else {
            MemberKind::File
        };

        listed.push(ManifestEntry {
            path: member.name().to_string(),
            kind,
            size: member.size(),
            mode: unix_mode.map(|m| m & 0o7777),
            uid: None,
            gid: None,
            uname: None,
            gname: None,
            mtime: None,
            zip_modified: member.last_modified().map(ZipTimestamp::from),
            link_target: None,
        });
    }
    Ok(listed)
}
