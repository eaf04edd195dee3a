//! Sentinel metadata applied to every member.
//!
//! Tar headers are built from the filesystem and then passed through
//! [`normalize_tar_header`] right before they are appended. Zip has no
//! post-hoc hook, so [`zip_epoch`] is supplied when each entry header is
//! constructed.
//!
//! Zip timestamps cannot represent anything earlier than 1980-01-01, so
//! every zip entry carries that floor regardless of the source mtime. This
//! is a format limit and not reported as a warning.

use crate::Result;
use std::fs::Metadata;
use tar::Header;
use tar::HeaderMode;
use zip::DateTime;

/// Owner and group id written to every tar header.
pub const TAR_ID: u64 = 0;

/// Owner and group name written to every tar header.
pub const TAR_OWNER_NAME: &str = "root";

/// Modification time written to every tar header.
pub const TAR_MTIME: u64 = 0;

/// Modification time written into the gzip envelope.
pub const GZIP_MTIME: u32 = 0;

/// Operating-system byte written into the gzip envelope ("unknown").
pub const GZIP_OS: u8 = 255;

/// Zip date-time floor: 1980-01-01 00:00:00.
///
/// # Examples
///
/// ```
/// use reproducible_core::creation::metadata::zip_epoch;
///
/// let epoch = zip_epoch();
/// assert_eq!((epoch.year(), epoch.month(), epoch.day()), (1980, 1, 1));
/// assert_eq!((epoch.hour(), epoch.minute(), epoch.second()), (0, 0, 0));
/// ```
#[must_use]
pub fn zip_epoch() -> DateTime {
    DateTime::default()
}

/// Overwrites the volatile fields of a tar header with sentinel values.
///
/// Permission bits, entry type, size, and link name are left as read.
///
/// # Errors
///
/// Returns an I/O error if the owner names do not fit the header.
pub fn normalize_tar_header(header: &mut Header) -> Result<()> {
    header.set_uid(TAR_ID);
    header.set_gid(TAR_ID);
    header.set_username(TAR_OWNER_NAME)?;
    header.set_groupname(TAR_OWNER_NAME)?;
    header.set_mtime(TAR_MTIME);
    Ok(())
}

/// Builds a normalized ustar header from filesystem metadata.
///
/// The mode keeps only permission bits (`0o7777`); the file-type bits from
/// `st_mode` are carried by the entry type instead.
///
/// # Errors
///
/// Returns an I/O error if the header fields cannot be encoded.
pub fn tar_header_from(metadata: &Metadata) -> Result<Header> {
    let mut header = Header::new_ustar();
    header.set_metadata_in_mode(metadata, HeaderMode::Complete);
    let mode = header.mode()? & 0o7777;
    header.set_mode(mode);
    normalize_tar_header(&mut header)?;
    Ok(header)
}

/// Returns the permission bits to record for a zip entry.
#[cfg(unix)]
#[must_use]
pub fn zip_permissions(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

/// Returns the permission bits to record for a zip entry.
#[cfg(not(unix))]
#[must_use]
pub fn zip_permissions(metadata: &Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}
