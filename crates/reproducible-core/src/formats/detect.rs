//! Source archive type detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::ArchiveError;
use crate::Result;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const BZIP2_MAGIC: [u8; 3] = *b"BZh";
const XZ_MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];
const ZIP_LOCAL_MAGIC: [u8; 4] = *b"PK\x03\x04";
const ZIP_EMPTY_MAGIC: [u8; 4] = *b"PK\x05\x06";
const USTAR_OFFSET: usize = 257;
const USTAR_MAGIC: [u8; 5] = *b"ustar";

/// Archive types accepted as repack input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveType {
    /// Tar archive (uncompressed).
    Tar,
    /// Gzip-compressed tar archive.
    TarGz,
    /// Bzip2-compressed tar archive.
    TarBz2,
    /// XZ-compressed tar archive.
    TarXz,
    /// Zstd-compressed tar archive.
    TarZst,
    /// ZIP archive.
    Zip,
}

/// Detects the archive type from the file name alone.
///
/// # Errors
///
/// Returns `UnsupportedArchive` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<ArchiveType> {
    let unsupported = || ArchiveError::UnsupportedArchive {
        path: path.to_path_buf(),
    };
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(unsupported)?;

    match extension.to_ascii_lowercase().as_str() {
        "tar" => Ok(ArchiveType::Tar),
        "gz" | "tgz" => Ok(ArchiveType::TarGz),
        "bz2" | "tbz" | "tbz2" => Ok(ArchiveType::TarBz2),
        "xz" | "txz" => Ok(ArchiveType::TarXz),
        "zst" | "tzst" => Ok(ArchiveType::TarZst),
        "zip" => Ok(ArchiveType::Zip),
        _ => Err(unsupported()),
    }
}

/// Detects the archive type from leading bytes.
///
/// Compressed streams are assumed to hold a tar archive.
#[must_use]
pub fn detect_from_magic(header: &[u8]) -> Option<ArchiveType> {
    if header.starts_with(&ZIP_LOCAL_MAGIC) || header.starts_with(&ZIP_EMPTY_MAGIC) {
        Some(ArchiveType::Zip)
    } else if header.starts_with(&GZIP_MAGIC) {
        Some(ArchiveType::TarGz)
    } else if header.starts_with(&BZIP2_MAGIC) {
        Some(ArchiveType::TarBz2)
    } else if header.starts_with(&XZ_MAGIC) {
        Some(ArchiveType::TarXz)
    } else if header.starts_with(&ZSTD_MAGIC) {
        Some(ArchiveType::TarZst)
    } else if header
        .get(USTAR_OFFSET..USTAR_OFFSET + USTAR_MAGIC.len())
        .is_some_and(|magic| magic == USTAR_MAGIC)
    {
        Some(ArchiveType::Tar)
    } else {
        None
    }
}

/// Detects the archive type by extension, falling back to file content.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, or `UnsupportedArchive`
/// if neither the name nor the content identify a supported type.
pub fn detect_archive(path: &Path) -> Result<ArchiveType> {
    if let Ok(archive_type) = detect_format(path) {
        return Ok(archive_type);
    }

    let mut header = Vec::with_capacity(512);
    File::open(path)?.take(512).read_to_end(&mut header)?;

    detect_from_magic(&header).ok_or_else(|| ArchiveError::UnsupportedArchive {
        path: path.to_path_buf(),
    })
}
