//! Unpacking of source archives for repack.
//!
//! Ownership is never restored; permission bits are. Entries that would land
//! outside the destination are refused by the underlying readers.

use crate::ArchiveError;
use crate::Result;
use crate::formats::ArchiveType;
use crate::formats::detect::detect_archive;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;

/// Unpacks `archive` into the existing directory `dest`.
///
/// The archive type is detected from the file name, falling back to the
/// leading bytes. Returns the detected type.
///
/// # Errors
///
/// Returns `UnsupportedArchive` if the type cannot be determined, and
/// `Extraction` if the archive cannot be opened or unpacked.
///
/// # Examples
///
/// ```no_run
/// use reproducible_core::extract_archive;
/// use std::path::Path;
///
/// let kind = extract_archive(Path::new("release.tar.gz"), Path::new("/tmp/unpacked"))?;
/// println!("unpacked a {kind:?} archive");
/// # Ok::<(), reproducible_core::ArchiveError>(())
/// ```
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<ArchiveType> {
    let archive_type = detect_archive(archive).map_err(|err| match err {
        ArchiveError::Io(e) => extraction_error(archive, e),
        other => other,
    })?;
    match archive_type {
        ArchiveType::Zip => {
            let file = File::open(archive).map_err(|e| extraction_error(archive, e))?;
            let mut zip = zip::ZipArchive::new(BufReader::new(file))
                .map_err(|e| extraction_error(archive, e))?;
            zip.extract(dest).map_err(|e| extraction_error(archive, e))?;
        }
        tar_type => {
            let mut tar = tar::Archive::new(open_tar_stream(archive, tar_type)?);
            tar.set_preserve_permissions(true);
            tar.set_preserve_ownerships(false);
            tar.set_overwrite(true);
            tar.unpack(dest).map_err(|e| extraction_error(archive, e))?;
        }
    }

    tracing::debug!(
        archive = %archive.display(),
        dest = %dest.display(),
        ?archive_type,
        "extracted source archive"
    );
    Ok(archive_type)
}

/// Opens a decompressed tar stream for any tar-family archive type.
pub(crate) fn open_tar_stream(
    archive: &Path,
    archive_type: ArchiveType,
) -> Result<Box<dyn Read>> {
    let file = File::open(archive).map_err(|e| extraction_error(archive, e))?;
    let reader = BufReader::new(file);
    let stream: Box<dyn Read> = match archive_type {
        ArchiveType::Tar => Box::new(reader),
        ArchiveType::TarGz => Box::new(flate2::read::MultiGzDecoder::new(reader)),
        ArchiveType::TarBz2 => Box::new(bzip2::read::BzDecoder::new(reader)),
        ArchiveType::TarXz => Box::new(xz2::read::XzDecoder::new(reader)),
        ArchiveType::TarZst => Box::new(
            zstd::stream::read::Decoder::with_buffer(reader)
                .map_err(|e| extraction_error(archive, e))?,
        ),
        ArchiveType::Zip => {
            return Err(extraction_error(archive, "zip archives have no tar stream"));
        }
    };
    Ok(stream)
}

pub(crate) fn extraction_error(archive: &Path, reason: impl std::fmt::Display) -> ArchiveError {
    ArchiveError::Extraction {
        archive: archive.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn tar_bytes() -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        let mut header = tar::Header::new_ustar();
        header.set_size(5);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "dir/hello.txt", &b"hello"[..])
            .unwrap();
        builder.into_inner().unwrap()
    }

    #[test]
    fn test_extract_tar() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("in.tar");
        fs::write(&archive, tar_bytes()).unwrap();
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();

        assert_eq!(extract_archive(&archive, &dest).unwrap(), ArchiveType::Tar);
        assert_eq!(fs::read_to_string(dest.join("dir/hello.txt")).unwrap(), "hello");
    }

    #[test]
    fn test_extract_tar_gz() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("in.tgz");
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&tar_bytes()).unwrap();
        fs::write(&archive, encoder.finish().unwrap()).unwrap();
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();

        assert_eq!(extract_archive(&archive, &dest).unwrap(), ArchiveType::TarGz);
        assert!(dest.join("dir/hello.txt").exists());
    }

    #[test]
    fn test_extract_tar_zst() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("in.tar.zst");
        fs::write(&archive, zstd::encode_all(tar_bytes().as_slice(), 3).unwrap()).unwrap();
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();

        assert_eq!(extract_archive(&archive, &dest).unwrap(), ArchiveType::TarZst);
        assert!(dest.join("dir/hello.txt").exists());
    }

    #[test]
    fn test_extract_zip_by_content() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("download.bin");
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file("a.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"zipped").unwrap();
        fs::write(&archive, writer.finish().unwrap().into_inner()).unwrap();
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();

        assert_eq!(extract_archive(&archive, &dest).unwrap(), ArchiveType::Zip);
        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "zipped");
    }

    #[test]
    fn test_corrupt_archive() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("broken.tar.gz");
        fs::write(&archive, b"definitely not gzip").unwrap();

        let err = extract_archive(&archive, temp.path()).unwrap_err();
        assert!(matches!(err, ArchiveError::Extraction { .. }));
    }

    #[test]
    fn test_missing_archive() {
        let temp = TempDir::new().unwrap();
        let err = extract_archive(&temp.path().join("gone.tar"), temp.path()).unwrap_err();
        assert!(matches!(err, ArchiveError::Extraction { .. }));
    }

    #[test]
    fn test_unknown_archive_type() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("notes.txt");
        fs::write(&archive, b"plain").unwrap();

        let err = extract_archive(&archive, temp.path()).unwrap_err();
        assert!(matches!(err, ArchiveError::UnsupportedArchive { .. }));
    }
}
