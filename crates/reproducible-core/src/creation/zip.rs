//! Zip serializer.
//!
//! Zip needs its central directory written after the entry data, so the
//! archive is assembled in an anonymous scratch file and copied to the
//! destination only once it has been finalized. Every entry header carries
//! the 1980-01-01 floor date regardless of the source mtime.

use crate::ArchiveError;
use crate::Result;
use crate::creation::config::BuildOptions;
use crate::creation::filters::compute_archive_path;
use crate::creation::metadata;
use crate::creation::report::CreationReport;
use crate::creation::walker::ArchiveEntry;
use crate::creation::walker::EntryKind;
use crate::progress::ProgressTracker;
use std::fs::File;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::path::Path;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Zip entries at or above this size need zip64 headers.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Writes `entries` as a zip archive and copies it into `sink`.
///
/// Only [`EntryKind::File`] entries are written. `compress` selects deflate
/// over store.
pub(crate) fn write_zip<W: Write>(
    entries: &[ArchiveEntry],
    mut sink: W,
    options: &BuildOptions,
    compress: bool,
    tracker: &mut ProgressTracker<'_>,
    report: &mut CreationReport,
) -> Result<W> {
    let scratch = open_scratch(options.scratch_dir.as_deref())?;
    let mut zip = ZipWriter::new(scratch);

    for entry in entries {
        if entry.kind != EntryKind::File {
            continue;
        }
        let name = compute_archive_path(options.prepend_path.as_deref(), &entry.relative_path)?;
        tracker.entry_start(Path::new(&name));

        let meta = std::fs::metadata(&entry.source_path)
            .map_err(|e| ArchiveError::traversal(&entry.source_path, e))?;
        let content = std::fs::read(&entry.source_path)
            .map_err(|e| ArchiveError::traversal(&entry.source_path, e))?;
        let size = content.len() as u64;

        let file_options = base_options(options, compress)
            .unix_permissions(metadata::zip_permissions(&meta))
            .large_file(size >= ZIP64_THRESHOLD);
        zip.start_file(name.as_str(), file_options)?;
        zip.write_all(&content)?;

        tracker.bytes(size);
        report.files_added += 1;
        report.bytes_read += size;
        tracing::debug!(member = %name, size, "added zip member");
        tracker.entry_complete(Path::new(&name));
    }

    let mut scratch = zip.finish()?;
    scratch.flush()?;
    scratch.seek(SeekFrom::Start(0))?;
    std::io::copy(&mut scratch, &mut sink)?;
    sink.flush()?;
    Ok(sink)
}

fn open_scratch(dir: Option<&Path>) -> Result<File> {
    let file = match dir {
        Some(dir) => tempfile::tempfile_in(dir)?,
        None => tempfile::tempfile()?,
    };
    Ok(file)
}

fn base_options(options: &BuildOptions, compress: bool) -> SimpleFileOptions {
    let base = SimpleFileOptions::default().last_modified_time(metadata::zip_epoch());
    if compress {
        base.compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(options.deflate_level())))
    } else {
        base.compression_method(CompressionMethod::Stored)
    }
}
