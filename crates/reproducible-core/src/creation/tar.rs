//! Tar serializer.
//!
//! Entries are appended one at a time, in the order given, with headers
//! passed through the metadata normalizer. The serializer never recurses:
//! directories are written as single members and their children arrive as
//! separate entries.

use crate::ArchiveError;
use crate::Result;
use crate::creation::config::BuildOptions;
use crate::creation::filters::compute_archive_path;
use crate::creation::metadata;
use crate::creation::report::CreationReport;
use crate::creation::walker::ArchiveEntry;
use crate::creation::walker::EntryKind;
use crate::progress::ProgressTracker;
use flate2::Compression;
use flate2::GzBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tar::Builder;

/// Writes `entries` as an uncompressed tar stream into `sink`.
///
/// Returns the sink once the end-of-archive blocks have been written.
pub(crate) fn write_tar<W: Write>(
    entries: &[ArchiveEntry],
    sink: W,
    options: &BuildOptions,
    tracker: &mut ProgressTracker<'_>,
    report: &mut CreationReport,
) -> Result<W> {
    let mut builder = Builder::new(sink);

    for entry in entries {
        let name = compute_archive_path(options.prepend_path.as_deref(), &entry.relative_path)?;
        tracker.entry_start(Path::new(&name));
        match &entry.kind {
            EntryKind::File => {
                let bytes = append_file(&mut builder, entry, &name)?;
                tracker.bytes(bytes);
                report.files_added += 1;
                report.bytes_read += bytes;
            }
            EntryKind::Directory => {
                append_directory(&mut builder, entry, &name)?;
                report.directories_added += 1;
            }
            EntryKind::Symlink { target } => {
                append_symlink(&mut builder, entry, &name, target)?;
                report.symlinks_added += 1;
            }
        }
        tracing::debug!(member = %name, "added tar member");
        tracker.entry_complete(Path::new(&name));
    }

    builder.finish()?;
    Ok(builder.into_inner()?)
}

/// Writes `entries` as a tar stream inside a deterministic gzip envelope.
///
/// The gzip header carries `member_name`, an mtime of zero, and the
/// "unknown" OS byte. The extra-flags byte depends only on `level`.
pub(crate) fn write_tar_gz<W: Write>(
    entries: &[ArchiveEntry],
    sink: W,
    options: &BuildOptions,
    member_name: &str,
    tracker: &mut ProgressTracker<'_>,
    report: &mut CreationReport,
) -> Result<W> {
    let encoder = GzBuilder::new()
        .filename(member_name)
        .mtime(metadata::GZIP_MTIME)
        .operating_system(metadata::GZIP_OS)
        .write(sink, Compression::new(u32::from(options.gzip_level())));

    let encoder = write_tar(entries, encoder, options, tracker, report)?;
    Ok(encoder.finish()?)
}

fn append_file<W: Write>(
    builder: &mut Builder<W>,
    entry: &ArchiveEntry,
    name: &str,
) -> Result<u64> {
    let file = File::open(&entry.source_path)
        .map_err(|e| ArchiveError::traversal(&entry.source_path, e))?;
    let meta = file
        .metadata()
        .map_err(|e| ArchiveError::traversal(&entry.source_path, e))?;

    let mut header = metadata::tar_header_from(&meta)?;
    let size = meta.len();
    header.set_size(size);
    header.set_entry_type(tar::EntryType::Regular);
    builder.append_data(&mut header, name, file)?;
    Ok(size)
}

fn append_directory<W: Write>(
    builder: &mut Builder<W>,
    entry: &ArchiveEntry,
    name: &str,
) -> Result<()> {
    let meta = std::fs::metadata(&entry.source_path)
        .map_err(|e| ArchiveError::traversal(&entry.source_path, e))?;

    let mut header = metadata::tar_header_from(&meta)?;
    header.set_entry_type(tar::EntryType::Directory);
    header.set_size(0);
    builder.append_data(&mut header, format!("{name}/"), std::io::empty())?;
    Ok(())
}

fn append_symlink<W: Write>(
    builder: &mut Builder<W>,
    entry: &ArchiveEntry,
    name: &str,
    target: &Path,
) -> Result<()> {
    let meta = std::fs::symlink_metadata(&entry.source_path)
        .map_err(|e| ArchiveError::traversal(&entry.source_path, e))?;

    let mut header = metadata::tar_header_from(&meta)?;
    header.set_entry_type(tar::EntryType::Symlink);
    header.set_size(0);
    builder.append_link(&mut header, name, target)?;
    Ok(())
}
