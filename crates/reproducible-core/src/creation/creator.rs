//! Build pipeline: resolve, normalize, serialize.

use crate::OutputFormat;
use crate::ProgressCallback;
use crate::Result;
use crate::creation::config::BuildOptions;
use crate::creation::filters::normalize_lexically;
use crate::creation::report::CreationReport;
use crate::creation::walker::MemberSet;
use crate::creation::walker::resolve_entries;
use crate::io::CountingWriter;
use crate::progress::ProgressTracker;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Gzip member name used when the source root has no usable base name.
const FALLBACK_MEMBER_NAME: &str = "archive.tar";

/// Returns the member set a format records.
#[must_use]
pub fn member_set(format: OutputFormat) -> MemberSet {
    if format.is_zip() {
        MemberSet::FilesOnly
    } else {
        MemberSet::Tree
    }
}

/// Derives `<base name>.tar` from a source root.
///
/// Roots such as `.` are made absolute first so the name reflects the
/// directory actually archived.
///
/// # Examples
///
/// ```
/// use reproducible_core::creation::creator::default_member_name;
/// use std::path::Path;
///
/// assert_eq!(default_member_name(Path::new("/src/pkg-1.0")), "pkg-1.0.tar");
/// assert_eq!(default_member_name(Path::new("/src/pkg-1.0/")), "pkg-1.0.tar");
/// ```
#[must_use]
pub fn default_member_name(source_root: &Path) -> String {
    let absolute = std::path::absolute(source_root)
        .map(|abs| normalize_lexically(&abs))
        .unwrap_or_else(|_| source_root.to_path_buf());
    let base = source_root
        .file_name()
        .or_else(|| absolute.file_name())
        .map(|name| name.to_string_lossy());
    match base {
        Some(base) => format!("{base}.tar"),
        None => FALLBACK_MEMBER_NAME.to_string(),
    }
}

/// Runs one build.
///
/// Options are validated and the file set resolved before `open_sink` is
/// called, so configuration and traversal failures never create output.
pub(crate) fn run_build<W, F>(
    source_root: &Path,
    format: OutputFormat,
    options: &BuildOptions,
    member_name: &str,
    progress: &mut dyn ProgressCallback,
    open_sink: F,
) -> Result<CreationReport>
where
    W: Write,
    F: FnOnce() -> Result<W>,
{
    let start = Instant::now();
    options.validate()?;

    let mut report = CreationReport::default();
    let entries = resolve_entries(source_root, options, member_set(format), &mut report)?;
    let member_name = options.gzip_member_name.as_deref().unwrap_or(member_name);

    let sink = CountingWriter::new(open_sink()?);
    let mut tracker = ProgressTracker::new(progress, entries.len());
    let mut sink = match format {
        OutputFormat::Tar => {
            super::tar::write_tar(&entries, sink, options, &mut tracker, &mut report)?
        }
        OutputFormat::TarGz => super::tar::write_tar_gz(
            &entries,
            sink,
            options,
            member_name,
            &mut tracker,
            &mut report,
        )?,
        OutputFormat::ZipStore | OutputFormat::ZipDeflate => super::zip::write_zip(
            &entries,
            sink,
            options,
            format.is_compressed(),
            &mut tracker,
            &mut report,
        )?,
    };
    sink.flush()?;
    tracker.complete();

    report.bytes_written = sink.total_bytes();
    report.duration = start.elapsed();
    tracing::info!(
        source = %source_root.display(),
        %format,
        members = report.total_items(),
        bytes = report.bytes_written,
        "archive built"
    );
    Ok(report)
}
