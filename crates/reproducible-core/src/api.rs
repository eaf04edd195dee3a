//! High-level build API.

use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use crate::BuildOptions;
use crate::CreationReport;
use crate::OutputFormat;
use crate::ProgressCallback;
use crate::Result;
use crate::creation::creator::default_member_name;
use crate::creation::creator::run_build;
use crate::progress::NoopProgress;

/// Builds a reproducible archive of `source_root` into `sink`.
///
/// Members are ordered by their UTF-8 bytes, ownership and timestamps are
/// pinned, and the zip formats are assembled in a scratch file before being
/// copied into `sink`, which therefore need not be seekable.
///
/// # Errors
///
/// Returns an error if:
/// - Options are invalid
/// - `source_root` is missing or cannot be walked
/// - Writing to `sink` fails
///
/// # Examples
///
/// ```no_run
/// use reproducible_core::BuildOptions;
/// use reproducible_core::OutputFormat;
/// use reproducible_core::build_archive;
/// use std::path::Path;
///
/// let mut bytes = Vec::new();
/// let report = build_archive(
///     Path::new("./project"),
///     &mut bytes,
///     OutputFormat::Tar,
///     &BuildOptions::default(),
/// )?;
/// assert_eq!(report.bytes_written, bytes.len() as u64);
/// # Ok::<(), reproducible_core::ArchiveError>(())
/// ```
pub fn build_archive<W: Write>(
    source_root: &Path,
    sink: W,
    format: OutputFormat,
    options: &BuildOptions,
) -> Result<CreationReport> {
    build_archive_with_progress(source_root, sink, format, options, &mut NoopProgress)
}

/// Builds a reproducible archive into `sink`, reporting progress.
///
/// # Errors
///
/// See [`build_archive`].
pub fn build_archive_with_progress<W: Write>(
    source_root: &Path,
    sink: W,
    format: OutputFormat,
    options: &BuildOptions,
    progress: &mut dyn ProgressCallback,
) -> Result<CreationReport> {
    let member_name = default_member_name(source_root);
    run_build(source_root, format, options, &member_name, progress, || Ok(sink))
}

/// Builds a reproducible archive of `source_root` into the file `output`.
///
/// The file is created (or truncated) only after the options have been
/// validated and the source tree resolved. A build that fails part-way may
/// leave a partial file behind.
///
/// # Errors
///
/// See [`build_archive`]; additionally fails if `output` cannot be created.
pub fn build_archive_to_path(
    source_root: &Path,
    output: &Path,
    format: OutputFormat,
    options: &BuildOptions,
) -> Result<CreationReport> {
    build_archive_to_path_with_progress(source_root, output, format, options, &mut NoopProgress)
}

/// Builds into the file `output`, reporting progress.
///
/// # Errors
///
/// See [`build_archive_to_path`].
pub fn build_archive_to_path_with_progress(
    source_root: &Path,
    output: &Path,
    format: OutputFormat,
    options: &BuildOptions,
    progress: &mut dyn ProgressCallback,
) -> Result<CreationReport> {
    let member_name = default_member_name(source_root);
    run_build(source_root, format, options, &member_name, progress, || {
        create_output(output)
    })
}

/// Creates (or truncates) the output file behind a buffered writer.
pub(crate) fn create_output(output: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(output)?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_build_archive_to_sink_and_path_agree() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("tree");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("f.txt"), "content").unwrap();

        for format in OutputFormat::ALL {
            let mut in_memory = Vec::new();
            build_archive(&source, &mut in_memory, format, &BuildOptions::default()).unwrap();

            let output = temp.path().join(format!("out.{}", format.extension()));
            build_archive_to_path(&source, &output, format, &BuildOptions::default()).unwrap();

            assert_eq!(fs::read(&output).unwrap(), in_memory, "{format}");
        }
    }

    #[test]
    fn test_output_overwritten() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("tree");
        fs::create_dir(&source).unwrap();
        let output = temp.path().join("out.tar");
        fs::write(&output, vec![0xAA; 100_000]).unwrap();

        let report =
            build_archive_to_path(&source, &output, OutputFormat::Tar, &BuildOptions::default())
                .unwrap();
        assert_eq!(fs::metadata(&output).unwrap().len(), report.bytes_written);
    }

    #[test]
    fn test_missing_source_creates_no_output() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.tar.gz");
        let err = build_archive_to_path(
            &temp.path().join("missing"),
            &output,
            OutputFormat::TarGz,
            &BuildOptions::default(),
        )
        .unwrap_err();
        assert!(err.is_traversal_error());
        assert!(!output.exists());
    }
}
