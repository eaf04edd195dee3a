//! Repacking an existing archive into a reproducible one.

use crate::BuildOptions;
use crate::CreationReport;
use crate::OutputFormat;
use crate::ProgressCallback;
use crate::Result;
use crate::api::create_output;
use crate::creation::creator::run_build;
use crate::extract::extract_archive;
use crate::progress::NoopProgress;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

/// Suffixes stripped from an archive file name to find its stem.
const ARCHIVE_SUFFIXES: &[&str] = &[
    ".tar.gz", ".tar.bz2", ".tar.xz", ".tar.zst", ".tgz", ".tbz2", ".tbz", ".txz", ".tzst",
    ".tar", ".zip",
];

/// Scratch directory owned by one repack.
///
/// Extraction restores archived permission bits, so the tree may hold
/// read-only directories. Owner access is restored on every directory
/// before removal, both in [`ScratchDir::close`] and on drop.
struct ScratchDir {
    path: PathBuf,
    armed: bool,
}

impl ScratchDir {
    fn create(parent: Option<&Path>) -> Result<Self> {
        let dir = match parent {
            Some(parent) => TempDir::new_in(parent)?,
            None => TempDir::new()?,
        };
        Ok(Self {
            path: dir.keep(),
            armed: true,
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the scratch tree, reporting failure.
    fn close(mut self) -> Result<()> {
        self.armed = false;
        remove_scratch(&self.path)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if self.armed
            && let Err(e) = remove_scratch(&self.path)
        {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove scratch directory"
            );
        }
    }
}

fn remove_scratch(path: &Path) -> Result<()> {
    make_removable(path);
    fs::remove_dir_all(path)?;
    Ok(())
}

/// Grants owner access to `dir` and every directory beneath it.
///
/// Symlinks are not followed. Failures are left for `remove_dir_all` to
/// report.
fn make_removable(dir: &Path) {
    allow_removal(dir);
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        match entry.file_type() {
            Ok(kind) if kind.is_dir() => make_removable(&entry.path()),
            Ok(kind) if cfg!(not(unix)) && kind.is_file() => allow_removal(&entry.path()),
            _ => {}
        }
    }
}

#[cfg(unix)]
fn allow_removal(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let Ok(metadata) = fs::symlink_metadata(path) else {
        return;
    };
    let mut perms = metadata.permissions();
    if perms.mode() & 0o700 != 0o700 {
        perms.set_mode(perms.mode() | 0o700);
        if let Err(e) = fs::set_permissions(path, perms) {
            tracing::debug!(path = %path.display(), error = %e, "cannot restore owner access");
        }
    }
}

#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
fn allow_removal(path: &Path) {
    let Ok(metadata) = fs::symlink_metadata(path) else {
        return;
    };
    let mut perms = metadata.permissions();
    if perms.readonly() {
        perms.set_readonly(false);
        if let Err(e) = fs::set_permissions(path, perms) {
            tracing::debug!(path = %path.display(), error = %e, "cannot clear read-only flag");
        }
    }
}

/// Returns the archive file name without its archive extension.
///
/// # Examples
///
/// ```
/// use reproducible_core::repack::archive_stem;
/// use std::path::Path;
///
/// assert_eq!(archive_stem(Path::new("dist/pkg-1.0.tar.gz")), "pkg-1.0");
/// assert_eq!(archive_stem(Path::new("pkg.ZIP")), "pkg");
/// assert_eq!(archive_stem(Path::new("blob")), "blob");
/// ```
#[must_use]
pub fn archive_stem(archive: &Path) -> String {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lower = name.to_ascii_lowercase();
    ARCHIVE_SUFFIXES
        .iter()
        .find(|suffix| lower.len() > suffix.len() && lower.ends_with(*suffix))
        .map_or(name.clone(), |suffix| {
            name[..name.len() - suffix.len()].to_string()
        })
}

/// Repacks `archive` into `output` using `format`.
///
/// # Errors
///
/// See [`repack_archive_with_progress`].
///
/// # Examples
///
/// ```no_run
/// use reproducible_core::BuildOptions;
/// use reproducible_core::OutputFormat;
/// use reproducible_core::repack_archive;
/// use std::path::Path;
///
/// let report = repack_archive(
///     Path::new("upstream.zip"),
///     OutputFormat::TarGz,
///     Path::new("upstream.tar.gz"),
///     &BuildOptions::default(),
/// )?;
/// println!("{} members", report.total_items());
/// # Ok::<(), reproducible_core::ArchiveError>(())
/// ```
pub fn repack_archive(
    archive: &Path,
    format: OutputFormat,
    output: &Path,
    options: &BuildOptions,
) -> Result<CreationReport> {
    repack_archive_with_progress(archive, format, output, options, &mut NoopProgress)
}

/// Repacks `archive` into `output`, reporting progress.
///
/// The archive is unpacked into a fresh scratch directory, which is then
/// built exactly like a user-supplied source tree. The scratch directory is
/// removed on every exit path, including read-only directories restored
/// from the archive. The gzip member name defaults to
/// `<archive stem>.tar` so it does not depend on the scratch directory name.
///
/// # Errors
///
/// Returns an error if:
/// - Options are invalid (checked before anything is unpacked)
/// - The scratch directory cannot be created
/// - The archive cannot be unpacked (no output is created)
/// - The build itself fails
/// - The scratch directory cannot be removed after a successful build
pub fn repack_archive_with_progress(
    archive: &Path,
    format: OutputFormat,
    output: &Path,
    options: &BuildOptions,
    progress: &mut dyn ProgressCallback,
) -> Result<CreationReport> {
    options.validate()?;

    let scratch = ScratchDir::create(options.scratch_dir.as_deref())?;
    let archive_type = extract_archive(archive, scratch.path())?;
    tracing::info!(
        archive = %archive.display(),
        ?archive_type,
        "unpacked archive for repack"
    );

    let member_name = format!("{}.tar", archive_stem(archive));
    let report = run_build(scratch.path(), format, options, &member_name, progress, || {
        create_output(output)
    })?;

    scratch.close()?;
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ArchiveError;
    use crate::build_archive_to_path;
    use std::fs;

    fn sample_tree(root: &Path) {
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("a.txt"), "alpha").unwrap();
        fs::write(root.join("sub/b.txt"), "bravo").unwrap();
    }

    #[test]
    fn test_archive_stem() {
        assert_eq!(archive_stem(Path::new("x.tar.bz2")), "x");
        assert_eq!(archive_stem(Path::new("x.tzst")), "x");
        assert_eq!(archive_stem(Path::new(".tar")), ".tar");
        assert_eq!(archive_stem(Path::new("a.b.zip")), "a.b");
    }

    #[test]
    fn test_repack_is_deterministic() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        sample_tree(&source);
        let input = temp.path().join("input.zip");
        build_archive_to_path(
            &source,
            &input,
            OutputFormat::ZipDeflate,
            &BuildOptions::default(),
        )
        .unwrap();

        let first = temp.path().join("first.tar.gz");
        let second = temp.path().join("second.tar.gz");
        for out in [&first, &second] {
            repack_archive(&input, OutputFormat::TarGz, out, &BuildOptions::default()).unwrap();
        }
        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn test_repack_gzip_name_uses_archive_stem() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        sample_tree(&source);
        let input = temp.path().join("release-2.1.tar");
        build_archive_to_path(&source, &input, OutputFormat::Tar, &BuildOptions::default())
            .unwrap();

        let output = temp.path().join("out.tar.gz");
        repack_archive(&input, OutputFormat::TarGz, &output, &BuildOptions::default()).unwrap();

        let bytes = fs::read(&output).unwrap();
        let decoder = flate2::read::GzDecoder::new(bytes.as_slice());
        assert_eq!(
            decoder.header().unwrap().filename(),
            Some(&b"release-2.1.tar"[..])
        );
    }

    #[test]
    fn test_repack_failure_creates_no_output() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("broken.zip");
        fs::write(&input, b"PK\x03\x04 truncated").unwrap();
        let output = temp.path().join("out.tar");

        let err = repack_archive(&input, OutputFormat::Tar, &output, &BuildOptions::default())
            .unwrap_err();
        assert!(matches!(err, ArchiveError::Extraction { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_repack_cleans_scratch_on_success_and_failure() {
        let temp = TempDir::new().unwrap();
        let scratch = temp.path().join("scratch");
        fs::create_dir(&scratch).unwrap();
        let options = BuildOptions::default().with_scratch_dir(Some(scratch.clone()));

        let source = temp.path().join("src");
        sample_tree(&source);
        let input = temp.path().join("input.tar");
        build_archive_to_path(&source, &input, OutputFormat::Tar, &options).unwrap();

        repack_archive(&input, OutputFormat::ZipStore, &temp.path().join("ok.zip"), &options)
            .unwrap();
        assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);

        let broken = temp.path().join("broken.tar.gz");
        fs::write(&broken, b"nope").unwrap();
        assert!(
            repack_archive(&broken, OutputFormat::Tar, &temp.path().join("x.tar"), &options)
                .is_err()
        );
        assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
    }

    /// Tar holding a read-only directory with a read-only file inside.
    fn read_only_tar(path: &Path) {
        let mut builder = tar::Builder::new(Vec::new());

        let mut dir = tar::Header::new_ustar();
        dir.set_entry_type(tar::EntryType::Directory);
        dir.set_size(0);
        dir.set_mode(0o555);
        dir.set_cksum();
        builder.append_data(&mut dir, "ro/", std::io::empty()).unwrap();

        let mut file = tar::Header::new_ustar();
        file.set_size(4);
        file.set_mode(0o444);
        file.set_cksum();
        builder.append_data(&mut file, "ro/f", &b"data"[..]).unwrap();

        fs::write(path, builder.into_inner().unwrap()).unwrap();
    }

    #[test]
    fn test_repack_removes_read_only_scratch_tree() {
        let temp = TempDir::new().unwrap();
        let scratch = temp.path().join("scratch");
        fs::create_dir(&scratch).unwrap();
        let options = BuildOptions::default().with_scratch_dir(Some(scratch.clone()));
        let input = temp.path().join("ro.tar");
        read_only_tar(&input);

        let output = temp.path().join("out.tar");
        repack_archive(&input, OutputFormat::Tar, &output, &options).unwrap();

        assert!(fs::read_dir(&scratch).unwrap().next().is_none());
        let names: Vec<_> = crate::list_archive(&output)
            .unwrap()
            .names()
            .map(str::to_string)
            .collect();
        assert_eq!(names, ["ro/", "ro/f"]);
    }

    #[test]
    fn test_repack_removes_read_only_scratch_tree_on_build_failure() {
        let temp = TempDir::new().unwrap();
        let scratch = temp.path().join("scratch");
        fs::create_dir(&scratch).unwrap();
        let options = BuildOptions::default().with_scratch_dir(Some(scratch.clone()));
        let input = temp.path().join("ro.tar");
        read_only_tar(&input);

        let output = temp.path().join("missing-dir").join("out.zip");
        let err = repack_archive(&input, OutputFormat::ZipStore, &output, &options).unwrap_err();

        assert!(matches!(err, ArchiveError::Io(_)));
        assert!(fs::read_dir(&scratch).unwrap().next().is_none());
    }

    #[test]
    fn test_scratch_close_reports_removal_failure() {
        let temp = TempDir::new().unwrap();
        let scratch = ScratchDir::create(Some(temp.path())).unwrap();
        fs::remove_dir(scratch.path()).unwrap();

        assert!(matches!(scratch.close(), Err(ArchiveError::Io(_))));
    }

    #[test]
    fn test_repack_validates_before_unpacking() {
        let temp = TempDir::new().unwrap();
        let options = BuildOptions::default().with_compression_level(Some(42));
        let err = repack_archive(
            &temp.path().join("missing.tar"),
            OutputFormat::TarGz,
            &temp.path().join("out.tar.gz"),
            &options,
        )
        .unwrap_err();
        assert!(err.is_configuration_error());
    }
}
