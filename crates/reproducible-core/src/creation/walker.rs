//! File-set resolution.
//!
//! Walks a source directory, applies selection and exclusion, and returns
//! the surviving entries in collation order. Any traversal failure aborts
//! the walk; unreadable entries are never skipped silently.

use crate::ArchiveError;
use crate::Result;
use crate::collation;
use crate::creation::config::BuildOptions;
use crate::creation::filters::PathFilter;
use crate::creation::filters::to_member_name;
use crate::creation::report::CreationReport;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

/// One member of the archive being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Forward-slash path relative to the source root, before any prefix.
    pub relative_path: String,

    /// Location to read bytes and metadata from.
    pub source_path: PathBuf,

    /// What kind of member this is.
    pub kind: EntryKind,
}

/// Kind of archive member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file (or, for zip, a symlink resolved to one).
    File,

    /// Directory.
    Directory,

    /// Symbolic link stored as a link.
    Symlink {
        /// Target of the symlink, as read from the filesystem.
        target: PathBuf,
    },
}

/// Which members a container records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberSet {
    /// Files, directories, and symlinks (tar).
    Tree,

    /// Regular files only, with symlinks resolved to their content (zip).
    FilesOnly,
}

/// Resolves the ordered entry list for `root`.
///
/// Selection is applied first, then exclusion against both the relative
/// path and the absolute source path. Exclusion is an exact match: an
/// excluded directory is dropped as a member but its contents are still
/// visited. Fifos, sockets, and device nodes are skipped
/// with a warning in `report`.
///
/// # Errors
///
/// Returns an error if:
/// - `root` does not exist or is not a directory
/// - Any directory cannot be read or any metadata lookup fails
/// - A path is not valid UTF-8
/// - A symlink is dangling while building a [`MemberSet::FilesOnly`] set
///
/// # Examples
///
/// ```no_run
/// use reproducible_core::BuildOptions;
/// use reproducible_core::CreationReport;
/// use reproducible_core::creation::walker::{MemberSet, resolve_entries};
/// use std::path::Path;
///
/// let mut report = CreationReport::default();
/// let entries = resolve_entries(
///     Path::new("./project"),
///     &BuildOptions::default(),
///     MemberSet::Tree,
///     &mut report,
/// )?;
/// for entry in &entries {
///     println!("{}", entry.relative_path);
/// }
/// # Ok::<(), reproducible_core::ArchiveError>(())
/// ```
pub fn resolve_entries(
    root: &Path,
    options: &BuildOptions,
    members: MemberSet,
    report: &mut CreationReport,
) -> Result<Vec<ArchiveEntry>> {
    if !root.is_dir() {
        return Err(ArchiveError::SourceNotFound {
            path: root.to_path_buf(),
        });
    }

    let filter = PathFilter::new(options);
    let absolute_root =
        std::path::absolute(root).map_err(|e| ArchiveError::traversal(root, e))?;
    let mut entries = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(options.follow_symlinks);

    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .map_err(|e| ArchiveError::traversal(path, e))?;
        let file_type = entry.file_type();

        if filter.is_excluded(relative, &absolute_root.join(relative)) {
            tracing::debug!(path = %relative.display(), "excluded");
            report.entries_skipped += 1;
            continue;
        }
        if !filter.is_selected(relative) {
            continue;
        }

        let kind = if file_type.is_dir() {
            match members {
                MemberSet::Tree => EntryKind::Directory,
                MemberSet::FilesOnly => continue,
            }
        } else if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_symlink() {
            match classify_symlink(path, members, report)? {
                Some(kind) => kind,
                None => continue,
            }
        } else {
            tracing::warn!(path = %path.display(), "skipping special file");
            report.add_warning(format!("skipped special file: {}", path.display()));
            report.entries_skipped += 1;
            continue;
        };

        entries.push(ArchiveEntry {
            relative_path: to_member_name(relative)?,
            source_path: path.to_path_buf(),
            kind,
        });
    }

    collation::sort_entries(&mut entries);
    tracing::debug!(root = %root.display(), count = entries.len(), "resolved entries");
    Ok(entries)
}

/// Decides how an unfollowed symlink is recorded.
fn classify_symlink(
    path: &Path,
    members: MemberSet,
    report: &mut CreationReport,
) -> Result<Option<EntryKind>> {
    if members == MemberSet::Tree {
        let target = std::fs::read_link(path)
            .map_err(|e| ArchiveError::traversal(path, format!("cannot read symlink: {e}")))?;
        return Ok(Some(EntryKind::Symlink { target }));
    }

    let metadata = std::fs::metadata(path)
        .map_err(|e| ArchiveError::traversal(path, format!("dangling symlink: {e}")))?;
    if metadata.is_file() {
        Ok(Some(EntryKind::File))
    } else {
        tracing::warn!(path = %path.display(), "skipping symlink to non-file");
        report.add_warning(format!(
            "skipped symlink to non-file: {}",
            path.display()
        ));
        report.entries_skipped += 1;
        Ok(None)
    }
}
