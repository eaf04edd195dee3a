//! Path filtering and member-name computation.
//!
//! Selection and exclusion are exact path matches after lexical
//! normalization; there is no glob syntax.

use crate::ArchiveError;
use crate::Result;
use crate::creation::config::BuildOptions;
use std::collections::BTreeSet;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Normalizes a path without touching the filesystem.
///
/// `.` components are dropped and `..` removes the preceding normal
/// component when there is one. A `..` at the start of a relative path is
/// kept; at the root of an absolute path it is discarded.
///
/// # Examples
///
/// ```
/// use reproducible_core::creation::filters::normalize_lexically;
/// use std::path::Path;
///
/// assert_eq!(
///     normalize_lexically(Path::new("a/./b/../c")),
///     Path::new("a/c")
/// );
/// assert_eq!(normalize_lexically(Path::new("/x/../y")), Path::new("/y"));
/// ```
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

/// Converts a relative filesystem path into a forward-slash member name.
///
/// # Errors
///
/// Returns `NonUtf8Path` if a component is not valid UTF-8, or
/// `PathEscapesRoot` if the path is absolute or climbs above its root.
pub fn to_member_name(path: &Path) -> Result<String> {
    let mut segments: Vec<&str> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => {
                let segment = segment.to_str().ok_or_else(|| ArchiveError::NonUtf8Path {
                    path: path.to_path_buf(),
                })?;
                segments.push(segment);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if segments.pop().is_none() {
                    return Err(ArchiveError::PathEscapesRoot {
                        path: path.to_path_buf(),
                    });
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(ArchiveError::PathEscapesRoot {
                    path: path.to_path_buf(),
                });
            }
        }
    }
    Ok(segments.join("/"))
}

/// Computes the name an entry is stored under.
///
/// Without a prefix the relative path is returned unchanged. With one, the
/// prefix and relative path are joined and normalized; leading separators
/// on the prefix are dropped so the member name stays relative.
///
/// # Errors
///
/// Returns `PathEscapesRoot` if the joined name climbs above the archive
/// root or normalizes to nothing, and `NonUtf8Path` if the prefix is not
/// valid UTF-8.
///
/// # Examples
///
/// ```
/// use reproducible_core::creation::filters::compute_archive_path;
/// use std::path::Path;
///
/// let name = compute_archive_path(Some(Path::new("root//")), "sub/file.txt")?;
/// assert_eq!(name, "root/sub/file.txt");
///
/// let name = compute_archive_path(Some(Path::new("a/../b")), "f")?;
/// assert_eq!(name, "b/f");
/// # Ok::<(), reproducible_core::ArchiveError>(())
/// ```
pub fn compute_archive_path(prefix: Option<&Path>, relative: &str) -> Result<String> {
    let Some(prefix) = prefix else {
        return Ok(relative.to_string());
    };

    let unrooted: PathBuf = prefix
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect();
    let name = to_member_name(&unrooted.join(relative))?;
    if name.is_empty() {
        return Err(ArchiveError::PathEscapesRoot {
            path: prefix.join(relative),
        });
    }
    Ok(name)
}

/// Inclusion and exclusion sets, normalized once per build.
#[derive(Debug, Default)]
pub struct PathFilter {
    selector: Option<BTreeSet<PathBuf>>,
    excluded: BTreeSet<PathBuf>,
}

impl PathFilter {
    /// Builds a filter from the options' `file_selector` and `exclude_set`.
    #[must_use]
    pub fn new(options: &BuildOptions) -> Self {
        let normalize_all = |set: &BTreeSet<PathBuf>| {
            set.iter()
                .map(|p| normalize_lexically(p))
                .collect::<BTreeSet<_>>()
        };
        Self {
            selector: options.file_selector.as_ref().map(normalize_all),
            excluded: options
                .exclude_set
                .as_ref()
                .map(normalize_all)
                .unwrap_or_default(),
        }
    }

    /// Returns `true` if no selector is set or `relative` is a member of it.
    #[must_use]
    pub fn is_selected(&self, relative: &Path) -> bool {
        self.selector
            .as_ref()
            .is_none_or(|selector| selector.contains(relative))
    }

    /// Returns `true` if either the relative or absolute path is excluded.
    #[must_use]
    pub fn is_excluded(&self, relative: &Path, absolute: &Path) -> bool {
        !self.excluded.is_empty()
            && (self.excluded.contains(relative)
                || self.excluded.contains(&normalize_lexically(absolute)))
    }

    /// Returns `true` if an exclusion set is present.
    #[must_use]
    pub fn has_exclusions(&self) -> bool {
        !self.excluded.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(normalize_lexically(Path::new("a/b/c")), Path::new("a/b/c"));
        assert_eq!(normalize_lexically(Path::new("./a//b/")), Path::new("a/b"));
        assert_eq!(normalize_lexically(Path::new("a/../../b")), Path::new("../b"));
        assert_eq!(normalize_lexically(Path::new("/../etc")), Path::new("/etc"));
    }

    #[test]
    fn test_to_member_name() {
        assert_eq!(to_member_name(Path::new("sub/file.txt")).unwrap(), "sub/file.txt");
        assert_eq!(to_member_name(Path::new("a/./b")).unwrap(), "a/b");
        assert!(matches!(
            to_member_name(Path::new("../outside")),
            Err(ArchiveError::PathEscapesRoot { .. })
        ));
        assert!(matches!(
            to_member_name(Path::new("/abs")),
            Err(ArchiveError::PathEscapesRoot { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_to_member_name_non_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"bad\xffname"));
        assert!(matches!(
            to_member_name(path),
            Err(ArchiveError::NonUtf8Path { .. })
        ));
    }

    #[test]
    fn test_compute_archive_path_without_prefix() {
        assert_eq!(compute_archive_path(None, "sub/file.txt").unwrap(), "sub/file.txt");
    }

    #[test]
    fn test_compute_archive_path_with_prefix() {
        let prefix = Path::new("root");
        assert_eq!(
            compute_archive_path(Some(prefix), "sub/file.txt").unwrap(),
            "root/sub/file.txt"
        );
    }

    #[test]
    fn test_compute_archive_path_strips_leading_separator() {
        assert_eq!(
            compute_archive_path(Some(Path::new("/opt/pkg")), "bin").unwrap(),
            "opt/pkg/bin"
        );
    }

    #[test]
    fn test_compute_archive_path_dot_prefix() {
        assert_eq!(compute_archive_path(Some(Path::new(".")), "a").unwrap(), "a");
    }

    #[test]
    fn test_compute_archive_path_escape() {
        assert!(matches!(
            compute_archive_path(Some(Path::new("../up")), "file"),
            Err(ArchiveError::PathEscapesRoot { .. })
        ));
        assert!(matches!(
            compute_archive_path(Some(Path::new("x/..")), "."),
            Err(ArchiveError::PathEscapesRoot { .. })
        ));
    }

    #[test]
    fn test_filter_selection() {
        let options = BuildOptions::default().with_file_selector(["a", "./c"]);
        let filter = PathFilter::new(&options);
        assert!(filter.is_selected(Path::new("a")));
        assert!(!filter.is_selected(Path::new("b")));
        assert!(filter.is_selected(Path::new("c")));
    }

    #[test]
    fn test_filter_no_selector_selects_everything() {
        let filter = PathFilter::new(&BuildOptions::default());
        assert!(filter.is_selected(Path::new("anything")));
        assert!(!filter.has_exclusions());
    }

    #[test]
    fn test_filter_exclusion_relative_and_absolute() {
        let options = BuildOptions::default().with_exclude(["b", "/src/tree/./c"]);
        let filter = PathFilter::new(&options);

        assert!(filter.is_excluded(Path::new("b"), Path::new("/src/tree/b")));
        assert!(filter.is_excluded(Path::new("c"), Path::new("/src/tree/c")));
        assert!(!filter.is_excluded(Path::new("a"), Path::new("/src/tree/a")));
    }
}
