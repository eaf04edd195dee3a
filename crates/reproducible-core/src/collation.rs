//! Locale-independent ordering of archive member names.
//!
//! Member order is decided by comparing the UTF-8 bytes of the
//! forward-slash-separated archive path, which is the same as ordering by
//! Unicode code point (the "C" collation). No process-wide locale state is
//! read or modified, so sorting is safe to run alongside any other work in
//! the process.

use std::cmp::Ordering;

use crate::creation::walker::ArchiveEntry;

/// Compares two archive paths by their UTF-8 bytes.
///
/// Upper case sorts before lower case and accented letters sort after
/// all ASCII, regardless of the active locale.
///
/// # Examples
///
/// ```
/// use reproducible_core::collation::compare_paths;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare_paths("Zebra", "apple"), Ordering::Less);
/// assert_eq!(compare_paths("a/b", "a.b"), Ordering::Greater);
/// assert_eq!(compare_paths("zeta", "\u{e9}t\u{e9}"), Ordering::Less);
/// ```
#[must_use]
pub fn compare_paths(a: &str, b: &str) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

/// Sorts entries in place by their relative archive path.
pub fn sort_entries(entries: &mut [ArchiveEntry]) {
    entries.sort_by(|a, b| compare_paths(&a.relative_path, &b.relative_path));
}

/// Returns `true` if `entries` are already in collation order.
#[must_use]
pub fn is_sorted(entries: &[ArchiveEntry]) -> bool {
    entries
        .windows(2)
        .all(|pair| compare_paths(&pair[0].relative_path, &pair[1].relative_path).is_lt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creation::walker::EntryKind;
    use std::path::PathBuf;

    fn entry(name: &str) -> ArchiveEntry {
        ArchiveEntry {
            relative_path: name.to_string(),
            source_path: PathBuf::from("/src").join(name),
            kind: EntryKind::File,
        }
    }

    fn names(entries: &[ArchiveEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.relative_path.as_str()).collect()
    }

    #[test]
    fn test_case_is_not_folded() {
        let mut entries = vec![entry("b"), entry("B"), entry("a"), entry("A")];
        sort_entries(&mut entries);
        assert_eq!(names(&entries), ["A", "B", "a", "b"]);
    }

    #[test]
    fn test_accents_sort_after_ascii() {
        let mut entries = vec![entry("\u{e4}pfel"), entry("zebra"), entry("apfel")];
        sort_entries(&mut entries);
        assert_eq!(names(&entries), ["apfel", "zebra", "\u{e4}pfel"]);
    }

    #[test]
    fn test_separator_ordering_is_bytewise() {
        // '-' (0x2d) < '.' (0x2e) < '/' (0x2f) < '0' (0x30)
        let mut entries = vec![
            entry("dir/file"),
            entry("dir0"),
            entry("dir.txt"),
            entry("dir-x"),
            entry("dir"),
        ];
        sort_entries(&mut entries);
        assert_eq!(
            names(&entries),
            ["dir", "dir-x", "dir.txt", "dir/file", "dir0"]
        );
    }

    #[test]
    fn test_is_sorted() {
        let mut entries = vec![entry("c"), entry("a"), entry("b")];
        assert!(!is_sorted(&entries));
        sort_entries(&mut entries);
        assert!(is_sorted(&entries));
        assert!(is_sorted(&[]));
    }

    #[test]
    fn test_compare_equal() {
        assert_eq!(compare_paths("same", "same"), Ordering::Equal);
    }
}
