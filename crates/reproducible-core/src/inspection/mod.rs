//! Archive inspection without extraction.

pub mod list;

pub use list::ArchiveManifest;
pub use list::ManifestEntry;
pub use list::MemberKind;
pub use list::ZipTimestamp;
pub use list::list_archive;
