//! Byte-for-byte reproducible tar and zip archives.
//!
//! `reproducible-core` builds archives whose bytes depend only on the
//! content of the source tree and the options given: member order is fixed
//! by a locale-independent comparison, ownership and timestamps are pinned
//! to sentinel values, and compressed envelopes carry no run-specific
//! fields. Existing archives can be repacked into the same form.
//!
//! # Examples
//!
//! ```no_run
//! use reproducible_core::BuildOptions;
//! use reproducible_core::OutputFormat;
//! use reproducible_core::build_archive_to_path;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = BuildOptions::default().with_prepend_path(Some("pkg-1.0".into()));
//! let report = build_archive_to_path(
//!     Path::new("./pkg"),
//!     Path::new("pkg-1.0.tar.gz"),
//!     OutputFormat::TarGz,
//!     &options,
//! )?;
//! println!("wrote {} members", report.total_items());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod collation;
pub mod creation;
pub mod error;
pub mod extract;
pub mod formats;
pub mod inspection;
pub mod io;
pub mod progress;
pub mod repack;

pub use api::build_archive;
pub use api::build_archive_to_path;
pub use api::build_archive_to_path_with_progress;
pub use api::build_archive_with_progress;
pub use creation::BuildOptions;
pub use creation::CreationReport;
pub use error::ArchiveError;
pub use error::ErrorCategory;
pub use error::Result;
pub use extract::extract_archive;
pub use formats::ArchiveType;
pub use formats::OutputFormat;
pub use inspection::ArchiveManifest;
pub use inspection::ManifestEntry;
pub use inspection::MemberKind;
pub use inspection::list_archive;
pub use progress::NoopProgress;
pub use progress::ProgressCallback;
pub use repack::repack_archive;
pub use repack::repack_archive_with_progress;
