//! Archive format identification.
//!
//! [`OutputFormat`] names the containers a build can produce, while
//! [`ArchiveType`] names the containers accepted as repack input.

pub mod detect;
pub mod output;

pub use detect::ArchiveType;
pub use output::OutputFormat;
