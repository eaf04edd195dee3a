//! Reproducible archive creation.
//!
//! The pipeline runs leaf-first: [`walker`] resolves and orders the file
//! set, [`metadata`] pins volatile header fields, and the [`tar`] or
//! [`zip`] serializer writes the container.

pub mod config;
pub mod creator;
pub mod filters;
pub mod metadata;
pub mod report;
pub mod tar;
pub mod walker;
pub mod zip;

pub use config::BuildOptions;
pub use report::CreationReport;
pub use walker::ArchiveEntry;
pub use walker::EntryKind;
pub use walker::MemberSet;
