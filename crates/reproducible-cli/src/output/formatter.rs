//! Output formatter trait for CLI results.

use anyhow::Result;
use reproducible_core::ArchiveManifest;
use reproducible_core::CreationReport;
use reproducible_core::OutputFormat;
use serde::Serialize;
use std::path::Path;

/// What a `pack` invocation was asked to do.
pub struct PackSummary<'a> {
    pub output: &'a Path,
    pub source: &'a Path,
    pub format: OutputFormat,
    pub repacked: bool,
}

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of a build or repack
    fn format_pack_result(&self, summary: &PackSummary<'_>, report: &CreationReport)
    -> Result<()>;

    /// Format an archive listing
    fn format_manifest(&self, manifest: &ArchiveManifest, long: bool) -> Result<()>;

    /// Format a fatal error for `operation`
    fn format_error(&self, operation: &str, error: &anyhow::Error);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
