//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::PackSummary;
use anyhow::Result;
use reproducible_core::ArchiveManifest;
use reproducible_core::CreationReport;
use reproducible_core::ManifestEntry;
use serde::Serialize;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct PackOutput {
    output_path: String,
    source: String,
    format: String,
    repacked: bool,
    files_added: usize,
    directories_added: usize,
    symlinks_added: usize,
    entries_skipped: usize,
    bytes_read: u64,
    bytes_written: u64,
    duration_ms: u128,
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct MemberOutput<'a> {
    path: &'a str,
    kind: &'static str,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uname: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gname: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mtime: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link_target: Option<&'a str>,
}

impl<'a> From<&'a ManifestEntry> for MemberOutput<'a> {
    fn from(entry: &'a ManifestEntry) -> Self {
        use reproducible_core::MemberKind;

        Self {
            path: &entry.path,
            kind: match entry.kind {
                MemberKind::File => "file",
                MemberKind::Directory => "directory",
                MemberKind::Symlink => "symlink",
                MemberKind::Hardlink => "hardlink",
                MemberKind::Other => "other",
            },
            size: entry.size,
            mode: entry.mode.map(|m| format!("{m:04o}")),
            uid: entry.uid,
            gid: entry.gid,
            uname: entry.uname.as_deref(),
            gname: entry.gname.as_deref(),
            mtime: entry.mtime,
            modified: entry.zip_modified.map(|dt| dt.to_string()),
            link_target: entry.link_target.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct ManifestOutput<'a> {
    archive_type: String,
    total_entries: usize,
    total_size: u64,
    entries: Vec<MemberOutput<'a>>,
}

impl OutputFormatter for JsonFormatter {
    fn format_pack_result(
        &self,
        summary: &PackSummary<'_>,
        report: &CreationReport,
    ) -> Result<()> {
        let data = PackOutput {
            output_path: summary.output.display().to_string(),
            source: summary.source.display().to_string(),
            format: summary.format.to_string(),
            repacked: summary.repacked,
            files_added: report.files_added,
            directories_added: report.directories_added,
            symlinks_added: report.symlinks_added,
            entries_skipped: report.entries_skipped,
            bytes_read: report.bytes_read,
            bytes_written: report.bytes_written,
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        };

        Self::output(&JsonOutput::success("pack", data))
    }

    fn format_manifest(&self, manifest: &ArchiveManifest, _long: bool) -> Result<()> {
        let data = ManifestOutput {
            archive_type: format!("{:?}", manifest.archive_type),
            total_entries: manifest.len(),
            total_size: manifest.total_size(),
            entries: manifest.entries.iter().map(MemberOutput::from).collect(),
        };

        Self::output(&JsonOutput::success("list", data))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::error(operation, format!("{error:#}"));
        let _ = Self::output(&output);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reproducible_core::MemberKind;
    use reproducible_core::inspection::ZipTimestamp;

    #[test]
    fn test_error_envelope_omits_data() {
        let json = serde_json::to_value(JsonOutput::error("pack", "boom")).unwrap();
        assert_eq!(json["operation"], "pack");
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "boom");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_zip_member_output() {
        let entry = ManifestEntry {
            path: "a.txt".into(),
            kind: MemberKind::File,
            size: 3,
            mode: Some(0o644),
            uid: None,
            gid: None,
            uname: None,
            gname: None,
            mtime: None,
            zip_modified: Some(ZipTimestamp {
                year: 1980,
                month: 1,
                day: 1,
                hour: 0,
                minute: 0,
                second: 0,
            }),
            link_target: None,
        };

        let json = serde_json::to_value(MemberOutput::from(&entry)).unwrap();
        assert_eq!(json["kind"], "file");
        assert_eq!(json["mode"], "0644");
        assert_eq!(json["modified"], "1980-01-01T00:00:00");
        assert!(json.get("uid").is_none());
        assert!(json.get("mtime").is_none());
    }
}
