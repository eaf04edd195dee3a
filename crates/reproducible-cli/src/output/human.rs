//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use super::formatter::PackSummary;
use crate::progress::humanize_bytes;
use anyhow::Result;
use console::Term;
use console::style;
use reproducible_core::ArchiveManifest;
use reproducible_core::CreationReport;
use reproducible_core::ManifestEntry;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_number(n: usize) -> String {
        let digits = n.to_string();
        let mut result = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                result.push(',');
            }
            result.push(c);
        }
        result
    }

    /// One `ls -l`-style line: kind and mode, owner, size, timestamp, name.
    fn long_line(entry: &ManifestEntry) -> String {
        let mode = entry
            .mode
            .map_or_else(|| "----".to_string(), |m| format!("{m:04o}"));
        let owner = match (&entry.uname, &entry.gname, entry.uid, entry.gid) {
            (Some(u), Some(g), _, _) if !u.is_empty() || !g.is_empty() => format!("{u}/{g}"),
            (_, _, Some(uid), Some(gid)) => format!("{uid}/{gid}"),
            _ => "-".to_string(),
        };
        let modified = match (entry.mtime, entry.zip_modified) {
            (Some(mtime), _) => mtime.to_string(),
            (None, Some(dt)) => dt.to_string(),
            (None, None) => "-".to_string(),
        };
        let link = entry
            .link_target
            .as_ref()
            .map_or_else(String::new, |target| format!(" -> {target}"));

        format!(
            "{}{mode} {owner:<11} {:>10} {modified:>19}  {}{link}",
            entry.kind.tag(),
            entry.size,
            entry.path
        )
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_pack_result(
        &self,
        summary: &PackSummary<'_>,
        report: &CreationReport,
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let verb = if summary.repacked { "Repacked" } else { "Packed" };
        let headline = format!(
            "{verb} {} -> {} ({})",
            summary.source.display(),
            summary.output.display(),
            summary.format
        );
        if self.use_colors {
            self.term
                .write_line(&format!("{} {headline}", style("✓").green().bold()))?;
        } else {
            self.term.write_line(&headline)?;
        }

        self.term.write_line(&format!(
            "  Files:        {}",
            Self::format_number(report.files_added)
        ))?;
        if report.directories_added > 0 {
            self.term.write_line(&format!(
                "  Directories:  {}",
                Self::format_number(report.directories_added)
            ))?;
        }
        if report.symlinks_added > 0 {
            self.term.write_line(&format!(
                "  Symlinks:     {}",
                Self::format_number(report.symlinks_added)
            ))?;
        }
        self.term.write_line(&format!(
            "  Archive size: {}",
            humanize_bytes(report.bytes_written)
        ))?;

        if self.verbose {
            self.term.write_line(&format!(
                "  Content read: {}",
                humanize_bytes(report.bytes_read)
            ))?;
            if summary.format.is_compressed() {
                self.term.write_line(&format!(
                    "  Ratio:        {:.2}",
                    report.compression_ratio()
                ))?;
            }
            self.term
                .write_line(&format!("  Skipped:      {}", report.entries_skipped))?;
            self.term
                .write_line(&format!("  Duration:     {:?}", report.duration))?;
        }

        if report.has_warnings() {
            if self.use_colors {
                self.term
                    .write_line(&format!("{}", style("Warnings:").yellow().bold()))?;
            } else {
                self.term.write_line("Warnings:")?;
            }
            for warning in &report.warnings {
                self.term.write_line(&format!("  - {warning}"))?;
            }
        }

        Ok(())
    }

    fn format_manifest(&self, manifest: &ArchiveManifest, long: bool) -> Result<()> {
        for entry in &manifest.entries {
            if long {
                self.term.write_line(&Self::long_line(entry))?;
            } else {
                self.term.write_line(&entry.path)?;
            }
        }

        if long && !self.quiet {
            self.term.write_line(&format!(
                "Total: {} members, {}",
                Self::format_number(manifest.len()),
                humanize_bytes(manifest.total_size())
            ))?;
        }

        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        // Always shown, even in quiet mode
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:?}"));
        }
    }
}
