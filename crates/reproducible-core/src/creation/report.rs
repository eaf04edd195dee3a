//! Build statistics.

use std::time::Duration;

/// Report of a build or repack.
///
/// Reports are produced alongside the archive and never feed into its bytes.
///
/// # Examples
///
/// ```
/// use reproducible_core::CreationReport;
///
/// let mut report = CreationReport::default();
/// report.files_added = 10;
/// report.bytes_read = 1024;
/// report.bytes_written = 512;
///
/// assert_eq!(report.compression_ratio(), 2.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CreationReport {
    /// Regular files written.
    pub files_added: usize,

    /// Directory members written (tar only).
    pub directories_added: usize,

    /// Symlink members written (tar only).
    pub symlinks_added: usize,

    /// Entries dropped by exclusion or skipped as unsupported.
    pub entries_skipped: usize,

    /// Content bytes read from the source tree.
    pub bytes_read: u64,

    /// Bytes written to the destination sink.
    pub bytes_written: u64,

    /// Wall-clock time spent on the build.
    pub duration: Duration,

    /// Warnings generated during the build.
    pub warnings: Vec<String>,
}

impl CreationReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    ///
    /// # Examples
    ///
    /// ```
    /// use reproducible_core::CreationReport;
    ///
    /// let mut report = CreationReport::new();
    /// report.add_warning("skipped fifo: pipe");
    /// assert!(report.has_warnings());
    /// ```
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns `bytes_read / bytes_written`, or 0.0 if either is zero.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_written == 0 || self.bytes_read == 0 {
            return 0.0;
        }
        self.bytes_read as f64 / self.bytes_written as f64
    }

    /// Returns the number of members written.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_added + self.directories_added + self.symlinks_added
    }
}
