//! Progress reporting for builds and repacks.

use std::path::Path;

/// Callback trait for progress reporting during a build.
///
/// Callbacks observe the build; nothing they do can influence the bytes
/// written to the archive.
///
/// # Examples
///
/// ```
/// use reproducible_core::ProgressCallback;
/// use std::path::Path;
///
/// struct PrintProgress;
///
/// impl ProgressCallback for PrintProgress {
///     fn on_entry_start(&mut self, path: &Path, total: usize, current: usize) {
///         println!("[{current}/{total}] {}", path.display());
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, _path: &Path) {}
///
///     fn on_complete(&mut self) {
///         println!("done");
///     }
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called before an entry is written.
    ///
    /// `current` is 1-indexed.
    fn on_entry_start(&mut self, path: &Path, total: usize, current: usize);

    /// Called with the number of content bytes read for the current entry.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called after an entry has been written.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called once the archive has been finalized.
    fn on_complete(&mut self);
}

/// Progress callback that ignores every event.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}

/// Numbers entries as they are handed to a [`ProgressCallback`].
pub(crate) struct ProgressTracker<'a> {
    progress: &'a mut dyn ProgressCallback,
    current: usize,
    total: usize,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(progress: &'a mut dyn ProgressCallback, total: usize) -> Self {
        Self {
            progress,
            current: 0,
            total,
        }
    }

    pub(crate) fn entry_start(&mut self, path: &Path) {
        self.current += 1;
        self.progress
            .on_entry_start(path, self.total, self.current);
    }

    pub(crate) fn bytes(&mut self, bytes: u64) {
        if bytes > 0 {
            self.progress.on_bytes_written(bytes);
        }
    }

    pub(crate) fn entry_complete(&mut self, path: &Path) {
        self.progress.on_entry_complete(path);
    }

    pub(crate) fn complete(&mut self) {
        self.progress.on_complete();
    }
}
