// file: src/archive/progress.rs
// description: progress bar and statistics while entries are written to the archive
// reference: uses indicatif for progress bars and tracks processing metrics

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct ArchiveStats {
    pub files_total: usize,
    pub files_written: usize,
    pub empty_dirs_written: usize,
    pub bytes_read: u64,
    pub duration: Duration,
}

impl ArchiveStats {
    pub fn percent_complete(&self) -> f64 {
        if self.files_total == 0 {
            return 0.0;
        }
        (self.files_written as f64 / self.files_total as f64) * 100.0
    }

    pub fn entries_written(&self) -> usize {
        self.files_written + self.empty_dirs_written
    }
}

pub struct ArchiveProgress {
    bar: ProgressBar,
    files_total: usize,
    files_written: AtomicUsize,
    empty_dirs_written: AtomicUsize,
    bytes_read: AtomicU64,
    start_time: Instant,
}

impl ArchiveProgress {
    pub fn new(files_total: usize, visible: bool) -> Self {
        let bar = if visible {
            create_progress_bar(files_total as u64)
        } else {
            ProgressBar::hidden()
        };

        Self {
            bar,
            files_total,
            files_written: AtomicUsize::new(0),
            empty_dirs_written: AtomicUsize::new(0),
            bytes_read: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Returns the running file count.
    pub fn file_written(&self, name: &str, bytes: u64) -> usize {
        let written = self.files_written.fetch_add(1, Ordering::SeqCst) + 1;
        self.bytes_read.fetch_add(bytes, Ordering::SeqCst);
        self.bar.inc(1);
        self.bar.set_message(name.to_string());
        written
    }

    pub fn empty_dir_written(&self) {
        self.empty_dirs_written.fetch_add(1, Ordering::SeqCst);
    }

    /// True when a status line is due: every `interval` files and on the last one.
    pub fn should_report(&self, written: usize, interval: usize) -> bool {
        written == self.files_total || (interval > 0 && written % interval == 0)
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> ArchiveStats {
        ArchiveStats {
            files_total: self.files_total,
            files_written: self.files_written.load(Ordering::SeqCst),
            empty_dirs_written: self.empty_dirs_written.load(Ordering::SeqCst),
            bytes_read: self.bytes_read.load(Ordering::SeqCst),
            duration: self.start_time.elapsed(),
        }
    }
}

impl Drop for ArchiveProgress {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        .map(|s| s.progress_chars("█▓▒░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}
