// file: src/archive/writer.rs
// description: walks a folder and writes a deflate zip with relative entry names
// reference: https://docs.rs/zip, https://docs.rs/walkdir

use crate::archive::progress::{ArchiveProgress, ArchiveStats};
use crate::config::ArchiveConfig;
use crate::error::{Result, UploadError};
use crate::utils::{PerformanceMetrics, Reporter};
use chrono::{Datelike, Local, Timelike};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const ZIP64_THRESHOLD: u64 = 0xFFFF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    File { size: u64 },
    EmptyDir,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    #[serde(skip)]
    pub modified: Option<SystemTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub entries: Vec<String>,
    pub files: usize,
    pub empty_dirs: usize,
    pub source_bytes: u64,
    pub archive_bytes: u64,
    pub sha256: String,
    pub metrics: PerformanceMetrics,
}

impl ArchiveSummary {
    pub fn size_mb(&self) -> f64 {
        self.archive_bytes as f64 / (1024.0 * 1024.0)
    }
}

pub struct ArchiveBuilder {
    config: ArchiveConfig,
}

impl ArchiveBuilder {
    pub fn new(config: ArchiveConfig) -> Self {
        Self { config }
    }

    /// Files and empty directories below `root`, in sorted walk order.
    ///
    /// Links to regular files are archived with the target's content under the
    /// link's name; directory links are not descended.
    pub fn collect_entries(&self, root: &Path) -> Result<Vec<ArchiveEntry>> {
        let mut entries = Vec::new();

        for entry in WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                UploadError::Archive(format!("Failed to walk {}: {}", root.display(), e))
            })?;
            let path = entry.path();
            let name = entry_name(root, path)?;

            let file_type = entry.file_type();
            let metadata = if file_type.is_symlink() {
                match fs::metadata(path) {
                    Ok(target) => target,
                    Err(e) => {
                        warn!("Skipping dangling link {}: {}", path.display(), e);
                        continue;
                    }
                }
            } else {
                entry
                    .metadata()
                    .map_err(|e| UploadError::Archive(format!("{}: {}", path.display(), e)))?
            };

            if metadata.is_file() {
                entries.push(ArchiveEntry {
                    name,
                    path: path.to_path_buf(),
                    kind: EntryKind::File {
                        size: metadata.len(),
                    },
                    modified: metadata.modified().ok(),
                });
            } else if file_type.is_dir() && is_empty_dir(path)? {
                entries.push(ArchiveEntry {
                    name: format!("{}/", name),
                    path: path.to_path_buf(),
                    kind: EntryKind::EmptyDir,
                    modified: metadata.modified().ok(),
                });
            } else if file_type.is_symlink() {
                debug!("Not descending into linked directory: {}", path.display());
            } else {
                debug!("Not archiving: {}", path.display());
            }
        }

        Ok(entries)
    }

    /// Writes `source` into a new zip at `destination`.
    ///
    /// Fails without leaving a file behind when the folder holds no regular files
    /// or when any entry cannot be written.
    pub fn build(
        &self,
        source: &Path,
        destination: &Path,
        reporter: &dyn Reporter,
    ) -> Result<ArchiveSummary> {
        reporter.info(&format!("Compressing folder: {}", source.display()));

        let entries = self.collect_entries(source)?;
        let files_total = entries
            .iter()
            .filter(|e| matches!(e.kind, EntryKind::File { .. }))
            .count();

        if files_total == 0 {
            reporter.warn("The folder appears to be empty");
            return Err(UploadError::EmptyFolder(source.to_path_buf()));
        }

        reporter.info(&format!("Total files to process: {}", files_total));

        let progress = ArchiveProgress::new(files_total, self.config.show_progress);
        if let Err(err) = self.write_archive(&entries, destination, &progress, reporter) {
            progress.finish();
            if destination.exists() {
                let _ = fs::remove_file(destination);
            }
            reporter.error(&format!("Error creating archive: {}", err));
            return Err(if matches!(err, UploadError::Archive(_)) {
                err
            } else {
                UploadError::Archive(err.to_string())
            });
        }
        progress.finish();
        let stats = progress.get_stats();

        let archive_bytes = fs::metadata(destination)
            .map_err(|e| UploadError::file_operation(destination, e))?
            .len();
        let sha256 = compute_file_hash(destination)?;
        let summary = summarize(destination, &entries, &stats, archive_bytes, sha256);

        reporter.success("Archive created successfully");
        reporter.info(&format!("Size: {:.2} MB", summary.size_mb()));
        reporter.info(&format!("Files processed: {}", summary.files));
        debug!("{}", summary.metrics.format());

        Ok(summary)
    }

    fn write_archive(
        &self,
        entries: &[ArchiveEntry],
        destination: &Path,
        progress: &ArchiveProgress,
        reporter: &dyn Reporter,
    ) -> Result<()> {
        let file =
            File::create(destination).map_err(|e| UploadError::file_operation(destination, e))?;
        let mut zip = ZipWriter::new(BufWriter::new(file));

        let base_options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(self.config.compression_level));

        for entry in entries {
            let options = base_options.last_modified_time(zip_timestamp(entry.modified));

            match entry.kind {
                EntryKind::File { size } => {
                    zip.start_file(
                        entry.name.as_str(),
                        options.large_file(size >= ZIP64_THRESHOLD),
                    )?;
                    let source = File::open(&entry.path)
                        .map_err(|e| UploadError::file_operation(&entry.path, e))?;
                    io::copy(&mut BufReader::new(source), &mut zip)
                        .map_err(|e| UploadError::file_operation(&entry.path, e))?;

                    let written = progress.file_written(&entry.name, size);
                    if progress.should_report(written, self.config.progress_interval) {
                        let percent = progress.get_stats().percent_complete();
                        reporter.info(&format!(
                            "Archive progress: {:.1}% ({}/{} files)",
                            percent, written, progress.get_stats().files_total
                        ));
                    }
                }
                EntryKind::EmptyDir => {
                    zip.add_directory(entry.name.as_str(), options)?;
                    progress.empty_dir_written();
                }
            }
        }

        zip.finish()?;
        Ok(())
    }
}

fn summarize(
    destination: &Path,
    entries: &[ArchiveEntry],
    stats: &ArchiveStats,
    archive_bytes: u64,
    sha256: String,
) -> ArchiveSummary {
    ArchiveSummary {
        path: destination.to_path_buf(),
        entries: entries.iter().map(|e| e.name.clone()).collect(),
        files: stats.files_written,
        empty_dirs: stats.empty_dirs_written,
        source_bytes: stats.bytes_read,
        archive_bytes,
        sha256,
        metrics: PerformanceMetrics::new(
            "archive",
            stats.files_written,
            stats.bytes_read,
            stats.duration,
        ),
    }
}

/// Relative path components joined with `/`, exactly as they are on disk.
fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut parts = Vec::new();

    for component in relative.components() {
        let part = component.as_os_str().to_str().ok_or_else(|| {
            UploadError::Archive(format!(
                "File name is not valid UTF-8: {}",
                path.display()
            ))
        })?;
        parts.push(part);
    }

    Ok(parts.join("/"))
}

fn is_empty_dir(path: &Path) -> Result<bool> {
    let mut children = fs::read_dir(path).map_err(|e| UploadError::file_operation(path, e))?;
    Ok(children.next().is_none())
}

/// Zip stores local wall-clock time; anything before 1980 falls back to the DOS epoch.
fn zip_timestamp(modified: Option<SystemTime>) -> zip::DateTime {
    let Some(modified) = modified else {
        return zip::DateTime::default();
    };
    let local: chrono::DateTime<Local> = modified.into();

    zip::DateTime::from_date_and_time(
        u16::try_from(local.year()).unwrap_or(0),
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    )
    .unwrap_or_default()
}

pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| UploadError::file_operation(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| UploadError::file_operation(path, e))?;
    Ok(format!("{:x}", hasher.finalize()))
}
