// file: src/archive/naming.rs
// description: timestamped archive file names with an injectable clock
// reference: https://docs.rs/chrono

use chrono::{Local, NaiveDateTime};
use std::path::Path;

pub const ARCHIVE_EXTENSION: &str = "zip";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const FALLBACK_BASE_NAME: &str = "archive";

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Builds `<base>_<YYYYMMDD_HHMMSS>.zip`.
///
/// A non-blank `custom_name` wins over the folder name; a trailing `.zip` on it
/// (any case) is dropped before the timestamp is appended.
pub fn generate_archive_name(
    folder: &Path,
    custom_name: Option<&str>,
    now: NaiveDateTime,
) -> String {
    let timestamp = now.format(TIMESTAMP_FORMAT);

    let base = match custom_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => strip_archive_extension(name).to_string(),
        None => folder
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| FALLBACK_BASE_NAME.to_string()),
    };

    format!("{}_{}.{}", base, timestamp, ARCHIVE_EXTENSION)
}

fn strip_archive_extension(name: &str) -> &str {
    let suffix = format!(".{}", ARCHIVE_EXTENSION);
    if name.to_ascii_lowercase().ends_with(&suffix) {
        &name[..name.len() - suffix.len()]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap()
    }

    #[test]
    fn test_name_from_folder() {
        let name = generate_archive_name(Path::new("/workspace/packs/demo"), None, fixed_time());
        assert_eq!(name, "demo_20240309_140507.zip");
    }

    #[test]
    fn test_blank_custom_name_falls_back_to_folder() {
        let name = generate_archive_name(Path::new("/data/demo"), Some("   "), fixed_time());
        assert_eq!(name, "demo_20240309_140507.zip");
    }

    #[test]
    fn test_custom_name_strips_extension() {
        let time = fixed_time();
        assert_eq!(
            generate_archive_name(Path::new("/data/demo"), Some("release.zip"), time),
            "release_20240309_140507.zip"
        );
        assert_eq!(
            generate_archive_name(Path::new("/data/demo"), Some("Release.ZIP"), time),
            "Release_20240309_140507.zip"
        );
        assert_eq!(
            generate_archive_name(Path::new("/data/demo"), Some("pack.tar"), time),
            "pack.tar_20240309_140507.zip"
        );
    }

    #[test]
    fn test_root_folder_uses_fallback() {
        let name = generate_archive_name(Path::new("/"), None, fixed_time());
        assert_eq!(name, "archive_20240309_140507.zip");
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(fixed_time());
        assert_eq!(clock.now(), fixed_time());
    }
}
