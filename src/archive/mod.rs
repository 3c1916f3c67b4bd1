// file: src/archive/mod.rs
// description: folder lookup, archive naming and zip creation
// reference: internal module structure

pub mod locator;
pub mod naming;
pub mod progress;
pub mod writer;

pub use locator::FolderLocator;
pub use naming::{ARCHIVE_EXTENSION, Clock, FixedClock, SystemClock, generate_archive_name};
pub use progress::{ArchiveProgress, ArchiveStats};
pub use writer::{ArchiveBuilder, ArchiveEntry, ArchiveSummary, EntryKind};
