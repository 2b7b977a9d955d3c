pub mod empty;
pub mod entry;
pub mod listing;
pub mod metadata;
pub mod walker;

pub use empty::{find_empty_containers, DetectorOptions, EmptyContainer, EmptyContainerDetector};
pub use entry::{DuplicateSet, Entry, EntryKind, Markers};
pub use listing::{list_dir, Listing};
pub use metadata::{platform_default, EntryStat, MetadataSource};
pub use walker::{scan, DuplicateScanner, ScanOptions};
