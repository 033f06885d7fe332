pub mod classify;
pub mod cli;
pub mod date;
pub mod error;
pub mod metadata;
pub mod mover;
pub mod plan;
pub mod record;
pub mod sidecar;
pub mod skiplog;
pub mod sorter;

pub use cli::Cli;
pub use error::{Result, SortError};
pub use metadata::{ExifToolReader, TagReader};
pub use mover::TransferMode;
pub use record::{Category, ClassifiedFile, FileRecord, TagMap};
pub use skiplog::{RunContext, SkipLogger};
pub use sorter::{SortConfig, SortStats, sort_media};
