use crate::mediasort_core::error::Result;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;

/// Default root for per-run log directories.
pub const DEFAULT_LOGS_DIR: &str = "logs";

/// Name of the file listing skipped paths inside a run directory.
pub const SKIPPED_FILE_NAME: &str = "skipped";

/// Run directory name format (`2024-05-21_12-30-00`).
const RUN_DIR_FORMAT: &[FormatItem] =
    format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");

/// Values fixed for the lifetime of one run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub started_at: OffsetDateTime,
    pub logs_root: PathBuf,
}

impl RunContext {
    /// A context starting now, in local time when the offset is known.
    pub fn start(logs_root: impl Into<PathBuf>) -> Self {
        Self {
            started_at: OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc()),
            logs_root: logs_root.into(),
        }
    }

    pub fn run_dir(&self) -> PathBuf {
        let stamp = self
            .started_at
            .format(RUN_DIR_FORMAT)
            .unwrap_or_else(|_| self.started_at.unix_timestamp().to_string());
        self.logs_root.join(stamp)
    }
}

/// Appends unrecognized paths to `<logs>/<run>/skipped`.
///
/// The run directory is only created once the first path is recorded.
pub struct SkipLogger {
    log_path: PathBuf,
    recorded: usize,
}

impl SkipLogger {
    pub fn new(ctx: &RunContext) -> Self {
        Self {
            log_path: ctx.run_dir().join(SKIPPED_FILE_NAME),
            recorded: 0,
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn recorded(&self) -> usize {
        self.recorded
    }

    pub fn record(&mut self, path: &Path) -> Result<()> {
        println!("Unknown file type: {}, skipping", path.display());

        if let Some(dir) = self.log_path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(file, "{}", path.display())?;

        self.recorded += 1;
        Ok(())
    }
}
