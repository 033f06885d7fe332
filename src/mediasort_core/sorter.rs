use crate::mediasort_core::error::{Result, SortError};
use crate::mediasort_core::metadata::{TagReader, read_metadata};
use crate::mediasort_core::mover::{Mover, TransferMode};
use crate::mediasort_core::plan::build_plan;
use crate::mediasort_core::record::Category;
use crate::mediasort_core::skiplog::{RunContext, SkipLogger};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Settings for one sorting run.
#[derive(Debug, Clone)]
pub struct SortConfig {
    pub src: PathBuf,
    pub dest: PathBuf,
    pub mode: TransferMode,
    pub dry_run: bool,
}

/// Statistics from a sorting run.
#[derive(Debug, Default, Serialize)]
pub struct SortStats {
    pub discovered: usize,
    pub videos: usize,
    pub images: usize,
    pub sidecars: usize,
    pub transferred: usize,
    pub would_transfer: usize,
    pub already_existing: usize,
    pub unrecognized: usize,
    pub failed: usize,
}

impl std::fmt::Display for SortStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} videos, {} images, {} sidecars planned; {} transferred, {} already existed, {} unrecognized",
            self.videos,
            self.images,
            self.sidecars,
            self.transferred,
            self.already_existing,
            self.unrecognized
        )
    }
}

/// Collect every regular file under `dir`, recursively. Symlinks to files are
/// included; symlinked directories are not descended into.
pub fn discover_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
        })
        .map(|entry| entry.into_path())
        .collect()
}

/// Sort media from `config.src` into `config.dest`.
///
/// Walk, read metadata in one batch, classify, transfer, then log whatever was
/// not routed. Per-file transfer failures are reported after the skip log is
/// written.
pub fn sort_media<R: TagReader + ?Sized>(
    config: &SortConfig,
    reader: &mut R,
    ctx: &RunContext,
) -> Result<SortStats> {
    if !config.src.is_dir() {
        return Err(SortError::NotADirectory(config.src.clone()));
    }

    if !config.dry_run {
        fs::create_dir_all(&config.dest)?;
    }

    log::info!("Phase 1: Scanning source directory {}", config.src.display());
    let discovered = discover_files(&config.src);
    log::info!("Found {} files", discovered.len());

    log::info!("Phase 2: Reading metadata");
    let metadata = read_metadata(reader, &discovered);

    log::info!("Phase 3: Classifying files");
    let plan = build_plan(&discovered, metadata, &config.dest);

    log::info!("Phase 4: Transferring {} files", plan.len());
    let report = Mover::new(config.mode, config.dry_run).execute(&plan);

    let unplanned = plan.unplanned(&discovered);
    if config.dry_run {
        for path in &unplanned {
            println!("[DRY RUN] Unknown file type: {}, skipping", path.display());
        }
    } else if !unplanned.is_empty() {
        let mut skip_log = SkipLogger::new(ctx);
        for path in &unplanned {
            if let Err(e) = skip_log.record(path) {
                log::error!(
                    "Failed to write {} to skip log {}: {}",
                    path.display(),
                    skip_log.log_path().display(),
                    e
                );
            }
        }
        log::info!(
            "Logged {} of {} unrecognized files to {}",
            skip_log.recorded(),
            unplanned.len(),
            skip_log.log_path().display()
        );
    }

    let stats = SortStats {
        discovered: discovered.len(),
        videos: plan.count(Category::Video),
        images: plan.count(Category::PrimaryImage),
        sidecars: plan.count(Category::Sidecar),
        transferred: report.transferred,
        would_transfer: report.would_transfer,
        already_existing: report.already_existing,
        unrecognized: unplanned.len(),
        failed: report.failures.len(),
    };
    log::info!("Sort complete: {}", stats);

    if !report.failures.is_empty() {
        log::error!("{} files failed to transfer", report.failures.len());
        return Err(SortError::TransferFailed(report.failures));
    }

    Ok(stats)
}
