use crate::mediasort_core::error::TransferFailures;
use crate::mediasort_core::plan::{MovePlan, PlannedMove};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Whether files are copied or moved. Fixed for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferMode {
    Copy,
    Move,
}

impl TransferMode {
    pub fn verb(&self) -> &'static str {
        match self {
            TransferMode::Copy => "Copying",
            TransferMode::Move => "Moving",
        }
    }
}

/// What happened to a single planned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Copied,
    Moved,
    AlreadyExists,
    /// Dry run: the transfer would have happened.
    WouldTransfer,
    Failed,
}

/// Per-run tally of the transfer pass.
#[derive(Debug, Default)]
pub struct MoveReport {
    pub transferred: usize,
    pub already_existing: usize,
    pub would_transfer: usize,
    pub failures: TransferFailures,
}

impl MoveReport {
    fn record(&mut self, outcome: MoveOutcome) {
        match outcome {
            MoveOutcome::Copied | MoveOutcome::Moved => self.transferred += 1,
            MoveOutcome::AlreadyExists => self.already_existing += 1,
            MoveOutcome::WouldTransfer => self.would_transfer += 1,
            MoveOutcome::Failed => {}
        }
    }
}

/// Executes a move plan. The only component that touches the destination tree.
pub struct Mover {
    mode: TransferMode,
    dry_run: bool,
    claimed: HashSet<PathBuf>,
}

impl Mover {
    pub fn new(mode: TransferMode, dry_run: bool) -> Self {
        Self {
            mode,
            dry_run,
            claimed: HashSet::new(),
        }
    }

    /// Run every planned transfer in order. Failures are collected, not raised.
    pub fn execute(&mut self, plan: &MovePlan) -> MoveReport {
        let bar = ProgressBar::new(plan.len() as u64).with_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message(self.mode.verb());

        let mut report = MoveReport::default();
        for planned in plan.moves() {
            let outcome = match self.transfer(planned) {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!(
                        "Failed to transfer {} -> {}: {}",
                        planned.source.display(),
                        planned.destination.display(),
                        e
                    );
                    report.failures.add(
                        planned.source.clone(),
                        planned.destination.clone(),
                        e,
                    );
                    MoveOutcome::Failed
                }
            };

            match outcome {
                MoveOutcome::Copied | MoveOutcome::Moved => bar.suspend(|| {
                    println!(
                        "{} {} -> {}",
                        self.mode.verb(),
                        planned.source.display(),
                        planned.destination.display()
                    )
                }),
                MoveOutcome::AlreadyExists => bar.suspend(|| {
                    println!("{} already exists, skipping", planned.destination.display())
                }),
                MoveOutcome::WouldTransfer => bar.suspend(|| {
                    println!(
                        "[DRY RUN] {} {} -> {}",
                        self.mode.verb(),
                        planned.source.display(),
                        planned.destination.display()
                    )
                }),
                MoveOutcome::Failed => {}
            }

            report.record(outcome);
            bar.inc(1);
        }

        bar.finish_with_message("Done");
        report
    }

    /// Transfer one file. Never overwrites an existing destination.
    pub fn transfer(&mut self, planned: &PlannedMove) -> io::Result<MoveOutcome> {
        let PlannedMove {
            source,
            destination,
            ..
        } = planned;

        if destination.exists() || !self.claimed.insert(destination.clone()) {
            log::debug!(
                "Skipping {}: {} already exists",
                source.display(),
                destination.display()
            );
            return Ok(MoveOutcome::AlreadyExists);
        }

        if self.dry_run {
            return Ok(MoveOutcome::WouldTransfer);
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }

        log::info!(
            "{} {} -> {}",
            self.mode.verb(),
            source.display(),
            destination.display()
        );

        match self.mode {
            TransferMode::Copy => {
                fs::copy(source, destination)?;
                Ok(MoveOutcome::Copied)
            }
            TransferMode::Move => {
                move_file(source, destination)?;
                Ok(MoveOutcome::Moved)
            }
        }
    }
}

/// Rename, falling back to copy-then-remove across filesystems.
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    if fs::rename(source, destination).is_ok() {
        return Ok(());
    }
    fs::copy(source, destination)?;
    if let Err(e) = fs::remove_file(source) {
        // Leave no half-moved state behind.
        let _ = fs::remove_file(destination);
        return Err(e);
    }
    Ok(())
}
