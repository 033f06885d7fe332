use crate::mediasort_core::mover::TransferMode;
use crate::mediasort_core::skiplog::DEFAULT_LOGS_DIR;
use crate::mediasort_core::sorter::SortConfig;
use clap::{ArgAction, Parser};
use simplelog::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sort photos and videos into folders by capture date")]
pub struct Cli {
    /// Directory containing media to sort
    #[arg(long, required = true)]
    pub src: PathBuf,

    /// Destination root; files land in video/<date>/ and image/<date>/
    #[arg(long, required = true)]
    pub dest: PathBuf,

    /// Move files instead of copying them
    #[arg(
        long = "move",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = parse_move_flag,
    )]
    pub move_files: bool,

    /// Show what would be sorted without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// Directory for per-run skip logs
    #[arg(long, default_value = DEFAULT_LOGS_DIR)]
    pub logs_dir: PathBuf,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable file logging to mediasort.log
    #[arg(long = "log")]
    pub log: bool,

    /// Log level for file logging (debug, info, warn, error)
    #[arg(long, default_value_t = LevelFilter::Debug)]
    pub log_level: LevelFilter,
}

impl Cli {
    pub fn transfer_mode(&self) -> TransferMode {
        if self.move_files {
            TransferMode::Move
        } else {
            TransferMode::Copy
        }
    }

    pub fn sort_config(&self) -> SortConfig {
        SortConfig {
            src: self.src.clone(),
            dest: self.dest.clone(),
            mode: self.transfer_mode(),
            dry_run: self.dry_run,
        }
    }
}

/// Parse an explicit `--move=<value>`. Anything unrecognised is rejected.
fn parse_move_flag(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(format!(
            "invalid \"--move\" value '{value}' (expected true or false)"
        )),
    }
}
