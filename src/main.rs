use anyhow::Result;
use clap::Parser;
use mediasort::mediasort_core::{Cli, ExifToolReader, RunContext, sort_media};
use simplelog::{CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, WriteLogger};
use std::fs::File;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize loggers
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Warn,
        Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )];

    if cli.log {
        loggers.push(WriteLogger::new(
            cli.log_level,
            Config::default(),
            File::create("mediasort.log")?,
        ));
    }

    CombinedLogger::init(loggers)?;

    let ctx = RunContext::start(&cli.logs_dir);
    let config = cli.sort_config();
    let mut reader = ExifToolReader::new();

    let stats = sort_media(&config, &mut reader, &ctx)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else if config.dry_run {
        println!("\n[DRY RUN] Would sort:");
        println!("  {} videos", stats.videos);
        println!("  {} images", stats.images);
        println!("  {} sidecars", stats.sidecars);
        println!("  {} unrecognized", stats.unrecognized);
    } else {
        println!("\nSort complete!");
        println!("  {} files transferred", stats.transferred);
        println!("  {} videos, {} images, {} sidecars", stats.videos, stats.images, stats.sidecars);
        if stats.already_existing > 0 {
            println!("  {} already existed", stats.already_existing);
        }
        if stats.unrecognized > 0 {
            println!("  {} unrecognized (see {})", stats.unrecognized, ctx.run_dir().display());
        }
    }

    Ok(())
}
