use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use bikeshare_monitor::config::Config;
use bikeshare_monitor::logging::{self, Component, LogLevel};
use bikeshare_monitor::{collector, report};

#[derive(Parser)]
#[command(name = "bikeshare", version, about = "Sample a bike-share station-status feed and chart it")]
struct Args {
    /// Config file (default: bikeshare.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Also append log lines to this file
    #[arg(long, global = true)]
    log_file: Option<String>,
    /// Show debug output
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Prefix console output with timestamps
    #[arg(long, global = true)]
    timestamps: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch one snapshot and append it to the log
    Collect,
    /// Render the charts and index page from the log
    Report,
    /// Render the local-time totals chart with a 12-hour clock
    ClockView,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { LogLevel::Debug } else { LogLevel::Info };
    logging::init_logger(level, args.log_file.as_deref(), args.timestamps);

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::error(Component::System, &e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        Command::Collect => collector::run(&config)
            .map(|summary| {
                println!(
                    "OK: {} stations written to {} (append).",
                    summary.written,
                    config.storage.log_path.display()
                );
            })
            .map_err(|e| e.to_string()),
        Command::Report => report::run(&config, Utc::now())
            .map(|artifacts| {
                for path in artifacts.paths() {
                    println!("written: {}", path.display());
                }
            })
            .map_err(|e| e.to_string()),
        Command::ClockView => report::clock_view::run(&config)
            .map(|path| println!("written: {}", path.display()))
            .map_err(|e| e.to_string()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            logging::error(Component::System, &message);
            ExitCode::FAILURE
        }
    }
}
