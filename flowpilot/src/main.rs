//! FlowPilot - Entry Point
//!
//! Inspects a captured workflow editor snapshot from the command line.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use flowpilot::app::run::{run, Command};
use flowpilot::app::settings::Settings;
use flowpilot::logs::init_logging;
use flowpilot::utils::version_info;

use tracing::{error, info};

const USAGE: &str = "usage: flowpilot --snapshot=<file> [--settings=<file>] \
(--context | --trace=<node> | --scan=<change> | --apply=<change> | --detect | --guide=<pattern>) \
| flowpilot --patterns [--error=<message>]";

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Failed to serialize version info: {e}"),
        }
        return ExitCode::SUCCESS;
    }

    let settings = match cli_args.get("settings") {
        Some(path) => match Settings::load(&PathBuf::from(path)).await {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Failed to load settings: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };

    if let Err(e) = init_logging(settings.log_options()) {
        eprintln!("Failed to initialize logging: {e}");
    }
    if let Some(path) = cli_args.get("settings") {
        info!("Loaded settings from {path}");
    }

    let Some(command) = Command::from_args(&cli_args) else {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };

    let snapshot = cli_args.get("snapshot").map(PathBuf::from);
    match run(command, snapshot.as_deref(), &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}
