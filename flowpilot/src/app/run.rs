//! Command execution for the command line tool

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::adapter::editor::EditorAdapter;
use crate::adapter::snapshot::SnapshotDriver;
use crate::adapter::{AdapterRegistry, PlatformAdapter};
use crate::app::settings::Settings;
use crate::catalog::{DetectionInput, PatternCatalog};
use crate::errors::CopilotError;
use crate::guide::predicates::is_step_completed;
use crate::models::security::ScanContext;
use crate::security::{summarize, SecurityScanner};

/// What the command line asked for
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the aggregated context of a snapshot
    Context,
    /// Print the data flow into a node
    Trace(String),
    /// Scan a change file through the security gate
    Scan(PathBuf),
    /// Gate and apply a change file to the snapshot
    Apply(PathBuf),
    /// List patterns, or rank them against an error message
    Patterns(Option<String>),
    /// Report which registered platform recognizes the snapshot
    Detect,
    /// Show guide progress for a pattern against the snapshot's view
    Guide(String),
}

impl Command {
    /// Pick the command from parsed `--key[=value]` arguments
    pub fn from_args(args: &HashMap<String, String>) -> Option<Self> {
        if args.contains_key("context") {
            return Some(Command::Context);
        }
        if let Some(node) = args.get("trace") {
            return Some(Command::Trace(node.clone()));
        }
        if let Some(path) = args.get("scan") {
            return Some(Command::Scan(PathBuf::from(path)));
        }
        if let Some(path) = args.get("apply") {
            return Some(Command::Apply(PathBuf::from(path)));
        }
        if args.contains_key("patterns") {
            return Some(Command::Patterns(args.get("error").cloned()));
        }
        if args.contains_key("detect") {
            return Some(Command::Detect);
        }
        args.get("guide").map(|id| Command::Guide(id.clone()))
    }

    fn needs_snapshot(&self) -> bool {
        !matches!(self, Command::Patterns(_) | Command::Scan(_))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CopilotError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn load_json(path: &Path) -> Result<Value, CopilotError> {
    let json = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&json)?)
}

async fn load_catalog(settings: &Settings) -> Result<PatternCatalog, CopilotError> {
    match &settings.catalog_path {
        Some(path) => PatternCatalog::load(path).await,
        None => PatternCatalog::builtin(),
    }
}

/// Run one command against an optional snapshot file
pub async fn run(command: Command, snapshot: Option<&Path>, settings: &Settings) -> Result<(), CopilotError> {
    debug!("Running {:?}", command);
    let scanner = Arc::new(SecurityScanner::new()?);
    let options = settings.to_options();

    let driver = match snapshot {
        Some(path) => Some(Arc::new(SnapshotDriver::load(path).await?)),
        None if command.needs_snapshot() => {
            return Err(CopilotError::ConfigError("this command needs --snapshot=<file>".to_string()));
        }
        None => None,
    };
    let adapter = driver
        .as_ref()
        .map(|d| Arc::new(EditorAdapter::new(d.clone(), scanner.clone(), &options)));

    match command {
        Command::Context => {
            if let Some(adapter) = &adapter {
                print_json(&adapter.get_context().await)?;
            }
        }
        Command::Trace(node_id) => {
            if let Some(adapter) = &adapter {
                print_json(&*adapter.trace_data_flow(&node_id).await)?;
            }
        }
        Command::Scan(path) => {
            let change = load_json(&path).await?;
            let scan_context = match &adapter {
                Some(adapter) => adapter.get_context().await.scan_context(),
                None => ScanContext::default(),
            };
            let result = scanner.validate_ai_response(&change, &scan_context);
            let summary = summarize(&result);
            if result.safe {
                eprintln!("{}", summary.green());
            } else {
                eprintln!("{}", summary.red());
            }
            print_json(&result)?;
        }
        Command::Apply(path) => {
            if let Some(adapter) = &adapter {
                let change = load_json(&path).await?;
                let result = adapter.apply_changes(&change).await;
                if result.success {
                    eprintln!("{}", result.message.green());
                } else {
                    eprintln!("{}", result.message.red());
                }
                print_json(&result)?;
            }
        }
        Command::Patterns(error) => {
            let catalog = load_catalog(settings).await?;
            match error {
                Some(message) => {
                    let input = DetectionInput {
                        error_message: Some(message.as_str()),
                        ..Default::default()
                    };
                    print_json(&catalog.detect_relevant(&input))?;
                }
                None => {
                    for id in catalog.ids() {
                        if let Some(pattern) = catalog.get(id) {
                            println!("{}  {}", id.bold(), pattern.title);
                        }
                    }
                }
            }
        }
        Command::Detect => {
            let mut registry = AdapterRegistry::new();
            if let Some(adapter) = adapter {
                registry.register(adapter);
            }
            match registry.detect().await {
                Some(found) => println!("{}", found.platform_name().green()),
                None => println!("{}", "no supported editor detected".yellow()),
            }
        }
        Command::Guide(pattern_id) => {
            let catalog = load_catalog(settings).await?;
            let pattern = catalog
                .get(&pattern_id)
                .ok_or_else(|| CopilotError::NotFound(format!("pattern '{}'", pattern_id)))?;
            if let Some(driver) = &driver {
                let view = driver.snapshot().await.view;
                for (index, step) in pattern.manual_steps.iter().enumerate() {
                    let mark = if is_step_completed(step, &view) {
                        "done".green()
                    } else {
                        "todo".yellow()
                    };
                    println!("{} {}. {}", mark, index + 1, step.description);
                }
                info!("Evaluated {} step(s) of '{}'", pattern.manual_steps.len(), pattern_id);
            }
        }
    }

    Ok(())
}
