//! `fleetboard` - CLI and web server for the truck status board.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{error, info};

use fleetboard::cli::{Cli, Command, ConfigCommand, LogCommand, ServeCommand};
use fleetboard::{init_logging, ActivityLog, AppState, Board, Config, FleetStore, SystemClock};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Serve(cmd) => handle_serve(config, cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Log(cmd) => handle_log(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn handle_serve(mut config: Config, cmd: ServeCommand) -> anyhow::Result<()> {
    if let Some(host) = cmd.host {
        config.server.host = host;
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    config.validate()?;

    let addr = config.bind_address();
    let state = match AppState::load(config, Arc::new(SystemClock)) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to load board state: {e}");
            return Err(e.into());
        }
    };
    info!("Board loaded, starting server");

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(fleetboard::web::serve(state, &addr))?;
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let store = FleetStore::new(&config.storage.fleet_path);
    let loaded = store.load()?;
    let board = Board::new(
        loaded.fleet,
        &config.dispatch.initially_available,
        &loaded.created,
    );
    let fleet = board.fleet();

    if json {
        let trucks: Vec<_> = fleet
            .trucks
            .iter()
            .map(|truck| {
                serde_json::json!({
                    "id": truck.id,
                    "location": truck.location,
                    "status": board.status(&truck.id),
                    "fallbacks": fleet.rule_for(&truck.id).map(|r| &r.fallbacks),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&trucks)?);
        return Ok(());
    }

    println!("Fleet: {}", store.path().display());
    println!();
    println!("{:<16} {:<12} {:<24} Fallbacks", "Truck", "Status", "Location");
    for truck in &fleet.trucks {
        let status = board
            .status(&truck.id)
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        let fallbacks = fleet
            .rule_for(&truck.id)
            .map(|r| r.fallbacks.join(", "))
            .unwrap_or_default();
        println!(
            "{:<16} {:<12} {:<24} {}",
            truck.id, status, truck.location, fallbacks
        );
    }
    Ok(())
}

fn handle_log(config: &Config, cmd: &LogCommand) -> anyhow::Result<()> {
    let log = ActivityLog::open(
        &config.storage.activity_log_path,
        config.retention(),
        config.log_timezone()?,
        Utc::now(),
    )?;

    let entries = log.entries();
    let shown = cmd.limit.map_or(entries.len(), |n| n.min(entries.len()));
    if shown == 0 {
        println!("No activity in the last {} hours.", config.activity.retention_hours);
    }
    for entry in &entries[..shown] {
        println!("{entry}");
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                let mut value = serde_json::to_value(config)?;
                value["admin"]["password"] = serde_json::Value::from("********");
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Listen address:     {}", config.bind_address());
                println!();
                println!("[Storage]");
                println!("  Fleet file:         {}", config.storage.fleet_path.display());
                println!(
                    "  Activity log:       {}",
                    config.storage.activity_log_path.display()
                );
                println!();
                println!("[Dispatch]");
                println!(
                    "  Initially available: {}",
                    config.dispatch.initially_available.join(", ")
                );
                println!(
                    "  Alert:              {} or fewer {} units",
                    config.dispatch.alert_threshold, config.dispatch.alert_prefix
                );
                println!(
                    "  Overdue after:      {} min logistics, {} min destination",
                    config.dispatch.logistics_overdue_minutes,
                    config.dispatch.destination_overdue_minutes
                );
                println!();
                println!("[Activity]");
                println!("  Retention (hours):  {}", config.activity.retention_hours);
                println!("  Time zone:          {}", config.activity.timezone);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
