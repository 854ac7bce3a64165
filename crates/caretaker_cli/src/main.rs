//! Operator entry point: reconcile the database against the buildings
//! configuration, once or continuously.
//!
//! # Responsibility
//! - Wire configuration loading, the watcher and the reconcile
//!   supervisor together.
//! - Keep serving after a failed watcher-triggered run; only startup
//!   errors are fatal.

use caretaker_core::{load_config, ConfigWatcher, ReconcileSupervisor};
use log::{error, info};
use std::process::ExitCode;
use std::time::Duration;

const USAGE: &str = "usage: caretaker_cli <db-path> <config-path> [--watch] [--log-dir DIR]";
const POLL_INTERVAL: Duration = Duration::from_secs(2);

struct Args {
    db_path: String,
    config_path: String,
    watch: bool,
    log_dir: Option<String>,
}

fn parse_args(mut args: std::env::Args) -> Result<Args, String> {
    // Skip the binary name.
    args.next();

    let mut positional = Vec::new();
    let mut watch = false;
    let mut log_dir = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--watch" => watch = true,
            "--log-dir" => {
                log_dir = Some(args.next().ok_or("--log-dir requires a value")?);
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown flag `{other}`"));
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let db_path = positional.next().ok_or("missing <db-path>")?;
    let config_path = positional.next().ok_or("missing <config-path>")?;
    if positional.next().is_some() {
        return Err("too many arguments".to_string());
    }

    Ok(Args {
        db_path,
        config_path,
        watch,
        log_dir,
    })
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args()) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = &args.log_dir {
        if let Err(message) = caretaker_core::init_logging("info", log_dir) {
            eprintln!("failed to initialize logging: {message}");
            return ExitCode::FAILURE;
        }
    }

    let config = match load_config(&args.config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration `{}`: {err}", args.config_path);
            return ExitCode::FAILURE;
        }
    };

    let mut conn = match caretaker_core::db::open_db(&args.db_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open database `{}`: {err}", args.db_path);
            return ExitCode::FAILURE;
        }
    };

    let supervisor = ReconcileSupervisor::new();
    match supervisor.run(&mut conn, &config) {
        Ok(Some(summary)) => {
            println!(
                "reconciled: buildings +{} -{}, rooms +{} -{}",
                summary.buildings_created,
                summary.buildings_removed,
                summary.rooms_created,
                summary.rooms_removed
            );
        }
        Ok(None) => {}
        Err(err) => {
            eprintln!("initial reconciliation failed: {err}");
            return ExitCode::FAILURE;
        }
    }

    if !args.watch {
        return ExitCode::SUCCESS;
    }

    println!("watching `{}` for changes", args.config_path);
    let watcher = ConfigWatcher::spawn(args.config_path.as_str(), POLL_INTERVAL);
    for config in watcher.changes().iter() {
        match supervisor.run(&mut conn, &config) {
            Ok(Some(summary)) => {
                info!(
                    "event=watch_reconcile module=cli status=ok buildings_created={} buildings_removed={} rooms_created={} rooms_removed={}",
                    summary.buildings_created,
                    summary.buildings_removed,
                    summary.rooms_created,
                    summary.rooms_removed
                );
            }
            Ok(None) => {}
            Err(err) => {
                // Keep serving existing state; the next change retries.
                error!("event=watch_reconcile module=cli status=error error={err}");
            }
        }
    }

    ExitCode::SUCCESS
}
