// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use roster_app::{AppState, ListQuery, QueryState};
use roster_remote::HttpGateway;
use runtime::RemoteRuntime;
use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `roster --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let log_file = config.log_file()?;
    init_logging(&log_file, config.log_level())
        .with_context(|| format!("initialize logging at {}", log_file.display()))?;

    let gateway = HttpGateway::new(config.base_url(), config.collection(), config.timeout()?)
        .with_context(|| {
            format!(
                "invalid [remote] config in {}; fix base_url/collection/timeout values",
                options.config_path.display()
            )
        })?;
    let controller_config = config.controller_config();
    info!(
        base_url = gateway.base_url(),
        collection = gateway.collection(),
        page_size = controller_config.page_size,
        actor = controller_config.actor.is_some(),
        "starting roster"
    );

    if options.check_only {
        let query = ListQuery::from_state(
            &QueryState::new(controller_config.default_sort, controller_config.default_order),
            controller_config.page_size,
        );
        let rows = roster_remote::check_connection(&gateway, &query)?;
        println!("ok: {} returned {rows} row(s)", gateway.collection_url());
        return Ok(());
    }

    let mut state = AppState::default();
    let mut runtime = RemoteRuntime::new(gateway);
    roster_tui::run_app(&mut state, &mut runtime, controller_config)
}

/// Logs go to a file; the terminal belongs to the table view.
fn init_logging(path: &Path, level: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let filter = match EnvFilter::try_from_env("ROSTER_LOG") {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid logging.level {level:?}"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("roster");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config and run one list request");
    println!("  --help                   Show this help");
}
