//! # idforge CLI
//!
//! Parses arguments, loads env configuration, and answers one request.
//!
//! ```text
//! argv ──► clap ──► Request ──► Engine::handle(today, thread_rng) ──► JSON
//!                      ▲
//!          `idforge request` reads it as JSON instead
//! ```

mod cli;
mod config;

use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use idforge_core::{Engine, Request};

use crate::cli::{Cli, Commands};
use crate::config::CliConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load().context("loading configuration")?;
    debug!(?config, "Configuration loaded");

    let request = match cli.command {
        Commands::Request { json } => read_request(json)?,
        command => command
            .into_request(&config)
            .context("command does not map to a request")?,
    };

    let engine = Engine::with_limits(config.limits).context("building engine")?;
    let today = Utc::now().date_naive();
    let response = engine.handle(request, today, &mut rand::thread_rng())?;
    info!(%today, "Request answered");

    let output = if cli.pretty || config.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{output}");

    Ok(())
}

fn read_request(json: Option<String>) -> anyhow::Result<Request> {
    let text = match json {
        Some(text) => text,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading request from stdin")?;
            text
        }
    };

    serde_json::from_str(&text).context("parsing request JSON")
}
