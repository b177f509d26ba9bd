//! fileindex - recursive filesystem indexer
//!
//! Entry point for the command-line tool.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fileindex::config::{RuleSpec, DEFAULT_MAX_CONCURRENT_READS};
use fileindex::observability::{init_tracing, TracingConfig};
use fileindex::{Config, Loader, ResultMap};
use serde::Serialize;

/// Recursively load files into one path-keyed map
#[derive(Parser, Debug)]
#[command(name = "fileindex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "FILEINDEX_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, global = true, env = "FILEINDEX_LOG_JSON")]
    log_json: bool,

    /// Maximum number of files read at once
    #[arg(
        long,
        global = true,
        env = "FILEINDEX_MAX_CONCURRENT_READS",
        default_value_t = DEFAULT_MAX_CONCURRENT_READS
    )]
    max_concurrent_reads: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and decode every matching file
    Load {
        /// Files or directories to load
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Rule as PATTERN=HANDLER (json, text, raw, metadata); first match wins
        #[arg(short, long = "rule", value_parser = parse_rule)]
        rules: Vec<RuleSpec>,
    },
    /// List metadata of matching files without reading them
    Scan {
        /// Files or directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Glob matched against file names
        #[arg(short, long = "pattern", default_value = "*")]
        patterns: Vec<String>,
    },
}

fn parse_rule(s: &str) -> Result<RuleSpec, String> {
    s.parse().map_err(|e: fileindex::Error| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (roots, rules) = match &cli.command {
        Command::Load { paths, rules } => (paths.clone(), rules.clone()),
        Command::Scan { paths, .. } => (paths.clone(), Vec::new()),
    };

    let config = Config {
        roots,
        rules,
        log_level: cli.log_level,
        log_json: cli.log_json,
        max_concurrent_reads: Some(cli.max_concurrent_reads),
    };

    init_tracing(&TracingConfig::from(&config));
    tracing::debug!(?config, "Configuration loaded");
    config.validate()?;

    let mut loader = Loader::new(config.pattern_rules()?);
    if let Some(limit) = config.max_concurrent_reads {
        loader = loader.with_max_concurrent_reads(limit);
    }

    let output = match cli.command {
        Command::Load { .. } => render(loader.load(config.roots).await?)?,
        Command::Scan { patterns, .. } => render(loader.scan(config.roots, patterns).await?)?,
    };

    println!("{output}");
    Ok(())
}

/// Pretty JSON with keys in path order.
fn render<T: Serialize>(results: ResultMap<T>) -> serde_json::Result<String> {
    let sorted: BTreeMap<String, T> = results
        .into_iter()
        .map(|(path, value)| (path.display().to_string(), value))
        .collect();
    serde_json::to_string_pretty(&sorted)
}
