// SPDX-License-Identifier: MIT OR Apache-2.0
//! delve CLI binary - typed, path-addressed lookups over JSON

use anyhow::Context;
use clap::{Parser, Subcommand};
use delve_cli::{Shape, get, keys, leaf_paths, option};
use delve_core::{Json, Path};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "delve")]
#[command(version, about, long_about = None)]
struct Args {
    /// Log decode internals to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for delve CLI
#[derive(Subcommand)]
enum Commands {
    /// Decode the value at a path
    Get {
        /// Dotted path, e.g. `user.tags[0]`
        path: Path,
        /// Input file (reads from stdin if not provided)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
        /// Type to decode as
        #[arg(long = "as", value_enum, default_value_t = Shape::Json)]
        shape: Shape,
    },
    /// Decode the value at a path, printing null when it is absent
    #[command(name = "option")]
    Maybe {
        /// Dotted path, e.g. `user.tags[0]`
        path: Path,
        /// Input file (reads from stdin if not provided)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
        /// Type to decode as
        #[arg(long = "as", value_enum, default_value_t = Shape::Json)]
        shape: Shape,
    },
    /// List the keys of the object at a path
    Keys {
        /// Dotted path (default: the document root)
        #[arg(default_value = "$")]
        path: Path,
        /// Input file (reads from stdin if not provided)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
    },
    /// Print every leaf path in dotted notation
    Paths {
        /// Input file (reads from stdin if not provided)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
    },
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    match &args.command {
        Commands::Get { .. } => handle_get(&args),
        Commands::Maybe { .. } => handle_option(&args),
        Commands::Keys { .. } => handle_keys(&args),
        Commands::Paths { .. } => handle_paths(&args),
    }
}

fn handle_get(args: &Args) {
    if let Commands::Get { path, input, shape } = &args.command
        && let Err(e) = run_get(path, input.as_ref(), *shape)
    {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run_get(path: &Path, input: Option<&PathBuf>, shape: Shape) -> anyhow::Result<()> {
    let json = read_input(input)?;
    let value = get(&json, path, shape)?;
    write_output(&serde_json::to_string_pretty(&value)?)
}

fn handle_option(args: &Args) {
    if let Commands::Maybe { path, input, shape } = &args.command
        && let Err(e) = run_option(path, input.as_ref(), *shape)
    {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run_option(path: &Path, input: Option<&PathBuf>, shape: Shape) -> anyhow::Result<()> {
    let json = read_input(input)?;
    let value = option(&json, path, shape)?;
    write_output(&serde_json::to_string_pretty(&value)?)
}

fn handle_keys(args: &Args) {
    if let Commands::Keys { path, input } = &args.command
        && let Err(e) = run_keys(path, input.as_ref())
    {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run_keys(path: &Path, input: Option<&PathBuf>) -> anyhow::Result<()> {
    let json = read_input(input)?;
    let mut out = String::new();
    for key in keys(&json, path)? {
        out.push_str(&key);
        out.push('\n');
    }
    write_output(&out)
}

fn handle_paths(args: &Args) {
    if let Commands::Paths { input } = &args.command
        && let Err(e) = run_paths(input.as_ref())
    {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run_paths(input: Option<&PathBuf>) -> anyhow::Result<()> {
    let json = read_input(input)?;
    let leaves = leaf_paths(json.view());
    debug!(count = leaves.len(), "collected leaf paths");
    let mut out = String::new();
    for leaf in leaves {
        out.push_str(&leaf.to_string());
        out.push('\n');
    }
    write_output(&out)
}

fn read_input(path: Option<&PathBuf>) -> anyhow::Result<Json> {
    let bytes = if let Some(p) = path {
        fs::read(p).with_context(|| format!("reading {}", p.display()))?
    } else {
        let mut input = Vec::new();
        io::stdin()
            .read_to_end(&mut input)
            .context("reading stdin")?;
        input
    };
    debug!(bytes = bytes.len(), "read input");
    Ok(Json::from_slice(&bytes)?)
}

fn write_output(output: &str) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(output.as_bytes())?;
    if !output.is_empty() && !output.ends_with('\n') {
        handle.write_all(b"\n")?;
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}
