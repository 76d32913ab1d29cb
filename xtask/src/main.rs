// SPDX-License-Identifier: MIT OR Apache-2.0
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use schemars::schema_for;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "xtask", version, about = "Repo maintenance tasks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate JSON Schemas for the error snapshot and config types.
    Schema {
        /// Output directory.
        #[arg(long, default_value = "contracts/schemas")]
        out_dir: PathBuf,
    },
    /// Load and validate a normalizer config file, printing any warnings.
    CheckConfig {
        /// Path to the TOML file.
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Schema { out_dir } => schema(out_dir),
        Command::CheckConfig { path } => check_config(&path),
    }
}

fn schema(out_dir: PathBuf) -> Result<()> {
    std::fs::create_dir_all(&out_dir).context("create schema output dir")?;

    let error = schema_for!(rpcerr_normalize::RpcErrorDto);
    let config = schema_for!(rpcerr_config::NormalizerConfig);

    write_schema(&out_dir.join("rpc_error.schema.json"), &error)?;
    write_schema(&out_dir.join("normalizer_config.schema.json"), &config)?;

    eprintln!("wrote schemas to {}", out_dir.display());
    Ok(())
}

fn check_config(path: &Path) -> Result<()> {
    let config = rpcerr_config::load_config(Some(path))
        .with_context(|| format!("load {}", path.display()))?;
    let warnings = match rpcerr_config::validate_config(&config) {
        Ok(w) => w,
        Err(e) => bail!("{}: {e}", path.display()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.filter_directive()))
        .with_writer(std::io::stderr)
        .init();

    let normalizer = rpcerr_normalize::Normalizer::from_config(&config);
    debug!(
        target: "rpcerr.xtask",
        options = ?normalizer.builder().options(),
        "loaded config"
    );
    for w in &warnings {
        println!("warning: {w}");
    }
    println!("{}: ok ({} warning(s))", path.display(), warnings.len());
    Ok(())
}

fn write_schema(path: &Path, schema: &schemars::Schema) -> Result<()> {
    let s = serde_json::to_string_pretty(schema)?;
    std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
