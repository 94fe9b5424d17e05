// src/bin/sfv.rs
//! sfv: seal, unseal and share files from the command line

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sealed_file_vault::{load_config, SqlCipherSecretStore, ShareToken, VaultPipeline};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sfv", version, about = "Encrypt stored files at rest")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encrypt a file in place, creating its key on first use
    Seal { id: String, path: PathBuf },

    /// Decrypt a file in place, or into --to leaving the stored file sealed
    Unseal {
        id: String,
        path: PathBuf,
        #[arg(long)]
        to: Option<PathBuf>,
    },

    /// Print a fresh share-link token
    ShareToken,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config();

    match cli.command {
        Command::ShareToken => {
            println!("{}", ShareToken::generate(config.share.token_bytes));
        }
        Command::Seal { id, path } => {
            let path = stored_path(&path)?;
            let pipeline = open_pipeline(config)?;
            let bytes = pipeline
                .seal(id.as_str(), &path)
                .with_context(|| format!("sealing {}", path.display()))?;
            info!("sealed {} ({bytes} bytes)", path.display());
        }
        Command::Unseal { id, path, to } => {
            let path = stored_path(&path)?;
            let to = to.as_deref().map(output_path).transpose()?;
            let pipeline = open_pipeline(config)?;
            let bytes = pipeline
                .unseal(id.as_str(), &path, to.as_deref())
                .with_context(|| format!("unsealing {}", path.display()))?;
            info!("unsealed {} ({bytes} bytes)", path.display());
        }
    }

    Ok(())
}

/// Canonical absolute form of a stored file's path.
///
/// The path is bound into the envelope, so `a.bin`, `./a.bin` and the same
/// file named from another directory must all resolve to identical bytes.
fn stored_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("resolving {}", path.display()))
}

/// Absolute form of an output path, which need not exist yet
fn output_path(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("resolving {}", path.display()))
}

fn open_pipeline(config: &sealed_file_vault::Config) -> Result<VaultPipeline<SqlCipherSecretStore>> {
    let store = SqlCipherSecretStore::from_config(config).with_context(|| {
        format!(
            "opening secret store {} (is SFV_STORE_KEY set?)",
            config.paths.secret_db.display()
        )
    })?;
    Ok(VaultPipeline::from_config(store, config))
}
