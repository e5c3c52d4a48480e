//! ModelForge CLI - declare, download and manage project models.
//!
//! This binary wraps the modelforge-library pipeline: resolving model
//! names against the remote catalog, reconciling them with the project
//! configuration and local disk, and driving the Python downloader.

mod commands;
mod interact;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "modelforge")]
#[command(about = "Model acquisition and reconciliation for ML projects")]
struct Args {
    /// Project root directory (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    project: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve, download and declare models
    Add(commands::add::AddArgs),
    /// Re-download declared models that changed in the catalog
    Update(commands::update::UpdateArgs),
    /// Remove models from disk and from the configuration
    Remove(commands::remove::RemoveArgs),
    /// List declared models
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::WARN };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let project_root = match args.project {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    match args.command {
        Command::Add(add) => commands::add::run(&project_root, add).await,
        Command::Update(update) => commands::update::run(&project_root, update).await,
        Command::Remove(remove) => commands::remove::run(&project_root, remove),
        Command::List => commands::list::run(&project_root),
    }
}
