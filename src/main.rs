//! Outlay main entry point

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use outlay_api::start_server;
use outlay_config::Config;
use outlay_store::{JsonStore, StoreLayout, StoreRef};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;

mod menu;

#[derive(Parser, Debug)]
#[command(name = "outlay")]
#[command(author = "Outlay Contributors")]
#[command(version = "0.1.0")]
#[command(about = "A personal expense tracker with a CLI menu and a JSON HTTP API", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP API server
    Serve,
    /// Run the interactive expense menu (the default)
    Menu,
    /// Write a default configuration file and exit
    Init,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if matches!(args.command, Some(Command::Init)) {
        return init_config(&args.config);
    }

    let config = Config::load(args.config.clone()).map_err(|err| {
        anyhow::anyhow!(
            "[{}] could not load {}: {} (run `outlay init` to create a default config)",
            err.code(),
            args.config.display(),
            err
        )
    })?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    info!(
        "Config loaded: data path={}, expenses file={}",
        config.data.path.to_string_lossy(),
        config.data.expenses_file
    );

    let rt = Runtime::new()?;
    rt.block_on(run(args, config))
}

async fn run(args: Args, config: Config) -> anyhow::Result<()> {
    let layout = StoreLayout {
        data_dir: config.data.path.clone(),
        expenses_file: config.data.expenses_file.clone(),
        budget_file: config.data.budget_file.clone(),
        export_dir: config.data.export_dir.clone(),
    };
    let store: StoreRef = Arc::new(
        JsonStore::open(layout)
            .await
            .context("Failed to open expense store")?,
    );

    match args.command {
        Some(Command::Serve) => start_server(config, store).await,
        _ => menu::run(config, store).await?,
    }
    Ok(())
}

fn init_config(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    std::fs::write(path, Config::generate_default())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
