use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use model_fetch::core::{LineConfirm, Settings};
use model_fetch::models::{list_models, Downloader, InstallService, ModelManager, Profile};
use model_fetch::output::Console;
use tracing::metadata::LevelFilter;

const ENV_LOG: &str = "DOWNLOAD_MODELS_LOG";

/// Downloads the ComfyUI models used by Anime Maker.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Model profile to install
    #[arg(short, long, value_enum)]
    config: Option<Profile>,

    /// List every profile and what is installed
    #[arg(short, long)]
    list: bool,

    /// Download models even if they are already installed
    #[arg(short, long)]
    force: bool,

    /// ComfyUI install directory (defaults to $COMFYUI_PATH or ~/ComfyUI)
    #[arg(long, value_name = "DIR")]
    comfyui_path: Option<PathBuf>,
}

fn setup_logging() {
    let filter = std::env::var(ENV_LOG)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(LevelFilter::INFO);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> Result<()> {
    setup_logging();

    let cli = Cli::parse();
    let settings = Settings::resolve(cli.comfyui_path, cli.config)?;
    let manager = ModelManager::new(settings.models_dir());
    let mut console = Console::stdout();

    if cli.list {
        list_models(&manager, &mut console);
        return Ok(());
    }

    let downloader = Downloader::standard()?;
    let outcome = InstallService::new(&manager, &downloader, LineConfirm::stdin(), &mut console)
        .run(settings.profile, &settings.comfyui_path, cli.force)?;
    tracing::debug!(?outcome, "run finished");
    Ok(())
}
