mod app;
mod audio;
mod config;
mod input;
mod model;
mod render;
mod scheduler;
mod sim;
mod storage;
mod weather;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(name = "termipet")]
#[command(about = "A terminal desktop pet with live weather (Open-Meteo)")]
pub(crate) struct Cli {
    /// Config file (default: platform config dir / pet_config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for saved state (default: platform data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Latitude override for the weather location
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude override for the weather location
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Disable the weather refresh entirely
    #[arg(long, default_value_t = false)]
    no_weather: bool,

    /// Disable audio for this session
    #[arg(long, default_value_t = false)]
    mute: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they survive the alternate screen; pipe them
    // somewhere with 2> when debugging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("termipet=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    app::run(cli).await
}
