use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "freshet")]
#[command(about = "A cached feed server for YouTube Music home", long_about = None)]
pub struct Cli {
    /// Config file path (default: ~/.config/freshet/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// API key required by the /feed routes
    #[arg(short, long)]
    pub key: Option<String>,

    /// Refresh interval (e.g., "6h", "30m", "1d")
    #[arg(short, long)]
    pub interval: Option<String>,

    /// Skip the refresh on startup
    #[arg(long)]
    pub no_initial_refresh: bool,

    /// Show the browser window while scraping
    #[arg(long)]
    pub headful: bool,
}
