use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use freshet::cli::Cli;
use freshet::config::Config;
use freshet::refresh::RefreshCoordinator;
use freshet::scheduler::{format_interval, parse_interval, Scheduler};
use freshet::scrape::FeedScraper;
use freshet::server::{self, AppState};
use freshet::shutdown::{listen_for_signals, Shutdown};

/// Exit code that asks the supervisor to start a fresh process.
const RESTART_EXIT_CODE: u8 = 3;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // CLI flags override the config file
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(key) = cli.key {
        config.server.api_key = key;
    }
    if let Some(interval) = cli.interval {
        config.refresh.interval = interval;
    }
    if cli.no_initial_refresh {
        config.refresh.refresh_on_start = false;
    }
    if cli.headful {
        config.scrape.headless = false;
    }

    if config.server.api_key.is_empty() {
        anyhow::bail!(
            "No API key configured. Set server.api_key in {} or pass --key",
            Config::default_config_path()?.display()
        );
    }

    let interval = parse_interval(&config.refresh.interval)?;

    let shutdown = Shutdown::new();
    listen_for_signals(shutdown.clone());

    let scraper = Arc::new(FeedScraper::new(config.scrape.clone(), shutdown.clone()));
    let coordinator = Arc::new(RefreshCoordinator::new(scraper));

    tokio::spawn(
        Scheduler::new(
            coordinator.clone(),
            interval,
            config.refresh.refresh_on_start,
            shutdown.clone(),
        )
        .run(),
    );

    let state = AppState::new(coordinator, shutdown.clone(), config.server.api_key.clone());
    let app = server::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(
        "Listening on {} (refresh interval: {})",
        addr,
        format_interval(interval)
    );

    let serve_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { serve_shutdown.wait().await })
        .await
        .context("Server error")?;

    if shutdown.restart_requested() {
        info!("Exiting for restart");
        Ok(ExitCode::from(RESTART_EXIT_CODE))
    } else {
        info!("Exiting");
        Ok(ExitCode::SUCCESS)
    }
}
