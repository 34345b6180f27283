use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use bankview::config::ViewerConfig;
use bankview::controller::Viewer;
use bankview::service::HttpDataService;
use bankview::tui::app::TuiApp;
use bankview::tui::runner::run_tui;
use bankview::tui::surface::TuiSurface;
use bankview::view::ViewId;

#[derive(Parser)]
#[command(name = "bankview", about = "Terminal viewer for wwiser bank dumps.")]
struct Cli {
    /// Backend base URL (e.g. http://localhost:55123)
    #[arg(short, long)]
    url: Option<String>,

    /// Request timeout in seconds (0 = wait forever)
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Tab to open first (bank-list, simple-list, docs-readme, docs-wwiser)
    #[arg(long, value_parser = parse_tab)]
    tab: Option<ViewId>,

    /// Config file (defaults to ~/.bankview/config.yaml + .bankview/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn parse_tab(s: &str) -> Result<ViewId, String> {
    ViewId::parse(s).ok_or_else(|| format!("unknown tab '{s}'"))
}

/// Route tracing to `log_file`. Without one nothing is installed: the
/// terminal belongs to the UI.
fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("bankview=info".parse()?);
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let config = match &cli.config {
        Some(path) => ViewerConfig::load_from(path)?,
        None => ViewerConfig::load(),
    }
    .with_overrides(cli.url, cli.timeout, cli.tab);

    info!(url = %config.base_url, timeout = ?config.timeout, "bankview starting");

    let service = HttpDataService::with_base_url(&config.base_url, config.timeout)?;
    let (viewer, completions) = Viewer::new(Arc::new(service), TuiSurface::new());

    run_tui(TuiApp::new(viewer), completions, config.start_tab).await
}
