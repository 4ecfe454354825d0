//! # OpsDesk — Operations Command Center
//!
//! Serves the dashboard over the prospect and task sheets, and forwards
//! approvals and task edits to the automation webhooks.
//!
//! Usage:
//!   opsdesk serve                      # Start the command center (default port 8501)
//!   opsdesk serve --port 9000          # Custom port
//!   opsdesk check                      # Connect to the sheets and count rows per feed
//!   opsdesk config                     # Print the effective configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use opsdesk_core::OpsDeskConfig;
use opsdesk_dashboard::{Dashboard, DashboardSettings};
use opsdesk_sheets::{Feeds, SheetsClient, connect_or_disconnected};
use opsdesk_webhooks::{Endpoint, WebhookDispatcher};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "opsdesk",
    version,
    about = "📊 OpsDesk — Donor prospecting & operations command center"
)]
struct Cli {
    /// Config file (default: $OPSDESK_CONFIG or ~/.opsdesk/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the web command center
    Serve {
        /// Bind address (overrides [gateway].host)
        #[arg(long)]
        host: Option<String>,
        /// Port (overrides [gateway].port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Connect to the spreadsheet store and report rows per feed
    Check,
    /// Print the effective configuration as TOML
    Config,
}

fn init_logging(verbose: bool, json: bool) {
    let filter = if verbose {
        "opsdesk=debug,opsdesk_sheets=debug,opsdesk_webhooks=debug,opsdesk_dashboard=debug,opsdesk_gateway=debug,tower_http=debug"
    } else {
        "opsdesk=info,opsdesk_sheets=info,opsdesk_webhooks=info,opsdesk_dashboard=info,opsdesk_gateway=info"
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<OpsDeskConfig> {
    let config = match path {
        Some(path) => {
            let mut config = OpsDeskConfig::load_from(path)
                .with_context(|| format!("loading {}", path.display()))?;
            config.apply_env_overrides();
            config
        }
        None => OpsDeskConfig::load()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);

    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.gateway.host = host;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }
            serve(config).await
        }
        Command::Check => check(&config).await,
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

async fn serve(config: OpsDeskConfig) -> Result<()> {
    if config.sheets.prospects_sheet_id.trim().is_empty() {
        tracing::warn!("⚠️ No prospects sheet configured; set [sheets].prospects_sheet_id");
    }

    let source = connect_or_disconnected(&config.sheets);
    let feeds = Arc::new(Feeds::from_config(&config.sheets, source));
    let webhooks = Arc::new(WebhookDispatcher::new(config.webhooks.clone()));
    let dashboard = Arc::new(Dashboard::new(
        feeds,
        webhooks,
        DashboardSettings::from_config(&config),
    ));

    println!("📊 OpsDesk v{}", env!("CARGO_PKG_VERSION"));
    println!("   🌐 Command center: http://{}:{}", config.gateway.host, config.gateway.port);
    println!("   🔗 Webhooks:       {}", config.webhooks.base_url);
    println!();

    opsdesk_gateway::start(&config.gateway, dashboard).await
}

async fn check(config: &OpsDeskConfig) -> Result<()> {
    println!("🔍 OpsDesk connectivity check\n");

    let client = SheetsClient::connect(&config.sheets).context("connecting to Google Sheets")?;
    println!("✅ Authenticated as {}", client.service_account());

    let feeds = Feeds::from_config(&config.sheets, Arc::new(client));
    let mut failures = 0;
    for feed in [&feeds.prospects, &feeds.tasks, &feeds.leads] {
        let read = feed.read().await;
        match read.failure {
            None => println!(
                "   ✅ {:<7} {:>5} row(s)  [{}]",
                feed.name(),
                read.records.len(),
                feed.sheet_id()
            ),
            Some(failure) => {
                failures += 1;
                println!("   ❌ {:<7} {failure}", feed.name());
            }
        }
    }

    let dispatcher = WebhookDispatcher::new(config.webhooks.clone());
    println!("\n🔗 Webhook endpoints (not called):");
    for endpoint in [Endpoint::ApproveProspects, Endpoint::CreateTask, Endpoint::UpdateTask] {
        println!("   {:<18} {}", endpoint.name(), dispatcher.url(endpoint));
    }

    if failures > 0 {
        anyhow::bail!("{failures} feed(s) could not be read");
    }
    Ok(())
}
