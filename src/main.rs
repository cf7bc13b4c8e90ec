use anyhow::Context;
use clap::{Parser, Subcommand};
use configuration::{init_tracing, ConfigArgs};
use core_types::{ArtifactName, Horizon};
use query::ReportQueryService;
use std::net::SocketAddr;

mod render;

/// The entry point for the Vizfolio results service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A local .env may carry VIZFOLIO_* overrides; it is optional.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = cli.config.load().context("Failed to load configuration")?;
    let _log_guard = init_tracing(&settings.logging)?;
    tracing::debug!(config_file = ?cli.config.config, results_dir = %settings.paths.results_dir.display(), "Configuration loaded.");

    match cli.command {
        Commands::Serve(args) => {
            let addr = match args.addr {
                Some(addr) => addr,
                None => format!("{}:{}", settings.server.host, settings.server.port)
                    .parse()
                    .context("Invalid server.host / server.port")?,
            };
            web_server::run_server(settings, addr).await?;
        }
        Commands::Report(args) => {
            let service = ReportQueryService::new(&settings, std::env::current_dir()?);
            let view = service.latest_simulation_or_backtest(args.horizon)?;
            println!("{}", render::report_view(&view));
        }
        Commands::Locate(args) => {
            let service = ReportQueryService::new(&settings, std::env::current_dir()?);
            let descriptor = service.locate(&args.artifact);
            println!("{}", render::descriptor(&descriptor, &service.context().current_dir));
        }
        Commands::Slice(args) => {
            let service = ReportQueryService::new(&settings, std::env::current_dir()?);
            let slice = service.symbol_slice(&args.report_id, &args.symbol)?;
            println!("{}", serde_json::to_string_pretty(&slice)?);
        }
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Serves and inspects simulation and backtest results.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Print the dashboard report (latest backtest, else the horizon's simulation).
    Report(ReportArgs),
    /// Show where an artifact is searched for and where it was found.
    Locate(LocateArgs),
    /// Print one symbol's slice of a report as JSON.
    Slice(SliceArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Listen address; defaults to server.host:server.port from the configuration.
    #[arg(long)]
    addr: Option<SocketAddr>,
}

#[derive(Parser)]
struct ReportArgs {
    /// Simulation horizon to fall back to (live, 30min, 1hour).
    #[arg(long)]
    horizon: Option<Horizon>,
}

#[derive(Parser)]
struct LocateArgs {
    /// Artifact key: live, 30min, 1hour, backtest, or backtest_<start>_<end>.
    artifact: ArtifactName,
}

#[derive(Parser)]
struct SliceArgs {
    /// Report id (an artifact key).
    report_id: String,
    /// Symbol within the report.
    symbol: String,
}
