use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use horizon_server::assets::build_asset_host;
use horizon_server::codes::repair::{CodeCounters, repair_codes};
use horizon_server::config::AppConfig;
use horizon_server::database::connect;
use horizon_server::seed::seed_admin;
use horizon_server::state::AppState;

#[derive(Parser)]
#[command(name = "horizon-server", version, about = "Heavy Horizon backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Assign or normalize machine codes for every machine.
    ///
    /// Run with the server stopped; concurrent writes may allocate codes
    /// this pass does not see.
    RepairCodes {
        /// Log the planned rewrites without saving them.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::RepairCodes { dry_run } => repair(config, dry_run).await,
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let db = connect(&config.database).await?;
    seed_admin(&db, &config.auth).await?;
    let assets = build_asset_host(&config.assets).await?;
    info!(backend = ?config.assets.backend, cleanup = ?config.assets.cleanup, "Asset host ready");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState {
        db,
        config: Arc::new(config),
        assets,
    };
    let app = horizon_server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}

async fn repair(config: AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let db = connect(&config.database).await?;
    let plan = repair_codes(&db, CodeCounters::default(), dry_run).await?;

    let verb = if dry_run { "would be rewritten" } else { "rewritten" };
    println!(
        "{} machine code(s) {verb}, {} machine(s) skipped (unmapped category)",
        plan.rewrites.len(),
        plan.skipped.len()
    );
    for rewrite in &plan.rewrites {
        println!(
            "  #{} {}: {} -> {}",
            rewrite.id,
            rewrite.title,
            rewrite.from.as_deref().unwrap_or("(none)"),
            rewrite.to
        );
    }

    Ok(())
}
