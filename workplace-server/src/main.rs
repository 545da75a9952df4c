//! Shadow Workplace server - HTTP boundary for the setup and review workflows.

mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use axum::Router;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;
use workplace::io::config::{DEFAULT_CONFIG_PATH, Secrets, load_config};
use workplace::workflow::Workflows;

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "workplace-server")]
#[command(about = "HTTP server for the Shadow Workplace workflows")]
struct Args {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value = "8000")]
    port: u16,

    /// Path to the TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory containing the static web UI
    #[arg(long, default_value = "workplace-server/ui")]
    ui_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("workplace_server=info".parse()?)
                .add_directive("workplace=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let config = load_config(&args.config)?;
    let secrets = Secrets::from_env();
    secrets.log_presence();

    // Blocking HTTP clients must be created and dropped outside the async runtime.
    let workflows = Workflows::from_config(&config, &secrets)?;
    let state = AppState::new(workflows);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    runtime.block_on(serve(args, state))
}

async fn serve(args: Args, state: AppState) -> anyhow::Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app: Router = routes::router().layer(cors).with_state(state);

    if args.ui_dir.exists() {
        info!(ui_dir = %args.ui_dir.display(), "serving static UI files");
        app = app.nest_service(
            "/ui",
            ServeDir::new(&args.ui_dir).append_index_html_on_directories(true),
        );
    } else {
        info!(ui_dir = %args.ui_dir.display(), "UI directory not found, API-only mode");
    }

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
