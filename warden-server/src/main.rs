use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use warden_server::{AppState, ServerConfig, bootstrap, create_router};

#[derive(Parser, Debug)]
#[command(name = "warden-server", version, about = "JWT-authenticated REST API with dynamic RBAC")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "warden.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = if args.config.exists() {
        ServerConfig::from_file(&args.config)?
    } else {
        ServerConfig::default()
    };

    init_tracing(&config);
    info!("Starting Warden Server v{}", env!("CARGO_PKG_VERSION"));

    if !args.config.exists() {
        info!(
            "Config file {} not found, using defaults",
            args.config.display()
        );
    }
    if config.auth.jwt_secret == ServerConfig::default().auth.jwt_secret {
        warn!("Running with the built-in JWT secret; set auth.jwt_secret for production");
    }

    let state = AppState::from_config(&config);
    bootstrap::seed(&state, &config.auth)?;

    let app = create_router(state);

    let addr = config.server_addr();
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.logging.level.clone()));

    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
