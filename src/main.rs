use ai_webapp::app::App;
use ai_webapp::models::Config;
use ai_webapp::server;
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "ai-webapp")]
#[command(about = "Serve the AI web app API")]
struct CliArgs {
    /// Address to listen on; overrides BIND_ADDR.
    #[arg(long, value_name = "HOST:PORT")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ai_webapp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ai-webapp");

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let bind_addr = args.bind.unwrap_or_else(|| config.bind_addr.clone());

    let app = match App::new(&config).await {
        Ok(app) => Arc::new(app),
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    server::serve(app, &bind_addr, &config.cors_allow_origins).await?;
    Ok(())
}
