//! The `delver` binary: config loading, tracing setup, and the serve
//! command that wires the runtime, exporter, pipeline, and gateway
//! together.

use clap::{Parser, Subcommand};
use delver_agents::{HttpAgentRuntime, RuntimeConfig};
use delver_export::{ExportConfig, ExportingRuntime, PdfExporter};
use delver_gateway::GatewayConfig;
use delver_pipeline::{PipelineConfig, ResearchPipeline};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "delver", about = "Delver — streaming deep-research service")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "delver.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the research gateway
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Deserialize)]
struct DelverConfig {
    runtime: RuntimeConfig,
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    export: ExportConfig,
    #[serde(default)]
    pipeline: PipelineConfig,
}

#[derive(Deserialize)]
struct ServerConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_environment")]
    environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_environment() -> String {
    "production".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_str = tokio::fs::read_to_string(&cli.config).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to read config file '{}': {}",
            cli.config.display(),
            e
        )
    })?;
    let config: DelverConfig = toml::from_str(&config_str)?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);

            info!("Starting Delver gateway on {}:{}", host, port);

            let export_root = config.export.export_root.clone();
            let exporter = Arc::new(PdfExporter::new(config.export));
            let runtime = Arc::new(ExportingRuntime::new(
                HttpAgentRuntime::new(config.runtime),
                exporter,
            ));
            let pipeline = Arc::new(ResearchPipeline::new(runtime, config.pipeline));

            let app = delver_gateway::build(
                pipeline,
                GatewayConfig {
                    environment: config.server.environment,
                    export_root,
                },
            );

            let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
