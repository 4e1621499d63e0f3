//! Transit Analyst Gateway
//!
//! Entry point of the transit-network analysis service. Brings subsystems up
//! in a fixed order and authorizes every request before it reaches a
//! business component.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────────────┐
//!                   │                  ANALYST GATEWAY                      │
//!                   │                                                       │
//!   Client Request  │  ┌──────────┐   ┌───────────────┐   ┌─────────────┐  │
//!   ────────────────┼─▶│ listener │──▶│ authorization │──▶│ registered  │  │
//!                   │  │          │   │     gate      │   │ controllers │  │
//!                   │  └──────────┘   └───────┬───────┘   └──────┬──────┘  │
//!                   │                         │                  │         │
//!                   │                         ▼                  ▼         │
//!                   │                 ┌──────────────┐   ┌──────────────┐  │
//!                   │                 │  credential  │   │ storage +    │  │
//!                   │                 │   verifier   │   │ feed cache   │  │
//!                   │                 └──────────────┘   └──────────────┘  │
//!                   └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use analyst_gateway::config::loader::read_config;
use analyst_gateway::config::Mode;
use analyst_gateway::lifecycle::signals::trigger_on_ctrl_c;
use analyst_gateway::observability::logging;
use analyst_gateway::{controllers, Bootstrap, Shutdown};

#[derive(Parser)]
#[command(name = "analyst-gateway")]
#[command(about = "Authorization gateway for the transit analyst service", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "analyst.toml")]
    config: PathBuf,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Run without authorization, as the offline group.
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    let mut config = match read_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = %cli.config.display(), error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    if let Some(port) = cli.port {
        config.listener.port = port;
    }
    if cli.offline {
        config.mode = Mode::Offline;
    }

    let gateway = match Bootstrap::new(config).run(controllers::registry()).await {
        Ok(gateway) => gateway,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    let server = tokio::spawn(gateway.serve(shutdown.subscribe()));
    tokio::spawn(async move { trigger_on_ctrl_c(&shutdown).await });

    match server.await {
        Ok(Ok(())) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "Server task failed");
            ExitCode::FAILURE
        }
    }
}
