use std::path::PathBuf;

use clap::Parser;

/// Cascadeflow routing gateway
#[derive(Debug, Parser)]
#[command(name = "cascadeflow", about = "Cost-aware cascade router for LLM providers")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "cascadeflow.toml", env = "CASCADEFLOW_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "CASCADEFLOW_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}
