use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cube_core::CubeConfig;

mod client;
mod commands;

#[derive(Parser)]
#[command(
    name = "cube",
    about = "Cube — a small cluster task orchestrator",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to cube.toml (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the nodes known to the manager.
    Node {
        /// Manager to talk to (host:port). Overrides [manager].address.
        #[arg(short, long)]
        manager: Option<String>,
    },
    /// Submit a new task to the manager.
    Run {
        /// Manager to talk to (host:port). Overrides [manager].address.
        #[arg(short, long)]
        manager: Option<String>,
        /// Task specification file (JSON)
        #[arg(short, long, default_value = "task.json")]
        filename: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cube=info".parse()?)
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => CubeConfig::from_file(path)?,
        None => CubeConfig::default(),
    };

    match cli.command {
        Commands::Node { manager } => {
            let manager = manager.unwrap_or(config.manager.address);
            commands::node::list(&manager).await
        }
        Commands::Run { manager, filename } => {
            let manager = manager.unwrap_or(config.manager.address);
            commands::run::submit(&manager, &filename).await
        }
    }
}
