//! `janken` - play confidential rock-paper-scissors against the mock backend.
//!
//! Moves are encrypted before they reach the registry, the winner is computed
//! over ciphertexts, and only the winner selector is ever decrypted.
//!
//! # Examples
//!
//! ```bash
//! # Play the computer
//! janken demo-single --move rock
//!
//! # Two players, JSON output, reproducible backend
//! janken demo-duel --p1 rock --p2 scissors --json --seed 7
//! ```

mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use janken_runtime::{Runtime, RuntimeConfig};

use commands::{DemoDuel, DemoSingle};

/// Confidential rock-paper-scissors
#[derive(Parser)]
#[command(name = "janken")]
#[command(about = "Confidential rock-paper-scissors over a mock encryption backend", long_about = None)]
#[command(version)]
struct Cli {
    /// Seed for the mock backend (overrides JANKEN_BACKEND_SEED)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Print the game report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Play one round against the computer
    DemoSingle(DemoSingle),

    /// Play one round between two players
    DemoDuel(DemoDuel),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = logging::setup_logging()?;

    let mut config = RuntimeConfig::from_env();
    if let Some(seed) = cli.seed {
        config = config.with_backend_seed(seed);
    }
    tracing::debug!("Runtime config: {:?}", config);

    let runtime = Runtime::mock(config).await?;
    let handle = runtime.handle();

    let report = match cli.command {
        Command::DemoSingle(cmd) => cmd.execute(&handle).await,
        Command::DemoDuel(cmd) => cmd.execute(&handle).await,
    };

    drop(handle);
    runtime.shutdown().await?;

    report?.print(cli.json)
}
