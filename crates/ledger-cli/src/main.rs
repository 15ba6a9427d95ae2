use anyhow::Result;
use clap::{Parser, Subcommand};
use ledger_core::{
    constants::DEFAULT_DIFFICULTY,
    strategy::{hardware_threads, DifficultyScaled, WorkerCountStrategy},
    Chain, ChainConfig, RayonPool,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "Mine a local proof-of-work ledger")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a chain and append blocks to it
    Mine {
        /// Leading zero characters required of each hash
        #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
        difficulty: u32,
        /// Blocks to append after genesis
        #[arg(long, default_value_t = 5)]
        blocks: u64,
        /// Override the worker count picked for the difficulty
        #[arg(long)]
        workers: Option<usize>,
        /// Print the chain as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show how many workers a difficulty would use on this machine
    Workers {
        /// Difficulty to size the pool for
        #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
        difficulty: u32,
    },
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Mine {
            difficulty,
            blocks,
            workers,
            json,
        } => {
            let config = ChainConfig {
                difficulty,
                ..Default::default()
            };
            let mut chain = match workers {
                Some(n) => Chain::with_pool(config, RayonPool::new(n)?)?,
                None => Chain::new(config)?,
            };
            for i in 1..=blocks {
                chain.append(chain.next_block(format!("Block {i} Data")))?;
            }
            info!(blocks = chain.len(), difficulty, "chain complete");

            if json {
                println!("{}", serde_json::to_string_pretty(&chain.records())?);
            } else {
                for record in chain.records() {
                    println!("{} {} {}", record.index, record.nonce, record.hash);
                }
            }
        }
        Command::Workers { difficulty } => {
            let hardware = hardware_threads();
            let workers = DifficultyScaled::default().worker_count(difficulty, hardware);
            println!("difficulty {difficulty}: {workers} workers ({hardware} hardware threads)");
        }
    }
    Ok(())
}
