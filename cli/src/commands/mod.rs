pub mod embed;
pub mod evaluate;
pub mod rank;
pub mod setup;
pub mod strategies;
pub mod ui;

pub use embed::handle_embed;
pub use evaluate::{handle_evaluate, EvaluateArgs};
pub use rank::{handle_rank, RankArgs};
pub use strategies::handle_strategies;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hemolink")]
#[command(about = "Hybrid hospital ranking and retrieval evaluation for emergency blood requests")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Hospital snapshot (overrides data.snapshot_path)
    #[arg(long, value_name = "FILE", global = true)]
    pub data: Option<PathBuf>,

    /// Debug logging for hemolink crates
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank hospitals for an emergency blood request
    Rank(RankArgs),
    /// Compare retrieval strategies over the evaluation query set
    Evaluate(EvaluateArgs),
    /// Embed hospital profiles that have no embedding and save the snapshot
    Embed {
        /// Profiles per embedding request
        #[arg(long, default_value_t = 16)]
        batch: usize,
    },
    /// List the available strategies
    Strategies,
}
