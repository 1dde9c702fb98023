use std::path::PathBuf;

use clap::Parser;
use stockfish_analyzer::{Config, expand_home};

const EXAMPLES: &str = "\
Examples:
  stockfish-analyzer
  stockfish-analyzer --engine-path /usr/local/bin/stockfish
  stockfish-analyzer --threads 8 --hash-size 8192 --depth 20
  stockfish-analyzer --config my_config.json
  stockfish-analyzer --skill-level 15 --syzygy-path ~/tablebase/syzygy

Config file format (JSON):
{
    \"engine_path\": \"/usr/local/bin/stockfish\",
    \"threads\": 8,
    \"hash_size\": 8192,
    \"skill_level\": 20,
    \"eval_depth\": 20,
    \"syzygy_path\": \"~/chess/syzygy\"
}";

/// Interactive chess analysis with a UCI engine and Syzygy tablebases.
#[derive(Debug, Parser)]
#[command(name = "stockfish-analyzer", version, after_help = EXAMPLES)]
pub struct Cli {
    /// Path to the engine binary (default: discovered)
    #[arg(long)]
    pub engine_path: Option<PathBuf>,

    /// Number of engine threads (default: 4)
    #[arg(long)]
    pub threads: Option<u32>,

    /// Hash table size in MB (default: 16384)
    #[arg(long)]
    pub hash_size: Option<u32>,

    /// Engine skill level 0-20, where 20 is strongest (default: 20)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=20))]
    pub skill_level: Option<u8>,

    /// Fixed evaluation depth in plies (default: chosen per position)
    #[arg(long = "depth", visible_alias = "eval-depth", value_parser = clap::value_parser!(u32).range(1..))]
    pub eval_depth: Option<u32>,

    /// Directory holding Syzygy tablebase files (default: ~/chess/syzygy)
    #[arg(long)]
    pub syzygy_path: Option<PathBuf>,

    /// JSON config file with engine settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Save the resolved settings to a JSON config file and exit
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    /// Start from this position instead of the initial one
    #[arg(long)]
    pub fen: Option<String>,

    /// Log engine traffic and tablebase activity
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Defaults, then the config file, then command-line flags.
    pub fn resolve(&self) -> Config {
        let mut config = match &self.config {
            Some(path) => Config::load(path).unwrap_or_else(|err| {
                eprintln!("Error loading config file: {err}");
                eprintln!("Using default configuration...");
                Config::default()
            }),
            None => Config::default(),
        };
        self.apply(&mut config);
        config
    }

    fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.engine_path {
            config.engine_path = expand_home(path);
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(hash_size) = self.hash_size {
            config.hash_size = hash_size;
        }
        if let Some(skill_level) = self.skill_level {
            config.skill_level = skill_level;
        }
        if let Some(depth) = self.eval_depth {
            config.eval_depth = Some(depth);
        }
        if let Some(path) = &self.syzygy_path {
            config.syzygy_path = expand_home(path);
        }
    }
}
