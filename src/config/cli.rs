use crate::config::toml_config::{OmikujiConfig, StoreBackend};
use clap::{Parser, Subcommand};
use std::num::NonZeroUsize;

#[derive(Debug, Clone, Parser)]
#[command(name = "omikuji")]
#[command(about = "Draw fortunes and review the draw history")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override store.backend from the config file
    #[arg(long, value_enum, global = true)]
    pub backend: Option<StoreBackend>,

    /// Override store.path from the config file
    #[arg(long, global = true)]
    pub store_path: Option<String>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Write logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Draw one fortune and record it
    Draw,
    /// Show the most recent draws
    History {
        #[arg(short, long)]
        limit: Option<NonZeroUsize>,
    },
    /// Count draws per fortune between two dates (inclusive)
    Stats {
        /// YYYY-MM-DD, defaults to a week before --end
        #[arg(long)]
        start: Option<String>,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        end: Option<String>,
    },
}

impl CliConfig {
    /// CLI flags win over the file.
    pub fn apply_overrides(&self, config: &mut OmikujiConfig) {
        if let Some(backend) = self.backend {
            tracing::debug!("🔧 store.backend overridden to {:?}", backend);
            config.store.backend = backend;
        }
        if let Some(path) = &self.store_path {
            tracing::debug!("🔧 store.path overridden to {}", path);
            config.store.path = Some(path.clone());
        }
    }
}
