pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::{build_service, OmikujiConfig};

pub use adapters::{FileStore, MemoryStore, StoreClient};
pub use crate::core::service::{OmikujiService, ReportZone, StatisticsReport};
pub use domain::model::{Category, HistoryEntry, Outcome};
pub use utils::error::{ErrorKind, OmikujiError, Result};
