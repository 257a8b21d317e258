#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use toml_config::{OmikujiConfig, StoreBackend, StoreConfig};

use crate::adapters::StoreClient;
use crate::core::service::OmikujiService;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Single initialization point: validates the configuration, connects the
/// store and wires the service around it.
pub fn build_service(config: &OmikujiConfig) -> Result<OmikujiService<StoreClient>> {
    config.validate()?;

    let store = Arc::new(config.store.connect()?);
    let mut service = OmikujiService::new(store)
        .with_zone(config.report_zone()?)
        .with_window_days(config.stats.default_window_days);

    if let Some(limit) = NonZeroUsize::new(config.history.default_limit) {
        service = service.with_history_limit(limit);
    }

    Ok(service)
}
