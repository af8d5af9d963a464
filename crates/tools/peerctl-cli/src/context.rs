use crate::error::CliResult;
use peerctl_config::{load_config, PeerCliConfig};
use std::path::Path;

pub struct CliContext {
    pub config: PeerCliConfig,
}

impl CliContext {
    pub fn new(config_path: Option<&Path>) -> CliResult<Self> {
        let config = load_config(config_path)?;
        log::debug!("loaded configuration: {:?}", config);
        Ok(Self { config })
    }

    pub fn with_config(config: PeerCliConfig) -> Self {
        Self { config }
    }
}
