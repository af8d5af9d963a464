use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "peerctl.toml";

/// Directory override for the configuration file.
pub const ENV_CFG_PATH: &str = "PEERCTL_CFG_PATH";
pub const ENV_PEER_ADDRESS: &str = "PEERCTL_PEER_ADDRESS";
pub const ENV_PEER_TLS_ENABLED: &str = "PEERCTL_PEER_TLS_ENABLED";
pub const ENV_PEER_TLS_ROOTCERT_FILE: &str = "PEERCTL_PEER_TLS_ROOTCERT_FILE";
pub const ENV_ORDERER_ADDRESS: &str = "PEERCTL_ORDERER_ADDRESS";

/// Settings the CLI reads when a flag is not given on the command line.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PeerCliConfig {
    pub peer: PeerConfig,
    pub orderer: OrdererConfig,
    pub chaincode: ChaincodeConfig,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PeerConfig {
    /// Default endorsing peer, e.g. `peer0.org1.example.com:7051`
    pub address: Option<String>,
    pub tls: TlsConfig,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct TlsConfig {
    pub enabled: bool,
    pub root_cert_file: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct OrdererConfig {
    pub address: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ChaincodeConfig {
    /// Endorsement system chaincode used when `--escc` is not given
    pub escc: String,
    /// Validation system chaincode used when `--vscc` is not given
    pub vscc: String,
}

impl Default for ChaincodeConfig {
    fn default() -> Self {
        Self { escc: "escc".to_string(), vscc: "vscc".to_string() }
    }
}

impl PeerCliConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| anyhow!("Failed to parse TOML config: {}", e))
    }

    /// Applies `PEERCTL_*` overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(address) = lookup(ENV_PEER_ADDRESS) {
            self.peer.address = Some(address);
        }
        if let Some(raw) = lookup(ENV_PEER_TLS_ENABLED) {
            self.peer.tls.enabled = parse_bool(&raw)
                .ok_or_else(|| anyhow!("{} must be a boolean, got '{}'", ENV_PEER_TLS_ENABLED, raw))?;
        }
        if let Some(cert) = lookup(ENV_PEER_TLS_ROOTCERT_FILE) {
            self.peer.tls.root_cert_file = Some(cert);
        }
        if let Some(address) = lookup(ENV_ORDERER_ADDRESS) {
            self.orderer.address = Some(address);
        }
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Returns ~/.peerctl by default, respecting $PEERCTL_CFG_PATH override.
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CFG_PATH) {
        Ok(PathBuf::from(dir))
    } else {
        dirs::home_dir()
            .map(|home| home.join(".peerctl"))
            .ok_or_else(|| anyhow!("cannot find home dir"))
    }
}

pub fn load_config_file(path: &Path) -> Result<PeerCliConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file from {}", path.display()))?;
    PeerCliConfig::from_toml_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))
}

/// Loads the configuration and applies environment overrides.
///
/// An explicit path must exist. Without one, `peerctl.toml` in
/// [`config_dir`] is used when present and built-in defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<PeerCliConfig> {
    let mut config = match explicit {
        Some(path) => load_config_file(path)?,
        None => {
            let default_path = config_dir()?.join(CONFIG_FILE_NAME);
            if default_path.exists() {
                load_config_file(&default_path)?
            } else {
                log::debug!("no config file at {}, using defaults", default_path.display());
                PeerCliConfig::default()
            }
        }
    };
    config.apply_env_overrides()?;
    Ok(config)
}
