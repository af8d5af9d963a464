#![deny(unsafe_code)]
//! Compiles a collection configuration file, a JSON array such as
//!
//! ```json
//! [{ "name": "prices", "policy": "OR('Org1MSP.member', 'Org2MSP.member')",
//!    "requiredPeerCount": 1, "maxPeerCount": 3, "blockToLive": 0, "memberOnlyRead": true }]
//! ```
//!
//! into the binary collection config package carried by instantiate and
//! upgrade requests. Compilation is all-or-nothing.

use peerctl_policy_parser::{parse_policy, PolicyParseError};
use peerctl_types::{CollectionConfigPackage, CollectionDescriptor, EncodingError};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectionConfigError {
    #[error("invalid collection configuration: {0}")]
    ConfigFormat(String),

    #[error("invalid policy {policy} for collection '{collection}': {source}")]
    PolicySyntax {
        collection: String,
        policy: String,
        #[source]
        source: PolicyParseError,
    },

    #[error("failed to encode collection config package: {0}")]
    Encoding(#[from] EncodingError),

    #[error("failed to read collection configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One entry of the JSON array as written by users.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawCollectionConfig {
    name: String,
    policy: String,
    #[serde(default)]
    required_peer_count: u32,
    #[serde(default, alias = "maximumPeerCount")]
    max_peer_count: u32,
    #[serde(default)]
    block_to_live: u64,
    #[serde(default)]
    member_only_read: bool,
}

/// Compiles collection JSON straight to its wire bytes.
pub fn compile(json: &[u8]) -> Result<Vec<u8>, CollectionConfigError> {
    let package = compile_package(json)?;
    Ok(package.to_bytes()?)
}

/// Reads and compiles a collection configuration file.
pub fn compile_file(path: impl AsRef<Path>) -> Result<Vec<u8>, CollectionConfigError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| CollectionConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    compile(&bytes)
}

/// Validates collection JSON and returns the typed package.
pub fn compile_package(json: &[u8]) -> Result<CollectionConfigPackage, CollectionConfigError> {
    let raw: Vec<RawCollectionConfig> = serde_json::from_slice(json)
        .map_err(|e| CollectionConfigError::ConfigFormat(e.to_string()))?;

    let mut seen = HashSet::new();
    let mut config = Vec::with_capacity(raw.len());
    for entry in raw {
        config.push(compile_entry(entry, &mut seen)?);
    }

    log::debug!("compiled {} collection(s)", config.len());
    Ok(CollectionConfigPackage::new(config))
}

fn compile_entry(
    entry: RawCollectionConfig,
    seen: &mut HashSet<String>,
) -> Result<CollectionDescriptor, CollectionConfigError> {
    if entry.name.is_empty() {
        return Err(CollectionConfigError::ConfigFormat(
            "collection name must not be empty".to_string(),
        ));
    }

    let member_orgs_policy = parse_policy(&entry.policy).map_err(|source| {
        CollectionConfigError::PolicySyntax {
            collection: entry.name.clone(),
            policy: entry.policy.clone(),
            source,
        }
    })?;

    // Duplicates and inverted peer counts are left for the peer to reject.
    if !seen.insert(entry.name.clone()) {
        log::warn!("collection '{}' is defined more than once", entry.name);
    }
    if entry.max_peer_count < entry.required_peer_count {
        log::warn!(
            "collection '{}': maxPeerCount ({}) is lower than requiredPeerCount ({})",
            entry.name,
            entry.max_peer_count,
            entry.required_peer_count
        );
    }

    Ok(CollectionDescriptor {
        name: entry.name,
        member_orgs_policy,
        required_peer_count: entry.required_peer_count,
        maximum_peer_count: entry.max_peer_count,
        block_to_live: entry.block_to_live,
        member_only_read: entry.member_only_read,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_counts_default_to_zero() {
        let package = compile_package(br#"[{"name":"c","policy":"OR('A.member')"}]"#).unwrap();
        let c = &package.config[0];
        assert_eq!(c.required_peer_count, 0);
        assert_eq!(c.maximum_peer_count, 0);
        assert_eq!(c.block_to_live, 0);
        assert!(!c.member_only_read);
    }

    #[test]
    fn maximum_peer_count_alias_is_accepted() {
        let package = compile_package(
            br#"[{"name":"c","policy":"OR('A.member')","maximumPeerCount":7}]"#,
        )
        .unwrap();
        assert_eq!(package.config[0].maximum_peer_count, 7);
    }

    #[test]
    fn negative_counts_are_a_format_error() {
        let err = compile_package(br#"[{"name":"c","policy":"OR('A.member')","requiredPeerCount":-1}]"#)
            .unwrap_err();
        assert!(matches!(err, CollectionConfigError::ConfigFormat(_)));
    }

    #[test]
    fn empty_name_is_a_format_error() {
        let err = compile_package(br#"[{"name":"","policy":"OR('A.member')"}]"#).unwrap_err();
        assert!(matches!(err, CollectionConfigError::ConfigFormat(_)));
    }
}
