use super::invocation::{InvocationError, InvocationSpec};
use super::ChaincodeCommand;
use peerctl_collections::{compile_file, CollectionConfigError};
use peerctl_config::ChaincodeConfig;
use peerctl_policy_parser::{parse_policy, PolicyParseError};
use peerctl_types::PolicyNode;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParamError {
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error("chaincode version is not provided for {0}")]
    MissingVersion(String),

    #[error("chaincode path is not provided for {0}")]
    MissingPath(String),

    #[error("invalid policy {policy}: {source}")]
    InvalidPolicy {
        policy: String,
        #[source]
        source: PolicyParseError,
    },

    #[error("invalid collection configuration in file {}: {source}", .path.display())]
    InvalidCollections {
        path: PathBuf,
        #[source]
        source: CollectionConfigError,
    },
}

/// Raw chaincode flags as collected by the command line.
#[derive(Debug, Clone, Default)]
pub struct ChaincodeParams {
    pub name: String,
    pub path: Option<String>,
    pub version: Option<String>,
    pub ctor_json: String,
    pub policy: Option<String>,
    pub collections_config: Option<PathBuf>,
    pub escc: Option<String>,
    pub vscc: Option<String>,
}

/// Chaincode parameters after validation, ready to be put on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct CheckedChaincode {
    pub command: ChaincodeCommand,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation: Option<InvocationSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vscc: Option<String>,
    #[serde(skip)]
    pub endorsement_policy: Option<PolicyNode>,
    #[serde(skip)]
    pub collection_config: Option<Vec<u8>>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

pub fn check_chaincode_params(
    command: ChaincodeCommand,
    params: &ChaincodeParams,
    defaults: &ChaincodeConfig,
) -> Result<CheckedChaincode, ParamError> {
    // the name is needed for everything, including deploy
    if params.name.is_empty() {
        return Err(InvocationError::MissingName.into());
    }

    let version = non_empty(&params.version);
    if command.requires_version() && version.is_none() {
        return Err(ParamError::MissingVersion(command.name().to_string()));
    }
    let path = non_empty(&params.path);
    if command.requires_path() && path.is_none() {
        return Err(ParamError::MissingPath(command.name().to_string()));
    }

    let mut checked = CheckedChaincode {
        command,
        name: params.name.clone(),
        path,
        version,
        invocation: None,
        escc: None,
        vscc: None,
        endorsement_policy: None,
        collection_config: None,
    };

    if command.is_deployment() {
        checked.escc = Some(system_chaincode("escc", &params.escc, &defaults.escc));
        checked.vscc = Some(system_chaincode("vscc", &params.vscc, &defaults.vscc));

        if let Some(policy) = non_empty(&params.policy) {
            let node = parse_policy(&policy)
                .map_err(|source| ParamError::InvalidPolicy { policy: policy.clone(), source })?;
            checked.endorsement_policy = Some(node);
        }

        if let Some(path) = &params.collections_config {
            let bytes = compile_file(path).map_err(|source| ParamError::InvalidCollections {
                path: path.clone(),
                source,
            })?;
            checked.collection_config = Some(bytes);
        }
    } else if params.policy.is_some() || params.collections_config.is_some() {
        log::warn!(
            "endorsement policy and collection configuration are ignored by '{}'",
            command
        );
    }

    if command.requires_ctor() {
        checked.invocation = Some(InvocationSpec::check_and_normalize(&params.ctor_json, &params.name)?);
    }

    Ok(checked)
}

fn system_chaincode(kind: &str, flag: &Option<String>, default: &str) -> String {
    match non_empty(flag) {
        Some(name) => {
            log::info!("Using {} {}", kind, name);
            name
        }
        None => {
            log::info!("Using default {}", kind);
            default.to_string()
        }
    }
}
