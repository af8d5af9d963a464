use crate::chaincode::{ConnectionError, ParamError};
use peerctl_collections::CollectionConfigError;
use peerctl_policy_parser::PolicyParseError;
use peerctl_types::EncodingError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O Error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON Serialization Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error(transparent)]
    Params(#[from] ParamError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Policy(#[from] PolicyParseError),

    #[error(transparent)]
    Collections(#[from] CollectionConfigError),

    #[error("Encoding Error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),
}

impl From<anyhow::Error> for CliError {
    fn from(e: anyhow::Error) -> Self {
        CliError::Config(format!("{:#}", e))
    }
}

// Define the standard Result type alias
pub type CliResult<T = ()> = Result<T, CliError>;
