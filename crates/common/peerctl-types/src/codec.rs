//! DAG-CBOR helpers shared by every wire type in this crate.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("DAG-CBOR encoding failed: {0}")]
    Encode(String),
    #[error("DAG-CBOR decoding failed: {0}")]
    Decode(String),
}

pub fn to_dag_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, EncodingError> {
    serde_ipld_dagcbor::to_vec(value).map_err(|e| EncodingError::Encode(e.to_string()))
}

pub fn from_dag_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, EncodingError> {
    serde_ipld_dagcbor::from_slice(bytes).map_err(|e| EncodingError::Decode(e.to_string()))
}
