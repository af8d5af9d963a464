use serde::Serialize;
use thiserror::Error;

/// Whether a command may talk to one peer or to several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandKind {
    SingleTarget,
    MultiTarget,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("'{command}' command can only be executed against one peer. received {count}")]
    TooManyTargets { command: String, count: usize },

    #[error("number of peer addresses ({addresses}) does not match the number of TLS root cert files ({certs})")]
    CertCountMismatch { addresses: usize, certs: usize },

    #[error("error validating peer connection parameters: {0}")]
    InvalidParameters(Box<ConnectionError>),

    #[error("no endorser clients retrieved: at least one peer address is required for '{0}'")]
    NoEndorserTargets(String),

    #[error("no ordering endpoint or endorser client supplied")]
    NoOrderingEndpoint,
}

/// Target peers plus the TLS root certificates that authenticate them,
/// paired by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionParameters {
    pub peer_addresses: Vec<String>,
    pub tls_root_cert_files: Vec<String>,
}

impl ConnectionParameters {
    pub fn new(peer_addresses: Vec<String>, tls_root_cert_files: Vec<String>) -> Self {
        Self { peer_addresses, tls_root_cert_files }
    }

    /// Checks the address/cert lists for `command` and trims the cert list
    /// to what will actually be used: nothing when TLS is off, at most one
    /// entry per address for single-target commands.
    pub fn validate(
        &mut self,
        command: &str,
        kind: CommandKind,
        tls_enabled: bool,
    ) -> Result<(), ConnectionError> {
        let addresses = self.peer_addresses.len();
        if kind == CommandKind::SingleTarget && addresses > 1 {
            return Err(ConnectionError::TooManyTargets {
                command: command.to_string(),
                count: addresses,
            });
        }

        let certs = self.tls_root_cert_files.len();
        if certs > addresses {
            log::warn!(
                "received more TLS root cert files ({}) than peer addresses ({})",
                certs,
                addresses
            );
        }

        if !tls_enabled {
            self.tls_root_cert_files.clear();
            return Ok(());
        }

        match kind {
            CommandKind::MultiTarget if certs != addresses => {
                Err(ConnectionError::CertCountMismatch { addresses, certs })
            }
            CommandKind::SingleTarget if certs < addresses => {
                Err(ConnectionError::CertCountMismatch { addresses, certs })
            }
            CommandKind::SingleTarget => {
                self.tls_root_cert_files.truncate(addresses);
                Ok(())
            }
            CommandKind::MultiTarget => Ok(()),
        }
    }
}

/// Which transport clients a command needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientRequirements {
    pub endorser: bool,
    pub orderer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerEndpoint {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_root_cert_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrdererSource {
    Explicit(String),
    /// Orderer endpoints are fetched from the channel config through this peer.
    DiscoverViaPeer(String),
}

/// What the transport layer has to connect to for one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientPlan {
    pub endorsers: Vec<PeerEndpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orderer: Option<OrdererSource>,
}

pub fn plan_clients(
    command: &str,
    kind: CommandKind,
    mut params: ConnectionParameters,
    requirements: &ClientRequirements,
    orderer_endpoint: Option<&str>,
    tls_enabled: bool,
) -> Result<ClientPlan, ConnectionError> {
    params
        .validate(command, kind, tls_enabled)
        .map_err(|e| ConnectionError::InvalidParameters(Box::new(e)))?;

    let mut endorsers = Vec::new();
    if requirements.endorser {
        let mut certs = params.tls_root_cert_files.into_iter();
        for address in params.peer_addresses {
            endorsers.push(PeerEndpoint { address, tls_root_cert_file: certs.next() });
        }
        if endorsers.is_empty() {
            return Err(ConnectionError::NoEndorserTargets(command.to_string()));
        }
    }

    let orderer = if requirements.orderer {
        match (orderer_endpoint, endorsers.first()) {
            (Some(endpoint), _) => Some(OrdererSource::Explicit(endpoint.to_string())),
            (None, Some(peer)) => {
                log::info!(
                    "no orderer endpoint given, retrieving it from the channel config via {}",
                    peer.address
                );
                Some(OrdererSource::DiscoverViaPeer(peer.address.clone()))
            }
            (None, None) => return Err(ConnectionError::NoOrderingEndpoint),
        }
    } else {
        None
    };

    Ok(ClientPlan { endorsers, orderer })
}
