use crate::chaincode::{
    check_chaincode_params, plan_clients, ChaincodeCommand, ChaincodeParams, CheckedChaincode,
    ClientPlan, ConnectionParameters,
};
use crate::context::CliContext;
use crate::error::CliResult;
use clap::{Args, Subcommand, ValueHint};
use peerctl_types::CollectionConfigPackage;
use serde::Serialize;
use std::path::PathBuf;

/// Chaincode operations. Each one is validated and printed as the request
/// that would be sent to the peers and orderer.
#[derive(Subcommand, Debug, Clone)]
pub enum ChaincodeCmd {
    /// Install a chaincode on a peer
    Install(ChaincodeArgs),
    /// Deploy an installed chaincode on a channel
    Instantiate(ChaincodeArgs),
    /// Upgrade a deployed chaincode to a new version
    Upgrade(ChaincodeArgs),
    /// Invoke a chaincode function and submit the transaction
    Invoke(ChaincodeArgs),
    /// Query a chaincode without submitting a transaction
    Query(ChaincodeArgs),
}

impl ChaincodeCmd {
    pub fn parts(&self) -> (ChaincodeCommand, &ChaincodeArgs) {
        match self {
            ChaincodeCmd::Install(args) => (ChaincodeCommand::Install, args),
            ChaincodeCmd::Instantiate(args) => (ChaincodeCommand::Instantiate, args),
            ChaincodeCmd::Upgrade(args) => (ChaincodeCommand::Upgrade, args),
            ChaincodeCmd::Invoke(args) => (ChaincodeCommand::Invoke, args),
            ChaincodeCmd::Query(args) => (ChaincodeCommand::Query, args),
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ChaincodeArgs {
    /// Name of the chaincode
    #[arg(short = 'n', long, default_value = "")]
    pub name: String,

    /// Path to the chaincode source
    #[arg(short = 'p', long)]
    pub path: Option<String>,

    /// Version of the chaincode
    #[arg(short = 'v', long)]
    pub version: Option<String>,

    /// Constructor message in JSON, e.g. '{"Args":["init","a","100"]}'
    #[arg(short = 'c', long = "ctor", default_value = "{}")]
    pub ctor: String,

    /// Endorsement policy, e.g. "AND('Org1MSP.member','Org2MSP.member')"
    #[arg(short = 'P', long)]
    pub policy: Option<String>,

    /// JSON file describing the chaincode's private-data collections
    #[arg(long = "collections-config", value_hint = ValueHint::FilePath)]
    pub collections_config: Option<PathBuf>,

    /// Endorsement system chaincode
    #[arg(long)]
    pub escc: Option<String>,

    /// Validation system chaincode
    #[arg(long)]
    pub vscc: Option<String>,

    /// Peers to connect to (repeatable)
    #[arg(long = "peerAddresses")]
    pub peer_addresses: Vec<String>,

    /// TLS root cert files for the peers, in the same order (repeatable)
    #[arg(long = "tlsRootCertFiles", value_hint = ValueHint::FilePath)]
    pub tls_root_cert_files: Vec<String>,

    /// Ordering service endpoint
    #[arg(short = 'o', long)]
    pub orderer: Option<String>,

    /// Override the configured TLS setting
    #[arg(long)]
    pub tls: Option<bool>,
}

impl ChaincodeArgs {
    fn to_params(&self) -> ChaincodeParams {
        ChaincodeParams {
            name: self.name.clone(),
            path: self.path.clone(),
            version: self.version.clone(),
            ctor_json: self.ctor.clone(),
            policy: self.policy.clone(),
            collections_config: self.collections_config.clone(),
            escc: self.escc.clone(),
            vscc: self.vscc.clone(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct EndorsementPolicySummary {
    pub expression: String,
    pub envelope_hex: String,
}

#[derive(Serialize, Debug)]
pub struct CollectionSummary {
    pub collections: Vec<String>,
    pub package_hex: String,
}

/// Everything the transport layer needs to carry out one chaincode command.
#[derive(Serialize, Debug)]
pub struct ChaincodeRequest {
    #[serde(flatten)]
    pub chaincode: CheckedChaincode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endorsement_policy: Option<EndorsementPolicySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_config: Option<CollectionSummary>,
    pub tls_enabled: bool,
    pub clients: ClientPlan,
}

/// Fills in peer address and TLS cert from configuration when none were given.
fn connection_parameters(ctx: &CliContext, args: &ChaincodeArgs) -> ConnectionParameters {
    if !args.peer_addresses.is_empty() {
        return ConnectionParameters::new(
            args.peer_addresses.clone(),
            args.tls_root_cert_files.clone(),
        );
    }
    let peer = &ctx.config.peer;
    let addresses: Vec<String> = peer.address.iter().cloned().collect();
    let certs = if args.tls_root_cert_files.is_empty() {
        peer.tls.root_cert_file.iter().cloned().collect()
    } else {
        args.tls_root_cert_files.clone()
    };
    ConnectionParameters::new(addresses, certs)
}

pub fn build_request(
    ctx: &CliContext,
    command: ChaincodeCommand,
    args: &ChaincodeArgs,
) -> CliResult<ChaincodeRequest> {
    let chaincode = check_chaincode_params(command, &args.to_params(), &ctx.config.chaincode)?;

    let tls_enabled = args.tls.unwrap_or(ctx.config.peer.tls.enabled);
    let orderer = args.orderer.as_deref().or(ctx.config.orderer.address.as_deref());
    let clients = plan_clients(
        command.name(),
        command.kind(),
        connection_parameters(ctx, args),
        &command.client_requirements(),
        orderer,
        tls_enabled,
    )?;

    let endorsement_policy = match &chaincode.endorsement_policy {
        Some(policy) => Some(EndorsementPolicySummary {
            expression: policy.to_string(),
            envelope_hex: hex::encode(policy.to_envelope().to_bytes()?),
        }),
        None => None,
    };

    let collection_config = match &chaincode.collection_config {
        Some(bytes) => {
            let package = CollectionConfigPackage::from_bytes(bytes)?;
            Some(CollectionSummary {
                collections: package.config.into_iter().map(|c| c.name).collect(),
                package_hex: hex::encode(bytes),
            })
        }
        None => None,
    };

    let input_args = chaincode.invocation.as_ref().map(|spec| spec.to_input_args());

    log::debug!(
        "{} request for chaincode '{}' targets {} endorser(s)",
        command,
        chaincode.name,
        clients.endorsers.len()
    );

    Ok(ChaincodeRequest {
        chaincode,
        input_args,
        endorsement_policy,
        collection_config,
        tls_enabled,
        clients,
    })
}

pub fn handle_chaincode_command(ctx: &CliContext, cmd: &ChaincodeCmd) -> CliResult<()> {
    let (command, args) = cmd.parts();
    let request = build_request(ctx, command, args)?;
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chaincode::connection::OrdererSource;
    use crate::error::CliError;
    use peerctl_config::PeerCliConfig;

    fn args(ctor: &str) -> ChaincodeArgs {
        ChaincodeArgs {
            name: "mycc".to_string(),
            version: Some("1.0".to_string()),
            ctor: ctor.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn falls_back_to_configured_peer() {
        let mut config = PeerCliConfig::default();
        config.peer.address = Some("peer0:7051".to_string());
        config.peer.tls.enabled = true;
        config.peer.tls.root_cert_file = Some("/tls/ca.crt".to_string());
        let ctx = CliContext::with_config(config);

        let request = build_request(&ctx, ChaincodeCommand::Query, &args(r#"{"Args":["get","a"]}"#))
            .unwrap();
        assert!(request.tls_enabled);
        assert_eq!(request.clients.endorsers.len(), 1);
        assert_eq!(request.clients.endorsers[0].address, "peer0:7051");
        assert_eq!(
            request.clients.endorsers[0].tls_root_cert_file.as_deref(),
            Some("/tls/ca.crt")
        );
        assert_eq!(request.clients.orderer, None);
        assert_eq!(request.input_args.unwrap(), vec!["get", "a"]);
    }

    #[test]
    fn tls_flag_overrides_config() {
        let mut config = PeerCliConfig::default();
        config.peer.tls.enabled = true;
        let ctx = CliContext::with_config(config);

        let mut a = args(r#"{"Function":"move","Args":["a","b","10"]}"#);
        a.peer_addresses = vec!["peer0".into(), "peer1".into()];
        a.tls_root_cert_files = vec!["cert0".into()];
        assert!(matches!(
            build_request(&ctx, ChaincodeCommand::Invoke, &a),
            Err(CliError::Connection(_))
        ));

        a.tls = Some(false);
        let request = build_request(&ctx, ChaincodeCommand::Invoke, &a).unwrap();
        assert!(request.clients.endorsers.iter().all(|e| e.tls_root_cert_file.is_none()));
        assert_eq!(
            request.clients.orderer,
            Some(OrdererSource::DiscoverViaPeer("peer0".into()))
        );
        assert_eq!(request.input_args.unwrap(), vec!["move", "a", "b", "10"]);
    }

    #[test]
    fn instantiate_summarises_policy() {
        let ctx = CliContext::with_config(PeerCliConfig::default());
        let mut a = args(r#"{"Args":["init"]}"#);
        a.peer_addresses = vec!["peer0".into()];
        a.orderer = Some("orderer:7050".into());
        a.policy = Some("or('Org1MSP.member','Org2MSP.member')".into());

        let request = build_request(&ctx, ChaincodeCommand::Instantiate, &a).unwrap();
        let policy = request.endorsement_policy.unwrap();
        assert_eq!(policy.expression, "OR('Org1MSP.member', 'Org2MSP.member')");
        assert!(!policy.envelope_hex.is_empty());
        assert_eq!(request.clients.orderer, Some(OrdererSource::Explicit("orderer:7050".into())));
    }

    #[test]
    fn parameter_errors_come_before_connection_errors() {
        let ctx = CliContext::with_config(PeerCliConfig::default());
        let mut a = args("{}");
        a.peer_addresses = vec!["peer0".into(), "peer1".into()];
        assert!(matches!(
            build_request(&ctx, ChaincodeCommand::Query, &a),
            Err(CliError::Params(_))
        ));
    }
}
