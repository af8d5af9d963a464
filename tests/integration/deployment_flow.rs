use anyhow::Result;
use peerctl_cli::chaincode::connection::OrdererSource;
use peerctl_cli::chaincode::ChaincodeCommand;
use peerctl_cli::commands::chaincode::{build_request, ChaincodeArgs};
use peerctl_cli::CliContext;
use peerctl_collections::compile_file;
use peerctl_config::PeerCliConfig;
use peerctl_policy_parser::parse_policy;
use peerctl_types::{CollectionConfigPackage, IdentityPrincipal, SignaturePolicyEnvelope};
use std::collections::HashSet;
use std::fs;
use tempfile::tempdir;

const COLLECTIONS: &str = r#"[
    {
        "name": "prices",
        "policy": "OR('Org1MSP.member', 'Org2MSP.member')",
        "requiredPeerCount": 1,
        "maxPeerCount": 3,
        "blockToLive": 1000000,
        "memberOnlyRead": true
    },
    {
        "name": "audits",
        "policy": "AND('Org1MSP.admin', 'AuditorMSP.member')",
        "requiredPeerCount": 0,
        "maxPeerCount": 1
    }
]"#;

fn signers(names: &[&str]) -> HashSet<IdentityPrincipal> {
    names.iter().map(|n| n.parse().unwrap()).collect()
}

#[test]
fn collection_file_survives_compile_and_decode() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("collections.json");
    fs::write(&path, COLLECTIONS)?;

    let bytes = compile_file(&path)?;
    let package = CollectionConfigPackage::from_bytes(&bytes)?;
    assert_eq!(package.config.len(), 2);

    let audits = package.get("audits").unwrap();
    assert_eq!(audits.member_orgs_policy, parse_policy("AND('Org1MSP.admin', 'AuditorMSP.member')")?);
    assert!(audits.member_orgs_policy.is_satisfied_by(&signers(&["Org1MSP.admin", "AuditorMSP.member"])));
    assert!(!audits.member_orgs_policy.is_satisfied_by(&signers(&["Org1MSP.member", "AuditorMSP.member"])));
    Ok(())
}

#[test]
fn endorsement_policy_envelope_round_trips() -> Result<()> {
    let policy = parse_policy("OutOf(2, 'Org1MSP.peer', 'Org2MSP.peer', AND('Org3MSP.peer', 'Org1MSP.peer'))")?;
    let envelope = policy.to_envelope();
    assert_eq!(envelope.identities.len(), 3);

    let decoded = SignaturePolicyEnvelope::from_bytes(&envelope.to_bytes()?)?;
    assert_eq!(decoded.to_policy_node()?, policy);
    assert!(policy.is_satisfied_by(&signers(&["Org1MSP.peer", "Org3MSP.peer"])));
    Ok(())
}

#[test]
fn upgrade_request_carries_everything_the_transport_needs() -> Result<()> {
    let dir = tempdir()?;
    let collections = dir.path().join("collections.json");
    fs::write(&collections, COLLECTIONS)?;

    let config = PeerCliConfig::from_toml_str(
        r#"
[peer]
address = "peer0.org1.example.com:7051"

[peer.tls]
enabled = true
root_cert_file = "/etc/tls/org1-ca.crt"
"#,
    )?;
    let ctx = CliContext::with_config(config);

    let args = ChaincodeArgs {
        name: "marbles".to_string(),
        version: Some("2.0".to_string()),
        ctor: r#"{"Function":"init","Args":["a","100"]}"#.to_string(),
        policy: Some("AND('Org1MSP.member', 'Org2MSP.member')".to_string()),
        collections_config: Some(collections),
        ..Default::default()
    };
    let request = build_request(&ctx, ChaincodeCommand::Upgrade, &args)?;

    assert_eq!(request.input_args.as_deref(), Some(&["init".to_string(), "a".into(), "100".into()][..]));
    assert_eq!(request.chaincode.escc.as_deref(), Some("escc"));
    assert_eq!(request.collection_config.as_ref().unwrap().collections, vec!["prices", "audits"]);
    assert_eq!(
        request.clients.endorsers[0].tls_root_cert_file.as_deref(),
        Some("/etc/tls/org1-ca.crt")
    );
    assert_eq!(
        request.clients.orderer,
        Some(OrdererSource::DiscoverViaPeer("peer0.org1.example.com:7051".to_string()))
    );

    let json = serde_json::to_value(&request)?;
    assert_eq!(json["command"], "upgrade");
    assert_eq!(json["name"], "marbles");
    Ok(())
}
