use crate::error::{CliError, CliResult};
use clap::Subcommand;
use peerctl_policy_parser::parse_policy;
use peerctl_types::{IdentityPrincipal, PolicyNode, SignaturePolicyEnvelope};
use serde::Serialize;
use std::collections::HashSet;

/// Commands for working with signature policy expressions
#[derive(Subcommand, Debug, Clone)]
pub enum PolicyCmd {
    /// Parse a policy expression and print its tree
    Parse {
        /// Policy expression, e.g. "OR('Org1MSP.member', AND('Org2MSP.peer', 'Org3MSP.peer'))"
        expression: String,

        /// Also print the indexed signature policy envelope
        #[arg(long)]
        envelope: bool,

        /// Evaluate the policy against these signers (ORG.ROLE, repeatable)
        #[arg(long = "check", value_name = "ORG.ROLE")]
        check: Vec<String>,
    },
}

#[derive(Serialize, Debug)]
pub struct EnvelopeReport {
    #[serde(flatten)]
    pub envelope: SignaturePolicyEnvelope,
    pub hex: String,
}

#[derive(Serialize, Debug)]
pub struct PolicyReport {
    pub rendered: String,
    pub depth: usize,
    pub tree: PolicyNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envelope: Option<EnvelopeReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satisfied: Option<bool>,
}

pub fn policy_report(expression: &str, envelope: bool, check: &[String]) -> CliResult<PolicyReport> {
    let tree = parse_policy(expression)?;

    let envelope = if envelope {
        let envelope = tree.to_envelope();
        let hex = hex::encode(envelope.to_bytes()?);
        Some(EnvelopeReport { envelope, hex })
    } else {
        None
    };

    let satisfied = if check.is_empty() {
        None
    } else {
        let signers = check
            .iter()
            .map(|s| {
                s.parse::<IdentityPrincipal>()
                    .map_err(|e| CliError::InvalidArgument(e.to_string()))
            })
            .collect::<Result<HashSet<_>, _>>()?;
        Some(tree.is_satisfied_by(&signers))
    };

    Ok(PolicyReport {
        rendered: tree.to_string(),
        depth: tree.depth(),
        tree,
        envelope,
        satisfied,
    })
}

pub fn handle_policy_command(cmd: &PolicyCmd) -> CliResult<()> {
    match cmd {
        PolicyCmd::Parse { expression, envelope, check } => {
            let report = policy_report(expression, *envelope, check)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
