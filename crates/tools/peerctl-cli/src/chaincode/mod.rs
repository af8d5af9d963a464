//! Validation of everything a chaincode command needs before a request is built.

pub mod connection;
pub mod invocation;
pub mod params;

use connection::{ClientRequirements, CommandKind};
use serde::Serialize;
use std::fmt;

pub use connection::{plan_clients, ClientPlan, ConnectionError, ConnectionParameters};
pub use invocation::{InvocationError, InvocationSpec};
pub use params::{check_chaincode_params, ChaincodeParams, CheckedChaincode, ParamError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChaincodeCommand {
    Install,
    Instantiate,
    Upgrade,
    Invoke,
    Query,
}

impl ChaincodeCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ChaincodeCommand::Install => "install",
            ChaincodeCommand::Instantiate => "instantiate",
            ChaincodeCommand::Upgrade => "upgrade",
            ChaincodeCommand::Invoke => "invoke",
            ChaincodeCommand::Query => "query",
        }
    }

    /// Only invoke may collect endorsements from several peers.
    pub fn kind(&self) -> CommandKind {
        match self {
            ChaincodeCommand::Invoke => CommandKind::MultiTarget,
            _ => CommandKind::SingleTarget,
        }
    }

    pub fn is_deployment(&self) -> bool {
        matches!(self, ChaincodeCommand::Instantiate | ChaincodeCommand::Upgrade)
    }

    pub fn requires_version(&self) -> bool {
        matches!(
            self,
            ChaincodeCommand::Install | ChaincodeCommand::Instantiate | ChaincodeCommand::Upgrade
        )
    }

    pub fn requires_path(&self) -> bool {
        matches!(self, ChaincodeCommand::Install)
    }

    pub fn requires_ctor(&self) -> bool {
        !matches!(self, ChaincodeCommand::Install)
    }

    pub fn client_requirements(&self) -> ClientRequirements {
        ClientRequirements {
            endorser: true,
            orderer: matches!(
                self,
                ChaincodeCommand::Instantiate | ChaincodeCommand::Upgrade | ChaincodeCommand::Invoke
            ),
        }
    }
}

impl fmt::Display for ChaincodeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
