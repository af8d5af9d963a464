use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Role an identity holds inside its organization.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
    Peer,
    Client,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Member, Role::Admin, Role::Peer, Role::Client];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
            Role::Peer => "peer",
            Role::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrincipalError {
    #[error("unknown role '{0}', expected one of member, admin, peer, client")]
    UnknownRole(String),
    #[error("principal '{0}' is not of the form <org>.<role>")]
    Malformed(String),
    #[error("principal '{0}' has an invalid organization identifier")]
    InvalidOrg(String),
}

impl FromStr for Role {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| PrincipalError::UnknownRole(s.to_string()))
    }
}

/// A reference to a role within an organization, e.g. `Org1MSP.admin`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityPrincipal {
    pub org_id: String,
    pub role: Role,
}

impl IdentityPrincipal {
    pub fn new(org_id: impl Into<String>, role: Role) -> Self {
        Self { org_id: org_id.into(), role }
    }
}

/// Organization identifiers are restricted to ASCII alphanumerics plus `.`, `-` and `_`.
pub fn is_valid_org_id(org_id: &str) -> bool {
    !org_id.is_empty()
        && org_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

impl FromStr for IdentityPrincipal {
    type Err = PrincipalError;

    /// Splits on the last `.` so that dotted organization ids such as
    /// `org1.example.com.member` keep their full name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (org_id, role) = s
            .rsplit_once('.')
            .ok_or_else(|| PrincipalError::Malformed(s.to_string()))?;
        if !is_valid_org_id(org_id) {
            return Err(PrincipalError::InvalidOrg(s.to_string()));
        }
        Ok(Self::new(org_id, role.parse()?))
    }
}

impl fmt::Display for IdentityPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.org_id, self.role)
    }
}
