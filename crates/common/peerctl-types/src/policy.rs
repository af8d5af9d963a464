use crate::codec::{from_dag_cbor, to_dag_cbor, EncodingError};
use crate::principal::IdentityPrincipal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Error types for building and converting threshold policies
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("threshold {n} exceeds the number of child rules ({children})")]
    ThresholdTooLarge { n: u32, children: usize },

    #[error("signed-by rule references identity index {index} but only {identities} identities are declared")]
    IdentityIndexOutOfRange { index: u32, identities: usize },

    #[error("unsupported signature policy envelope version {0}")]
    UnsupportedVersion(u32),
}

/// A threshold tree over identity principals.
///
/// Children are kept in the order they were written. Satisfaction does not
/// depend on that order, but signature evaluation walks children in it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum PolicyNode {
    Leaf(IdentityPrincipal),
    Threshold { n: u32, children: Vec<PolicyNode> },
}

impl PolicyNode {
    pub fn leaf(principal: IdentityPrincipal) -> Self {
        PolicyNode::Leaf(principal)
    }

    /// Builds a threshold node, refusing `n` larger than the child count.
    pub fn threshold(n: u32, children: Vec<PolicyNode>) -> Result<Self, PolicyError> {
        if n as usize > children.len() {
            return Err(PolicyError::ThresholdTooLarge { n, children: children.len() });
        }
        Ok(PolicyNode::Threshold { n, children })
    }

    /// Satisfied when any one child is.
    pub fn any_of(children: Vec<PolicyNode>) -> Self {
        PolicyNode::Threshold { n: 1.min(children.len() as u32), children }
    }

    /// Satisfied only when every child is.
    pub fn all_of(children: Vec<PolicyNode>) -> Self {
        PolicyNode::Threshold { n: children.len() as u32, children }
    }

    /// Leaves count as depth 0; each enclosing threshold adds one.
    pub fn depth(&self) -> usize {
        match self {
            PolicyNode::Leaf(_) => 0,
            PolicyNode::Threshold { children, .. } => {
                1 + children.iter().map(PolicyNode::depth).max().unwrap_or(0)
            }
        }
    }

    /// Principals referenced by the tree, in depth-first order, duplicates included.
    pub fn principals(&self) -> Vec<&IdentityPrincipal> {
        let mut out = Vec::new();
        self.collect_principals(&mut out);
        out
    }

    fn collect_principals<'a>(&'a self, out: &mut Vec<&'a IdentityPrincipal>) {
        match self {
            PolicyNode::Leaf(p) => out.push(p),
            PolicyNode::Threshold { children, .. } => {
                for child in children {
                    child.collect_principals(out);
                }
            }
        }
    }

    pub fn is_satisfied_by(&self, signers: &HashSet<IdentityPrincipal>) -> bool {
        match self {
            PolicyNode::Leaf(p) => signers.contains(p),
            PolicyNode::Threshold { n, children } => {
                let found = children.iter().filter(|c| c.is_satisfied_by(signers)).count();
                found >= *n as usize
            }
        }
    }

    /// Flattens the tree into the signed-by form carried inside deployment
    /// requests: principals are deduplicated in first-appearance order and
    /// leaves refer to them by index.
    pub fn to_envelope(&self) -> SignaturePolicyEnvelope {
        let mut identities: Vec<IdentityPrincipal> = Vec::new();
        let rule = self.to_signature_policy(&mut identities);
        SignaturePolicyEnvelope { version: 0, rule, identities }
    }

    fn to_signature_policy(&self, identities: &mut Vec<IdentityPrincipal>) -> SignaturePolicy {
        match self {
            PolicyNode::Leaf(p) => {
                let index = match identities.iter().position(|known| known == p) {
                    Some(i) => i,
                    None => {
                        identities.push(p.clone());
                        identities.len() - 1
                    }
                };
                SignaturePolicy::SignedBy(index as u32)
            }
            PolicyNode::Threshold { n, children } => SignaturePolicy::NOutOf {
                n: *n,
                rules: children.iter().map(|c| c.to_signature_policy(identities)).collect(),
            },
        }
    }
}

impl fmt::Display for PolicyNode {
    /// Renders the tree back into the expression language; `OR`/`AND` are
    /// used where the threshold matches, `OutOf` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyNode::Leaf(p) => write!(f, "'{}'", p),
            PolicyNode::Threshold { n, children } => {
                let count = children.len() as u32;
                if *n == 1 && count >= 1 {
                    write!(f, "OR(")?;
                } else if *n == count && count >= 1 {
                    write!(f, "AND(")?;
                } else {
                    write!(f, "OutOf({}", n)?;
                    if !children.is_empty() {
                        write!(f, ", ")?;
                    }
                }
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum SignaturePolicy {
    SignedBy(u32),
    NOutOf { n: u32, rules: Vec<SignaturePolicy> },
}

/// Indexed form of a [`PolicyNode`], as embedded in chaincode deployment requests.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SignaturePolicyEnvelope {
    pub version: u32,
    pub rule: SignaturePolicy,
    pub identities: Vec<IdentityPrincipal>,
}

impl SignaturePolicyEnvelope {
    pub fn to_policy_node(&self) -> Result<PolicyNode, PolicyError> {
        if self.version != 0 {
            return Err(PolicyError::UnsupportedVersion(self.version));
        }
        self.expand(&self.rule)
    }

    fn expand(&self, rule: &SignaturePolicy) -> Result<PolicyNode, PolicyError> {
        match rule {
            SignaturePolicy::SignedBy(index) => self
                .identities
                .get(*index as usize)
                .cloned()
                .map(PolicyNode::Leaf)
                .ok_or(PolicyError::IdentityIndexOutOfRange {
                    index: *index,
                    identities: self.identities.len(),
                }),
            SignaturePolicy::NOutOf { n, rules } => {
                let children = rules
                    .iter()
                    .map(|r| self.expand(r))
                    .collect::<Result<Vec<_>, _>>()?;
                PolicyNode::threshold(*n, children)
            }
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodingError> {
        to_dag_cbor(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EncodingError> {
        from_dag_cbor(bytes)
    }
}
