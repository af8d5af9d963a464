use crate::codec::{from_dag_cbor, to_dag_cbor, EncodingError};
use crate::policy::PolicyNode;
use serde::{Deserialize, Serialize};

/// A private-data collection together with the policy gating its members
/// and the dissemination requirements for its data.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CollectionDescriptor {
    pub name: String,
    pub member_orgs_policy: PolicyNode,
    pub required_peer_count: u32,
    /// Not checked against `required_peer_count`.
    pub maximum_peer_count: u32,
    pub block_to_live: u64,
    pub member_only_read: bool,
}

/// Ordered set of collection descriptors embedded in a chaincode deployment request.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectionConfigPackage {
    pub config: Vec<CollectionDescriptor>,
}

impl CollectionConfigPackage {
    pub fn new(config: Vec<CollectionDescriptor>) -> Self {
        Self { config }
    }

    pub fn get(&self, name: &str) -> Option<&CollectionDescriptor> {
        self.config.iter().find(|c| c.name == name)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodingError> {
        to_dag_cbor(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EncodingError> {
        from_dag_cbor(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principal::{IdentityPrincipal, Role};

    fn descriptor(name: &str) -> CollectionDescriptor {
        CollectionDescriptor {
            name: name.to_string(),
            member_orgs_policy: PolicyNode::any_of(vec![
                PolicyNode::leaf(IdentityPrincipal::new("Org1MSP", Role::Member)),
                PolicyNode::leaf(IdentityPrincipal::new("Org2MSP", Role::Member)),
            ]),
            required_peer_count: 1,
            maximum_peer_count: 3,
            block_to_live: 1_000_000,
            member_only_read: true,
        }
    }

    #[test]
    fn package_survives_the_wire_in_order() {
        let package = CollectionConfigPackage::new(vec![descriptor("marbles"), descriptor("prices")]);
        let bytes = package.to_bytes().unwrap();
        let decoded = CollectionConfigPackage::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, package);
        assert_eq!(decoded.config[1].name, "prices");
        assert_eq!(decoded.get("marbles").map(|c| c.block_to_live), Some(1_000_000));
    }

    #[test]
    fn garbage_does_not_decode() {
        assert!(matches!(
            CollectionConfigPackage::from_bytes(b"barf"),
            Err(EncodingError::Decode(_))
        ));
    }
}
