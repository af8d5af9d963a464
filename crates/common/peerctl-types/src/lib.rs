//! peerctl-types
//! Data structures shared across the peerctl workspace: identity principals,
//! threshold policies and the collection configuration wire format.

pub mod codec;
pub mod collection;
pub mod policy;
pub mod principal;

pub use codec::EncodingError;
pub use collection::{CollectionConfigPackage, CollectionDescriptor};
pub use policy::{PolicyError, PolicyNode, SignaturePolicy, SignaturePolicyEnvelope};
pub use principal::{is_valid_org_id, IdentityPrincipal, PrincipalError, Role};
