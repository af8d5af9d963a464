pub mod chaincode;
pub mod collections;
pub mod policy;

pub use chaincode::handle_chaincode_command;
pub use collections::handle_collections_command;
pub use policy::handle_policy_command;
