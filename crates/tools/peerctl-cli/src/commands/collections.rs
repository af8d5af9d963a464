use crate::error::CliResult;
use clap::{Subcommand, ValueHint};
use peerctl_collections::compile_package;
use peerctl_types::{CollectionConfigPackage, CollectionDescriptor};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Commands for private-data collection configurations
#[derive(Subcommand, Debug, Clone)]
pub enum CollectionsCmd {
    /// Compile a JSON collection configuration into its binary package
    Compile {
        /// JSON collection configuration file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Write the binary package here instead of printing it as hex
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Decode a binary collection package and print it as JSON
    Inspect {
        /// Binary package produced by `collections compile --output`
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },
}

#[derive(Serialize, Debug)]
pub struct CollectionView {
    pub name: String,
    pub policy: String,
    pub required_peer_count: u32,
    pub maximum_peer_count: u32,
    pub block_to_live: u64,
    pub member_only_read: bool,
}

impl From<&CollectionDescriptor> for CollectionView {
    fn from(c: &CollectionDescriptor) -> Self {
        Self {
            name: c.name.clone(),
            policy: c.member_orgs_policy.to_string(),
            required_peer_count: c.required_peer_count,
            maximum_peer_count: c.maximum_peer_count,
            block_to_live: c.block_to_live,
            member_only_read: c.member_only_read,
        }
    }
}

pub fn compile_to(file: &Path, output: Option<&Path>) -> CliResult<CollectionConfigPackage> {
    let json = fs::read(file)?;
    let package = compile_package(&json)?;
    let bytes = package.to_bytes()?;
    match output {
        Some(out) => {
            fs::write(out, &bytes)?;
            log::info!("wrote {} bytes to {}", bytes.len(), out.display());
        }
        None => println!("{}", hex::encode(&bytes)),
    }
    Ok(package)
}

pub fn inspect(file: &Path) -> CliResult<Vec<CollectionView>> {
    let bytes = fs::read(file)?;
    let package = CollectionConfigPackage::from_bytes(&bytes)?;
    Ok(package.config.iter().map(CollectionView::from).collect())
}

pub fn handle_collections_command(cmd: &CollectionsCmd) -> CliResult<()> {
    match cmd {
        CollectionsCmd::Compile { file, output } => {
            let package = compile_to(file, output.as_deref())?;
            let names: Vec<&str> = package.config.iter().map(|c| c.name.as_str()).collect();
            eprintln!("Compiled {} collection(s): {}", names.len(), names.join(", "));
        }
        CollectionsCmd::Inspect { file } => {
            let views = inspect(file)?;
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use tempfile::tempdir;

    const CONFIG: &str = r#"[
        {"name": "foo", "policy": "OR('A.member', 'B.member')", "requiredPeerCount": 3, "maxPeerCount": 483279847, "blockToLive": 10},
        {"name": "bar", "policy": "AND('A.member', 'B.peer')", "memberOnlyRead": true}
    ]"#;

    #[test]
    fn compile_then_inspect() {
        let dir = tempdir().unwrap();
        let json = dir.path().join("collections.json");
        let out = dir.path().join("collections.bin");
        fs::write(&json, CONFIG).unwrap();

        let package = compile_to(&json, Some(&out)).unwrap();
        assert_eq!(package.config.len(), 2);

        let views = inspect(&out).unwrap();
        assert_eq!(views[0].name, "foo");
        assert_eq!(views[0].policy, "OR('A.member', 'B.member')");
        assert_eq!(views[0].maximum_peer_count, 483279847);
        assert_eq!(views[0].block_to_live, 10);
        assert_eq!(views[1].required_peer_count, 0);
        assert!(views[1].member_only_read);
    }

    #[test]
    fn inspect_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.bin");
        fs::write(&path, [0xffu8, 0x00, 0x01]).unwrap();
        assert!(matches!(inspect(&path), Err(CliError::Encoding(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = compile_to(&dir.path().join("nope.json"), None).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}
