use crate::commands::{chaincode::ChaincodeCmd, collections::CollectionsCmd, policy::PolicyCmd};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(name = "peerctl", author, version, about = "Validate and shape chaincode requests for ledger peers", long_about = None)]
pub struct Cli {
    #[clap(flatten)]
    pub global_opts: GlobalOpts,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Parser, Debug)]
pub struct GlobalOpts {
    /// Increase log output (-v is taken by --version on chaincode commands)
    #[clap(long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to ~/.peerctl/peerctl.toml)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Validate chaincode operations and print the request they produce
    #[clap(subcommand)]
    Chaincode(ChaincodeCmd),

    /// Work with signature policy expressions
    #[clap(subcommand)]
    Policy(PolicyCmd),

    /// Compile and inspect private-data collection configurations
    #[clap(subcommand)]
    Collections(CollectionsCmd),
}
