//! peerctl: validates chaincode commands, endorsement policies and
//! collection configurations before anything is sent to a peer.

pub mod chaincode;
pub mod cli;
pub mod commands;
pub mod context;
pub mod error;

pub use cli::{Cli, Commands, GlobalOpts};
pub use context::CliContext;
pub use error::{CliError, CliResult};

/// Main library entry point.
pub fn run(cli: Cli) -> CliResult<()> {
    let ctx = CliContext::new(cli.global_opts.config.as_deref())?;

    match &cli.command {
        Commands::Chaincode(cmd) => commands::handle_chaincode_command(&ctx, cmd)?,
        Commands::Policy(cmd) => commands::handle_policy_command(cmd)?,
        Commands::Collections(cmd) => commands::handle_collections_command(cmd)?,
    }

    Ok(())
}

/// Sets up env_logger. `RUST_LOG` still wins over the verbosity count.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .format_timestamp(None)
        .try_init();
}
