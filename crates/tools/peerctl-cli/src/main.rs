use clap::Parser;
use colored::Colorize;
use peerctl_cli::{init_logging, run, Cli};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global_opts.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
