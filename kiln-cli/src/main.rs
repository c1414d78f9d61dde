use anyhow::Result;
use clap::{Arg, Command};

mod cmd;
mod config;
mod telemetry;

fn cli() -> Command {
    Command::new("kiln")
        .about("Static site generator for a personal content library")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("Configuration file [default: ./kiln.toml]"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("FILTER")
                .global(true)
                .help("Log filter such as `info` or `kiln_core=debug`; RUST_LOG wins"),
        )
        .subcommand(cmd::build::make_subcommand())
        .subcommand(cmd::serve::make_subcommand())
        .subcommand(cmd::validate::make_subcommand())
        .subcommand(cmd::hash_passphrase::make_subcommand())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("build", args)) => cmd::build::execute(args),
        Some(("serve", args)) => cmd::serve::execute(args).await,
        Some(("validate", args)) => cmd::validate::execute(args),
        Some(("hash-passphrase", args)) => cmd::hash_passphrase::execute(args),
        _ => unreachable!("clap requires a subcommand"),
    }
}
