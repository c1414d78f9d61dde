use anyhow::Result;
use clap::ArgMatches;

use crate::config::KilnConfig;
use crate::telemetry;

pub mod build;
pub mod hash_passphrase;
pub mod serve;
pub mod validate;

/// Load layered configuration and install logging for a subcommand.
fn init(args: &ArgMatches) -> Result<KilnConfig> {
    let config = KilnConfig::load(args)?;
    telemetry::init(&config.logging)?;
    Ok(config)
}
