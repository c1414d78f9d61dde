use anyhow::{Result, bail};
use clap::{Arg, ArgMatches, Command};
use kiln_core::{ContentError, EntryKind, Library};
use tracing::info;

pub fn make_subcommand() -> Command {
    Command::new("validate")
        .about("Check every content file without writing anything")
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("DIR")
                .help("Content directory, one subdirectory per kind [default: ./content]"),
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let config = super::init(args)?;

    match Library::load(&config.build.source, &config.site) {
        Ok(library) => {
            for kind in EntryKind::ALL {
                let count = library.entries(kind).len();
                if count > 0 {
                    info!(kind = %kind, entries = count, "ok");
                }
            }
            info!(
                entries = library.len(),
                secrets = library.secrets().len(),
                "all content is valid"
            );
            Ok(())
        }
        Err(ContentError::Invalid(issues)) => {
            for issue in &issues {
                eprintln!("{issue}");
            }
            bail!("{} content problem(s) found", issues.len())
        }
        Err(err) => Err(err.into()),
    }
}
