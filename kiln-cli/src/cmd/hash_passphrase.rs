use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use kiln_server::passphrase;

pub fn make_subcommand() -> Command {
    Command::new("hash-passphrase")
        .about("Print the passphrase_sha256 value for a secret-area user")
        .arg(
            Arg::new("identifier")
                .long("identifier")
                .short('i')
                .value_name("NAME")
                .required(true)
                .help("User identifier"),
        )
        .arg(
            Arg::new("words")
                .value_name("WORD")
                .num_args(3)
                .required(true)
                .help("The three passphrase words"),
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let config = super::init(args)?;
    let master = config
        .secret
        .master_password
        .as_deref()
        .filter(|master| !master.is_empty())
        .context(
            "secret.master_password must be set (kiln.toml or KILN__SECRET__MASTER_PASSWORD)",
        )?;

    let identifier = args
        .get_one::<String>("identifier")
        .context("missing --identifier")?;
    let words: Vec<&str> = args
        .get_many::<String>("words")
        .context("missing words")?
        .map(String::as_str)
        .collect();
    let [w1, w2, w3] = words[..] else {
        anyhow::bail!("exactly three words are required");
    };

    println!("{}", passphrase::digest(master, identifier, [w1, w2, w3]));
    Ok(())
}
