use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use kiln_server::{AppState, Server, ServerConfig};
use tracing::{info, warn};

use super::build::{add_build_args, build_site};

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("serve"))
        .about("Build the site, then serve it together with the JSON API")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to serve on [default: 3000]"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host to bind to [default: 127.0.0.1]"),
        )
        .arg(
            Arg::new("open")
                .long("open")
                .help("Open browser automatically")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("watch")
                .short('w')
                .long("watch")
                .help("Rebuild when content changes")
                .action(ArgAction::SetTrue),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    let config = super::init(args)?;
    let (library, report) = build_site(&config)?;
    info!(pages = report.pages, feeds = report.feeds, "initial build done");

    if config.secret.master_password.is_none() {
        warn!("secret.master_password is not set; every login will fail");
    }

    let build = &config.build;
    let server_config = ServerConfig {
        host: build.host.clone(),
        port: build.port,
        root: PathBuf::from(&build.output),
        source: PathBuf::from(&build.source),
        open: build.open,
        watch: build.watch,
    };

    let state = AppState::new(config.secret.clone(), library);
    let rebuild_config = config.clone();

    Server::new(server_config, state)
        .on_change(Arc::new(move || {
            build_site(&rebuild_config).map(|(library, _)| library)
        }))
        .run()
        .await?;

    Ok(())
}
