use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use kiln_core::{BuildReport, Library, SiteBuilder};
use tracing::info;

use crate::config::KilnConfig;

pub fn add_build_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("DIR")
                .help("Content directory, one subdirectory per kind [default: ./content]"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for generated site [default: ./out]"),
        )
        .arg(
            Arg::new("theme")
                .short('t')
                .long("theme")
                .value_name("DIR")
                .help("Theme directory [default: ./theme]"),
        )
        .arg(
            Arg::new("origin")
                .long("origin")
                .value_name("URL")
                .help("Absolute site URL used in links and feeds"),
        )
}

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("build")).about("Build the static site from content files")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let config = super::init(args)?;
    let (_, report) = build_site(&config)?;

    info!(
        output = %config.build.output,
        pages = report.pages,
        feeds = report.feeds,
        "site built"
    );

    Ok(())
}

/// Scan, validate and render everything `config` points at.
pub fn build_site(config: &KilnConfig) -> Result<(Library, BuildReport)> {
    let site = SiteBuilder::new()
        .source_dir(&config.build.source)
        .output_dir(&config.build.output)
        .theme_dir(&config.build.theme)
        .site_config(config.site.clone())
        .build()?;

    let report = site.render_all()?;
    Ok((site.library().clone(), report))
}
