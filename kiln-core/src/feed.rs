//! RSS 2.0 feeds, one per kind and one across every kind.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rss::validation::Validate;
use rss::{CategoryBuilder, Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use thiserror::Error;
use tracing::debug;

use crate::config::SiteConfig;
use crate::entry::{Entry, EntryKind};

const CONTENT_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/content/";
const GENERATOR: &str = concat!("kiln ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("rss validation failed: {0}")]
    Invalid(#[from] rss::validation::ValidationError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Feed for a single kind, served at `/{plural}/rss.xml`.
pub fn kind_feed(
    kind: EntryKind,
    entries: &[Entry],
    site: &SiteConfig,
) -> Result<Channel, FeedError> {
    let title = format!("{} | {}", site.title, capitalize(kind.plural()));
    let link = format!("{}/{}", site.origin(), kind.plural());
    build_channel(&title, &link, site, entries.iter().filter(|e| e.kind == kind))
}

/// Feed across every kind, served at `/rss.xml`.
pub fn merged_feed<'a, I>(entries: I, site: &SiteConfig) -> Result<Channel, FeedError>
where
    I: IntoIterator<Item = &'a Entry>,
{
    build_channel(&site.title, site.origin(), site, entries)
}

pub fn write_feed(channel: &Channel, path: &Path) -> Result<(), FeedError> {
    let io_err = |source| FeedError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, channel.to_string()).map_err(io_err)?;

    debug!(path = %path.display(), items = channel.items().len(), "wrote feed");
    Ok(())
}

fn build_channel<'a, I>(
    title: &str,
    link: &str,
    site: &SiteConfig,
    entries: I,
) -> Result<Channel, FeedError>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut entries: Vec<&Entry> = entries.into_iter().collect();
    entries.sort_by(|a, b| b.published.cmp(&a.published));

    let items: Vec<Item> = entries.into_iter().map(entry_to_item).collect();

    let mut namespaces = BTreeMap::new();
    namespaces.insert("content".to_string(), CONTENT_NAMESPACE.to_string());

    let channel = ChannelBuilder::default()
        .title(title)
        .link(link)
        .description(&site.description)
        .language(site.language.clone())
        .generator(GENERATOR.to_string())
        .namespaces(namespaces)
        .items(items)
        .build();

    channel.validate()?;
    Ok(channel)
}

fn entry_to_item(entry: &Entry) -> Item {
    let categories = entry
        .tags
        .iter()
        .map(|tag| CategoryBuilder::default().name(tag.title.clone()).build())
        .collect::<Vec<_>>();

    ItemBuilder::default()
        .title(entry.title.clone())
        .link(Some(entry.full_path.clone()))
        .guid(
            GuidBuilder::default()
                .permalink(true)
                .value(entry.full_path.clone())
                .build(),
        )
        .description(entry.description.clone())
        .pub_date(entry.published.to_rfc2822())
        .categories(categories)
        .content(entry.kind.has_body().then(|| entry.html.clone()))
        .build()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
