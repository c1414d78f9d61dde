use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::Context;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::SiteConfig;
use crate::entry::{Entry, EntryKind};
use crate::feed::{self, FeedError};
use crate::scanner::{ContentError, Library};
use crate::template::{TemplateError, TemplateRenderer};
use crate::view::{ViewError, ViewQuery};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Source directory not specified")]
    MissingSourceDir,
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error(transparent)]
    View(#[from] ViewError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
pub struct NavItem {
    pub text: String,
    pub link: String,
}

/// What a build produced.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub pages: usize,
    pub feeds: usize,
    pub indexes: usize,
}

pub struct SiteBuilder {
    source_dir: Option<PathBuf>,
    output_dir: PathBuf,
    theme_dir: PathBuf,
    site: SiteConfig,
    library: Option<Library>,
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteBuilder {
    pub fn new() -> Self {
        Self {
            source_dir: None,
            output_dir: PathBuf::from("./out"),
            theme_dir: PathBuf::from("./theme"),
            site: SiteConfig::default(),
            library: None,
        }
    }

    pub fn source_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn theme_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.theme_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn site_config(mut self, config: SiteConfig) -> Self {
        self.site = config;
        self
    }

    /// Use an already loaded library instead of scanning `source_dir`.
    pub fn library(mut self, library: Library) -> Self {
        self.library = Some(library);
        self
    }

    pub fn build(self) -> Result<Site, BuildError> {
        let library = match self.library {
            Some(library) => library,
            None => {
                let source_dir = self.source_dir.ok_or(BuildError::MissingSourceDir)?;
                Library::load(&source_dir, &self.site)?
            }
        };

        let mut renderer = TemplateRenderer::new(&self.theme_dir)?;

        let navigation: Vec<NavItem> = EntryKind::ALL
            .into_iter()
            .filter(|kind| !library.entries(*kind).is_empty())
            .map(|kind| NavItem {
                text: kind.plural().to_string(),
                link: format!("/{}/", kind.plural()),
            })
            .collect();

        renderer.set_global("site", &self.site);
        renderer.set_global("navigation", &navigation);

        Ok(Site {
            library,
            renderer,
            output_dir: self.output_dir,
            site: self.site,
        })
    }
}

pub struct Site {
    library: Library,
    renderer: TemplateRenderer,
    output_dir: PathBuf,
    site: SiteConfig,
}

impl Site {
    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Write every page, feed and JSON index below the output directory.
    pub fn render_all(&self) -> Result<BuildReport, BuildError> {
        create_dir(&self.output_dir)?;
        let mut report = BuildReport::default();

        for kind in EntryKind::ALL {
            let entries = self.library.entries(kind);
            if entries.is_empty() {
                debug!(kind = %kind, "no entries; skipping");
                continue;
            }
            self.render_kind(kind, entries, &mut report)?;
        }

        let merged = feed::merged_feed(self.library.all(), &self.site)?;
        feed::write_feed(&merged, &self.output_dir.join("rss.xml"))?;
        report.feeds += 1;

        if self.renderer.has_template("index.html") {
            let recent = crate::view::view(
                &self.library.all().cloned().collect::<Vec<_>>(),
                &ViewQuery::default(),
            )?;
            let mut context = Context::new();
            context.insert("entries", &recent);
            self.renderer
                .render_to_file("index.html", &context, &self.output_dir.join("index.html"))?;
            report.pages += 1;
        }

        info!(
            output = %self.output_dir.display(),
            pages = report.pages,
            feeds = report.feeds,
            indexes = report.indexes,
            "site written"
        );
        Ok(report)
    }

    fn render_kind(
        &self,
        kind: EntryKind,
        entries: &[Entry],
        report: &mut BuildReport,
    ) -> Result<(), BuildError> {
        let kind_dir = self.output_dir.join(kind.plural());
        let store = self.library.store(kind);
        let default_view = store.view()?;

        for entry in entries {
            let mut context = Context::new();
            context.insert("kind", kind.plural());
            context.insert("entry", entry);
            self.renderer.render_to_file(
                "entry.html",
                &context,
                &kind_dir.join(&entry.slug).join("index.html"),
            )?;
            report.pages += 1;
        }

        let mut context = Context::new();
        context.insert("kind", kind.plural());
        context.insert("entries", &default_view);
        context.insert("tags", store.tags());
        self.renderer
            .render_to_file("list.html", &context, &kind_dir.join("index.html"))?;
        report.pages += 1;

        for tag in store.tags() {
            let tagged = crate::view::view(entries, &ViewQuery::default().with_tag(&tag.slug))?;
            let mut context = Context::new();
            context.insert("kind", kind.plural());
            context.insert("entries", &tagged);
            context.insert("tags", store.tags());
            context.insert("tag", tag);
            self.renderer.render_to_file(
                "list.html",
                &context,
                &kind_dir.join("tags").join(&tag.slug).join("index.html"),
            )?;
            report.pages += 1;
        }

        let channel = feed::kind_feed(kind, entries, &self.site)?;
        feed::write_feed(&channel, &kind_dir.join("rss.xml"))?;
        report.feeds += 1;

        let json_path = kind_dir.join("index.json");
        let json = serde_json::to_string_pretty(&default_view)?;
        std::fs::write(&json_path, json).map_err(|source| BuildError::Io {
            path: json_path.clone(),
            source,
        })?;
        report.indexes += 1;

        debug!(kind = %kind, entries = entries.len(), tags = store.tags().len(), "rendered kind");
        Ok(())
    }
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    std::fs::create_dir_all(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}
