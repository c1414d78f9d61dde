use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::entry::{Entry, EntryKind};
use crate::frontmatter::{FrontmatterError, RawRecord};
use crate::secret::SecretDocument;
use crate::store::EntryStore;
use crate::validate::{ValidationIssue, duplicate_slugs, render_issues};

const SECRET_DIR: &str = "secret";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{} content problem(s):\n{}", .0.len(), render_issues(.0))]
    Invalid(Vec<ValidationIssue>),
    #[error(transparent)]
    Parse(#[from] FrontmatterError),
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

/// Every entry of every kind, plus the secret documents, loaded from one
/// content directory.
#[derive(Debug, Clone, Default)]
pub struct Library {
    entries: BTreeMap<EntryKind, Vec<Entry>>,
    secrets: Vec<SecretDocument>,
}

impl Library {
    pub fn load<P: AsRef<Path>>(source: P, site: &SiteConfig) -> Result<Self, ContentError> {
        ContentScanner::new(source, site).scan()
    }

    pub fn entries(&self, kind: EntryKind) -> &[Entry] {
        self.entries.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// All entries, kind by kind.
    pub fn all(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values().flatten()
    }

    pub fn secrets(&self) -> &[SecretDocument] {
        &self.secrets
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A freshly seeded store for `kind`.
    pub fn store(&self, kind: EntryKind) -> EntryStore {
        let mut store = EntryStore::new(kind);
        store.init(self.entries(kind).to_vec());
        store
    }
}

pub struct ContentScanner {
    source_dir: PathBuf,
    origin: String,
}

impl ContentScanner {
    pub fn new<P: AsRef<Path>>(path: P, site: &SiteConfig) -> Self {
        Self {
            source_dir: path.as_ref().to_path_buf(),
            origin: site.origin().to_string(),
        }
    }

    /// Parse, validate and map every content file. Validation problems
    /// from all files are gathered before failing.
    pub fn scan(&self) -> Result<Library, ContentError> {
        info!(source = %self.source_dir.display(), "scanning content");

        let mut library = Library::default();
        let mut issues = Vec::new();

        for kind in EntryKind::ALL {
            let mut mapped: Vec<(PathBuf, Entry)> = Vec::new();
            let mut drafts = 0;

            for path in self.markdown_files(&self.source_dir.join(kind.plural()))? {
                let record = RawRecord::read(&path)?;
                match Entry::from_record(kind, &record, &self.origin) {
                    Ok(_) if record.frontmatter.draft => drafts += 1,
                    Ok(entry) => mapped.push((path, entry)),
                    Err(err) => issues.extend(err.into_issues()),
                }
            }

            issues.extend(duplicate_slugs(mapped.iter().map(|(path, entry)| (path, entry))));

            debug!(kind = %kind, entries = mapped.len(), drafts, "scanned kind");
            if !mapped.is_empty() {
                library
                    .entries
                    .insert(kind, mapped.into_iter().map(|(_, entry)| entry).collect());
            }
        }

        for path in self.markdown_files(&self.source_dir.join(SECRET_DIR))? {
            let record = RawRecord::read(&path)?;
            match SecretDocument::from_record(&record) {
                Ok(_) if record.frontmatter.draft => {}
                Ok(doc) => library.secrets.push(doc),
                Err(err) => issues.extend(err.into_issues()),
            }
        }

        if !issues.is_empty() {
            for issue in &issues {
                warn!(path = %issue.path.display(), field = %issue.field, "{}", issue.problem);
            }
            return Err(ContentError::Invalid(issues));
        }

        info!(
            entries = library.len(),
            secrets = library.secrets.len(),
            "content loaded"
        );
        Ok(library)
    }

    /// Markdown files below `dir`, sorted by path. A missing directory has
    /// no files.
    fn markdown_files(&self, dir: &Path) -> Result<Vec<PathBuf>, ContentError> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|source| ContentError::Walk {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
                paths.push(path.to_path_buf());
            }
        }

        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::Problem;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn post(title: &str, published: &str) -> String {
        format!(
            "---\ntitle: {title}\ndescription: d\npublished: {published}\ntags: [rust]\nimage: /c.png\n---\nHi\n"
        )
    }

    fn site() -> SiteConfig {
        SiteConfig {
            origin: "https://example.com".into(),
            ..Default::default()
        }
    }

    #[test]
    fn loads_entries_per_kind() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "posts/one.md", &post("One", "2024-01-01"));
        write(dir.path(), "posts/2024/two.md", &post("Two", "2024-02-01"));
        write(
            dir.path(),
            "bookmarks/link.md",
            "---\ntitle: Link\ndescription: d\npublished: 2024-01-01\ntags: []\nurl: https://example.org\n---\n",
        );
        write(dir.path(), "posts/notes.txt", "ignored");

        let library = Library::load(dir.path(), &site()).unwrap();
        assert_eq!(library.entries(EntryKind::Post).len(), 2);
        assert_eq!(library.entries(EntryKind::Bookmark).len(), 1);
        assert!(library.entries(EntryKind::Uses).is_empty());
        assert_eq!(library.len(), 3);
        assert_eq!(
            library.entries(EntryKind::Post)[0].full_path,
            "https://example.com/posts/two"
        );
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::load(dir.path().join("nope"), &site()).unwrap();
        assert!(library.is_empty());
    }

    #[test]
    fn collects_issues_from_every_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "posts/a.md", "---\ntitle: A\n---\n");
        write(dir.path(), "uses/b.md", &post("B", "yesterday"));

        let Err(ContentError::Invalid(issues)) = Library::load(dir.path(), &site()) else {
            panic!("expected validation failure");
        };
        assert!(issues.iter().any(|i| i.path.ends_with("posts/a.md") && i.field == "image"));
        assert!(issues.iter().any(|i| i.path.ends_with("uses/b.md") && i.field == "url"));
        assert!(issues.iter().any(|i| i.problem == Problem::InvalidDate("yesterday".into())));
    }

    #[test]
    fn duplicate_slugs_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "posts/a.md", &post("Same Title", "2024-01-01"));
        write(dir.path(), "posts/b.md", &post("Same title!", "2024-01-02"));

        let Err(ContentError::Invalid(issues)) = Library::load(dir.path(), &site()) else {
            panic!("expected duplicate slug");
        };
        assert_eq!(issues.len(), 1);
        assert!(issues[0].path.ends_with("posts/b.md"));
        assert_eq!(issues[0].problem, Problem::DuplicateSlug("same-title".into()));
    }

    #[test]
    fn drafts_are_left_out() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "posts/a.md", &post("Live", "2024-01-01"));
        write(
            dir.path(),
            "posts/b.md",
            &post("Live", "2024-01-02").replace("---\nHi", "draft: true\n---\nHi"),
        );

        let library = Library::load(dir.path(), &site()).unwrap();
        assert_eq!(library.entries(EntryKind::Post).len(), 1);
    }

    #[test]
    fn loads_secret_documents() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "secret/plans.md", "---\ntitle: Plans\naudience: [alice]\n---\nShh\n");

        let library = Library::load(dir.path(), &site()).unwrap();
        assert_eq!(library.secrets().len(), 1);
        assert_eq!(library.secrets()[0].slug, "plans");
        assert!(library.is_empty());
    }

    #[test]
    fn store_is_seeded_from_the_library() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "posts/one.md", &post("One", "2024-01-01"));

        let library = Library::load(dir.path(), &site()).unwrap();
        let store = library.store(EntryKind::Post);
        assert_eq!(store.view().unwrap().len(), 1);
        assert_eq!(store.tags()[0].slug, "rust");
    }
}
