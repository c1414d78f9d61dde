use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::date::{DateValue, normalize_date};
use crate::frontmatter::{Link, RawRecord};
use crate::slug::slug;
use crate::tag::{Tag, resolve_tag};
use crate::toc::{TocNode, nest};
use crate::validate::{ValidationError, validate_record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    Post,
    Project,
    Uses,
    StackEntry,
    Shareable,
    Bookmark,
}

impl EntryKind {
    pub const ALL: [EntryKind; 6] = [
        EntryKind::Post,
        EntryKind::Project,
        EntryKind::Uses,
        EntryKind::StackEntry,
        EntryKind::Shareable,
        EntryKind::Bookmark,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Post => "post",
            EntryKind::Project => "project",
            EntryKind::Uses => "uses",
            EntryKind::StackEntry => "stack-entry",
            EntryKind::Shareable => "shareable",
            EntryKind::Bookmark => "bookmark",
        }
    }

    /// Path segment and content directory name for this kind.
    pub fn plural(self) -> &'static str {
        match self {
            EntryKind::Post => "posts",
            EntryKind::Project => "projects",
            EntryKind::Uses => "uses",
            EntryKind::StackEntry => "stack",
            EntryKind::Shareable => "shareables",
            EntryKind::Bookmark => "bookmarks",
        }
    }

    /// Status values entries of this kind may carry. Empty for kinds
    /// without a status.
    pub fn statuses(self) -> &'static [Status] {
        match self {
            EntryKind::Project | EntryKind::Uses | EntryKind::Bookmark => &Status::ALL,
            _ => &[],
        }
    }

    /// Whether the rendered body is worth shipping in feeds.
    pub fn has_body(self) -> bool {
        matches!(self, EntryKind::Post | EntryKind::Project)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s || kind.plural() == s)
            .ok_or_else(|| UnknownValue(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Inactive,
    Archived,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Active, Status::Inactive, Status::Archived];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
            Status::Archived => "archived",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownValue(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value `{0}`")]
pub struct UnknownValue(pub String);

/// One piece of site content, whatever its kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub tags: Vec<Tag>,
    pub published: DateValue,
    pub updated: DateValue,
    pub relative_path: String,
    pub full_path: String,
    pub image: String,
    pub status: Option<Status>,
    pub url: String,
    pub discussion: Option<String>,
    pub open_source: bool,
    pub links: Vec<Link>,
    pub prio: i64,
    pub html: String,
    pub toc: Vec<TocNode>,
}

impl Entry {
    /// Validate `record` for `kind` and map it to an entry. `origin` is the
    /// absolute site URL used for `full_path`.
    pub fn from_record(
        kind: EntryKind,
        record: &RawRecord,
        origin: &str,
    ) -> Result<Self, ValidationError> {
        let issues = validate_record(kind, record);
        if !issues.is_empty() {
            return Err(ValidationError::new(issues));
        }

        let fm = &record.frontmatter;
        let title = fm.title.clone().unwrap_or_default().trim().to_string();
        let slug = slug(&title);
        let relative_path = format!("/{}/{}", kind.plural(), slug);
        let full_path = format!("{}{}", origin.trim_end_matches('/'), relative_path);

        let published = normalize_date(fm.published.as_deref().unwrap_or_default());
        let updated = fm
            .updated
            .as_deref()
            .map(normalize_date)
            .unwrap_or_else(|| published.clone());

        let status = match fm.status.as_deref() {
            Some(raw) => raw.parse().ok(),
            None if !kind.statuses().is_empty() => Some(Status::Active),
            None => None,
        };

        let is_project = kind == EntryKind::Project;

        Ok(Self {
            kind,
            description: fm.description.clone().unwrap_or_default().trim().to_string(),
            tags: fm
                .tags
                .iter()
                .flatten()
                .map(|token| resolve_tag(token, kind))
                .collect(),
            published,
            updated,
            relative_path,
            full_path,
            image: fm.image.clone().unwrap_or_default(),
            status,
            url: fm.url.clone().unwrap_or_default(),
            discussion: fm.discussion.clone(),
            open_source: fm.open_source.unwrap_or(false),
            links: if is_project {
                fm.links.clone().unwrap_or_default()
            } else {
                Vec::new()
            },
            prio: if is_project { fm.prio.unwrap_or(0) } else { 0 },
            html: record.body.html.clone(),
            toc: nest(&record.body.headings),
            title,
            slug,
        })
    }

    pub fn has_tag(&self, tag_slug: &str) -> bool {
        self.tags.iter().any(|tag| tag.slug == tag_slug)
    }
}
