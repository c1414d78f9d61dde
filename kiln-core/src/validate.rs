//! One validation contract for every content kind.
//!
//! Records are checked before mapping so that a missing title or a broken
//! date is reported with its file and field instead of turning into an
//! empty value somewhere downstream.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::date;
use crate::entry::{Entry, EntryKind, Status};
use crate::frontmatter::{Frontmatter, RawRecord};

const BASE_REQUIRED: &[&str] = &["title", "description", "published", "tags"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    Missing,
    InvalidDate(String),
    InvalidUrl(String),
    UnknownStatus(String),
    DuplicateSlug(String),
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Missing => write!(f, "is required"),
            Problem::InvalidDate(v) => write!(
                f,
                "`{v}` is not YYYY-MM-DD, YYYY-MM-DD HH:MM or an ISO-8601 datetime"
            ),
            Problem::InvalidUrl(v) => write!(f, "`{v}` is not an absolute URL"),
            Problem::UnknownStatus(v) => write!(f, "`{v}` is not an allowed status"),
            Problem::DuplicateSlug(v) => write!(f, "slug `{v}` is already used by another entry"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: PathBuf,
    pub field: String,
    pub problem: Problem,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: `{}` {}", self.path.display(), self.field, self.problem)
    }
}

#[derive(Debug, Clone, Error)]
#[error("{} content problem(s):\n{}", .issues.len(), render_issues(.issues))]
pub struct ValidationError {
    issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }
}

pub(crate) fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  {issue}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Frontmatter fields a kind cannot do without.
pub fn required_fields(kind: EntryKind) -> Vec<&'static str> {
    let specific: &[&str] = match kind {
        EntryKind::Post => &["image"],
        EntryKind::Project => &["links"],
        EntryKind::Uses => &["url", "status"],
        EntryKind::Bookmark => &["url"],
        EntryKind::StackEntry | EntryKind::Shareable => &[],
    };
    BASE_REQUIRED.iter().chain(specific).copied().collect()
}

/// Check one record against the rules for `kind`. An empty result means
/// the record maps cleanly.
pub fn validate_record(kind: EntryKind, record: &RawRecord) -> Vec<ValidationIssue> {
    let fm = &record.frontmatter;
    let mut issues = Vec::new();
    let mut push = |field: &str, problem: Problem| {
        issues.push(ValidationIssue {
            path: record.path.clone(),
            field: field.to_string(),
            problem,
        })
    };

    for field in required_fields(kind) {
        if !is_present(fm, field) {
            push(field, Problem::Missing);
        }
    }

    for (field, value) in [("published", &fm.published), ("updated", &fm.updated)] {
        if let Some(value) = value
            && !value.trim().is_empty()
            && !date::is_accepted_format(value)
        {
            push(field, Problem::InvalidDate(value.clone()));
        }
    }

    for (field, value) in [("url", &fm.url), ("discussion", &fm.discussion)] {
        if let Some(value) = value
            && !value.trim().is_empty()
            && !is_absolute_url(value)
        {
            push(field, Problem::InvalidUrl(value.clone()));
        }
    }

    for (index, link) in fm.links.iter().flatten().enumerate() {
        if !is_absolute_url(&link.url) {
            push(&format!("links[{index}].url"), Problem::InvalidUrl(link.url.clone()));
        }
    }

    if let Some(raw) = fm.status.as_deref()
        && !raw.trim().is_empty()
    {
        let allowed = raw
            .parse::<Status>()
            .is_ok_and(|status| kind.statuses().contains(&status));
        if !allowed {
            push("status", Problem::UnknownStatus(raw.to_string()));
        }
    }

    issues
}

/// Report every entry whose slug was already taken by an earlier entry of
/// the same kind. Each entry is paired with its source file.
pub fn duplicate_slugs<'a, I>(entries: I) -> Vec<ValidationIssue>
where
    I: IntoIterator<Item = (&'a PathBuf, &'a Entry)>,
{
    let mut seen: HashSet<(EntryKind, &str)> = HashSet::new();
    let mut issues = Vec::new();

    for (path, entry) in entries {
        if !seen.insert((entry.kind, entry.slug.as_str())) {
            issues.push(ValidationIssue {
                path: path.clone(),
                field: "title".to_string(),
                problem: Problem::DuplicateSlug(entry.slug.clone()),
            });
        }
    }

    issues
}

fn is_present(fm: &Frontmatter, field: &str) -> bool {
    let text = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
    match field {
        "title" => text(&fm.title),
        "description" => text(&fm.description),
        "published" => text(&fm.published),
        "tags" => fm.tags.is_some(),
        "image" => text(&fm.image),
        "url" => text(&fm.url),
        "status" => text(&fm.status),
        "links" => fm.links.is_some(),
        _ => true,
    }
}

fn is_absolute_url(value: &str) -> bool {
    Url::parse(value.trim()).is_ok_and(|url| url.has_host())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;

    fn record(source: &str) -> RawRecord {
        RawRecord::parse("content/uses/editor.md", source).unwrap()
    }

    fn fields(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.field.as_str()).collect()
    }

    #[test]
    fn base_fields_are_required_for_all_kinds() {
        let rec = record("---\n---\nbody\n");
        for kind in EntryKind::ALL {
            let issues = validate_record(kind, &rec);
            let f = fields(&issues);
            for field in BASE_REQUIRED {
                assert!(f.contains(field), "{kind} should require {field}");
            }
        }
    }

    #[test]
    fn kind_specific_requirements() {
        let rec = record(
            "---\ntitle: t\ndescription: d\npublished: 2024-01-01\ntags: []\n---\n",
        );
        assert_eq!(fields(&validate_record(EntryKind::Post, &rec)), ["image"]);
        assert_eq!(fields(&validate_record(EntryKind::Project, &rec)), ["links"]);
        assert_eq!(fields(&validate_record(EntryKind::Uses, &rec)), ["url", "status"]);
        assert_eq!(fields(&validate_record(EntryKind::Bookmark, &rec)), ["url"]);
        assert!(validate_record(EntryKind::StackEntry, &rec).is_empty());
        assert!(validate_record(EntryKind::Shareable, &rec).is_empty());
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let rec = record(
            "---\ntitle: '  '\ndescription: d\npublished: 2024-01-01\ntags: []\n---\n",
        );
        let issues = validate_record(EntryKind::StackEntry, &rec);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "title");
        assert_eq!(issues[0].problem, Problem::Missing);
    }

    #[test]
    fn rejects_bad_dates_and_urls() {
        let rec = record(
            "---
title: Editor
description: What I type in
published: 01/02/2024
updated: 2024-01-05T10:00:00.123Z
tags: [tools]
url: not a url
discussion: https://news.example.com/item?id=1
status: active
---
",
        );
        let issues = validate_record(EntryKind::Uses, &rec);
        assert_eq!(
            issues
                .iter()
                .map(|i| (i.field.as_str(), &i.problem))
                .collect::<Vec<_>>(),
            [
                ("published", &Problem::InvalidDate("01/02/2024".into())),
                ("url", &Problem::InvalidUrl("not a url".into())),
            ]
        );
    }

    #[test]
    fn checks_project_link_urls() {
        let rec = record(
            "---
title: p
description: d
published: 2024-01-01
tags: []
links:
  - title: ok
    url: https://example.com
  - title: broken
    url: /relative/path
---
",
        );
        let issues = validate_record(EntryKind::Project, &rec);
        assert_eq!(fields(&issues), ["links[1].url"]);
    }

    #[test]
    fn status_must_belong_to_the_kind() {
        let source = "---
title: t
description: d
published: 2024-01-01
tags: []
status: paused
url: https://example.com
---
";
        let issues = validate_record(EntryKind::Uses, &record(source));
        assert_eq!(issues[0].problem, Problem::UnknownStatus("paused".into()));

        let shareable = source.replace("paused", "active");
        let issues = validate_record(EntryKind::Shareable, &record(&shareable));
        assert_eq!(fields(&issues), ["status"]);
    }

    #[test]
    fn error_lists_every_issue() {
        let err = ValidationError::new(validate_record(EntryKind::Post, &record("---\n---\n")));
        let message = err.to_string();
        assert!(message.starts_with("5 content problem(s)"));
        assert!(message.contains("content/uses/editor.md: `image` is required"));
    }
}
