use serde::Serialize;

use crate::date::{DateValue, normalize_date};
use crate::frontmatter::RawRecord;
use crate::slug::slug;
use crate::toc::{TocNode, nest};
use crate::validate::{Problem, ValidationError, ValidationIssue};

/// A document only readable with a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretDocument {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub published: Option<DateValue>,
    /// Identifiers allowed to read the document. Empty means every user.
    #[serde(skip)]
    pub audience: Vec<String>,
    pub html: String,
    pub toc: Vec<TocNode>,
}

impl SecretDocument {
    pub fn from_record(record: &RawRecord) -> Result<Self, ValidationError> {
        let fm = &record.frontmatter;
        let issue = |field: &str, problem| ValidationIssue {
            path: record.path.clone(),
            field: field.to_string(),
            problem,
        };

        let title = fm.title.as_deref().map(str::trim).unwrap_or_default();
        let mut issues = Vec::new();
        if title.is_empty() {
            issues.push(issue("title", Problem::Missing));
        }
        let published = fm.published.as_deref().map(normalize_date);
        if let (Some(raw), Some(value)) = (&fm.published, &published)
            && !value.is_valid()
        {
            issues.push(issue("published", Problem::InvalidDate(raw.clone())));
        }
        if !issues.is_empty() {
            return Err(ValidationError::new(issues));
        }

        Ok(Self {
            title: title.to_string(),
            slug: slug(title),
            description: fm.description.clone().unwrap_or_default(),
            published,
            audience: fm.audience.clone(),
            html: record.body.html.clone(),
            toc: nest(&record.body.headings),
        })
    }

    pub fn visible_to(&self, identifier: &str) -> bool {
        self.audience.is_empty() || self.audience.iter().any(|who| who == identifier)
    }
}
