//! Filtered, sorted projections of an entry collection.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::form_urlencoded;

use crate::entry::{Entry, EntryKind, Status};
use crate::tag::ALL_TAGS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortProperty {
    Title,
    #[default]
    Published,
    Updated,
    Priority,
}

impl SortProperty {
    pub fn as_str(self) -> &'static str {
        match self {
            SortProperty::Title => "title",
            SortProperty::Published => "published",
            SortProperty::Updated => "updated",
            SortProperty::Priority => "priority",
        }
    }

    /// Whether every entry of `kind` can be ordered by this property.
    pub fn supports(self, kind: EntryKind) -> bool {
        match self {
            SortProperty::Priority => kind == EntryKind::Project,
            _ => true,
        }
    }
}

impl FromStr for SortProperty {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(SortProperty::Title),
            "published" => Ok(SortProperty::Published),
            "updated" => Ok(SortProperty::Updated),
            "priority" | "prio" => Ok(SortProperty::Priority),
            other => Err(ViewError::InvalidQuery {
                param: "sort",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SortProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(ViewError::InvalidQuery {
                param: "direction",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    pub fn matches(self, status: Option<Status>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => status == Some(wanted),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Only(status) => status.as_str(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "all" {
            return Ok(StatusFilter::All);
        }
        s.parse::<Status>()
            .map(StatusFilter::Only)
            .map_err(|_| ViewError::InvalidQuery {
                param: "status",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("cannot sort {kind} entries by {property}")]
    UnsupportedSort {
        property: SortProperty,
        kind: EntryKind,
    },
    #[error("invalid value `{value}` for `{param}`")]
    InvalidQuery { param: &'static str, value: String },
}

/// Everything that shapes a derived view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewQuery {
    /// Tag slug, or [`ALL_TAGS`].
    pub tag: String,
    pub status: StatusFilter,
    pub sort: SortProperty,
    pub direction: SortDirection,
}

impl Default for ViewQuery {
    fn default() -> Self {
        Self {
            tag: ALL_TAGS.to_string(),
            status: StatusFilter::All,
            sort: SortProperty::Published,
            direction: SortDirection::Descending,
        }
    }
}

impl ViewQuery {
    /// Build a query from URL parameters. Absent parameters keep their
    /// defaults; unknown parameters are ignored.
    pub fn from_params<'a, I>(params: I) -> Result<Self, ViewError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut query = Self::default();
        for (key, value) in params {
            match key {
                "tag" if !value.is_empty() => query.tag = value.to_string(),
                "status" => query.status = value.parse()?,
                "sort" => query.sort = value.parse()?,
                "direction" => query.direction = value.parse()?,
                _ => {}
            }
        }
        Ok(query)
    }

    /// The non-default parameters as a query string, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let defaults = Self::default();
        let mut query = form_urlencoded::Serializer::new(String::new());
        if self.tag != defaults.tag {
            query.append_pair("tag", &self.tag);
        }
        if self.status != defaults.status {
            query.append_pair("status", self.status.as_str());
        }
        if self.sort != defaults.sort {
            query.append_pair("sort", self.sort.as_str());
        }
        if self.direction != defaults.direction {
            query.append_pair("direction", self.direction.as_str());
        }
        query.finish()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn sorted_by(mut self, sort: SortProperty, direction: SortDirection) -> Self {
        self.sort = sort;
        self.direction = direction;
        self
    }
}

/// Filter by tag and status, then sort, returning a new vector. The input
/// is never reordered.
pub fn view(entries: &[Entry], query: &ViewQuery) -> Result<Vec<Entry>, ViewError> {
    if let Some(entry) = entries.iter().find(|e| !query.sort.supports(e.kind)) {
        return Err(ViewError::UnsupportedSort {
            property: query.sort,
            kind: entry.kind,
        });
    }

    let mut selected: Vec<Entry> = entries
        .iter()
        .filter(|entry| query.tag == ALL_TAGS || entry.has_tag(&query.tag))
        .filter(|entry| query.status.matches(entry.status))
        .cloned()
        .collect();

    let compare = comparator(query.sort);
    match query.direction {
        SortDirection::Ascending => selected.sort_by(|a, b| compare(a, b)),
        SortDirection::Descending => selected.sort_by(|a, b| compare(b, a)),
    }

    Ok(selected)
}

/// [`view`] over a collection that holds only `kind` entries. An
/// unsupported sort fails even when the collection is empty.
pub fn kind_view(
    kind: EntryKind,
    entries: &[Entry],
    query: &ViewQuery,
) -> Result<Vec<Entry>, ViewError> {
    if !query.sort.supports(kind) {
        return Err(ViewError::UnsupportedSort {
            property: query.sort,
            kind,
        });
    }
    view(entries, query)
}

fn comparator(property: SortProperty) -> fn(&Entry, &Entry) -> Ordering {
    match property {
        SortProperty::Title => |a: &Entry, b: &Entry| compare_titles(&a.title, &b.title),
        SortProperty::Published => |a: &Entry, b: &Entry| a.published.cmp(&b.published),
        SortProperty::Updated => |a: &Entry, b: &Entry| a.updated.cmp(&b.updated),
        SortProperty::Priority => |a: &Entry, b: &Entry| a.prio.cmp(&b.prio),
    }
}

/// Case- and accent-insensitive ordering, falling back to the raw titles
/// so distinct titles never compare equal.
fn compare_titles(a: &str, b: &str) -> Ordering {
    let fold = |s: &str| deunicode::deunicode(s).to_lowercase();
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::normalize_date;
    use crate::tag::resolve_tag;

    fn entry(kind: EntryKind, title: &str, published: &str, tags: &[&str]) -> Entry {
        let slug = crate::slug::slug(title);
        let published = normalize_date(published);
        Entry {
            kind,
            title: title.to_string(),
            description: String::new(),
            relative_path: format!("/{}/{slug}", kind.plural()),
            full_path: format!("https://example.com/{}/{slug}", kind.plural()),
            slug,
            tags: tags.iter().map(|t| resolve_tag(t, kind)).collect(),
            updated: published.clone(),
            published,
            image: String::new(),
            status: kind.statuses().first().copied(),
            url: String::new(),
            discussion: None,
            open_source: false,
            links: Vec::new(),
            prio: 0,
            html: String::new(),
            toc: Vec::new(),
        }
    }

    fn titles(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.title.as_str()).collect()
    }

    fn posts() -> Vec<Entry> {
        vec![
            entry(EntryKind::Post, "beta", "2024-02-01", &["Rust", "Web"]),
            entry(EntryKind::Post, "Alpha", "2024-03-01", &["Rust"]),
            entry(EntryKind::Post, "Éclair", "2023-12-24", &["Baking"]),
            entry(EntryKind::Post, "delta", "garbage", &["Web"]),
        ]
    }

    #[test]
    fn all_tag_keeps_everything() {
        let entries = posts();
        for sort in [SortProperty::Title, SortProperty::Published, SortProperty::Updated] {
            for direction in [SortDirection::Ascending, SortDirection::Descending] {
                let q = ViewQuery::default().sorted_by(sort, direction);
                assert_eq!(view(&entries, &q).unwrap().len(), entries.len());
            }
        }
    }

    #[test]
    fn tag_filter_is_any_match() {
        let entries = posts();
        let result = view(&entries, &ViewQuery::default().with_tag("rust")).unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|e| e.has_tag("rust")));

        let web = view(&entries, &ViewQuery::default().with_tag("web")).unwrap();
        assert_eq!(web.len(), 2);

        let none = view(&entries, &ViewQuery::default().with_tag("go")).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn published_descending_puts_recent_first_and_invalid_last() {
        let result = view(&posts(), &ViewQuery::default()).unwrap();
        assert_eq!(titles(&result), ["Alpha", "beta", "Éclair", "delta"]);
    }

    #[test]
    fn title_sort_folds_case_and_accents() {
        let q = ViewQuery::default().sorted_by(SortProperty::Title, SortDirection::Ascending);
        let result = view(&posts(), &q).unwrap();
        assert_eq!(titles(&result), ["Alpha", "beta", "delta", "Éclair"]);
    }

    #[test]
    fn title_descending_is_ascending_reversed() {
        let entries = posts();
        let mut asc = view(
            &entries,
            &ViewQuery::default().sorted_by(SortProperty::Title, SortDirection::Ascending),
        )
        .unwrap();
        asc.reverse();
        let desc = view(
            &entries,
            &ViewQuery::default().sorted_by(SortProperty::Title, SortDirection::Descending),
        )
        .unwrap();
        assert_eq!(asc, desc);
    }

    #[test]
    fn input_order_is_untouched() {
        let entries = posts();
        let before = titles(&entries).join(",");
        let q = ViewQuery::default().sorted_by(SortProperty::Title, SortDirection::Ascending);
        let _ = view(&entries, &q).unwrap();
        assert_eq!(titles(&entries).join(","), before);
    }

    #[test]
    fn status_and_tag_combine_with_and() {
        let mut entries = vec![
            entry(EntryKind::Bookmark, "one", "2024-01-01", &["read"]),
            entry(EntryKind::Bookmark, "two", "2024-01-02", &["read"]),
            entry(EntryKind::Bookmark, "three", "2024-01-03", &["watch"]),
        ];
        entries[1].status = Some(Status::Archived);
        entries[2].status = Some(Status::Archived);

        let q = ViewQuery::default()
            .with_tag("read")
            .with_status(StatusFilter::Only(Status::Archived));
        assert_eq!(titles(&view(&entries, &q).unwrap()), ["two"]);

        let status_only =
            ViewQuery::default().with_status(StatusFilter::Only(Status::Archived));
        assert_eq!(titles(&view(&entries, &status_only).unwrap()), ["three", "two"]);
    }

    #[test]
    fn entries_without_status_never_match_a_concrete_status() {
        let q = ViewQuery::default().with_status(StatusFilter::Only(Status::Active));
        assert!(view(&posts(), &q).unwrap().is_empty());
    }

    #[test]
    fn priority_sorts_projects() {
        let mut entries = vec![
            entry(EntryKind::Project, "low", "2024-01-01", &[]),
            entry(EntryKind::Project, "high", "2024-01-01", &[]),
            entry(EntryKind::Project, "mid", "2024-01-01", &[]),
        ];
        entries[0].prio = 1;
        entries[1].prio = 9;
        entries[2].prio = 5;

        let q = ViewQuery::default().sorted_by(SortProperty::Priority, SortDirection::Descending);
        assert_eq!(titles(&view(&entries, &q).unwrap()), ["high", "mid", "low"]);
    }

    #[test]
    fn priority_on_other_kinds_is_an_error() {
        let q = ViewQuery::default().sorted_by(SortProperty::Priority, SortDirection::Ascending);
        assert_eq!(
            view(&posts(), &q).unwrap_err(),
            ViewError::UnsupportedSort {
                property: SortProperty::Priority,
                kind: EntryKind::Post,
            }
        );
        assert!(view(&[], &q).unwrap().is_empty());
    }

    #[test]
    fn priority_is_rejected_for_a_kind_even_without_entries() {
        let q = ViewQuery::default().sorted_by(SortProperty::Priority, SortDirection::Descending);
        assert_eq!(
            kind_view(EntryKind::Post, &[], &q).unwrap_err(),
            ViewError::UnsupportedSort {
                property: SortProperty::Priority,
                kind: EntryKind::Post,
            }
        );
        assert!(kind_view(EntryKind::Project, &[], &q).unwrap().is_empty());
    }

    #[test]
    fn query_round_trips_through_params() {
        let q = ViewQuery::from_params([
            ("tag", "rust"),
            ("status", "archived"),
            ("sort", "title"),
            ("direction", "asc"),
            ("utm_source", "feed"),
        ])
        .unwrap();
        assert_eq!(q.tag, "rust");
        assert_eq!(q.status, StatusFilter::Only(Status::Archived));
        assert_eq!(q.to_query_string(), "tag=rust&status=archived&sort=title&direction=asc");
        assert_eq!(ViewQuery::default().to_query_string(), "");
    }

    #[test]
    fn query_string_encodes_the_tag() {
        let q = ViewQuery::default().with_tag("über-café");
        let rendered = q.to_query_string();
        assert_eq!(rendered, "tag=%C3%BCber-caf%C3%A9");

        let parsed: Vec<(String, String)> =
            form_urlencoded::parse(rendered.as_bytes()).into_owned().collect();
        let back =
            ViewQuery::from_params(parsed.iter().map(|(k, v)| (k.as_str(), v.as_str()))).unwrap();
        assert_eq!(back, q);

        let odd = ViewQuery::default().with_tag("a&b=c");
        assert_eq!(odd.to_query_string(), "tag=a%26b%3Dc");
    }

    #[test]
    fn bad_params_are_rejected() {
        let err = ViewQuery::from_params([("sort", "colour")]).unwrap_err();
        assert_eq!(
            err,
            ViewError::InvalidQuery {
                param: "sort",
                value: "colour".to_string()
            }
        );
        assert!(ViewQuery::from_params([("status", "paused")]).is_err());
    }
}
