use std::collections::HashSet;

use serde::Serialize;

use crate::entry::EntryKind;
use crate::slug::slug;

/// Slug reserved to mean "no tag filter".
pub const ALL_TAGS: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub slug: String,
}

impl Tag {
    /// Listing path for this tag within one content kind.
    pub fn path_in(&self, kind: EntryKind) -> String {
        format!("/{}/tags/{}", kind.plural(), self.slug)
    }
}

/// Turn a raw frontmatter token into a tag owned by `kind`.
///
/// Tags are identified globally by slug; the owning kind only matters when
/// building per-kind browse paths via [`Tag::path_in`].
pub fn resolve_tag(token: &str, _kind: EntryKind) -> Tag {
    let title = token.trim().to_string();
    Tag {
        slug: slug(&title),
        title,
        description: None,
    }
}

/// Deduplicate by slug. The first tag seen for a slug wins and the
/// first-seen order is kept.
pub fn unique_tags<'a, I>(tags: I) -> Vec<Tag>
where
    I: IntoIterator<Item = &'a Tag>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter(|tag| seen.insert(tag.slug.clone()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_derives_slug_and_keeps_title() {
        let tag = resolve_tag("Vue.js", EntryKind::Post);
        assert_eq!(tag.title, "Vue.js");
        assert_eq!(tag.slug, "vuejs");
        assert_eq!(tag.description, None);
    }

    #[test]
    fn path_is_scoped_by_kind() {
        let tag = resolve_tag("Side Projects", EntryKind::Project);
        assert_eq!(tag.path_in(EntryKind::Project), "/projects/tags/side-projects");
        assert_eq!(tag.path_in(EntryKind::Bookmark), "/bookmarks/tags/side-projects");
    }

    #[test]
    fn unique_tags_keeps_first_seen() {
        let tags = vec![
            resolve_tag("Rust", EntryKind::Post),
            resolve_tag("CLI", EntryKind::Post),
            resolve_tag("rust", EntryKind::Post),
            resolve_tag("Web", EntryKind::Post),
            resolve_tag("cli", EntryKind::Post),
        ];
        let unique = unique_tags(&tags);
        let titles: Vec<_> = unique.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["Rust", "CLI", "Web"]);
    }

    #[test]
    fn unique_tags_of_nothing_is_empty() {
        assert!(unique_tags(&Vec::new()).is_empty());
    }
}
