use crate::entry::{Entry, EntryKind};
use crate::tag::{ALL_TAGS, Tag, unique_tags};
use crate::view::{SortDirection, SortProperty, StatusFilter, ViewError, ViewQuery, kind_view};

/// The canonical entries of one kind plus the current filter and sort
/// selections.
///
/// Seeded once; the view is derived from the state on every call.
#[derive(Debug, Clone)]
pub struct EntryStore {
    kind: EntryKind,
    init_entries: Vec<Entry>,
    tags: Vec<Tag>,
    filter_tag_slug: String,
    filter_status: StatusFilter,
    sort_property: SortProperty,
    sort_direction: SortDirection,
}

impl EntryStore {
    pub fn new(kind: EntryKind) -> Self {
        Self {
            kind,
            init_entries: Vec::new(),
            tags: Vec::new(),
            filter_tag_slug: ALL_TAGS.to_string(),
            filter_status: StatusFilter::default(),
            sort_property: SortProperty::default(),
            sort_direction: SortDirection::default(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Seed the store. Does nothing and returns `false` when it already
    /// holds entries.
    pub fn init(&mut self, entries: Vec<Entry>) -> bool {
        if !self.init_entries.is_empty() {
            return false;
        }
        self.tags = unique_tags(entries.iter().flat_map(|entry| &entry.tags));
        self.init_entries = entries;
        true
    }

    pub fn entries(&self) -> &[Entry] {
        &self.init_entries
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn set_filter_tag(&mut self, slug: impl Into<String>) {
        self.filter_tag_slug = slug.into();
    }

    pub fn set_filter_status(&mut self, status: StatusFilter) {
        self.filter_status = status;
    }

    pub fn set_sort_property(&mut self, property: SortProperty) {
        self.sort_property = property;
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        self.sort_direction = direction;
    }

    /// Apply every selection from `query` at once.
    pub fn apply(&mut self, query: &ViewQuery) {
        self.filter_tag_slug = query.tag.clone();
        self.filter_status = query.status;
        self.sort_property = query.sort;
        self.sort_direction = query.direction;
    }

    pub fn query(&self) -> ViewQuery {
        ViewQuery {
            tag: if self.filter_tag_slug.is_empty() {
                ALL_TAGS.to_string()
            } else {
                self.filter_tag_slug.clone()
            },
            status: self.filter_status,
            sort: self.sort_property,
            direction: self.sort_direction,
        }
    }

    pub fn view(&self) -> Result<Vec<Entry>, ViewError> {
        kind_view(self.kind, &self.init_entries, &self.query())
    }
}
