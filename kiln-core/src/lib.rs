pub mod builder;
pub mod config;
pub mod date;
pub mod entry;
pub mod feed;
pub mod frontmatter;
pub mod markdown;
pub mod scanner;
pub mod secret;
pub mod slug;
pub mod store;
pub mod tag;
pub mod template;
pub mod toc;
pub mod validate;
pub mod view;

// Re-export main types
pub use builder::{BuildError, BuildReport, Site, SiteBuilder};
pub use config::{ConfigError, SiteConfig};
pub use date::{DateValue, normalize_date};
pub use entry::{Entry, EntryKind, Status};
pub use scanner::{ContentError, Library};
pub use secret::SecretDocument;
pub use slug::slug;
pub use store::EntryStore;
pub use tag::{ALL_TAGS, Tag, resolve_tag, unique_tags};
pub use template::{TemplateError, TemplateRenderer};
pub use toc::{TocNode, nest};
pub use validate::{ValidationError, ValidationIssue};
pub use view::{SortDirection, SortProperty, StatusFilter, ViewError, ViewQuery, kind_view, view};
