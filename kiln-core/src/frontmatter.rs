use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::markdown::{Rendered, render_markdown};

const FENCE: &str = "---";

#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unterminated frontmatter block in {path}")]
    Unterminated { path: PathBuf },
    #[error("invalid frontmatter in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Link {
    pub title: String,
    pub url: String,
}

/// The metadata header of a content file. Every field is optional here;
/// which ones are required depends on the content kind and is checked by
/// [`crate::validate`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frontmatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub published: Option<String>,
    pub updated: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub discussion: Option<String>,
    pub status: Option<String>,
    pub open_source: Option<bool>,
    pub links: Option<Vec<Link>>,
    pub prio: Option<i64>,
    #[serde(default)]
    pub draft: bool,
    /// Identifiers allowed to read a secret document. Empty means everyone
    /// with a session.
    #[serde(default)]
    pub audience: Vec<String>,
}

/// A content file after parsing, before validation and mapping.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub path: PathBuf,
    pub frontmatter: Frontmatter,
    pub body: Rendered,
}

impl RawRecord {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, FrontmatterError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| FrontmatterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &source)
    }

    pub fn parse<P: AsRef<Path>>(path: P, source: &str) -> Result<Self, FrontmatterError> {
        let path = path.as_ref().to_path_buf();
        let (header, body) = split(&path, source)?;

        let frontmatter = match header {
            Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml)
                .map_err(|source| FrontmatterError::Yaml {
                    path: path.clone(),
                    source,
                })?,
            _ => Frontmatter::default(),
        };

        Ok(Self {
            path,
            frontmatter,
            body: render_markdown(body),
        })
    }
}

/// Split `source` into its optional YAML header and the markdown body.
fn split<'a>(
    path: &Path,
    source: &'a str,
) -> Result<(Option<&'a str>, &'a str), FrontmatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let Some(first_line_end) = source.find('\n') else {
        return Ok((None, source));
    };
    if source[..first_line_end].trim_end() != FENCE {
        return Ok((None, source));
    }

    let rest = &source[first_line_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let header = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((Some(header), body));
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unterminated {
        path: path.to_path_buf(),
    })
}
