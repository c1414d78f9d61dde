//! Table-of-contents reconstruction from a flat heading list.

use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocNode {
    pub depth: u8,
    pub slug: String,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocNode>,
}

impl TocNode {
    pub fn leaf(depth: u8, slug: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            depth,
            slug: slug.into(),
            text: text.into(),
            children: Vec::new(),
        }
    }
}

/// Nest a flat, ordered heading list into a tree.
///
/// The shallowest depth present is the root depth. Each heading hangs off
/// the nearest open heading exactly one level above it. Headings that come
/// before the first root-depth heading have nothing to hang off, so each
/// becomes a childless root of its own. A heading that skips a level
/// relative to the previous one cannot be placed; it is logged and dropped
/// so rendering can carry on.
pub fn nest(headings: &[TocNode]) -> Vec<TocNode> {
    if headings.len() <= 1 {
        return headings.to_vec();
    }

    let Some(root_depth) = headings.iter().map(|h| h.depth).min() else {
        return Vec::new();
    };

    let mut roots: Vec<TocNode> = Vec::new();
    // Index path from `roots` down to the most recently placed heading.
    // Depths along the path are root_depth, root_depth + 1, ...
    let mut open: Vec<usize> = Vec::new();

    for heading in headings {
        let node = TocNode {
            children: Vec::new(),
            ..heading.clone()
        };

        if node.depth == root_depth {
            roots.push(node);
            open.clear();
            open.push(roots.len() - 1);
            continue;
        }

        if open.is_empty() {
            roots.push(node);
            continue;
        }

        let max_depth = root_depth as usize + open.len();
        let depth = node.depth as usize;
        if depth > max_depth {
            warn!(
                slug = %node.slug,
                depth = node.depth,
                "heading skips a level; leaving it out of the table of contents"
            );
            continue;
        }

        // Parent sits at depth - 1, which is path position depth - 1 - root.
        open.truncate(depth - root_depth as usize);
        let Some(parent) = node_at(&mut roots, &open) else {
            continue;
        };
        parent.children.push(node);
        open.push(parent.children.len() - 1);
    }

    roots
}

fn node_at<'a>(roots: &'a mut [TocNode], path: &[usize]) -> Option<&'a mut TocNode> {
    let (first, rest) = path.split_first()?;
    let mut node = roots.get_mut(*first)?;
    for &index in rest {
        node = node.children.get_mut(index)?;
    }
    Some(node)
}
