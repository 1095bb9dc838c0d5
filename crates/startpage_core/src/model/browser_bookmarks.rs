//! Projection of the browser's native bookmark tree for the bookmarks panel.
//!
//! Only the root's direct children are shown: loose links as rows, and each
//! non-empty folder as a titled group of its direct links.

use crate::model::bookmark::{favicon_url, host_or_raw, PANEL_FAVICON_SIZE};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum links listed under one folder.
pub const FOLDER_LINK_LIMIT: usize = 20;

const UNTITLED_FOLDER: &str = "Untitled folder";

/// Node of the tree handed over by the browser bookmarks API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkNode {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<BookmarkNode>>,
}

impl BookmarkNode {
    pub fn link(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: Some(url.into()),
            children: None,
        }
    }

    pub fn folder(title: impl Into<String>, children: Vec<BookmarkNode>) -> Self {
        Self {
            title: title.into(),
            url: None,
            children: Some(children),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLink {
    pub title: String,
    pub url: String,
    pub host: String,
    pub favicon_url: String,
}

impl PanelLink {
    fn from_node(title: &str, url: &str) -> Self {
        let host = host_or_raw(url);
        let title = if title.trim().is_empty() {
            host.clone()
        } else {
            title.to_string()
        };
        Self {
            title,
            url: url.to_string(),
            host,
            favicon_url: favicon_url(url, PANEL_FAVICON_SIZE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEntry {
    Link(PanelLink),
    Folder { title: String, links: Vec<PanelLink> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkTreeError {
    /// The browser did not grant access to its bookmarks.
    Unavailable,
}

impl Display for BookmarkTreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "browser bookmarks are unavailable"),
        }
    }
}

impl Error for BookmarkTreeError {}

/// Flattens the browser tree into panel entries.
///
/// `tree` is `None` when the bookmarks API is not accessible.
pub fn project_panel(tree: Option<&[BookmarkNode]>) -> Result<Vec<PanelEntry>, BookmarkTreeError> {
    let roots = tree.ok_or(BookmarkTreeError::Unavailable)?;
    let Some(children) = roots.first().and_then(|root| root.children.as_deref()) else {
        return Ok(Vec::new());
    };

    let mut entries = Vec::new();
    for child in children {
        if let Some(url) = child.url.as_deref() {
            entries.push(PanelEntry::Link(PanelLink::from_node(&child.title, url)));
            continue;
        }

        let Some(grandchildren) = child.children.as_deref().filter(|nodes| !nodes.is_empty())
        else {
            continue;
        };
        let title = if child.title.trim().is_empty() {
            UNTITLED_FOLDER.to_string()
        } else {
            child.title.clone()
        };
        let links = grandchildren
            .iter()
            .filter_map(|node| {
                node.url
                    .as_deref()
                    .map(|url| PanelLink::from_node(&node.title, url))
            })
            .take(FOLDER_LINK_LIMIT)
            .collect();
        entries.push(PanelEntry::Folder { title, links });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tree_is_unavailable() {
        assert_eq!(project_panel(None), Err(BookmarkTreeError::Unavailable));
        assert_eq!(project_panel(Some(&[][..])), Ok(Vec::new()));
    }

    #[test]
    fn projects_links_and_non_empty_folders() {
        let many = (0..30)
            .map(|i| BookmarkNode::link(format!("link {i}"), format!("https://site{i}.example")))
            .collect::<Vec<_>>();
        let root = BookmarkNode::folder(
            "",
            vec![
                BookmarkNode::link("", "https://docs.rs/tokio"),
                BookmarkNode::folder("", many),
                BookmarkNode::folder("Empty", Vec::new()),
                BookmarkNode::folder(
                    "Nested",
                    vec![BookmarkNode::folder("Inner", vec![BookmarkNode::link("x", "https://x.io")])],
                ),
            ],
        );

        let entries = project_panel(Some(&[root][..])).unwrap();
        assert_eq!(entries.len(), 3);

        let PanelEntry::Link(link) = &entries[0] else {
            panic!("expected a link first");
        };
        assert_eq!(link.title, "docs.rs");
        assert_eq!(
            link.favicon_url,
            "https://www.google.com/s2/favicons?domain=docs.rs&sz=16"
        );

        let PanelEntry::Folder { title, links } = &entries[1] else {
            panic!("expected a folder");
        };
        assert_eq!(title, UNTITLED_FOLDER);
        assert_eq!(links.len(), FOLDER_LINK_LIMIT);
        assert_eq!(links[0].title, "link 0");

        // Sub-folders are not expanded.
        assert!(matches!(&entries[2], PanelEntry::Folder { links, .. } if links.is_empty()));
    }
}
