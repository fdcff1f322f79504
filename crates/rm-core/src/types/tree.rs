//! The owned file tree produced by a scan.
//!
//! A [`FileNode`] is either a directory holding named children or a file
//! with its line count and analysis results. Nodes never point back at
//! their parents; rendering carries ancestry as a traversal parameter, so
//! the tree stays a plain owned value that can cross thread boundaries.

use serde::{Deserialize, Serialize};

use crate::hash::FxHashMap;

/// One node of a scanned project tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileNode {
    /// A directory with its named children.
    Directory {
        /// Child nodes keyed by base name.
        children: FxHashMap<String, FileNode>,
    },
    /// A regular file.
    File {
        /// Number of lines in the file, zero if the file exceeded the
        /// size limit.
        lines: u64,
        /// Whether per-file analysis ran on this file.
        analyzed: bool,
        /// Number of functions found by analysis.
        functions: u64,
    },
}

impl FileNode {
    /// Creates an empty directory node.
    #[must_use]
    pub fn new_dir() -> Self {
        Self::Directory {
            children: FxHashMap::default(),
        }
    }

    /// Creates a file node with the given line count.
    #[must_use]
    pub const fn new_file(lines: u64) -> Self {
        Self::File {
            lines,
            analyzed: false,
            functions: 0,
        }
    }

    /// Returns `true` if this node is a directory.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }

    /// Returns this directory's children, or `None` for a file.
    #[must_use]
    pub const fn children(&self) -> Option<&FxHashMap<String, FileNode>> {
        match self {
            Self::Directory { children } => Some(children),
            Self::File { .. } => None,
        }
    }

    /// Returns this directory's children mutably, or `None` for a file.
    #[must_use]
    pub const fn children_mut(&mut self) -> Option<&mut FxHashMap<String, FileNode>> {
        match self {
            Self::Directory { children } => Some(children),
            Self::File { .. } => None,
        }
    }

    /// Records analysis results on a file node. Has no effect on
    /// directory nodes.
    pub fn mark_analyzed(&mut self, function_count: u64) {
        if let Self::File {
            analyzed,
            functions,
            ..
        } = self
        {
            *analyzed = true;
            *functions = function_count;
        }
    }

    /// Inserts a child into this directory node. Has no effect on file
    /// nodes.
    pub fn insert_child(&mut self, name: impl Into<String>, node: FileNode) {
        if let Self::Directory { children } = self {
            children.insert(name.into(), node);
        }
    }

    /// Returns `true` if this is a directory with no children.
    #[must_use]
    pub fn is_empty_dir(&self) -> bool {
        matches!(self, Self::Directory { children } if children.is_empty())
    }

    /// Counts all file nodes in this subtree.
    #[must_use]
    pub fn file_count(&self) -> u64 {
        match self {
            Self::File { .. } => 1,
            Self::Directory { children } => children.values().map(FileNode::file_count).sum(),
        }
    }

    /// Sums line counts across all file nodes in this subtree.
    #[must_use]
    pub fn line_count(&self) -> u64 {
        match self {
            Self::File { lines, .. } => *lines,
            Self::Directory { children } => children.values().map(FileNode::line_count).sum(),
        }
    }
}

impl Default for FileNode {
    fn default() -> Self {
        Self::new_dir()
    }
}
