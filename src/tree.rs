// ---------------------------------------------------------------------------
// Virtual file tree — the in-memory project representation everything else
// operates on. Wire format matches the host UI exactly:
//   {"type":"file","content":"..."} / {"type":"folder","children":{...}}
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Leaf node owning its full text content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "file")]
pub struct FileNode {
    pub content: String,
}

/// Interior node. Children are keyed by name; map order is lexicographic and
/// carries no meaning — presentation order (folders first) is applied by
/// [`FolderNode::sorted_entries`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "folder")]
pub struct FolderNode {
    pub children: BTreeMap<String, FileSystemNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileSystemNode {
    File(FileNode),
    Folder(FolderNode),
}

impl FileSystemNode {
    pub fn file(content: impl Into<String>) -> Self {
        Self::File(FileNode {
            content: content.into(),
        })
    }

    pub fn folder() -> Self {
        Self::Folder(FolderNode::default())
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Folder(_) => "folder",
        }
    }

    pub fn as_folder(&self) -> Option<&FolderNode> {
        match self {
            Self::Folder(f) => Some(f),
            Self::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Self::File(f) => Some(f),
            Self::Folder(_) => None,
        }
    }
}

/// A file located somewhere in the tree: its full slash-delimited path plus
/// its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundFile {
    pub path: String,
    pub content: String,
}

impl FolderNode {
    /// Follow a slash-delimited path without mutating anything. Empty segments
    /// are ignored. Returns `None` for the empty path; whole-tree operations
    /// go through [`crate::path::resolve`] instead.
    pub fn node_at(&self, path: &str) -> Option<&FileSystemNode> {
        let parts: Vec<&str> = crate::path::segments(path).collect();
        let mut folder = self;
        for (i, part) in parts.iter().enumerate() {
            let child = folder.children.get(*part)?;
            if i == parts.len() - 1 {
                return Some(child);
            }
            folder = child.as_folder()?;
        }
        None
    }

    /// Content of the file at an exact path, if present and a file.
    pub fn file_at(&self, path: &str) -> Option<&str> {
        match self.node_at(path)? {
            FileSystemNode::File(f) => Some(&f.content),
            FileSystemNode::Folder(_) => None,
        }
    }

    /// Depth-first search for the first file with the given name, anywhere in
    /// the tree. Traversal is in child-map order, so the match is
    /// deterministic for a given tree.
    pub fn find_file_named(&self, file_name: &str) -> Option<FoundFile> {
        self.find_named_inner(file_name, "")
    }

    fn find_named_inner(&self, file_name: &str, prefix: &str) -> Option<FoundFile> {
        for (name, child) in &self.children {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", prefix, name)
            };
            match child {
                FileSystemNode::File(f) if name == file_name => {
                    return Some(FoundFile {
                        path,
                        content: f.content.clone(),
                    });
                }
                FileSystemNode::Folder(f) => {
                    if let Some(found) = f.find_named_inner(file_name, &path) {
                        return Some(found);
                    }
                }
                FileSystemNode::File(_) => {}
            }
        }
        None
    }

    /// Children in presentation order: folders before files, each group
    /// lexicographic.
    pub fn sorted_entries(&self) -> Vec<(&str, &FileSystemNode)> {
        let mut entries: Vec<(&str, &FileSystemNode)> = self
            .children
            .iter()
            .map(|(name, node)| (name.as_str(), node))
            .collect();
        entries.sort_by_key(|(name, node)| (node.is_file(), *name));
        entries
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// ASCII listing of the whole tree, one entry per line, in presentation
    /// order.
    pub fn listing(&self) -> String {
        let mut lines: Vec<String> = vec!["/".to_string()];
        self.listing_inner("", &mut lines);
        lines.join("\n")
    }

    fn listing_inner(&self, prefix: &str, lines: &mut Vec<String>) {
        let entries = self.sorted_entries();
        let count = entries.len();
        for (i, (name, node)) in entries.into_iter().enumerate() {
            let is_last = i == count - 1;
            let connector = if is_last { "└── " } else { "├── " };
            let child_prefix = if is_last { "    " } else { "│   " };
            match node {
                FileSystemNode::Folder(f) => {
                    lines.push(format!("{}{}{}/", prefix, connector, name));
                    f.listing_inner(&format!("{}{}", prefix, child_prefix), lines);
                }
                FileSystemNode::File(f) => {
                    lines.push(format!(
                        "{}{}{} ({} bytes)",
                        prefix,
                        connector,
                        name,
                        f.content.len()
                    ));
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
