// ---------------------------------------------------------------------------
// Path resolution over the virtual file tree.
//
// Paths are `/`-delimited relative names with no scheme and no leading slash;
// empty segments are discarded, so `a//b/`, `/a/b` and `a/b` are equivalent.
// ---------------------------------------------------------------------------

use crate::error::PreviewError;
use crate::tree::{FileSystemNode, FolderNode};

/// Non-empty segments of a slash-delimited path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Outcome of resolving a path against a tree.
///
/// `Root` is returned for the empty path (the tree itself, no parent, no
/// key); `Slot` names a position in a parent folder, whether or not a node
/// currently occupies it.
#[derive(Debug)]
pub enum Resolution<'a> {
    Root(&'a mut FolderNode),
    Slot {
        parent: &'a mut FolderNode,
        key: String,
    },
}

impl<'a> Resolution<'a> {
    /// The node currently at the resolved position, if any.
    pub fn node(&self) -> Option<&FileSystemNode> {
        match self {
            Resolution::Root(_) => None,
            Resolution::Slot { parent, key } => parent.children.get(key),
        }
    }
}

/// Walk all but the last segment of `path`, then hand back the parent folder
/// and final key. The final segment is looked up by the caller, never created
/// here.
///
/// When `create_parents` is true, missing intermediate folders are
/// synthesized and linked in; only folders are ever created, never files.
/// Resolution fails if an intermediate segment is occupied by a file, or is
/// missing while `create_parents` is false.
pub fn resolve<'a>(
    tree: &'a mut FolderNode,
    path: &str,
    create_parents: bool,
) -> Result<Resolution<'a>, PreviewError> {
    let parts: Vec<&str> = segments(path).collect();
    let Some((last, intermediate)) = parts.split_last() else {
        return Ok(Resolution::Root(tree));
    };

    let mut current = tree;
    for part in intermediate {
        if !current.children.contains_key(*part) {
            if !create_parents {
                return Err(PreviewError::InvalidPath(format!(
                    "missing folder \"{}\" in \"{}\"",
                    part, path
                )));
            }
            current
                .children
                .insert((*part).to_string(), FileSystemNode::folder());
        }
        current = match current.children.get_mut(*part) {
            Some(FileSystemNode::Folder(folder)) => folder,
            _ => {
                return Err(PreviewError::InvalidPath(format!(
                    "\"{}\" is a file, not a folder, in \"{}\"",
                    part, path
                )));
            }
        };
    }

    Ok(Resolution::Slot {
        parent: current,
        key: (*last).to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_file(path_parts: &[&str], content: &str) -> FolderNode {
        let mut root = FolderNode::default();
        {
            let mut current = &mut root;
            for part in &path_parts[..path_parts.len() - 1] {
                current
                    .children
                    .insert((*part).to_string(), FileSystemNode::folder());
                current = match current.children.get_mut(*part) {
                    Some(FileSystemNode::Folder(f)) => f,
                    _ => panic!("just inserted a folder"),
                };
            }
            current.children.insert(
                path_parts[path_parts.len() - 1].to_string(),
                FileSystemNode::file(content),
            );
        }
        root
    }

    #[test]
    fn segments_discard_empty_parts() {
        let parts: Vec<&str> = segments("/a//b/").collect();
        assert_eq!(parts, vec!["a", "b"]);
    }

    #[test]
    fn empty_path_resolves_to_root() {
        let mut tree = FolderNode::default();
        match resolve(&mut tree, "", false).unwrap() {
            Resolution::Root(_) => {}
            Resolution::Slot { .. } => panic!("expected root resolution"),
        }
    }

    #[test]
    fn slash_only_path_resolves_to_root() {
        let mut tree = FolderNode::default();
        assert!(matches!(
            resolve(&mut tree, "///", false).unwrap(),
            Resolution::Root(_)
        ));
    }

    #[test]
    fn resolves_existing_file() {
        let mut tree = tree_with_file(&["src", "App.tsx"], "code");
        match resolve(&mut tree, "src/App.tsx", false).unwrap() {
            Resolution::Slot { key, .. } => assert_eq!(key, "App.tsx"),
            Resolution::Root(_) => panic!("expected slot"),
        }
    }

    #[test]
    fn resolution_node_is_none_for_absent_final_segment() {
        let mut tree = tree_with_file(&["src", "App.tsx"], "code");
        let resolution = resolve(&mut tree, "src/missing.ts", false).unwrap();
        assert!(resolution.node().is_none());
    }

    #[test]
    fn missing_intermediate_fails_without_create_parents() {
        let mut tree = FolderNode::default();
        let err = resolve(&mut tree, "a/b/c.txt", false).unwrap_err();
        assert!(matches!(err, PreviewError::InvalidPath(_)));
        assert!(tree.is_empty());
    }

    #[test]
    fn create_parents_materializes_intermediate_folders() {
        let mut tree = FolderNode::default();
        let resolution = resolve(&mut tree, "a/b/c.txt", true).unwrap();
        match resolution {
            Resolution::Slot { key, .. } => assert_eq!(key, "c.txt"),
            Resolution::Root(_) => panic!("expected slot"),
        }
        assert!(tree.node_at("a/b").unwrap().is_folder());
        // Only folders were created — the final segment is untouched.
        assert!(tree.node_at("a/b/c.txt").is_none());
    }

    #[test]
    fn file_in_the_middle_fails_even_with_create_parents() {
        let mut tree = tree_with_file(&["blocker"], "i am a file");
        let err = resolve(&mut tree, "blocker/child.txt", true).unwrap_err();
        assert!(matches!(err, PreviewError::InvalidPath(_)));
    }

    #[test]
    fn equivalent_spellings_resolve_identically() {
        for spelling in ["a/b", "/a/b", "a//b", "a/b/"] {
            let mut tree = FolderNode::default();
            let resolution = resolve(&mut tree, spelling, true).unwrap();
            match resolution {
                Resolution::Slot { key, .. } => assert_eq!(key, "b", "spelling {spelling}"),
                Resolution::Root(_) => panic!("expected slot for {spelling}"),
            }
            assert!(tree.node_at("a").unwrap().is_folder());
        }
    }
}
