// ---------------------------------------------------------------------------
// File operation engine — applies AI-authored operation batches to a tree.
//
// Batches are best-effort by design: AI output may be partially malformed,
// so a failing operation is logged and skipped, never aborting the batch.
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::error::PreviewError;
use crate::path::{resolve, Resolution};
use crate::tree::{FileSystemNode, FolderNode};

/// One structural mutation, wire-compatible with the AI batch format
/// `{ "operation": "...", "path": "...", "content"?, "newPath"?,
/// "description"? }`.
///
/// `newPath` is optional at the type level so that malformed rename
/// operations still parse; they fail at apply time instead of poisoning the
/// whole batch during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileOperation {
    CreateFile {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    UpdateFile {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    CreateFolder {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    DeleteFile {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    DeleteFolder {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    RenameFile {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_path: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    RenameFolder {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_path: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl FileOperation {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateFile { .. } => "CREATE_FILE",
            Self::UpdateFile { .. } => "UPDATE_FILE",
            Self::CreateFolder { .. } => "CREATE_FOLDER",
            Self::DeleteFile { .. } => "DELETE_FILE",
            Self::DeleteFolder { .. } => "DELETE_FOLDER",
            Self::RenameFile { .. } => "RENAME_FILE",
            Self::RenameFolder { .. } => "RENAME_FOLDER",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::CreateFile { path, .. }
            | Self::UpdateFile { path, .. }
            | Self::CreateFolder { path, .. }
            | Self::DeleteFile { path, .. }
            | Self::DeleteFolder { path, .. }
            | Self::RenameFile { path, .. }
            | Self::RenameFolder { path, .. } => path,
        }
    }
}

/// How a batch went. Failures are counted, not fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub applied: usize,
    pub failed: usize,
}

/// Apply a batch to a deep copy of `tree`, strictly in order, each operation
/// seeing the state left by the previous one. The input tree is never
/// mutated.
pub fn apply_operations(tree: &FolderNode, operations: &[FileOperation]) -> (FolderNode, BatchOutcome) {
    let mut new_tree = tree.clone();
    let mut outcome = BatchOutcome::default();
    for op in operations {
        match apply_one(&mut new_tree, op) {
            Ok(()) => outcome.applied += 1,
            Err(err) => {
                outcome.failed += 1;
                tracing::warn!(
                    kind = op.kind(),
                    path = op.path(),
                    error = %err,
                    "skipping failed file operation"
                );
            }
        }
    }
    (new_tree, outcome)
}

fn apply_one(tree: &mut FolderNode, op: &FileOperation) -> Result<(), PreviewError> {
    match op {
        FileOperation::CreateFile { path, content, .. }
        | FileOperation::UpdateFile { path, content, .. } => {
            set_file(tree, path, content.clone().unwrap_or_default())
        }
        FileOperation::CreateFolder { path, .. } => create_folder(tree, path),
        FileOperation::DeleteFile { path, .. } => delete(tree, path, true),
        FileOperation::DeleteFolder { path, .. } => delete(tree, path, false),
        FileOperation::RenameFile { path, new_path, .. } => {
            rename(tree, path, new_path.as_deref(), true)
        }
        FileOperation::RenameFolder { path, new_path, .. } => {
            rename(tree, path, new_path.as_deref(), false)
        }
    }
}

/// CREATE_FILE and UPDATE_FILE are one and the same: set-or-replace. Any
/// existing node at the path — file or folder — is overwritten.
fn set_file(tree: &mut FolderNode, path: &str, content: String) -> Result<(), PreviewError> {
    match resolve(tree, path, true)? {
        Resolution::Root(_) => Err(PreviewError::InvalidPath(format!(
            "cannot create a file at the tree root: \"{}\"",
            path
        ))),
        Resolution::Slot { parent, key } => {
            parent
                .children
                .insert(key, FileSystemNode::file(content));
            Ok(())
        }
    }
}

/// Creates the folder only if nothing occupies the exact path; an existing
/// node of either kind is left alone.
fn create_folder(tree: &mut FolderNode, path: &str) -> Result<(), PreviewError> {
    match resolve(tree, path, true)? {
        Resolution::Root(_) => Err(PreviewError::InvalidPath(
            "cannot create the root folder".to_string(),
        )),
        Resolution::Slot { parent, key } => {
            parent.children.entry(key).or_insert_with(FileSystemNode::folder);
            Ok(())
        }
    }
}

/// Missing targets (including unresolvable paths) are a silent no-op, per
/// the batch contract.
fn delete(tree: &mut FolderNode, path: &str, expect_file: bool) -> Result<(), PreviewError> {
    let Ok(Resolution::Slot { parent, key }) = resolve(tree, path, false) else {
        return Ok(());
    };
    if let Some(node) = parent.children.get(&key) {
        warn_on_kind_mismatch("delete", path, node, expect_file);
        parent.children.remove(&key);
    }
    Ok(())
}

/// A move, not a copy: the node value (with its full subtree for folders) is
/// detached from its old parent and re-attached under the new key, with
/// destination parents materialized as needed. If the destination cannot be
/// resolved the node is re-attached where it was and the operation fails.
fn rename(
    tree: &mut FolderNode,
    path: &str,
    new_path: Option<&str>,
    expect_file: bool,
) -> Result<(), PreviewError> {
    let Some(new_path) = new_path else {
        return Err(PreviewError::MissingNewPath(path.to_string()));
    };

    let node = match resolve(tree, path, false) {
        Ok(Resolution::Slot { parent, key }) => match parent.children.remove(&key) {
            Some(node) => node,
            None => return Err(PreviewError::NotFound(path.to_string())),
        },
        _ => return Err(PreviewError::NotFound(path.to_string())),
    };
    warn_on_kind_mismatch("rename", path, &node, expect_file);

    // Detach-then-resolve order matters: renaming a folder to a path beneath
    // its own old name must see the tree without the source node.
    match resolve(tree, new_path, true) {
        Ok(Resolution::Slot { parent, key }) => {
            parent.children.insert(key, node);
            Ok(())
        }
        _ => {
            restore(tree, path, node);
            Err(PreviewError::InvalidDestination(new_path.to_string()))
        }
    }
}

/// Put a detached node back at its source path. The parent chain still
/// exists — only the node itself was removed — so this cannot fail.
fn restore(tree: &mut FolderNode, path: &str, node: FileSystemNode) {
    if let Ok(Resolution::Slot { parent, key }) = resolve(tree, path, false) {
        parent.children.insert(key, node);
    }
}

/// The `_FILE` / `_FOLDER` suffix is a caller contract, not an engine
/// invariant: a mismatch is reported but the operation still applies.
fn warn_on_kind_mismatch(verb: &str, path: &str, node: &FileSystemNode, expect_file: bool) {
    let expected = if expect_file { "file" } else { "folder" };
    if node.kind() != expected {
        tracing::warn!(
            verb,
            path,
            expected,
            actual = node.kind(),
            "operation kind does not match node type; applying anyway"
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn create_file(path: &str, content: &str) -> FileOperation {
        FileOperation::CreateFile {
            path: path.to_string(),
            content: Some(content.to_string()),
            description: None,
        }
    }

    fn apply(tree: &FolderNode, ops: Vec<FileOperation>) -> (FolderNode, BatchOutcome) {
        apply_operations(tree, &ops)
    }

    #[test]
    fn create_then_read_roundtrip() {
        let (tree, outcome) = apply(
            &FolderNode::default(),
            vec![create_file("a/b/c.txt", "hi")],
        );
        assert_eq!(outcome, BatchOutcome { applied: 1, failed: 0 });
        assert_eq!(tree.file_at("a/b/c.txt"), Some("hi"));
        assert!(tree.node_at("a").unwrap().is_folder());
        assert!(tree.node_at("a/b").unwrap().is_folder());
    }

    #[test]
    fn input_tree_is_never_mutated() {
        let original = FolderNode::default();
        let (_, _) = apply(&original, vec![create_file("x.txt", "x")]);
        assert!(original.is_empty());
    }

    #[test]
    fn update_file_overwrites_content() {
        let (tree, _) = apply(
            &FolderNode::default(),
            vec![
                create_file("f.txt", "old"),
                FileOperation::UpdateFile {
                    path: "f.txt".to_string(),
                    content: Some("new".to_string()),
                    description: None,
                },
            ],
        );
        assert_eq!(tree.file_at("f.txt"), Some("new"));
    }

    #[test]
    fn create_file_with_no_content_defaults_to_empty() {
        let (tree, _) = apply(
            &FolderNode::default(),
            vec![FileOperation::CreateFile {
                path: "empty.txt".to_string(),
                content: None,
                description: None,
            }],
        );
        assert_eq!(tree.file_at("empty.txt"), Some(""));
    }

    #[test]
    fn create_file_overwrites_a_folder_unconditionally() {
        let (tree, outcome) = apply(
            &FolderNode::default(),
            vec![
                FileOperation::CreateFolder {
                    path: "thing".to_string(),
                    description: None,
                },
                create_file("thing", "now a file"),
            ],
        );
        assert_eq!(outcome.failed, 0);
        assert_eq!(tree.file_at("thing"), Some("now a file"));
    }

    #[test]
    fn create_folder_does_not_overwrite() {
        let (tree, outcome) = apply(
            &FolderNode::default(),
            vec![
                create_file("keep.txt", "data"),
                FileOperation::CreateFolder {
                    path: "keep.txt".to_string(),
                    description: None,
                },
            ],
        );
        assert_eq!(outcome.failed, 0);
        assert_eq!(tree.file_at("keep.txt"), Some("data"));
    }

    #[test]
    fn delete_missing_file_is_a_noop() {
        let (base, _) = apply(&FolderNode::default(), vec![create_file("a.txt", "1")]);
        let (tree, outcome) = apply(
            &base,
            vec![FileOperation::DeleteFile {
                path: "nope.txt".to_string(),
                description: None,
            }],
        );
        assert_eq!(outcome, BatchOutcome { applied: 1, failed: 0 });
        assert_eq!(tree, base);
    }

    #[test]
    fn delete_folder_removes_whole_subtree() {
        let (base, _) = apply(
            &FolderNode::default(),
            vec![create_file("dir/one.txt", "1"), create_file("dir/two.txt", "2")],
        );
        let (tree, _) = apply(
            &base,
            vec![FileOperation::DeleteFolder {
                path: "dir".to_string(),
                description: None,
            }],
        );
        assert!(tree.node_at("dir").is_none());
        assert!(tree.node_at("dir/one.txt").is_none());
    }

    #[test]
    fn delete_folder_on_a_file_still_deletes() {
        // Kind mismatch is a reported diagnostic, not a behavior change.
        let (base, _) = apply(&FolderNode::default(), vec![create_file("f.txt", "x")]);
        let (tree, outcome) = apply(
            &base,
            vec![FileOperation::DeleteFolder {
                path: "f.txt".to_string(),
                description: None,
            }],
        );
        assert_eq!(outcome.failed, 0);
        assert!(tree.node_at("f.txt").is_none());
    }

    #[test]
    fn rename_moves_without_duplicating() {
        let (base, _) = apply(
            &FolderNode::default(),
            vec![create_file("old/name.txt", "content"), create_file("old/sibling.txt", "s")],
        );
        let (tree, outcome) = apply(
            &base,
            vec![FileOperation::RenameFile {
                path: "old/name.txt".to_string(),
                new_path: Some("new/dir/renamed.txt".to_string()),
                description: None,
            }],
        );
        assert_eq!(outcome, BatchOutcome { applied: 1, failed: 0 });
        assert!(tree.node_at("old/name.txt").is_none());
        assert_eq!(tree.file_at("new/dir/renamed.txt"), Some("content"));
        assert_eq!(tree.file_at("old/sibling.txt"), Some("s"));
    }

    #[test]
    fn rename_folder_carries_its_subtree() {
        let (base, _) = apply(
            &FolderNode::default(),
            vec![create_file("src/deep/mod.rs", "code")],
        );
        let (tree, _) = apply(
            &base,
            vec![FileOperation::RenameFolder {
                path: "src".to_string(),
                new_path: Some("lib".to_string()),
                description: None,
            }],
        );
        assert!(tree.node_at("src").is_none());
        assert_eq!(tree.file_at("lib/deep/mod.rs"), Some("code"));
    }

    #[test]
    fn rename_folder_beneath_its_own_old_name() {
        let (base, _) = apply(&FolderNode::default(), vec![create_file("a/f.txt", "x")]);
        let (tree, outcome) = apply(
            &base,
            vec![FileOperation::RenameFolder {
                path: "a".to_string(),
                new_path: Some("a/b".to_string()),
                description: None,
            }],
        );
        assert_eq!(outcome.failed, 0);
        assert_eq!(tree.file_at("a/b/f.txt"), Some("x"));
    }

    #[test]
    fn rename_without_new_path_fails_but_batch_continues() {
        let (tree, outcome) = apply(
            &FolderNode::default(),
            vec![
                create_file("first.txt", "1"),
                FileOperation::RenameFile {
                    path: "first.txt".to_string(),
                    new_path: None,
                    description: None,
                },
                create_file("third.txt", "3"),
            ],
        );
        assert_eq!(outcome, BatchOutcome { applied: 2, failed: 1 });
        assert_eq!(tree.file_at("first.txt"), Some("1"));
        assert_eq!(tree.file_at("third.txt"), Some("3"));
    }

    #[test]
    fn rename_missing_source_fails() {
        let (_, outcome) = apply(
            &FolderNode::default(),
            vec![FileOperation::RenameFile {
                path: "ghost.txt".to_string(),
                new_path: Some("anywhere.txt".to_string()),
                description: None,
            }],
        );
        assert_eq!(outcome, BatchOutcome { applied: 0, failed: 1 });
    }

    #[test]
    fn rename_with_invalid_destination_restores_the_source() {
        let (base, _) = apply(
            &FolderNode::default(),
            vec![create_file("blocker", "a file"), create_file("move.txt", "data")],
        );
        let (tree, outcome) = apply(
            &base,
            vec![FileOperation::RenameFile {
                path: "move.txt".to_string(),
                // Intermediate segment is a file — unresolvable destination.
                new_path: Some("blocker/inside.txt".to_string()),
                description: None,
            }],
        );
        assert_eq!(outcome.failed, 1);
        assert_eq!(tree.file_at("move.txt"), Some("data"));
    }

    #[test]
    fn operations_apply_in_batch_order() {
        let (tree, _) = apply(
            &FolderNode::default(),
            vec![
                FileOperation::CreateFolder {
                    path: "a/b".to_string(),
                    description: None,
                },
                create_file("a/b/c.txt", "hi"),
            ],
        );
        assert_eq!(tree.file_at("a/b/c.txt"), Some("hi"));
    }

    #[test]
    fn wire_format_roundtrip() {
        let json = r#"[
            {"operation":"CREATE_FILE","path":"src/App.tsx","content":"x","description":"scaffold"},
            {"operation":"RENAME_FOLDER","path":"src","newPath":"lib"},
            {"operation":"DELETE_FILE","path":"old.txt"}
        ]"#;
        let ops: Vec<FileOperation> = serde_json::from_str(json).unwrap();
        assert_eq!(ops[0].kind(), "CREATE_FILE");
        assert_eq!(
            ops[1],
            FileOperation::RenameFolder {
                path: "src".to_string(),
                new_path: Some("lib".to_string()),
                description: None,
            }
        );
        let back = serde_json::to_value(&ops).unwrap();
        assert_eq!(back[1]["operation"], "RENAME_FOLDER");
        assert_eq!(back[1]["newPath"], "lib");
        assert!(back[2].get("content").is_none());
    }

    #[test]
    fn malformed_rename_parses_and_fails_at_apply_time() {
        let json = r#"{"operation":"RENAME_FILE","path":"a.txt"}"#;
        let op: FileOperation = serde_json::from_str(json).unwrap();
        let (_, outcome) = apply(&FolderNode::default(), vec![op]);
        assert_eq!(outcome.failed, 1);
    }
}
