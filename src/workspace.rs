// ---------------------------------------------------------------------------
// Workspaces and checkpoints.
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PreviewError;
use crate::tree::{FileSystemNode, FolderNode};

const INITIAL_CODE: &str = r#"// Welcome to Quantum Code!
// Your root component must be named 'App'.
// Try asking the AI for a big idea, like "build an app like Obsidian.md".
// The AI will first create a plan. Approve it, and watch it build!
// Or, enable Auto-Pilot and see what it comes with on its own.

// React is available globally in the preview, no import needed.
function App() {
  return (
    <div className="p-8 text-center bg-gray-100 h-screen flex flex-col justify-center items-center">
      <h1 className="text-4xl font-bold text-gray-800 mb-4">
        Quantum Code Live Preview
      </h1>
      <p className="text-lg text-gray-600 mb-6">
        Ask the AI on the right to build something!
      </p>
    </div>
  );
}"#;

/// The scaffold every fresh workspace starts from: a lone React component at
/// `src/App.tsx`, which the default react environment picks up directly.
pub fn initial_tree() -> FolderNode {
    let mut src = FolderNode::default();
    src.children
        .insert("App.tsx".to_string(), FileSystemNode::file(INITIAL_CODE));
    let mut root = FolderNode::default();
    root.children
        .insert("src".to_string(), FileSystemNode::Folder(src));
    root
}

/// An immutable snapshot of a workspace's file tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub id: Uuid,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub file_system: FolderNode,
}

/// A named project: one file tree plus its checkpoint history. Newest
/// checkpoint first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub file_system: FolderNode,
    #[serde(default)]
    pub checkpoints: Vec<Checkpoint>,
}

impl Workspace {
    /// Fresh workspace seeded with the default scaffold.
    pub fn new(name: impl Into<String>) -> Self {
        Workspace::with_tree(name, initial_tree())
    }

    pub fn with_tree(name: impl Into<String>, file_system: FolderNode) -> Self {
        Workspace {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
            file_system,
            checkpoints: Vec::new(),
        }
    }

    /// Snapshots the current tree under `name`. The snapshot is a deep copy;
    /// later edits to the workspace never leak into it.
    pub fn create_checkpoint(&mut self, name: impl Into<String>) -> &Checkpoint {
        let checkpoint = Checkpoint {
            id: Uuid::new_v4(),
            name: name.into(),
            timestamp: Utc::now(),
            file_system: self.file_system.clone(),
        };
        self.checkpoints.insert(0, checkpoint);
        &self.checkpoints[0]
    }

    /// Replaces the working tree with a checkpoint's snapshot. The
    /// checkpoint itself stays in the history and keeps its own copy.
    pub fn revert_to(&mut self, checkpoint_id: Uuid) -> Result<(), PreviewError> {
        let checkpoint = self
            .checkpoints
            .iter()
            .find(|c| c.id == checkpoint_id)
            .ok_or_else(|| PreviewError::UnknownCheckpoint(checkpoint_id.to_string()))?;
        self.file_system = checkpoint.file_system.clone();
        Ok(())
    }

    /// Full deep copy under a new identity. Tree, checkpoints and all; only
    /// id, name and creation time differ.
    pub fn duplicate(&self, name: impl Into<String>) -> Workspace {
        Workspace {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
            file_system: self.file_system.clone(),
            checkpoints: self.checkpoints.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::FileSystemNode;

    fn set_file(ws: &mut Workspace, name: &str, content: &str) {
        ws.file_system
            .children
            .insert(name.to_string(), FileSystemNode::file(content.to_string()));
    }

    #[test]
    fn fresh_workspace_carries_the_react_scaffold() {
        let ws = Workspace::new("My First Project");
        let code = ws.file_system.file_at("src/App.tsx").unwrap();
        assert!(code.contains("function App()"));
        assert!(code.contains("Quantum Code Live Preview"));
        assert!(ws.checkpoints.is_empty());
    }

    #[test]
    fn checkpoints_are_isolated_from_later_edits() {
        let mut ws = Workspace::new("p");
        set_file(&mut ws, "a.txt", "v1");
        let id = ws.create_checkpoint("before").id;

        set_file(&mut ws, "a.txt", "v2");
        let snapshot = ws.checkpoints.iter().find(|c| c.id == id).unwrap();
        assert_eq!(snapshot.file_system.file_at("a.txt"), Some("v1"));
        assert_eq!(ws.file_system.file_at("a.txt"), Some("v2"));
    }

    #[test]
    fn newest_checkpoint_comes_first() {
        let mut ws = Workspace::new("p");
        ws.create_checkpoint("first");
        ws.create_checkpoint("second");
        assert_eq!(ws.checkpoints[0].name, "second");
        assert_eq!(ws.checkpoints[1].name, "first");
    }

    #[test]
    fn revert_restores_the_snapshot_and_keeps_it() {
        let mut ws = Workspace::new("p");
        set_file(&mut ws, "a.txt", "v1");
        let id = ws.create_checkpoint("before").id;
        set_file(&mut ws, "a.txt", "v2");

        ws.revert_to(id).unwrap();
        assert_eq!(ws.file_system.file_at("a.txt"), Some("v1"));
        assert_eq!(ws.checkpoints.len(), 1);

        // The restored tree is its own copy too.
        set_file(&mut ws, "a.txt", "v3");
        assert_eq!(ws.checkpoints[0].file_system.file_at("a.txt"), Some("v1"));
    }

    #[test]
    fn revert_to_unknown_checkpoint_fails() {
        let mut ws = Workspace::new("p");
        let err = ws.revert_to(Uuid::new_v4()).unwrap_err();
        assert_eq!(err.code(), "PREVIEW_UNKNOWN_CHECKPOINT");
    }

    #[test]
    fn duplicate_is_independent_of_the_original() {
        let mut ws = Workspace::new("p");
        set_file(&mut ws, "a.txt", "orig");
        ws.create_checkpoint("cp");

        let mut copy = ws.duplicate("p (Copy)");
        assert_ne!(copy.id, ws.id);
        assert_eq!(copy.name, "p (Copy)");
        assert_eq!(copy.checkpoints.len(), 1);

        set_file(&mut copy, "a.txt", "changed");
        assert_eq!(ws.file_system.file_at("a.txt"), Some("orig"));
    }
}
