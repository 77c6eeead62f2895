//! In-memory project engine for a browser-based live-preview IDE: a virtual
//! file tree, batch file operations, environment detection, per-environment
//! document rendering, and the sandbox message bridge, exposed over JSON-RPC
//! 2.0 / NDJSON stdio.

pub mod bridge;
pub mod detect;
pub mod error;
pub mod ops;
pub mod path;
pub mod protocol;
pub mod render;
pub mod server;
pub mod share;
pub mod surface;
pub mod transport;
pub mod tree;
pub mod workspace;

pub use error::PreviewError;
pub use tree::{FileNode, FileSystemNode, FolderNode};
