use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Not a file: {0}")]
    NotAFile(String),
    #[error("Missing newPath for rename: {0}")]
    MissingNewPath(String),
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),
    #[error("Unknown checkpoint: {0}")]
    UnknownCheckpoint(String),
    #[error("Unknown workspace: {0}")]
    UnknownWorkspace(String),
    #[error("Invalid share data: {0}")]
    InvalidShareData(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PreviewError {
    pub fn code(&self) -> &str {
        match self {
            Self::InvalidPath(_) => "PREVIEW_INVALID_PATH",
            Self::NotFound(_) => "PREVIEW_NOT_FOUND",
            Self::NotAFile(_) => "PREVIEW_NOT_FILE",
            Self::MissingNewPath(_) => "PREVIEW_MISSING_NEW_PATH",
            Self::InvalidDestination(_) => "PREVIEW_INVALID_DESTINATION",
            Self::UnknownCheckpoint(_) => "PREVIEW_UNKNOWN_CHECKPOINT",
            Self::UnknownWorkspace(_) => "PREVIEW_UNKNOWN_WORKSPACE",
            Self::InvalidShareData(_) => "PREVIEW_INVALID_SHARE_DATA",
            Self::Io(_) => "PREVIEW_IO_ERROR",
            Self::Json(_) => "PREVIEW_JSON_ERROR",
        }
    }

    pub fn to_json_rpc_error(&self) -> serde_json::Value {
        serde_json::json!({
            "previewCode": self.code(),
            "message": self.to_string(),
        })
    }
}
