// ---------------------------------------------------------------------------
// Share links: workspace JSON, zlib-deflated, url-safe base64.
//
// The payload must stay readable by pako.inflate in the browser, so plain
// zlib framing is used rather than raw deflate or gzip.
// ---------------------------------------------------------------------------

use std::io::Write;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use flate2::write::{ZlibDecoder, ZlibEncoder};
use flate2::Compression;

use crate::error::PreviewError;
use crate::workspace::Workspace;

/// Compact, URL-embeddable encoding of a full workspace.
pub fn encode_share_link(workspace: &Workspace) -> Result<String, PreviewError> {
    let json = serde_json::to_vec(workspace)?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;
    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

/// Inverse of [`encode_share_link`]. Any corruption (bad base64, bad zlib
/// stream, malformed workspace JSON) comes back as a single error kind; the
/// payload arrives from an untrusted URL fragment.
pub fn decode_share_link(data: &str) -> Result<Workspace, PreviewError> {
    let compressed = URL_SAFE_NO_PAD
        .decode(data.trim())
        .map_err(|e| PreviewError::InvalidShareData(format!("invalid base64: {e}")))?;

    let mut decoder = ZlibDecoder::new(Vec::new());
    decoder
        .write_all(&compressed)
        .map_err(|e| PreviewError::InvalidShareData(format!("invalid deflate stream: {e}")))?;
    let json = decoder
        .finish()
        .map_err(|e| PreviewError::InvalidShareData(format!("invalid deflate stream: {e}")))?;

    serde_json::from_slice(&json)
        .map_err(|e| PreviewError::InvalidShareData(format!("invalid workspace: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::FileSystemNode;

    #[test]
    fn share_links_round_trip_a_full_workspace() {
        let mut ws = Workspace::new("shared project");
        ws.file_system.children.insert(
            "notes.txt".to_string(),
            FileSystemNode::file("remember the milk"),
        );
        ws.create_checkpoint("v1");

        let link = encode_share_link(&ws).unwrap();
        assert!(!link.contains('+'));
        assert!(!link.contains('/'));
        assert!(!link.contains('='));

        let decoded = decode_share_link(&link).unwrap();
        assert_eq!(decoded.id, ws.id);
        assert_eq!(decoded.name, "shared project");
        assert_eq!(decoded.file_system, ws.file_system);
        assert_eq!(decoded.checkpoints.len(), 1);
    }

    #[test]
    fn garbage_base64_is_rejected() {
        let err = decode_share_link("not base64 at all!!!").unwrap_err();
        assert_eq!(err.code(), "PREVIEW_INVALID_SHARE_DATA");
    }

    #[test]
    fn valid_base64_with_a_bad_stream_is_rejected() {
        let bogus = URL_SAFE_NO_PAD.encode(b"definitely not zlib");
        let err = decode_share_link(&bogus).unwrap_err();
        assert_eq!(err.code(), "PREVIEW_INVALID_SHARE_DATA");
    }
}
