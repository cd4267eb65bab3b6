use async_trait::async_trait;
use thiserror::Error;

use crate::models::ContentTree;

#[derive(Debug, Error)]
pub enum SerializeError {
    /// The document engine is not present at all. Fatal to the submission:
    /// the caller aborts before any assembly side effects and surfaces the
    /// message so the user can retry without re-entering data.
    #[error("document engine unavailable: {0}")]
    Unavailable(String),

    #[error("serialization failed: {0}")]
    Failed(String),
}

/// Turns a finished content tree into the downloadable binary document.
///
/// Contract: blocks are emitted in order with their style attributes; footer
/// text may contain the literal `{PAGE}` / `{PAGES}` tokens to be replaced
/// with page counters. The byte-level format is entirely the implementation's
/// concern.
#[async_trait]
pub trait DocumentSerializer: Send + Sync {
    /// Cheap capability probe, checked before any assembly work so a missing
    /// engine aborts the submission up front.
    fn available(&self) -> Result<(), SerializeError> {
        Ok(())
    }

    async fn serialize(&self, tree: &ContentTree) -> Result<Vec<u8>, SerializeError>;
}

/// Reference serializer: pretty-printed JSON of the content tree. Stands in
/// for a real document engine during development and in tests; image bytes
/// are elided by the tree's own serialization rules.
pub struct JsonDocumentSerializer;

#[async_trait]
impl DocumentSerializer for JsonDocumentSerializer {
    async fn serialize(&self, tree: &ContentTree) -> Result<Vec<u8>, SerializeError> {
        serde_json::to_vec_pretty(tree).map_err(|e| SerializeError::Failed(e.to_string()))
    }
}

/// Serializer slot with no engine behind it. Every submission fails with an
/// explicit message, exercising the fatal-to-submission path.
pub struct DisabledDocumentSerializer;

#[async_trait]
impl DocumentSerializer for DisabledDocumentSerializer {
    fn available(&self) -> Result<(), SerializeError> {
        Err(SerializeError::Unavailable(
            "no document engine configured (set DOC_SERIALIZER=json)".to_string(),
        ))
    }

    async fn serialize(&self, _tree: &ContentTree) -> Result<Vec<u8>, SerializeError> {
        self.available().map(|_| Vec::new())
    }
}
