use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::NormalizedSettings;

/// Encoded image bytes (PNG as produced by the backend). The core never
/// decodes payloads; it only stores and hands them out.
pub type ImagePayload = Vec<u8>;

/// Failure reported by the compute backend. Surfaced to the user verbatim;
/// previous state is retained and nothing is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Immutable snapshot sent with one `create_atlas`/`save_atlas` call.
///
/// Captured under the state lock at issue time, so an in-flight request is
/// never affected by later edits to the image set or settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasRequest {
    pub input_paths: Vec<String>,
    pub settings: NormalizedSettings,
}

/// The external compute backend: bin-packing, rasterization and encoding
/// live behind this boundary.
///
/// One round trip per call, no streaming. `load_images` and `create_atlas`
/// are pure functions of their inputs, so overlapping calls are safe to run
/// concurrently and superseded calls are simply allowed to finish with
/// their results ignored. `save_atlas` writes to disk and is only ever
/// issued by an explicit user action.
#[async_trait]
pub trait AtlasBackend: Send + Sync {
    /// Decodes each path into a displayable image; output order corresponds
    /// to input order.
    async fn load_images(&self, paths: &[String]) -> Result<Vec<ImagePayload>, BackendError>;

    /// Produces one packed atlas image from the request snapshot.
    async fn create_atlas(&self, request: &AtlasRequest) -> Result<ImagePayload, BackendError>;

    /// Packs with the same parameters and writes the result to disk instead
    /// of returning bytes.
    async fn save_atlas(&self, output_path: &str, request: &AtlasRequest)
    -> Result<(), BackendError>;
}
