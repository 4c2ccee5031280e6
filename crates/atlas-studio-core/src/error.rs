use thiserror::Error;

use crate::backend::BackendError;
use crate::settings::ValidationError;

/// Errors surfaced by the orchestration layer.
///
/// A superseded response is not an error: it is discarded silently and the
/// triggering call resolves `Ok`.
#[derive(Debug, Error)]
pub enum AtlasStudioError {
    #[error("invalid settings: {0}")]
    Validation(#[from] ValidationError),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

pub type Result<T> = std::result::Result<T, AtlasStudioError>;
