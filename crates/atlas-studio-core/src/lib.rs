//! Client-side orchestration core for an image atlas generator.
//!
//! - The packing backend (bin-packing, rasterization, encoding) lives behind
//!   the [`AtlasBackend`] boundary: `load_images` / `create_atlas` /
//!   `save_atlas`, one round trip per call.
//! - This crate decides when to (re)invoke the backend, which state is
//!   authoritative, and how overlapping in-flight calls are reconciled:
//!   every call carries a sequencer token and only the most recently issued
//!   request of a kind may mutate shared state.
//! - Readers observe the aggregate through cheap [`AppSnapshot`] values,
//!   either polled or subscribed.
//!
//! Quick example:
//! ```ignore
//! use std::sync::Arc;
//! use atlas_studio_core::prelude::*;
//! # async fn run(backend: Arc<dyn AtlasBackend>) -> atlas_studio_core::Result<()> {
//! let studio = AtlasStudio::new(backend);
//! studio.set_padding(4).await;
//! studio.replace_images(vec!["a.png".into(), "b.png".into()]).await?;
//! if let Some(preview) = studio.snapshot().preview_atlas {
//!     println!("preview: {} bytes", preview.len());
//! }
//! studio.set_output_path("atlas.png").await;
//! studio.save_atlas().await?;
//! # Ok(()) }
//! ```

pub mod backend;
pub mod error;
pub mod image_set;
mod orchestrator;
mod persister;
pub mod sequencer;
pub mod settings;
pub mod state;
pub mod studio;

pub use backend::*;
pub use error::*;
pub use image_set::*;
pub use sequencer::*;
pub use settings::*;
pub use state::{AppSnapshot, StateChange};
pub use studio::*;

/// Convenience prelude for common types.
/// Importing `atlas_studio_core::prelude::*` brings the primary API into scope.
pub mod prelude {
    pub use crate::backend::{AtlasBackend, AtlasRequest, BackendError, ImagePayload};
    pub use crate::error::AtlasStudioError;
    pub use crate::image_set::ImageSet;
    pub use crate::sequencer::{RequestSequencer, RequestToken};
    pub use crate::settings::{
        AtlasSettings, AtlasSettingsBuilder, NormalizedSettings, ValidationError,
    };
    pub use crate::state::AppSnapshot;
    pub use crate::studio::AtlasStudio;
}
