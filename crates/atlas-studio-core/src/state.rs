use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::error;

use crate::backend::ImagePayload;
use crate::image_set::ImageSet;
use crate::settings::AtlasSettings;

/// What changed, as reported to the orchestrator by the mutating API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// Image set contents changed.
    Images,
    /// A settings field changed.
    Settings,
    /// Explicit user-requested refresh.
    Manual,
}

/// The composed, externally observable aggregate.
///
/// Mutated only by the orchestration layer; the presentation layer observes
/// it through [`AppSnapshot`] values. Every mutation is a discrete
/// assignment under the state lock, so no partial update is ever visible.
#[derive(Debug, Default)]
pub(crate) struct AppState {
    pub images: ImageSet,
    pub settings: AtlasSettings,
    pub preview_atlas: Option<ImagePayload>,
    pub output_path: Option<String>,
    pub loading_images: bool,
    pub generating_atlas: bool,
    pub saving_atlas: bool,
    pub last_error: Option<String>,
}

impl AppState {
    pub fn set_error(&mut self, msg: impl ToString) {
        let s = msg.to_string();
        error!("{s}");
        self.last_error = Some(s);
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            input_paths: self.images.paths().to_vec(),
            image_previews: self.images.previews().to_vec(),
            settings: self.settings.clone(),
            preview_atlas: self.preview_atlas.clone(),
            output_path: self.output_path.clone(),
            loading_images: self.loading_images,
            generating_atlas: self.generating_atlas,
            saving_atlas: self.saving_atlas,
            last_error: self.last_error.clone(),
        }
    }
}

/// Immutable view of [`AppState`] published to readers.
///
/// The busy flags reflect whether the most recently observed operation of
/// that kind is still outstanding; under overlap they can flicker false
/// while a superseding request is still in flight, so they are a display
/// hint, not a mutual-exclusion primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSnapshot {
    pub input_paths: Vec<String>,
    pub image_previews: Vec<ImagePayload>,
    pub settings: AtlasSettings,
    pub preview_atlas: Option<ImagePayload>,
    pub output_path: Option<String>,
    pub loading_images: bool,
    pub generating_atlas: bool,
    pub saving_atlas: bool,
    pub last_error: Option<String>,
}

/// Shared aggregate plus its snapshot channel.
///
/// The lock is never held across a backend await; suspension points see a
/// fully consistent aggregate.
pub(crate) struct Shared {
    state: Mutex<AppState>,
    publish: watch::Sender<AppSnapshot>,
}

impl Shared {
    pub fn new() -> Arc<Self> {
        let state = AppState::default();
        let (publish, _) = watch::channel(state.snapshot());
        Arc::new(Self {
            state: Mutex::new(state),
            publish,
        })
    }

    /// Runs `f` under the state lock and publishes the resulting snapshot.
    pub async fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let mut state = self.state.lock().await;
        let out = f(&mut state);
        // send_replace stores the value even with no subscribers, so
        // `latest` never goes stale.
        self.publish.send_replace(state.snapshot());
        out
    }

    /// Most recently published snapshot.
    pub fn latest(&self) -> AppSnapshot {
        self.publish.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppSnapshot> {
        self.publish.subscribe()
    }
}
