use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::backend::AtlasBackend;
use crate::error::Result;
use crate::orchestrator::AtlasOrchestrator;
use crate::persister::AtlasPersister;
use crate::sequencer::{RequestSequencer, RequestToken};
use crate::settings::AtlasSettings;
use crate::state::{AppSnapshot, Shared, StateChange};

/// The composed client: owns the aggregate, the backend handle and the
/// per-kind sequencers, and exposes the full mutating API.
///
/// Clone-cheap; clones share the same aggregate, so overlapping calls from
/// separate tasks coordinate through the sequencer tokens. All methods
/// suspend only at backend calls and never block.
#[derive(Clone)]
pub struct AtlasStudio {
    inner: Arc<StudioInner>,
}

struct StudioInner {
    shared: Arc<Shared>,
    backend: Arc<dyn AtlasBackend>,
    orchestrator: AtlasOrchestrator,
    persister: AtlasPersister,
    load_seq: RequestSequencer,
}

impl AtlasStudio {
    pub fn new(backend: Arc<dyn AtlasBackend>) -> Self {
        let shared = Shared::new();
        Self {
            inner: Arc::new(StudioInner {
                orchestrator: AtlasOrchestrator::new(shared.clone(), backend.clone()),
                persister: AtlasPersister::new(shared.clone(), backend.clone()),
                load_seq: RequestSequencer::new(),
                shared,
                backend,
            }),
        }
    }

    /// Most recently published snapshot of the aggregate.
    pub fn snapshot(&self) -> AppSnapshot {
        self.inner.shared.latest()
    }

    /// Subscribe to snapshot updates; one value per state mutation.
    pub fn subscribe(&self) -> watch::Receiver<AppSnapshot> {
        self.inner.shared.subscribe()
    }

    /// Replaces the image set with `paths`, re-requests decoding for the
    /// new list and triggers a generation attempt.
    ///
    /// Resolves `Err` only if this call's own decode response failed while
    /// still current; a superseded decode resolves `Ok`.
    pub async fn replace_images(&self, paths: Vec<String>) -> Result<()> {
        let (token, snapshot) = self
            .inner
            .shared
            .update(|state| {
                state.images.replace(paths);
                state.loading_images = true;
                (self.inner.load_seq.issue(), state.images.paths().to_vec())
            })
            .await;
        let (load, _) = tokio::join!(
            self.load_previews(token, snapshot),
            self.inner.orchestrator.on_change(StateChange::Images),
        );
        load
    }

    /// Appends `paths` to the image set. The backend `load_images` contract
    /// is stateless, so decoding is re-requested for the entire resulting
    /// list, not just the delta.
    pub async fn append_images(&self, paths: Vec<String>) -> Result<()> {
        let (token, snapshot) = self
            .inner
            .shared
            .update(|state| {
                state.images.append(paths);
                state.loading_images = true;
                (self.inner.load_seq.issue(), state.images.paths().to_vec())
            })
            .await;
        let (load, _) = tokio::join!(
            self.load_previews(token, snapshot),
            self.inner.orchestrator.on_change(StateChange::Images),
        );
        load
    }

    /// Empties the image set and previews. Settings and the generated
    /// preview atlas are untouched; idempotent.
    ///
    /// Outstanding decode responses are orphaned so they cannot repopulate
    /// previews for a list that no longer exists.
    pub async fn clear_images(&self) {
        self.inner
            .shared
            .update(|state| {
                state.images.clear();
                state.loading_images = false;
                self.inner.load_seq.invalidate();
            })
            .await;
    }

    async fn load_previews(&self, token: RequestToken, paths: Vec<String>) -> Result<()> {
        debug!(seq = token.value(), count = paths.len(), "loading image previews");
        let result = self.inner.backend.load_images(&paths).await;
        self.inner
            .shared
            .update(|state| {
                state.loading_images = false;
                if !self.inner.load_seq.is_current(token) {
                    debug!(seq = token.value(), "discarding superseded image load");
                    return Ok(());
                }
                match result {
                    Ok(previews) => {
                        state.images.set_previews(previews);
                        Ok(())
                    }
                    Err(e) => {
                        state.images.clear_previews();
                        state.set_error(format!("failed to load images: {e}"));
                        Err(e.into())
                    }
                }
            })
            .await
    }

    pub async fn set_padding(&self, padding: u32) {
        self.apply_setting(|s| std::mem::replace(&mut s.padding, padding) != padding)
            .await;
    }

    pub async fn set_auto_size(&self, auto_size: bool) {
        self.apply_setting(|s| std::mem::replace(&mut s.auto_size, auto_size) != auto_size)
            .await;
    }

    pub async fn set_width(&self, width: u32) {
        self.apply_setting(|s| std::mem::replace(&mut s.width, width) != width)
            .await;
    }

    pub async fn set_height(&self, height: u32) {
        self.apply_setting(|s| std::mem::replace(&mut s.height, height) != height)
            .await;
    }

    pub async fn set_unified(&self, unified: bool) {
        self.apply_setting(|s| std::mem::replace(&mut s.unified, unified) != unified)
            .await;
    }

    /// Applies one settings mutation and notifies the orchestrator only if
    /// the value actually changed.
    async fn apply_setting(&self, mutate: impl FnOnce(&mut AtlasSettings) -> bool) {
        let changed = self
            .inner
            .shared
            .update(|state| mutate(&mut state.settings))
            .await;
        if changed {
            self.inner.orchestrator.on_change(StateChange::Settings).await;
        }
    }

    /// Output path for [`save_atlas`](Self::save_atlas). Not a packing
    /// parameter; changing it never triggers generation.
    pub async fn set_output_path(&self, path: impl Into<String>) {
        let path = path.into();
        self.inner
            .shared
            .update(|state| state.output_path = Some(path))
            .await;
    }

    /// Explicit refresh: re-runs the gate-then-issue logic against the
    /// current image set and settings.
    pub async fn regenerate(&self) {
        self.inner.orchestrator.on_change(StateChange::Manual).await;
    }

    /// Packs the current image set with the current settings and writes the
    /// result to the configured output path.
    pub async fn save_atlas(&self) -> Result<()> {
        self.inner.persister.save().await
    }
}

impl std::fmt::Debug for AtlasStudio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtlasStudio").finish_non_exhaustive()
    }
}
