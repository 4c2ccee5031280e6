use std::sync::Arc;

use tracing::debug;

use crate::backend::{AtlasBackend, AtlasRequest};
use crate::sequencer::RequestSequencer;
use crate::state::{Shared, StateChange};

/// Decides when to (re)issue atlas generation and which response is
/// authoritative.
///
/// Re-entrant: a new generation may be issued while one is in flight. The
/// older call is not aborted at the transport level; it runs to completion
/// and its result is discarded because its token is no longer current.
pub(crate) struct AtlasOrchestrator {
    shared: Arc<Shared>,
    backend: Arc<dyn AtlasBackend>,
    seq: RequestSequencer,
}

impl AtlasOrchestrator {
    pub fn new(shared: Arc<Shared>, backend: Arc<dyn AtlasBackend>) -> Self {
        Self {
            shared,
            backend,
            seq: RequestSequencer::new(),
        }
    }

    /// Gate-then-issue in response to an explicit change notification.
    ///
    /// No request is issued while the image set is empty. Settings must
    /// validate; on failure the error is surfaced, the busy flag stays
    /// false and the previous preview is left untouched.
    pub async fn on_change(&self, change: StateChange) {
        // Snapshot and token allocation happen under one lock acquisition,
        // so request contents and issue order cannot interleave.
        let issued = self
            .shared
            .update(|state| {
                if state.images.is_empty() {
                    return None;
                }
                match state.settings.validate() {
                    Ok(settings) => {
                        state.clear_error();
                        state.generating_atlas = true;
                        let request = AtlasRequest {
                            input_paths: state.images.paths().to_vec(),
                            settings,
                        };
                        Some((self.seq.issue(), request))
                    }
                    Err(e) => {
                        state.set_error(&e);
                        None
                    }
                }
            })
            .await;

        let Some((token, request)) = issued else {
            return;
        };
        debug!(seq = token.value(), ?change, "issuing atlas generation");

        let result = self.backend.create_atlas(&request).await;

        self.shared
            .update(|state| {
                // Cleared on every completion regardless of currency; a
                // superseding request may still be outstanding.
                state.generating_atlas = false;
                if !self.seq.is_current(token) {
                    debug!(seq = token.value(), "discarding superseded generation");
                    return;
                }
                match result {
                    Ok(payload) => {
                        state.preview_atlas = Some(payload);
                        debug!(seq = token.value(), "preview atlas updated");
                    }
                    Err(e) => state.set_error(format!("atlas generation failed: {e}")),
                }
            })
            .await;
    }
}
