use std::sync::Arc;

use tracing::{debug, info};

use crate::backend::{AtlasBackend, AtlasRequest};
use crate::error::Result;
use crate::sequencer::RequestSequencer;
use crate::state::Shared;

/// Issues the save operation against the current image set and settings.
///
/// Triggered only by explicit user action and sequenced independently from
/// preview generation: a save neither blocks nor is blocked by a concurrent
/// generation, but both read a snapshot taken at call time.
pub(crate) struct AtlasPersister {
    shared: Arc<Shared>,
    backend: Arc<dyn AtlasBackend>,
    seq: RequestSequencer,
}

impl AtlasPersister {
    pub fn new(shared: Arc<Shared>, backend: Arc<dyn AtlasBackend>) -> Self {
        Self {
            shared,
            backend,
            seq: RequestSequencer::new(),
        }
    }

    pub async fn save(&self) -> Result<()> {
        let issued = self
            .shared
            .update(|state| match state.settings.validate() {
                Ok(settings) => {
                    state.saving_atlas = true;
                    let request = AtlasRequest {
                        input_paths: state.images.paths().to_vec(),
                        settings,
                    };
                    // An unset output path is passed through as "" and
                    // rejected by the backend like any other bad path.
                    let output_path = state.output_path.clone().unwrap_or_default();
                    Ok((self.seq.issue(), request, output_path))
                }
                Err(e) => {
                    state.set_error(&e);
                    Err(e)
                }
            })
            .await;
        let (token, request, output_path) = issued?;
        debug!(seq = token.value(), path = %output_path, "saving atlas");

        let result = self.backend.save_atlas(&output_path, &request).await;

        self.shared
            .update(|state| {
                state.saving_atlas = false;
                if !self.seq.is_current(token) {
                    debug!(seq = token.value(), "discarding superseded save result");
                    return Ok(());
                }
                match result {
                    Ok(()) => {
                        info!(path = %output_path, "atlas saved");
                        Ok(())
                    }
                    Err(e) => {
                        state.set_error(format!("atlas save failed: {e}"));
                        Err(e.into())
                    }
                }
            })
            .await
    }
}
