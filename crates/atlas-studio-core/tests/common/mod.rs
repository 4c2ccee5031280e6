#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use atlas_studio_core::prelude::*;
use tokio::sync::{Notify, oneshot};

/// Backend whose completions are resolved manually, so tests control the
/// order in which overlapping responses arrive. Every call is recorded with
/// the request it carried; records survive resolution.
#[derive(Clone, Default)]
pub struct ControlledBackend {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    calls: Mutex<Calls>,
    notify: Notify,
}

#[derive(Default)]
struct Calls {
    load_requests: Vec<Vec<String>>,
    loads: Vec<Option<oneshot::Sender<Result<Vec<ImagePayload>, BackendError>>>>,
    generate_requests: Vec<AtlasRequest>,
    generates: Vec<Option<oneshot::Sender<Result<ImagePayload, BackendError>>>>,
    save_requests: Vec<(String, AtlasRequest)>,
    saves: Vec<Option<oneshot::Sender<Result<(), BackendError>>>>,
}

impl ControlledBackend {
    pub fn load_calls(&self) -> usize {
        self.inner.calls.lock().unwrap().load_requests.len()
    }

    pub fn generate_calls(&self) -> usize {
        self.inner.calls.lock().unwrap().generate_requests.len()
    }

    pub fn save_calls(&self) -> usize {
        self.inner.calls.lock().unwrap().save_requests.len()
    }

    pub fn load_request(&self, index: usize) -> Vec<String> {
        self.inner.calls.lock().unwrap().load_requests[index].clone()
    }

    pub fn generate_request(&self, index: usize) -> AtlasRequest {
        self.inner.calls.lock().unwrap().generate_requests[index].clone()
    }

    pub fn save_request(&self, index: usize) -> (String, AtlasRequest) {
        self.inner.calls.lock().unwrap().save_requests[index].clone()
    }

    pub fn resolve_load(&self, index: usize, result: Result<Vec<ImagePayload>, BackendError>) {
        let tx = self.inner.calls.lock().unwrap().loads[index]
            .take()
            .expect("load already resolved");
        let _ = tx.send(result);
    }

    pub fn resolve_generate(&self, index: usize, result: Result<ImagePayload, BackendError>) {
        let tx = self.inner.calls.lock().unwrap().generates[index]
            .take()
            .expect("generate already resolved");
        let _ = tx.send(result);
    }

    pub fn resolve_save(&self, index: usize, result: Result<(), BackendError>) {
        let tx = self.inner.calls.lock().unwrap().saves[index]
            .take()
            .expect("save already resolved");
        let _ = tx.send(result);
    }

    pub async fn wait_for_loads(&self, count: usize) {
        loop {
            let notified = self.inner.notify.notified();
            if self.load_calls() >= count {
                return;
            }
            notified.await;
        }
    }

    pub async fn wait_for_generates(&self, count: usize) {
        loop {
            let notified = self.inner.notify.notified();
            if self.generate_calls() >= count {
                return;
            }
            notified.await;
        }
    }

    pub async fn wait_for_saves(&self, count: usize) {
        loop {
            let notified = self.inner.notify.notified();
            if self.save_calls() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl AtlasBackend for ControlledBackend {
    async fn load_images(&self, paths: &[String]) -> Result<Vec<ImagePayload>, BackendError> {
        let (tx, rx) = oneshot::channel();
        {
            let mut calls = self.inner.calls.lock().unwrap();
            calls.load_requests.push(paths.to_vec());
            calls.loads.push(Some(tx));
        }
        self.inner.notify.notify_waiters();
        rx.await.map_err(|_| BackendError::new("backend dropped"))?
    }

    async fn create_atlas(&self, request: &AtlasRequest) -> Result<ImagePayload, BackendError> {
        let (tx, rx) = oneshot::channel();
        {
            let mut calls = self.inner.calls.lock().unwrap();
            calls.generate_requests.push(request.clone());
            calls.generates.push(Some(tx));
        }
        self.inner.notify.notify_waiters();
        rx.await.map_err(|_| BackendError::new("backend dropped"))?
    }

    async fn save_atlas(
        &self,
        output_path: &str,
        request: &AtlasRequest,
    ) -> Result<(), BackendError> {
        let (tx, rx) = oneshot::channel();
        {
            let mut calls = self.inner.calls.lock().unwrap();
            calls
                .save_requests
                .push((output_path.to_string(), request.clone()));
            calls.saves.push(Some(tx));
        }
        self.inner.notify.notify_waiters();
        rx.await.map_err(|_| BackendError::new("backend dropped"))?
    }
}

/// Backend that answers immediately with payloads derived from the request,
/// for tests that do not need to control completion order.
pub struct EchoBackend;

/// Deterministic preview payload `EchoBackend` produces for a request.
pub fn atlas_payload(request: &AtlasRequest) -> ImagePayload {
    format!(
        "atlas[{}] padding={} auto_size={} unified={}",
        request.input_paths.join("+"),
        request.settings.padding,
        request.settings.auto_size,
        request.settings.unified,
    )
    .into_bytes()
}

/// Deterministic preview payload `EchoBackend` produces for one source path.
pub fn decoded_payload(path: &str) -> ImagePayload {
    format!("decoded[{path}]").into_bytes()
}

#[async_trait]
impl AtlasBackend for EchoBackend {
    async fn load_images(&self, paths: &[String]) -> Result<Vec<ImagePayload>, BackendError> {
        Ok(paths.iter().map(|p| decoded_payload(p)).collect())
    }

    async fn create_atlas(&self, request: &AtlasRequest) -> Result<ImagePayload, BackendError> {
        Ok(atlas_payload(request))
    }

    async fn save_atlas(
        &self,
        output_path: &str,
        _request: &AtlasRequest,
    ) -> Result<(), BackendError> {
        if output_path.is_empty() {
            return Err(BackendError::new("output path is empty"));
        }
        Ok(())
    }
}
