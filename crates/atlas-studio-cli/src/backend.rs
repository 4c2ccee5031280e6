//! Command-invocation backend: one external process per backend call.
//!
//! The packer command receives a single JSON request object on stdin and
//! answers with a single JSON object on stdout, `{"ok": ...}` on success or
//! `{"err": "..."}` on failure. Image payloads cross the boundary
//! base64-encoded.

use std::process::Stdio;

use async_trait::async_trait;
use atlas_studio_core::prelude::*;
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

pub struct CommandBackend {
    program: String,
}

impl CommandBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn invoke(&self, request: &WireRequest<'_>) -> Result<serde_json::Value, BackendError> {
        let payload = serde_json::to_vec(request)
            .map_err(|e| BackendError::new(format!("failed to encode request: {e}")))?;
        debug!(program = %self.program, bytes = payload.len(), "invoking packer backend");

        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| BackendError::new(format!("failed to spawn {}: {e}", self.program)))?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| BackendError::new("backend stdin unavailable"))?;
        stdin
            .write_all(&payload)
            .await
            .map_err(|e| BackendError::new(format!("failed to write request: {e}")))?;
        stdin
            .write_all(b"\n")
            .await
            .map_err(|e| BackendError::new(format!("failed to write request: {e}")))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| BackendError::new(format!("backend did not finish: {e}")))?;
        if !output.status.success() {
            return Err(BackendError::new(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }
        let response: WireResponse = serde_json::from_slice(&output.stdout)
            .map_err(|e| BackendError::new(format!("malformed backend response: {e}")))?;
        if let Some(err) = response.err {
            return Err(BackendError(err));
        }
        Ok(response.ok.unwrap_or(serde_json::Value::Null))
    }
}

#[async_trait]
impl AtlasBackend for CommandBackend {
    async fn load_images(&self, paths: &[String]) -> Result<Vec<ImagePayload>, BackendError> {
        let value = self.invoke(&WireRequest::LoadImages { paths }).await?;
        let items = value
            .as_array()
            .ok_or_else(|| BackendError::new("expected an array of image payloads"))?;
        items.iter().map(decode_payload).collect()
    }

    async fn create_atlas(&self, request: &AtlasRequest) -> Result<ImagePayload, BackendError> {
        let value = self
            .invoke(&WireRequest::CreateAtlas {
                input_paths: &request.input_paths,
                atlas_width: request.settings.width,
                atlas_height: request.settings.height,
                padding: request.settings.padding,
                auto_size: request.settings.auto_size,
                unified: request.settings.unified,
            })
            .await?;
        decode_payload(&value)
    }

    async fn save_atlas(
        &self,
        output_path: &str,
        request: &AtlasRequest,
    ) -> Result<(), BackendError> {
        self.invoke(&WireRequest::SaveAtlas {
            output_path,
            input_paths: &request.input_paths,
            atlas_width: request.settings.width,
            atlas_height: request.settings.height,
            padding: request.settings.padding,
            auto_size: request.settings.auto_size,
            unified: request.settings.unified,
        })
        .await?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum WireRequest<'a> {
    LoadImages {
        paths: &'a [String],
    },
    CreateAtlas {
        input_paths: &'a [String],
        atlas_width: Option<u32>,
        atlas_height: Option<u32>,
        padding: u32,
        auto_size: bool,
        unified: bool,
    },
    SaveAtlas {
        output_path: &'a str,
        input_paths: &'a [String],
        atlas_width: Option<u32>,
        atlas_height: Option<u32>,
        padding: u32,
        auto_size: bool,
        unified: bool,
    },
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    ok: Option<serde_json::Value>,
    #[serde(default)]
    err: Option<String>,
}

fn decode_payload(value: &serde_json::Value) -> Result<ImagePayload, BackendError> {
    let text = value
        .as_str()
        .ok_or_else(|| BackendError::new("expected a base64 image payload"))?;
    general_purpose::STANDARD
        .decode(text)
        .map_err(|e| BackendError::new(format!("invalid base64 payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_atlas_request_carries_tagged_op() {
        let paths = vec!["a.png".to_string()];
        let request = WireRequest::CreateAtlas {
            input_paths: &paths,
            atlas_width: None,
            atlas_height: None,
            padding: 2,
            auto_size: true,
            unified: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["op"], "create_atlas");
        assert_eq!(json["input_paths"][0], "a.png");
        assert_eq!(json["atlas_width"], serde_json::Value::Null);
        assert_eq!(json["auto_size"], true);
    }

    #[test]
    fn error_responses_are_reported() {
        let response: WireResponse = serde_json::from_str(r#"{"err":"out of space"}"#).unwrap();
        assert_eq!(response.err.as_deref(), Some("out of space"));
        assert!(response.ok.is_none());
    }

    #[test]
    fn payloads_are_base64_decoded() {
        let value = serde_json::Value::String(general_purpose::STANDARD.encode(b"png-bytes"));
        assert_eq!(decode_payload(&value).unwrap(), b"png-bytes".to_vec());
        assert!(decode_payload(&serde_json::Value::Bool(true)).is_err());
    }
}
