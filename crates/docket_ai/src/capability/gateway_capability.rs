use std::time::Duration;

use docket_core::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Capability, CapabilityRequest};
use crate::gateway::GatewayClient;

/// Capability backed by the local model gateway's generate endpoint.
///
/// Requests run in JSON mode so stage outputs arrive as a single object;
/// image/PDF evidence rides along base64-encoded. One attempt per call,
/// bounded by `timeout` (no retries).
#[derive(Debug, Clone)]
pub struct GatewayCapability {
    client: GatewayClient,
    timeout: Duration,
}

impl GatewayCapability {
    pub fn new(client: GatewayClient) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<&'a str>>,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl Capability for GatewayCapability {
    fn invoke(&self, req: &CapabilityRequest) -> Result<Option<Value>, AppError> {
        let url = format!("{}/api/generate", self.client.base_url());
        let images = req
            .attachment
            .as_ref()
            .map(|a| vec![a.data_base64.as_str()]);
        let body = GenerateRequest {
            model: &req.model,
            prompt: &req.prompt,
            stream: false,
            format: "json",
            images,
        };

        let resp = ureq::post(&url)
            .timeout(self.timeout)
            .send_json(serde_json::to_value(body).map_err(|e| {
                AppError::new("AI_CAPABILITY_FAILED", "Failed to encode capability request")
                    .with_details(e.to_string())
            })?);

        match resp {
            Ok(r) if r.status() == 200 => {
                let v: GenerateResponse = r.into_json().map_err(|e| {
                    AppError::new("AI_CAPABILITY_FAILED", "Failed to decode capability response")
                        .with_details(format!("task={}; err={}", req.task, e))
                })?;

                let text = v.response.trim();
                if text.is_empty() {
                    return Ok(None);
                }

                let value: Value = serde_json::from_str(text).map_err(|e| {
                    AppError::new(
                        "AI_CAPABILITY_BAD_OUTPUT",
                        "Capability returned malformed JSON",
                    )
                    .with_details(format!("task={}; err={}", req.task, e))
                })?;
                Ok(Some(value))
            }
            Ok(r) => Err(
                AppError::new("AI_CAPABILITY_FAILED", "Capability request failed")
                    .with_details(format!("task={}; status={}", req.task, r.status())),
            ),
            Err(e) => {
                tracing::warn!(task = req.task, error = %e, "model gateway transport error");
                Err(AppError::new(
                    "AI_CAPABILITY_UNREACHABLE",
                    "Failed to reach the model gateway",
                )
                .with_details(e.to_string())
                .with_retryable(true))
            }
        }
    }
}
