use goi_core::error::{
    AppError, AI_GENERATION_MALFORMED, AI_GENERATION_TIMEOUT, AI_GENERATION_UNAVAILABLE,
};
use serde::{Deserialize, Serialize};

use super::Llm;
use crate::ollama::{is_timeout, OllamaClient};

#[derive(Debug, Clone)]
pub struct OllamaLlm {
    client: OllamaClient,
}

impl OllamaLlm {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl Llm for OllamaLlm {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError> {
        let url = format!("{}/api/generate", self.client.base_url());
        let req = GenerateRequest {
            model,
            prompt,
            stream: false,
        };
        let body = serde_json::to_value(req).map_err(|e| {
            AppError::new(AI_GENERATION_UNAVAILABLE, "Failed to encode generation request")
                .with_details(e.to_string())
        })?;

        let resp = ureq::post(&url).timeout(self.client.timeout()).send_json(body);

        match resp {
            Ok(r) if r.status() == 200 => {
                let v: GenerateResponse = r.into_json().map_err(|e| {
                    AppError::new(AI_GENERATION_MALFORMED, "Failed to decode generation response")
                        .with_details(e.to_string())
                })?;
                if v.response.trim().is_empty() {
                    return Err(AppError::new(
                        AI_GENERATION_MALFORMED,
                        "Generation response was empty",
                    ));
                }
                Ok(v.response)
            }
            Ok(r) => Err(
                AppError::new(AI_GENERATION_UNAVAILABLE, "Generation request failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(ureq::Error::Status(status, _)) => Err(
                AppError::new(AI_GENERATION_UNAVAILABLE, "Generation request failed")
                    .with_details(format!("status={status}"))
                    .with_retryable(status >= 500),
            ),
            Err(e) if is_timeout(&e) => Err(
                AppError::new(AI_GENERATION_TIMEOUT, "Generation request timed out")
                    .with_details(format!("timeout_ms={}", self.client.timeout().as_millis()))
                    .with_retryable(true),
            ),
            Err(e) => Err(
                AppError::new(AI_GENERATION_UNAVAILABLE, "Failed to call generation endpoint")
                    .with_details(e.to_string())
                    .with_retryable(true),
            ),
        }
    }
}
