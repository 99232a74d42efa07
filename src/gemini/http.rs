use crate::{
    config::GeminiConfig,
    error::{Result, TryOnError},
    gemini::backend::{BackendError, GenerationBackend},
    models::{ApiErrorBody, GenerateContentRequest, GenerateContentResponse},
};
use async_trait::async_trait;
use reqwest::StatusCode;

/// Talks to the Gemini REST API over HTTPS.
#[derive(Clone)]
pub struct GeminiHttpBackend {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GeminiHttpBackend {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| TryOnError::Configuration(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationBackend for GeminiHttpBackend {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> std::result::Result<GenerateContentResponse, BackendError> {
        log::debug!("POST {}", self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                log::error!("Gemini transport error: {:?}", e);
                BackendError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(service_error(status, &body));
        }
        decode_response(&body)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Maps a non-2xx reply to [`BackendError::Service`], taking the message from
/// the Gemini error body when there is one.
fn service_error(status: StatusCode, body: &str) -> BackendError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| {
            log::error!(
                "Gemini service error code: {:?}, status: {:?}",
                b.error.code,
                b.error.status
            );
            b.error.message
        });
    BackendError::Service {
        status: status.as_u16(),
        message,
    }
}

fn decode_response(body: &str) -> std::result::Result<GenerateContentResponse, BackendError> {
    serde_json::from_str(body).map_err(|e| {
        log::error!("Could not parse Gemini response: {}", e);
        BackendError::Decode(format!("invalid response body: {}", e))
    })
}
