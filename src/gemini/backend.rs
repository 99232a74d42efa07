use crate::models::{GenerateContentRequest, GenerateContentResponse};
use async_trait::async_trait;
use thiserror::Error;

/// Failure of the outbound call itself, before any response parts are read.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("{0}")]
    Transport(String),

    #[error("{}", service_message(.status, .message))]
    Service { status: u16, message: Option<String> },

    #[error("{0}")]
    Decode(String),
}

fn service_message(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(m) if !m.trim().is_empty() => m.clone(),
        _ => format!("HTTP {}", status),
    }
}

/// One `generateContent` round trip.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> std::result::Result<GenerateContentResponse, BackendError>;

    fn model(&self) -> &str;
}
