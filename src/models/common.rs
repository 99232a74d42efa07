use crate::models::image::GeneratedImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one generation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum AttemptState {
    Idle,
    InProgress,
    Succeeded(GeneratedImage),
    Failed(String),
}

impl AttemptState {
    pub fn name(&self) -> &'static str {
        match self {
            AttemptState::Idle => "idle",
            AttemptState::InProgress => "in_progress",
            AttemptState::Succeeded(_) => "succeeded",
            AttemptState::Failed(_) => "failed",
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, AttemptState::InProgress)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, AttemptState::Succeeded(_) | AttemptState::Failed(_))
    }

    pub fn image(&self) -> Option<&GeneratedImage> {
        match self {
            AttemptState::Succeeded(image) => Some(image),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AttemptState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

impl Default for AttemptState {
    fn default() -> Self {
        AttemptState::Idle
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a single generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Success(GeneratedImage),
    Failure(String),
}

impl From<crate::error::Result<GeneratedImage>> for GenerationResult {
    fn from(result: crate::error::Result<GeneratedImage>) -> Self {
        match result {
            Ok(image) => GenerationResult::Success(image),
            Err(e) => GenerationResult::Failure(e.to_string()),
        }
    }
}
