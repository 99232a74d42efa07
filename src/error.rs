use thiserror::Error;

/// Shown to the user when a selected file cannot be turned into an upload.
pub const FILE_PROCESSING_MESSAGE: &str = "There was an error processing your file.";

#[derive(Debug, Error)]
pub enum TryOnError {
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("A generation attempt is already in progress")]
    AttemptInFlight,

    #[error("Invalid state transition: cannot {event} while {from}")]
    InvalidTransition { from: &'static str, event: &'static str },
}

impl TryOnError {
    /// Text suitable for showing to an end user. Encoding failures collapse
    /// to a fixed message; everything else is already human readable.
    pub fn user_message(&self) -> String {
        match self {
            TryOnError::Encoding(_) => FILE_PROCESSING_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, TryOnError::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, TryOnError>;
