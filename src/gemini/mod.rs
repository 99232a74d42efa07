pub mod backend;
pub mod http;
pub mod image_client;
pub mod prompt;

pub use backend::{BackendError, GenerationBackend};
pub use http::GeminiHttpBackend;
pub use image_client::{GenerationRequest, TryOnClient};
pub use prompt::TRY_ON_PROMPT;
