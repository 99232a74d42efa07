//! rtryon: a virtual fitting room on top of Gemini's image model.
//!
//! Pick a photo of a person and a photo of a dress, and the
//! [`Orchestrator`] sends both to Gemini with a fixed styling prompt and
//! reports the attempt through [`AttemptState`].
//!
//! ```rust,no_run
//! use rtryon::{GeminiConfig, Orchestrator, RawImage};
//!
//! # async fn run() -> rtryon::Result<()> {
//! let config = GeminiConfig::from_env()?;
//! let orchestrator = Orchestrator::from_config(&config)?;
//! orchestrator.set_subject_image(RawImage::file("me.jpg")).await?;
//! orchestrator.set_garment_image(RawImage::file("dress.png")).await?;
//! let state = orchestrator.invoke().await?;
//! if let Some(image) = state.image() {
//!     println!("{}", image.to_data_url());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod slot;
pub mod state;
pub mod status;

pub use config::GeminiConfig;
pub use encoder::RawImage;
pub use error::{Result, TryOnError};
pub use gemini::{BackendError, GenerationBackend, GenerationRequest, TryOnClient};
pub use models::{AttemptState, EncodedImage, GeneratedImage, GenerationResult, MediaType};
pub use orchestrator::Orchestrator;
pub use slot::{SlotKind, UploadSlot};
pub use state::ResultStateMachine;
pub use status::STATUS_MESSAGES;
