use crate::{
    config::GeminiConfig,
    error::{Result, TryOnError},
    gemini::{
        backend::{BackendError, GenerationBackend},
        http::GeminiHttpBackend,
        prompt::TRY_ON_PROMPT,
    },
    logger,
    models::{
        Content, EncodedImage, GenerateContentRequest, GenerateContentResponse, GeneratedImage,
        GenerationConfig, Modality, Part,
    },
};
use std::sync::Arc;

const UNKNOWN_FAILURE: &str = "An unknown error occurred while generating the image.";
const NO_DETAILS: &str = "No details provided.";
const DEFAULT_OUTPUT_MIME: &str = "image/png";

/// Both images plus the fixed instruction. Can only be built with both
/// images in hand.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub subject: EncodedImage,
    pub garment: EncodedImage,
}

impl GenerationRequest {
    pub fn new(subject: EncodedImage, garment: EncodedImage) -> Self {
        Self { subject, garment }
    }

    pub fn instruction(&self) -> &'static str {
        TRY_ON_PROMPT
    }

    pub fn to_wire(&self) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: vec![
                    Part::inline(self.subject.media_type().mime(), self.subject.payload()),
                    Part::inline(self.garment.media_type().mime(), self.garment.payload()),
                    Part::text(self.instruction()),
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec![Modality::Image, Modality::Text],
            },
        }
    }
}

#[derive(Clone)]
pub struct TryOnClient {
    backend: Arc<dyn GenerationBackend>,
}

impl TryOnClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let backend = GeminiHttpBackend::new(config)?;
        Ok(Self::with_backend(Arc::new(backend)))
    }

    pub fn with_backend(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    pub async fn generate(
        &self,
        subject: &EncodedImage,
        garment: &EncodedImage,
    ) -> Result<GeneratedImage> {
        self.generate_request(&GenerationRequest::new(subject.clone(), garment.clone()))
            .await
    }

    /// Sends one request and returns the first inline image of the first
    /// candidate. Never retries.
    pub async fn generate_request(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        log::info!("Generating try-on image with model: {}", self.model());
        log::debug!(
            "Subject: {} ({} bytes), garment: {} ({} bytes)",
            request.subject.media_type(),
            request.subject.len(),
            request.garment.media_type(),
            request.garment.len()
        );

        let timer = logger::timer("gemini generateContent");
        let outcome = self.backend.generate_content(&request.to_wire()).await;
        drop(timer);

        match outcome {
            Ok(response) => self.extract_image(&response),
            Err(e) => {
                log::error!("Error generating image with Gemini: {}", e);
                Err(transport_failure(&e))
            }
        }
    }

    fn extract_image(&self, response: &GenerateContentResponse) -> Result<GeneratedImage> {
        let parts = response.first_candidate_parts();

        if let Some(inline) = parts.iter().find_map(Part::image_data) {
            let mime_type = if inline.mime_type.is_empty() {
                DEFAULT_OUTPUT_MIME.to_string()
            } else {
                inline.mime_type.clone()
            };
            log::info!(
                "✅ Received {} image ({} base64 characters)",
                mime_type,
                inline.data.len()
            );
            return Ok(GeneratedImage {
                image_data: inline.data.clone(),
                mime_type,
                model: self.model().to_string(),
            });
        }

        let detail = parts
            .iter()
            .find_map(Part::text_content)
            .unwrap_or(NO_DETAILS);
        log::warn!("Model answered without an image: {}", detail);
        Err(TryOnError::Generation(format!(
            "Could not generate image. AI response: {}",
            detail
        )))
    }
}

fn transport_failure(e: &BackendError) -> TryOnError {
    let message = e.to_string();
    if message.trim().is_empty() {
        TryOnError::Generation(UNKNOWN_FAILURE.to_string())
    } else {
        TryOnError::Generation(format!("Failed to generate image: {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_bytes;
    use crate::models::{Candidate, MediaType};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Scripted {
        reply: std::result::Result<GenerateContentResponse, BackendError>,
        seen: Mutex<Vec<GenerateContentRequest>>,
    }

    impl Scripted {
        fn replying(parts: Vec<Part>) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(GenerateContentResponse {
                    candidates: vec![Candidate {
                        content: Some(Content {
                            role: Some("model".into()),
                            parts,
                        }),
                        finish_reason: None,
                    }],
                    prompt_feedback: None,
                }),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(err: BackendError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(err),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl GenerationBackend for Scripted {
        async fn generate_content(
            &self,
            request: &GenerateContentRequest,
        ) -> std::result::Result<GenerateContentResponse, BackendError> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone()
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn images() -> (EncodedImage, EncodedImage) {
        (
            encode_bytes(vec![0xFF, 0xD8, 0xFF, 0x01], None, None).unwrap(),
            encode_bytes(b"\x89PNG\r\n\x1a\n\x02".to_vec(), None, None).unwrap(),
        )
    }

    async fn run(backend: Arc<Scripted>) -> Result<GeneratedImage> {
        let (subject, garment) = images();
        TryOnClient::with_backend(backend).generate(&subject, &garment).await
    }

    #[tokio::test]
    async fn test_request_carries_both_images_then_prompt() {
        let backend = Scripted::replying(vec![Part::inline("image/png", "aW1n")]);
        run(backend.clone()).await.unwrap();

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let parts = &seen[0].contents[0].parts;
        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts[0].inline_data.as_ref().unwrap().mime_type,
            MediaType::Jpeg.mime()
        );
        assert_eq!(
            parts[1].inline_data.as_ref().unwrap().mime_type,
            MediaType::Png.mime()
        );
        assert_eq!(parts[2].text.as_deref(), Some(TRY_ON_PROMPT));
        assert_eq!(
            seen[0].generation_config.response_modalities,
            vec![Modality::Image, Modality::Text]
        );
    }

    #[tokio::test]
    async fn test_first_image_part_wins() {
        let backend = Scripted::replying(vec![
            Part::inline("image/png", "Zmlyc3Q="),
            Part::text("here you go"),
            Part::inline("image/png", "c2Vjb25k"),
        ]);
        let image = run(backend).await.unwrap();
        assert_eq!(image.image_data, "Zmlyc3Q=");
        assert_eq!(image.model, "scripted");
    }

    #[tokio::test]
    async fn test_image_after_text_still_wins() {
        let backend = Scripted::replying(vec![
            Part::text("Sure, here is the result"),
            Part::inline("", "aW1n"),
        ]);
        let image = run(backend).await.unwrap();
        assert_eq!(image.image_data, "aW1n");
        assert_eq!(image.mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_text_only_response_fails_with_text() {
        let backend = Scripted::replying(vec![
            Part::text(""),
            Part::text("I can't help with that."),
            Part::text("second text"),
        ]);
        let err = run(backend).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not generate image. AI response: I can't help with that."
        );
    }

    #[tokio::test]
    async fn test_empty_response_has_no_details() {
        let backend = Scripted::replying(Vec::new());
        let err = run(backend).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not generate image. AI response: No details provided."
        );

        let backend = Arc::new(Scripted {
            reply: Ok(GenerateContentResponse::default()),
            seen: Mutex::new(Vec::new()),
        });
        let err = run(backend).await.unwrap_err();
        assert!(err.to_string().ends_with("No details provided."));
    }

    #[tokio::test]
    async fn test_transport_errors_are_wrapped() {
        let err = run(Scripted::failing(BackendError::Service {
            status: 429,
            message: Some("Resource has been exhausted".into()),
        }))
        .await
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to generate image: Resource has been exhausted"
        );

        let err = run(Scripted::failing(BackendError::Transport(String::new())))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), UNKNOWN_FAILURE);
    }

    #[tokio::test]
    async fn test_decode_errors_are_wrapped() {
        let err = run(Scripted::failing(BackendError::Decode(
            "invalid response body: expected value at line 1 column 1".into(),
        )))
        .await
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to generate image: invalid response body: expected value at line 1 column 1"
        );
    }
}
