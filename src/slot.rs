use crate::{
    encoder::{self, RawImage},
    error::Result,
    models::EncodedImage,
};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Subject,
    Garment,
}

impl SlotKind {
    pub fn title(&self) -> &'static str {
        match self {
            SlotKind::Subject => "Your Photo",
            SlotKind::Garment => "The Dress",
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKind::Subject => f.write_str("subject"),
            SlotKind::Garment => f.write_str("garment"),
        }
    }
}

/// Holds at most one selected image. Selecting again replaces it.
#[derive(Debug, Clone)]
pub struct UploadSlot {
    kind: SlotKind,
    image: Option<EncodedImage>,
}

impl UploadSlot {
    pub fn new(kind: SlotKind) -> Self {
        Self { kind, image: None }
    }

    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    /// Encodes `raw` and stores it. On failure the previous image is kept.
    pub async fn select(&mut self, raw: RawImage) -> Result<&EncodedImage> {
        let image = encoder::encode(raw).await?;
        Ok(self.store(image))
    }

    pub fn store(&mut self, image: EncodedImage) -> &EncodedImage {
        log::info!(
            "📎 {} slot now holds {} ({} bytes)",
            self.kind,
            image.source_name().unwrap_or("unnamed image"),
            image.len()
        );
        self.image.insert(image)
    }

    pub fn current(&self) -> Option<&EncodedImage> {
        self.image.as_ref()
    }

    pub fn is_filled(&self) -> bool {
        self.image.is_some()
    }
}
