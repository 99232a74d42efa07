//! Turns a user-selected image into an upload-ready [`EncodedImage`].
//!
//! The format is taken from the file signature first and from the caller's
//! hint (MIME type or file extension) second. Anything outside PNG, JPEG and
//! WEBP is rejected. Encoding itself is the same for every format.

use crate::{
    error::{Result, TryOnError},
    models::{EncodedImage, MediaType},
};
use std::path::{Path, PathBuf};

/// A raw image resource as handed over by the user.
#[derive(Debug, Clone)]
pub enum RawImage {
    File(PathBuf),
    Bytes {
        bytes: Vec<u8>,
        mime_type: Option<String>,
        name: Option<String>,
    },
}

impl RawImage {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        RawImage::File(path.into())
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>, mime_type: Option<&str>) -> Self {
        RawImage::Bytes {
            bytes: bytes.into(),
            mime_type: mime_type.map(String::from),
            name: None,
        }
    }
}

pub async fn encode(raw: RawImage) -> Result<EncodedImage> {
    match raw {
        RawImage::File(path) => encode_file(&path).await,
        RawImage::Bytes {
            bytes,
            mime_type,
            name,
        } => {
            let hint = mime_type.as_deref().and_then(MediaType::from_mime);
            encode_bytes(bytes, hint, name)
        }
    }
}

pub async fn encode_file(path: &Path) -> Result<EncodedImage> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        log::error!("Failed to read image {}: {}", path.display(), e);
        TryOnError::Encoding(format!("could not read {}: {}", path.display(), e))
    })?;

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(String::from);

    encode_bytes(bytes, MediaType::from_path(path), name)
}

pub fn encode_bytes(
    bytes: Vec<u8>,
    hint: Option<MediaType>,
    name: Option<String>,
) -> Result<EncodedImage> {
    if bytes.is_empty() {
        return Err(TryOnError::Encoding("image is empty".into()));
    }

    let media_type = MediaType::sniff(&bytes).or(hint).ok_or_else(|| {
        TryOnError::Encoding(format!(
            "unsupported image format{}; expected one of PNG, JPEG, WEBP",
            name.as_deref()
                .map(|n| format!(" for {}", n))
                .unwrap_or_default()
        ))
    })?;

    if let Some(hinted) = hint {
        if hinted != media_type {
            log::warn!(
                "Image {} is labelled {} but looks like {}; using {}",
                name.as_deref().unwrap_or("<bytes>"),
                hinted,
                media_type,
                media_type
            );
        }
    }

    let image = EncodedImage::new(bytes, media_type, name);
    log::debug!(
        "Encoded {} bytes of {} into {} base64 characters",
        image.len(),
        image.media_type(),
        image.payload().len()
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    use std::io::Write;

    fn sample(media_type: MediaType, body_len: usize) -> Vec<u8> {
        let mut bytes = match media_type {
            MediaType::Png => b"\x89PNG\r\n\x1a\n".to_vec(),
            MediaType::Jpeg => vec![0xFF, 0xD8, 0xFF, 0xE0],
            MediaType::Webp => b"RIFF\0\0\0\0WEBPVP8 ".to_vec(),
        };
        bytes.extend((0..body_len).map(|i| (i * 31 % 251) as u8));
        bytes
    }

    #[test]
    fn test_round_trip_for_every_accepted_type() {
        for media_type in MediaType::ACCEPTED {
            let original = sample(media_type, 4096);
            let encoded = encode_bytes(original.clone(), None, None).unwrap();
            assert_eq!(encoded.media_type(), media_type);
            assert_eq!(BASE64.decode(encoded.payload()).unwrap(), original);
            assert_eq!(encoded.bytes(), original.as_slice());
        }
    }

    #[test]
    fn test_hint_used_when_signature_unknown() {
        let encoded = encode_bytes(vec![1, 2, 3, 4], Some(MediaType::Webp), None).unwrap();
        assert_eq!(encoded.media_type(), MediaType::Webp);
    }

    #[test]
    fn test_signature_wins_over_hint() {
        let encoded =
            encode_bytes(sample(MediaType::Png, 8), Some(MediaType::Jpeg), None).unwrap();
        assert_eq!(encoded.media_type(), MediaType::Png);
    }

    #[test]
    fn test_rejects_empty_and_unknown() {
        assert!(matches!(
            encode_bytes(Vec::new(), Some(MediaType::Png), None),
            Err(TryOnError::Encoding(_))
        ));
        let err = encode_bytes(b"GIF89a....".to_vec(), None, Some("cat.gif".into())).unwrap_err();
        assert!(err.to_string().contains("cat.gif"));
    }

    #[tokio::test]
    async fn test_encode_file_uses_extension_and_name() {
        let mut file = tempfile::Builder::new().suffix(".jpeg").tempfile().unwrap();
        file.write_all(&[9, 9, 9, 9]).unwrap();

        let encoded = encode(RawImage::file(file.path())).await.unwrap();
        assert_eq!(encoded.media_type(), MediaType::Jpeg);
        assert!(encoded.source_name().unwrap().ends_with(".jpeg"));
    }

    #[tokio::test]
    async fn test_missing_file_is_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = encode_file(&dir.path().join("nope.png")).await.unwrap_err();
        assert!(matches!(err, TryOnError::Encoding(_)));
    }

    #[tokio::test]
    async fn test_encode_bytes_with_mime_hint() {
        let encoded = encode(RawImage::bytes(vec![7u8; 16], Some("image/png")))
            .await
            .unwrap();
        assert_eq!(encoded.media_type(), MediaType::Png);
        assert_eq!(encoded.len(), 16);
    }
}
