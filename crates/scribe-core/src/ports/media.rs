//! Media storage port - where uploaded post images end up.

use async_trait::async_trait;

/// Image formats accepted for post uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Gif,
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    /// Identify the format and fully decode the payload. Truncated or
    /// corrupted files, and formats other than the accepted four, give `None`.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let guessed = image::guess_format(bytes).ok()?;
        let format = match guessed {
            image::ImageFormat::Gif => Self::Gif,
            image::ImageFormat::Png => Self::Png,
            image::ImageFormat::Jpeg => Self::Jpeg,
            image::ImageFormat::WebP => Self::Webp,
            _ => return None,
        };

        match image::load_from_memory_with_format(bytes, guessed) {
            Ok(_) => Some(format),
            Err(e) => {
                tracing::debug!(format = ?format, error = %e, "Rejected undecodable image");
                None
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }
}

/// A file submitted in the `image` field of a post form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Media store - persists uploaded files and hands back a relative path.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `bytes` under `dir` and return the path relative to the media root.
    async fn store(&self, dir: &str, format: ImageFormat, bytes: &[u8])
    -> Result<String, MediaError>;

    /// Remove a previously stored file. Missing files are not an error.
    async fn remove(&self, path: &str) -> Result<(), MediaError>;
}

/// Media storage errors.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("I/O failure: {0}")]
    Io(String),

    #[error("Invalid media path: {0}")]
    InvalidPath(String),
}
