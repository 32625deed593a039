use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::ImageReader;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while loading an uploaded image or a data URI
#[derive(Debug, Error)]
pub enum SourceImageError {
    #[error("Failed to read image file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Unsupported image data: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image data is empty")]
    Empty,
}

/// An encoded image (upload, style reference or previous result) ready to be
/// sent to the generation API.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceImage {
    mime: String,
    bytes: Arc<[u8]>,
    dimensions: Option<(u32, u32)>,
}

// Bytes are omitted, they are usually megabytes of image data
impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceImage")
            .field("mime", &self.mime)
            .field("bytes_len", &self.bytes.len())
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl SourceImage {
    /// Wrap encoded image bytes, sniffing the format and natural size.
    ///
    /// `fallback_mime` is used when the format cannot be recognised; in that
    /// case the dimensions stay unknown and the mask surface cannot be sized.
    pub fn from_bytes(
        bytes: impl Into<Arc<[u8]>>,
        fallback_mime: &str,
    ) -> Result<Self, SourceImageError> {
        let bytes: Arc<[u8]> = bytes.into();
        if bytes.is_empty() {
            return Err(SourceImageError::Empty);
        }

        let reader = ImageReader::new(Cursor::new(&bytes[..])).with_guessed_format()?;
        let mime = reader
            .format()
            .map(|format| format.to_mime_type().to_owned())
            .unwrap_or_else(|| fallback_mime.to_owned());

        let dimensions = match reader.into_dimensions() {
            Ok(dims) => Some(dims),
            Err(err) => {
                log::warn!("Could not read image dimensions ({}): {}", mime, err);
                None
            }
        };

        Ok(Self { mime, bytes, dimensions })
    }

    /// Decode a `data:<mime>;base64,<payload>` URI. A bare base64 payload is
    /// accepted as well and treated as PNG unless the bytes say otherwise.
    pub fn from_data_uri(uri: &str) -> Result<Self, SourceImageError> {
        let (mime, payload) = split_data_uri(uri);
        let bytes = BASE64.decode(payload.trim())?;
        Self::from_bytes(bytes, mime.unwrap_or("image/png"))
    }

    /// Read an image file from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceImageError> {
        let path = path.as_ref();
        log::info!("Loading image from path: {}", path.display());
        let bytes = std::fs::read(path)?;
        let fallback = match path.extension().map(|ext| ext.to_string_lossy().to_lowercase()) {
            Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
            Some(ext) if ext == "webp" => "image/webp",
            Some(ext) if ext == "heic" => "image/heic",
            _ => "image/png",
        };
        Self::from_bytes(bytes, fallback)
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Natural pixel size, if the format could be decoded
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    pub fn to_data_uri(&self) -> String {
        to_data_uri(&self.mime, &self.bytes)
    }
}

/// Encode bytes as a base64 `data:` URI
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Split a data URI into its declared mime type and base64 payload.
pub(crate) fn split_data_uri(uri: &str) -> (Option<&str>, &str) {
    let Some(rest) = uri.strip_prefix("data:") else {
        return (None, uri);
    };
    match rest.split_once(',') {
        Some((header, payload)) => {
            let mime = header.strip_suffix(";base64").unwrap_or(header);
            let mime = if mime.is_empty() { None } else { Some(mime) };
            (mime, payload)
        }
        None => (None, rest),
    }
}
