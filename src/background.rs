use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{error, info};
use thiserror::Error;

use crate::raster::RasterImage;

/// The single persisted key: a data-URL-encoded background image.
pub const BACKGROUND_KEY: &str = "background_image";

/// Maximum encoded (data-URL) size accepted for persistence.
pub const MAX_BACKGROUND_BYTES: usize = 5 * 1024 * 1024;

/// Errors from selecting or restoring a background image. Every one of
/// these is recovered locally: the prior background stays in place and the
/// user is notified.
#[derive(Debug, Error)]
pub enum BackgroundError {
    #[error("background image is {size} bytes encoded, over the {MAX_BACKGROUND_BYTES} byte limit")]
    TooLarge { size: usize },
    #[error("could not decode background image: {0}")]
    Decode(String),
    #[error("persisted background entry is not a data URL")]
    MalformedEntry,
}

/// Persists exactly one string value per key. The app adapts
/// `eframe::Storage` to this; tests use [`MemoryBlobStore`].
pub trait BlobStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// In-memory store for tests and headless use.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    entries: std::collections::HashMap<String, String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_owned(), value);
    }
}

/// Encode raw image bytes as a `data:<mime>;base64,...` URL.
pub fn encode_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Decode a data URL back to raw bytes.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, BackgroundError> {
    let payload = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_mime, payload)| payload)
        .ok_or(BackgroundError::MalformedEntry)?;
    STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| BackgroundError::Decode(e.to_string()))
}

/// The optional background image shown beneath the canvas.
///
/// Not part of the action log: replay stays a function of the log alone,
/// and the background is composited underneath at display time.
#[derive(Debug, Default)]
pub struct Background {
    data_url: Option<String>,
    image: Option<RasterImage>,
}

impl Background {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self) -> Option<&RasterImage> {
        self.image.as_ref()
    }

    pub fn data_url(&self) -> Option<&str> {
        self.data_url.as_deref()
    }

    /// Replace the background with a newly selected image.
    ///
    /// The encoded entry must fit the persistence cap and the bytes must
    /// decode as an image; otherwise the current background is left
    /// untouched and the error is returned for the user to see.
    pub fn set_from_bytes(&mut self, bytes: &[u8]) -> Result<(), BackgroundError> {
        let mime = image::guess_format(bytes)
            .map(|f| f.to_mime_type())
            .unwrap_or("application/octet-stream");
        let url = encode_data_url(bytes, mime);
        if url.len() > MAX_BACKGROUND_BYTES {
            return Err(BackgroundError::TooLarge { size: url.len() });
        }
        let image = decode_image(bytes)?;
        info!(
            "background set: {}x{}, {} bytes encoded",
            image.width(),
            image.height(),
            url.len()
        );
        self.data_url = Some(url);
        self.image = Some(image);
        Ok(())
    }

    /// Write the background entry if one is set.
    pub fn save<S: BlobStore + ?Sized>(&self, store: &mut S) {
        if let Some(url) = &self.data_url {
            store.set(BACKGROUND_KEY, url.clone());
        }
    }

    /// Restore the background from the persisted entry, if present.
    ///
    /// A missing or unreadable entry yields an empty background; restore
    /// failures are logged but never fatal.
    pub fn load<S: BlobStore + ?Sized>(store: &S) -> Self {
        let Some(url) = store.get(BACKGROUND_KEY) else {
            return Self::default();
        };
        match decode_data_url(&url).and_then(|bytes| decode_image(&bytes)) {
            Ok(image) => {
                info!("background restored: {}x{}", image.width(), image.height());
                Self {
                    data_url: Some(url),
                    image: Some(image),
                }
            }
            Err(e) => {
                error!("could not restore persisted background: {e}");
                Self::default()
            }
        }
    }
}

fn decode_image(bytes: &[u8]) -> Result<RasterImage, BackgroundError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| BackgroundError::Decode(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(RasterImage::from_rgba_unmultiplied(size, &rgba.into_raw()))
}
