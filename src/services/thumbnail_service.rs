use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, Rgb, RgbImage};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::services::storage::{BlobStorage, Namespace};

pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "bmp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailOutcome {
    /// Storage key of the new thumbnail.
    Produced(String),
    /// The file is not a raster format we thumbnail.
    Skipped,
    Failed(String),
}

pub struct ThumbnailGenerator {
    storage: Arc<BlobStorage>,
    max_dimension: u32,
    quality: u8,
}

impl ThumbnailGenerator {
    pub fn new(storage: Arc<BlobStorage>, max_dimension: u32, quality: u8) -> Self {
        Self {
            storage,
            max_dimension,
            quality,
        }
    }

    pub fn is_supported(file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
    }

    /// Renders and stores a thumbnail for the blob at `file_key`. Never errors.
    pub async fn generate(&self, file_key: &str) -> ThumbnailOutcome {
        if !Self::is_supported(file_key) {
            debug!(file = %file_key, "no thumbnail for this file type");
            return ThumbnailOutcome::Skipped;
        }

        let bytes = match self.storage.read(file_key).await {
            Ok(bytes) => bytes,
            Err(e) => return failed(file_key, format!("read failed: {}", e)),
        };

        let max_dimension = self.max_dimension;
        let quality = self.quality;
        let rendered =
            tokio::task::spawn_blocking(move || render_thumbnail(&bytes, max_dimension, quality))
                .await;

        let jpeg = match rendered {
            Ok(Ok(jpeg)) => jpeg,
            Ok(Err(e)) => return failed(file_key, format!("image processing failed: {}", e)),
            Err(e) => return failed(file_key, format!("thumbnail task failed: {}", e)),
        };

        match self
            .storage
            .store(Namespace::Thumbnails, "thumbnail.jpg", &jpeg)
            .await
        {
            Ok(key) => {
                debug!(file = %file_key, thumbnail = %key, "thumbnail created");
                ThumbnailOutcome::Produced(key)
            }
            Err(e) => failed(file_key, format!("write failed: {}", e)),
        }
    }
}

fn failed(file_key: &str, reason: String) -> ThumbnailOutcome {
    warn!(file = %file_key, reason = %reason, "thumbnail generation failed");
    ThumbnailOutcome::Failed(reason)
}

/// Decode, flatten transparency onto white, shrink to fit `max_dimension`, encode as JPEG.
pub fn render_thumbnail(
    bytes: &[u8],
    max_dimension: u32,
    quality: u8,
) -> Result<Vec<u8>, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;

    let rgb = if decoded.color().has_alpha() {
        flatten_on_white(&decoded)
    } else {
        decoded.to_rgb8()
    };

    let rgb = if rgb.width() > max_dimension || rgb.height() > max_dimension {
        DynamicImage::ImageRgb8(rgb)
            .resize(max_dimension, max_dimension, FilterType::Lanczos3)
            .into_rgb8()
    } else {
        rgb
    };

    let mut buf = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;
    Ok(buf)
}

fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let mut flat = RgbImage::new(rgba.width(), rgba.height());

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        flat.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }

    flat
}
