//! Card photo normalization before upload.
//!
//! Phone photos of an ID card are often 12+ megapixels. The model reads the
//! card just as well at 1024 px, so every upload is bounded, re-encoded as
//! JPEG and base64-encoded for the JSON request body.
//!
//! Steps:
//! 1. Validate bytes (non-empty, size cap)
//! 2. Decode
//! 3. Apply EXIF orientation (browsers do the same when drawing to a canvas)
//! 4. Scale so the longer edge is at most `max_dimension`, aspect preserved
//! 5. Encode JPEG at fixed quality, then base64 (no data-URI prefix)
//!
//! Images already within bounds keep their size but are still re-encoded,
//! so some quality loss is expected even for small inputs.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageOutputFormat, RgbImage};
use thiserror::Error;
use tracing::debug;

// ═══════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════

/// Longest allowed edge of a normalized image, in pixels.
pub const MAX_DIMENSION: u32 = 1024;

/// JPEG quality (0-100). Equivalent to 0.8 on a 0-1 scale.
pub const JPEG_QUALITY: u8 = 80;

/// Mime type of every normalized payload.
pub const OUTPUT_MIME_TYPE: &str = "image/jpeg";

/// Maximum input size in bytes before rejecting.
/// Prevents OOM on corrupt/adversarial files.
const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024; // 50 MB

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Cannot decode image: {0}")]
    Decode(String),

    #[error("Image is {size} bytes, above the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("JPEG encoding failed: {0}")]
    Encode(String),
}

// ═══════════════════════════════════════════════════════════
// Configuration
// ═══════════════════════════════════════════════════════════

/// Resize filter quality levels.
///
/// CatmullRom is preferred over Lanczos3 for printed text: Lanczos3 rings
/// around high-contrast edges, and card text is nothing but those.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeQuality {
    /// CatmullRom (cubic spline).
    High,
    /// Triangle (bilinear).
    Fast,
}

impl ResizeQuality {
    fn filter_type(self) -> FilterType {
        match self {
            ResizeQuality::High => FilterType::CatmullRom,
            ResizeQuality::Fast => FilterType::Triangle,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    pub max_dimension: u32,
    pub jpeg_quality: u8,
    pub resize_filter: ResizeQuality,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            max_dimension: MAX_DIMENSION,
            jpeg_quality: JPEG_QUALITY,
            resize_filter: ResizeQuality::High,
        }
    }
}

impl NormalizeConfig {
    /// Bilinear resampling, for slow machines.
    pub fn fast() -> Self {
        Self {
            resize_filter: ResizeQuality::Fast,
            ..Self::default()
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Service traits
// ═══════════════════════════════════════════════════════════

/// Fixes image orientation from EXIF metadata.
///
/// Phone photos embed rotation in EXIF tag 0x0112. Without correction a
/// portrait shot of the card reaches the model sideways.
pub trait OrientationCorrector: Send + Sync {
    /// `raw_bytes`: original file bytes (needed for EXIF reading).
    /// Returns the corrected image. No-op if no EXIF or orientation=1.
    fn correct(&self, raw_bytes: &[u8], image: DynamicImage) -> DynamicImage;
}

/// Turns a raw uploaded file into a bounded, transport-ready payload.
pub trait ImageNormalizer: Send + Sync {
    fn normalize(&self, image_bytes: &[u8]) -> Result<NormalizedImage, NormalizeError>;
}

/// Result of normalization.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// JPEG bytes as standard base64, without a `data:` prefix.
    pub base64: String,
    /// Output dimensions.
    pub width: u32,
    pub height: u32,
    /// Dimensions after orientation, before scaling.
    pub source_width: u32,
    pub source_height: u32,
    /// Size of the JPEG before base64.
    pub encoded_len: usize,
}

// ═══════════════════════════════════════════════════════════
// JpegNormalizer
// ═══════════════════════════════════════════════════════════

/// Production normalizer: orientation fix, bounded resize, JPEG encode.
pub struct JpegNormalizer {
    orientation: Box<dyn OrientationCorrector>,
    config: NormalizeConfig,
}

impl JpegNormalizer {
    pub fn new(orientation: Box<dyn OrientationCorrector>, config: NormalizeConfig) -> Self {
        Self {
            orientation,
            config,
        }
    }

    pub fn config(&self) -> &NormalizeConfig {
        &self.config
    }
}

impl Default for JpegNormalizer {
    fn default() -> Self {
        Self::new(Box::new(ExifOrientationCorrector), NormalizeConfig::default())
    }
}

impl ImageNormalizer for JpegNormalizer {
    fn normalize(&self, image_bytes: &[u8]) -> Result<NormalizedImage, NormalizeError> {
        validate_image_bytes(image_bytes)?;

        let img = image::load_from_memory(image_bytes)
            .map_err(|e| NormalizeError::Decode(e.to_string()))?;
        let img = self.orientation.correct(image_bytes, img);
        let (source_w, source_h) = img.dimensions();

        // JPEG carries no alpha; drop it before resampling.
        let rgb = img.to_rgb8();

        let (width, height) =
            compute_bounded_dimensions(source_w, source_h, self.config.max_dimension);
        let resized = image::imageops::resize(
            &rgb,
            width,
            height,
            self.config.resize_filter.filter_type(),
        );

        let jpeg = encode_jpeg(&resized, self.config.jpeg_quality)?;
        let encoded_len = jpeg.len();
        let base64 = STANDARD.encode(&jpeg);

        debug!(
            source = format!("{source_w}x{source_h}"),
            output = format!("{width}x{height}"),
            jpeg_bytes = encoded_len,
            "Image normalized for upload"
        );

        Ok(NormalizedImage {
            base64,
            width,
            height,
            source_width: source_w,
            source_height: source_h,
            encoded_len,
        })
    }
}

// ── Orientation ───────────────────────────────────────────

/// EXIF-based orientation correction for phone photos.
///
/// EXIF orientation values:
/// 1 = Normal, 2 = Mirrored, 3 = 180deg, 4 = Flipped V,
/// 5 = Mirrored + 90deg CW, 6 = 90deg CW, 7 = Mirrored + 270deg CW, 8 = 270deg CW
pub struct ExifOrientationCorrector;

impl OrientationCorrector for ExifOrientationCorrector {
    fn correct(&self, raw_bytes: &[u8], image: DynamicImage) -> DynamicImage {
        let orientation = read_exif_orientation(raw_bytes);
        apply_orientation(image, orientation)
    }
}

/// Leaves the decoded image as-is.
pub struct NoOpOrientationCorrector;

impl OrientationCorrector for NoOpOrientationCorrector {
    fn correct(&self, _raw_bytes: &[u8], image: DynamicImage) -> DynamicImage {
        image
    }
}

/// Read EXIF orientation tag from raw image bytes.
/// Returns 1 (normal) if no EXIF data or tag not present.
pub fn read_exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    let reader = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(r) => r,
        Err(_) => return 1,
    };

    reader
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1)
}

pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

// ═══════════════════════════════════════════════════════════
// Pure helpers
// ═══════════════════════════════════════════════════════════

/// Reject input that cannot possibly decode before spending time on it.
pub fn validate_image_bytes(bytes: &[u8]) -> Result<(), NormalizeError> {
    if bytes.is_empty() {
        return Err(NormalizeError::Decode("file is empty".into()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(NormalizeError::TooLarge {
            size: bytes.len(),
            limit: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

/// Output dimensions for an image bounded by `max_dimension`.
///
/// When the longer edge exceeds the bound it becomes exactly `max_dimension`
/// and the shorter edge is scaled by the same factor, rounded to nearest.
/// Images within bounds are returned unchanged. Never upscales.
pub fn compute_bounded_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_dimension || width == 0 || height == 0 {
        return (width.max(1), height.max(1));
    }

    let scale = max_dimension as f64 / longest as f64;
    let scale_edge = |edge: u32| ((edge as f64 * scale).round() as u32).clamp(1, max_dimension);

    if width >= height {
        (max_dimension, scale_edge(height))
    } else {
        (scale_edge(width), max_dimension)
    }
}

/// Encode an RGB image as JPEG at the given quality.
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>, NormalizeError> {
    let dynamic = DynamicImage::ImageRgb8(img.clone());
    let mut cursor = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut cursor, ImageOutputFormat::Jpeg(quality))
        .map_err(|e| NormalizeError::Encode(e.to_string()))?;
    Ok(cursor.into_inner())
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
