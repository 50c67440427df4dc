//! Production image backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP, GIF, BMP, TIFF) | `image` crate |
//! | Decode (HEIC/HEIF) | `libheif-rs`, behind the `heic` feature |
//! | Resize | `image::DynamicImage::resize` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Encode → WebP (lossy) | `webp` crate (libwebp), quality + method |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::fit_within;
use super::params::{EncodeSpec, OutputFormat, TranscodeParams};
use super::LEGACY_EXTENSIONS;
use image::imageops::FilterType;
use image::{DynamicImage, ImageEncoder, ImageReader};
use std::path::Path;

/// Whether HEIC/HEIF decoding was compiled in.
pub fn heic_supported() -> bool {
    cfg!(feature = "heic")
}

/// Backend built on the `image` and `webp` crates.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn is_legacy(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| LEGACY_EXTENSIONS.iter().any(|l| e.eq_ignore_ascii_case(l)))
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    if is_legacy(path) {
        return decode_heif(path);
    }
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

#[cfg(feature = "heic")]
fn decode_heif(path: &Path) -> Result<DynamicImage, BackendError> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let heif_err = |e: libheif_rs::HeifError| {
        BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
    };
    let path_str = path
        .to_str()
        .ok_or_else(|| BackendError::Unsupported(format!("non UTF-8 path {}", path.display())))?;

    let lib = LibHeif::new();
    let ctx = HeifContext::read_from_file(path_str).map_err(heif_err)?;
    let handle = ctx.primary_image_handle().map_err(heif_err)?;
    let decoded = lib
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(heif_err)?;

    let planes = decoded.planes();
    let plane = planes.interleaved.ok_or_else(|| {
        BackendError::ProcessingFailed(format!("No interleaved plane in {}", path.display()))
    })?;

    // Rows may be padded past width * 3
    let row_bytes = plane.width as usize * 3;
    let mut rgb = Vec::with_capacity(row_bytes * plane.height as usize);
    for row in plane.data.chunks(plane.stride).take(plane.height as usize) {
        rgb.extend_from_slice(&row[..row_bytes]);
    }

    image::RgbImage::from_raw(plane.width, plane.height, rgb)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| {
            BackendError::ProcessingFailed(format!("Bad HEIF buffer in {}", path.display()))
        })
}

#[cfg(not(feature = "heic"))]
fn decode_heif(path: &Path) -> Result<DynamicImage, BackendError> {
    Err(BackendError::Unsupported(format!(
        "{}: HEIC/HEIF decoding not compiled in (build with --features heic)",
        path.display()
    )))
}

/// Encode and write `img` according to `spec`.
fn save_image(img: &DynamicImage, path: &Path, spec: &EncodeSpec) -> Result<(), BackendError> {
    match spec.format {
        OutputFormat::Jpeg => save_jpeg(img, path, spec.quality.value()),
        OutputFormat::Webp => save_webp(img, path, spec.quality.value(), spec.effort),
    }
}

fn save_jpeg(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    // JPEG has no alpha channel
    let rgb = img.to_rgb8();
    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality as u8)
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

fn save_webp(img: &DynamicImage, path: &Path, quality: u32, effort: u32) -> Result<(), BackendError> {
    let rgba = img.to_rgba8();
    let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());

    let mut config = webp::WebPConfig::new()
        .map_err(|_| BackendError::ProcessingFailed("WebP config init failed".into()))?;
    config.quality = quality as f32;
    config.method = effort.min(6) as i32;

    let encoded = encoder
        .encode_advanced(&config)
        .map_err(|e| BackendError::ProcessingFailed(format!("WebP encode failed: {:?}", e)))?;
    std::fs::write(path, &*encoded).map_err(BackendError::Io)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        if is_legacy(path) {
            let img = decode_heif(path)?;
            return Ok(Dimensions {
                width: img.width(),
                height: img.height(),
            });
        }
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn transcode(&self, params: &TranscodeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let (w, h) = fit_within(
            (img.width(), img.height()),
            params.max_width,
            params.max_height,
        );
        let img = if (w, h) == (img.width(), img.height()) {
            img
        } else {
            img.resize(w, h, FilterType::Lanczos3)
        };
        save_image(&img, &params.output, &params.encode)
    }
}
