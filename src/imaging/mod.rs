//! Image processing.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Shrink → WebP** | Lanczos3 + libwebp (`webp` crate) |
//! | **Shrink → JPEG** | Lanczos3 + `JpegEncoder` |
//! | **HEIC/HEIF decode** | `libheif-rs` (`heic` feature) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{fit_within, reduction_percent};
pub use operations::{
    FailedVariant, GeneratedVariant, Resize, SizeChange, SizesResult, generate_sizes,
    get_dimensions, optimize_image, output_path_for,
};
pub use params::{EncodeSpec, OutputFormat, Quality, TranscodeParams};
pub use rust_backend::{RustBackend, heic_supported};

/// Image encodings without broad browser support, converted by `convert`.
pub const LEGACY_EXTENSIONS: &[&str] = &["heic", "heif"];
