//! Shared test utilities for the simple-catalog test suite.
//!
//! Builds throwaway catalog trees in a temp directory and synthesizes small
//! real images for the optimizer tests.
//!
//! ```ignore
//! let tmp = catalog_root();
//! let root = tmp.path().join("Catalogo");
//! write_product(&root, "Sillas", "SillaRoja", Some("Silla Roja\n15.000\nComoda"), &["1.jpg"]);
//! ```

use image::{ImageEncoder, RgbImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Catalog trees
// =========================================================================

/// A fresh temp directory to hold a `Catalogo/` root (not created yet).
pub fn catalog_root() -> TempDir {
    TempDir::new().unwrap()
}

/// Create `<root>/<category>/<product>/` with an optional `info.txt` and
/// placeholder files in `imagenes/`.
///
/// Scanning only looks at extensions, so the image files hold dummy bytes.
/// An empty `images` slice still creates the `imagenes/` directory.
pub fn write_product(
    root: &Path,
    category: &str,
    product: &str,
    info: Option<&str>,
    images: &[&str],
) {
    let dir = root.join(category).join(product);
    let image_dir = dir.join("imagenes");
    fs::create_dir_all(&image_dir).unwrap();
    if let Some(text) = info {
        fs::write(dir.join("info.txt"), text).unwrap();
    }
    for name in images {
        fs::write(image_dir.join(name), "fake image").unwrap();
    }
}

// =========================================================================
// Synthetic images
// =========================================================================

/// Write a small valid JPEG with a gradient so it does not compress to nothing.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new_with_quality(writer, 95)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a small valid PNG.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([((x * 7) % 256) as u8, ((y * 3) % 256) as u8, 40])
    });
    img.save(path).unwrap();
}
