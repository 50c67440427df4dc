//! Catalog directory scanning.
//!
//! Stage 1 of the catalog build. Walks the catalog root and turns every valid
//! product directory into a [`ProductRecord`].
//!
//! ## Directory Structure
//!
//! ```text
//! Catalogo/                        # Catalog root
//! ├── catalog.toml                 # Optional config (ignored by the scan)
//! ├── Sillas/                      # Category
//! │   ├── SillaRoja/               # Product
//! │   │   ├── info.txt             # name / price / description...
//! │   │   └── imagenes/
//! │   │       ├── 1.jpg
//! │   │       ├── 2.jpg
//! │   │       └── 10.jpg
//! │   └── SillaAzul/
//! │       └── ...
//! └── Mesas/
//!     └── ...
//! ```
//!
//! ## info.txt
//!
//! Blank lines are ignored and every line is trimmed. The first line is the
//! name, the second the price, and everything after is the description
//! (joined with single spaces):
//!
//! ```text
//! Silla Roja
//! 15.000
//! Comoda silla de madera
//! ```
//!
//! ## Ordering
//!
//! Categories, products and images are all sorted with
//! [`natural_cmp`](crate::naming::natural_cmp), so the output never depends
//! on filesystem listing order.
//!
//! ## Validation
//!
//! A broken product never aborts the scan. It is reported as a [`Skipped`]
//! entry carrying a [`SkipReason`]; only a missing catalog root is fatal.

use crate::imaging::LEGACY_EXTENSIONS;
use crate::naming::sort_natural;
use crate::types::ProductRecord;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Catalog root not found: {0}")]
    RootNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a product directory was left out of the catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("missing info file")]
    MissingInfo,
    #[error("unreadable info file: {0}")]
    UnreadableInfo(String),
    #[error("info file has {0} non-blank lines, at least 3 required")]
    TooFewLines(usize),
    #[error("name too short")]
    NameTooShort,
    #[error("description too short")]
    DescriptionTooShort,
    #[error("missing image directory")]
    MissingImageDir,
    #[error("unreadable image directory: {0}")]
    UnreadableImageDir(String),
    #[error("no recognized images")]
    NoImages,
}

/// A product directory that did not make it into the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Result of a full scan: accepted products in traversal order plus skips.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub products: Vec<ProductRecord>,
    pub skipped: Vec<Skipped>,
}

/// Image formats accepted by the strict variant.
pub const STRICT_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "heic", "heif", "bmp", "tiff",
];

/// Image formats accepted by the lenient variant.
pub const LENIENT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "heic", "heif"];

/// Validation thresholds and layout names used while scanning.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRules {
    /// Minimum name length in characters.
    pub min_name_len: usize,
    /// Minimum description length in characters (0 = any).
    pub min_description_len: usize,
    /// Accepted image extensions, lowercase, without the dot.
    pub extensions: Vec<String>,
    pub info_file: String,
    pub image_dir: String,
}

impl ScanRules {
    pub fn strict() -> Self {
        Self {
            min_name_len: 2,
            min_description_len: 5,
            extensions: STRICT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            info_file: "info.txt".to_string(),
            image_dir: "imagenes".to_string(),
        }
    }

    pub fn lenient() -> Self {
        Self {
            min_name_len: 1,
            min_description_len: 0,
            extensions: LENIENT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            ..Self::strict()
        }
    }

    fn accepts(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.extensions.iter().any(|e| *e == ext))
    }
}

impl Default for ScanRules {
    fn default() -> Self {
        Self::strict()
    }
}

/// Parsed `info.txt` contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInfo {
    pub name: String,
    pub price: u64,
    pub description: String,
}

/// Scan the catalog root into products and skip reasons.
pub fn scan(root: &Path, rules: &ScanRules) -> Result<ScanReport, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }
    let root_name = root_name(root);
    let mut report = ScanReport::default();

    for category in list_subdirs(root)? {
        let category_dir = root.join(&category);
        let products = match list_subdirs(&category_dir) {
            Ok(products) => products,
            Err(e) => {
                tracing::warn!(path = %category_dir.display(), error = %e, "skipping unreadable category");
                continue;
            }
        };
        tracing::debug!(category = %category, products = products.len(), "scanning category");

        for product in products {
            let product_dir = category_dir.join(&product);
            match scan_product(&product_dir, &root_name, &category, &product, rules) {
                Ok(record) => report.products.push(record),
                Err(reason) => {
                    tracing::warn!(path = %product_dir.display(), %reason, "skipping product");
                    report.skipped.push(Skipped {
                        path: product_dir,
                        reason,
                    });
                }
            }
        }
    }

    Ok(report)
}

fn scan_product(
    product_dir: &Path,
    root_name: &str,
    category: &str,
    product: &str,
    rules: &ScanRules,
) -> Result<ProductRecord, SkipReason> {
    let info_path = product_dir.join(&rules.info_file);
    if !info_path.is_file() {
        return Err(SkipReason::MissingInfo);
    }
    let text =
        fs::read_to_string(&info_path).map_err(|e| SkipReason::UnreadableInfo(e.to_string()))?;
    let info = parse_info(&text, rules)?;

    let images = collect_images(&product_dir.join(&rules.image_dir), rules)?;
    let prefix = [root_name, category, product, rules.image_dir.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");

    Ok(ProductRecord {
        category: category.to_lowercase(),
        name: info.name,
        price: info.price,
        description: info.description,
        images: images
            .into_iter()
            .map(|file| format!("{prefix}/{file}"))
            .collect(),
    })
}

/// Parse the text of an `info.txt` file.
pub fn parse_info(text: &str, rules: &ScanRules) -> Result<ProductInfo, SkipReason> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let [name, price, description @ ..] = lines.as_slice() else {
        return Err(SkipReason::TooFewLines(lines.len()));
    };
    if description.is_empty() {
        return Err(SkipReason::TooFewLines(lines.len()));
    }

    if name.chars().count() < rules.min_name_len {
        return Err(SkipReason::NameTooShort);
    }

    let description = description.join(" ");
    if description.chars().count() < rules.min_description_len {
        return Err(SkipReason::DescriptionTooShort);
    }

    Ok(ProductInfo {
        name: name.to_string(),
        price: parse_price(price),
        description,
    })
}

/// Parse a price line into whole currency units.
///
/// Only digits, `.` and `,` are kept. A separator followed by exactly three
/// digits (then the end or another separator) is a thousands separator and
/// is dropped, unless the leading group is `0`; any other separator is the
/// decimal point. The value is rounded to the nearest integer. Negative or
/// unparsable input yields 0.
///
/// A `-` is a sign only when nothing but spaces and currency symbols
/// surround it before the first digit, so a label such as `"Oferta - 15.000"`
/// keeps its price.
///
/// - `"15000"` → 15000
/// - `"15.000"` / `"$ 15,000"` → 15000
/// - `"1.234,56"` → 1235
/// - `"0.500"` → 1
/// - `"abc"` / `"-5"` / `"$ -5"` → 0
pub fn parse_price(raw: &str) -> u64 {
    let prefix = raw.split(|c: char| c.is_ascii_digit()).next().unwrap_or("");
    let negative = prefix.contains('-')
        && prefix
            .chars()
            .all(|c| c == '-' || c.is_whitespace() || matches!(c, '$' | '€' | '£'));
    if negative {
        return 0;
    }

    let kept: Vec<char> = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    let mut normalized = String::with_capacity(kept.len());
    let mut seen_decimal = false;
    for (i, &c) in kept.iter().enumerate() {
        if c.is_ascii_digit() {
            normalized.push(c);
            continue;
        }
        let run = kept[i + 1..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count();
        let after_run = kept.get(i + 1 + run);
        let has_digits_before = normalized.chars().any(|c| c.is_ascii_digit());
        let is_thousands = !seen_decimal
            && has_digits_before
            && !normalized.starts_with('0')
            && run == 3
            && after_run.is_none_or(|c| *c == '.' || *c == ',');
        if is_thousands {
            continue;
        }
        if seen_decimal {
            break;
        }
        seen_decimal = true;
        normalized.push('.');
    }

    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value.round() as u64,
        _ => 0,
    }
}

/// List accepted image file names in a product's image directory, naturally sorted.
fn collect_images(dir: &Path, rules: &ScanRules) -> Result<Vec<String>, SkipReason> {
    if !dir.is_dir() {
        return Err(SkipReason::MissingImageDir);
    }
    let entries = fs::read_dir(dir).map_err(|e| SkipReason::UnreadableImageDir(e.to_string()))?;

    let mut files: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && !is_hidden(p) && rules.accepts(p))
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();

    if files.is_empty() {
        return Err(SkipReason::NoImages);
    }
    sort_natural(&mut files);

    for file in &files {
        if extension_of(Path::new(file)).is_some_and(|ext| LEGACY_EXTENSIONS.contains(&ext.as_str())) {
            tracing::warn!(
                path = %dir.join(file).display(),
                "HEIC image in catalog; consider `convert webp` for browser support"
            );
        }
    }

    Ok(files)
}

/// Names of non-hidden subdirectories, naturally sorted.
fn list_subdirs(dir: &Path) -> Result<Vec<String>, std::io::Error> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir() && !is_hidden(p))
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    sort_natural(&mut names);
    Ok(names)
}

pub(crate) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('.'))
}

/// Lowercase extension without the dot.
pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

/// Last component of the catalog root, used as the image path prefix.
fn root_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            root.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_default()
}
