//! Catalog configuration module.
//!
//! Handles loading, validating, and merging `catalog.toml`. Stock defaults
//! are overridden by an optional user file in the catalog root:
//!
//! ```text
//! Catalogo/
//! ├── catalog.toml             # Optional, sparse overrides
//! ├── Sillas/
//! │   └── SillaRoja/
//! │       ├── info.txt
//! │       └── imagenes/
//! └── ...
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! strictness = "strict"        # or "lenient"
//!
//! [catalog]
//! output_file = "catalogo.json"
//! info_file = "info.txt"
//! image_dir = "imagenes"
//!
//! [validation]
//! # extensions = ["jpg", "png"]  # overrides the strictness default set
//!
//! [optimize]
//! format = "webp"              # or "jpeg"
//! max_width = 800
//! webp_quality = 80
//! webp_effort = 6
//! jpeg_quality = 85
//!
//! [optimize.sizes]
//! thumbnail = 400
//! medium = 800
//! large = 1200
//!
//! [convert]
//! webp_quality = 85
//! webp_effort = 6
//! jpeg_quality = 90
//!
//! [site]
//! title = "Catálogo"
//! currency_symbol = "$"
//! # whatsapp_phone = "5491100000000"
//! whatsapp_message = "Hola, quiero comprar"
//!
//! # [site.shipping]
//! # free_threshold = 50000
//! # flat_fee = 3500
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{EncodeSpec, OutputFormat, Quality};
use crate::scan::ScanRules;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name of the user config inside the catalog root.
pub const CONFIG_FILENAME: &str = "catalog.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Validation strictness for product metadata.
///
/// The strict variant enforces minimum lengths on name and description and
/// accepts `bmp`/`tiff` on top of the web formats; the lenient variant only
/// requires the three lines to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    #[default]
    Strict,
    Lenient,
}

/// Catalog configuration loaded from `catalog.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Validation strictness for `info.txt` contents.
    pub strictness: Strictness,
    /// File and directory names used by the builder.
    pub catalog: CatalogPaths,
    /// Validation overrides.
    pub validation: ValidationConfig,
    /// Optimizer settings (`optimize` and `sizes` commands).
    pub optimize: OptimizeConfig,
    /// Legacy-format conversion settings (`convert` command).
    pub convert: ConvertConfig,
    /// Rendered page settings.
    pub site: SiteConfig,
}

impl CatalogConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, q) in [
            ("optimize.webp_quality", self.optimize.webp_quality),
            ("optimize.jpeg_quality", self.optimize.jpeg_quality),
            ("convert.webp_quality", self.convert.webp_quality),
            ("convert.jpeg_quality", self.convert.jpeg_quality),
        ] {
            if !(1..=100).contains(&q) {
                return Err(ConfigError::Validation(format!("{key} must be 1-100")));
            }
        }
        if self.optimize.webp_effort > 6 || self.convert.webp_effort > 6 {
            return Err(ConfigError::Validation(
                "webp_effort must be 0-6".into(),
            ));
        }
        if self.optimize.sizes.is_empty() {
            return Err(ConfigError::Validation(
                "optimize.sizes must not be empty".into(),
            ));
        }
        if let Some((name, _)) = self.optimize.sizes.iter().find(|(_, w)| **w == 0) {
            return Err(ConfigError::Validation(format!(
                "optimize.sizes.{name} must be non-zero"
            )));
        }
        if self.optimize.max_width == Some(0) || self.optimize.max_height == Some(0) {
            return Err(ConfigError::Validation(
                "optimize.max_width/max_height must be non-zero".into(),
            ));
        }
        if let Some(exts) = &self.validation.extensions
            && exts.is_empty()
        {
            return Err(ConfigError::Validation(
                "validation.extensions must not be empty".into(),
            ));
        }
        for (key, value) in [
            ("catalog.output_file", &self.catalog.output_file),
            ("catalog.info_file", &self.catalog.info_file),
            ("catalog.image_dir", &self.catalog.image_dir),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }

    /// Scanner rules for the configured strictness and overrides.
    pub fn scan_rules(&self) -> ScanRules {
        let mut rules = match self.strictness {
            Strictness::Strict => ScanRules::strict(),
            Strictness::Lenient => ScanRules::lenient(),
        };
        if let Some(exts) = &self.validation.extensions {
            rules.extensions = exts.iter().map(|e| normalize_extension(e)).collect();
        }
        rules.info_file = self.catalog.info_file.clone();
        rules.image_dir = self.catalog.image_dir.clone();
        rules
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// File and directory names used by the catalog builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogPaths {
    /// Name of the JSON file written into the output directory.
    pub output_file: String,
    /// Name of the metadata file inside each product directory.
    pub info_file: String,
    /// Name of the image subdirectory inside each product directory.
    pub image_dir: String,
}

impl Default for CatalogPaths {
    fn default() -> Self {
        Self {
            output_file: "catalogo.json".to_string(),
            info_file: "info.txt".to_string(),
            image_dir: "imagenes".to_string(),
        }
    }
}

/// Validation overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Accepted image extensions. When absent, the strictness default applies.
    pub extensions: Option<Vec<String>>,
}

/// Optimizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizeConfig {
    /// Output encoding.
    pub format: OutputFormat,
    /// Longest allowed width; images are never upscaled.
    pub max_width: Option<u32>,
    /// Longest allowed height; images are never upscaled.
    pub max_height: Option<u32>,
    /// WebP quality (1-100).
    pub webp_quality: u32,
    /// WebP encoder effort / method (0 = fastest, 6 = smallest).
    pub webp_effort: u32,
    /// JPEG quality (1-100).
    pub jpeg_quality: u32,
    /// Named width buckets for `sizes`.
    pub sizes: BTreeMap<String, u32>,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Webp,
            max_width: Some(800),
            max_height: None,
            webp_quality: 80,
            webp_effort: 6,
            jpeg_quality: 85,
            sizes: BTreeMap::from([
                ("thumbnail".to_string(), 400),
                ("medium".to_string(), 800),
                ("large".to_string(), 1200),
            ]),
        }
    }
}

impl OptimizeConfig {
    /// Encoding parameters for the given output format.
    pub fn encode_spec(&self, format: OutputFormat) -> EncodeSpec {
        encode_spec(format, self.webp_quality, self.webp_effort, self.jpeg_quality)
    }
}

/// Legacy-format conversion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    pub webp_quality: u32,
    pub webp_effort: u32,
    pub jpeg_quality: u32,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            webp_quality: 85,
            webp_effort: 6,
            jpeg_quality: 90,
        }
    }
}

impl ConvertConfig {
    pub fn encode_spec(&self, format: OutputFormat) -> EncodeSpec {
        encode_spec(format, self.webp_quality, self.webp_effort, self.jpeg_quality)
    }
}

fn encode_spec(format: OutputFormat, webp_quality: u32, effort: u32, jpeg_quality: u32) -> EncodeSpec {
    match format {
        OutputFormat::Webp => EncodeSpec {
            format,
            quality: Quality::new(webp_quality),
            effort,
        },
        OutputFormat::Jpeg => EncodeSpec {
            format,
            quality: Quality::new(jpeg_quality),
            effort,
        },
    }
}

/// Rendered page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Page title.
    pub title: String,
    /// Prefix printed before prices.
    pub currency_symbol: String,
    /// Phone number for the WhatsApp inquiry link; no link when absent.
    pub whatsapp_phone: Option<String>,
    /// Message prefix; the product name is appended.
    pub whatsapp_message: String,
    /// Shipping note; hidden when absent.
    pub shipping: Option<ShippingConfig>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Catálogo".to_string(),
            currency_symbol: "$".to_string(),
            whatsapp_phone: None,
            whatsapp_message: "Hola, quiero comprar".to_string(),
            shipping: None,
        }
    }
}

/// Shipping surcharge shown on product cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShippingConfig {
    /// Prices at or above this ship free.
    pub free_threshold: u64,
    /// Flat fee charged below the threshold.
    pub flat_fee: u64,
}

impl ShippingConfig {
    /// Shipping cost for a product at `price`.
    pub fn cost_for(&self, price: u64) -> u64 {
        if price >= self.free_threshold {
            0
        } else {
            self.flat_fee
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(CatalogConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `catalog.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CatalogConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CatalogConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `catalog.toml` in the given directory.
///
/// A missing directory or file yields the validated stock defaults.
pub fn load_config(root: &Path) -> Result<CatalogConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `catalog.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple Catalog Configuration
# ===========================
# Place this file at the catalog root as catalog.toml.
# All settings are optional; values shown are the defaults.
# Unknown keys will cause an error.

# "strict": name >= 2 chars, description >= 5 chars, also accepts bmp/tiff.
# "lenient": any name/description, web formats only.
strictness = "strict"

# ---------------------------------------------------------------------------
# Catalog layout
# ---------------------------------------------------------------------------
[catalog]
output_file = "catalogo.json"
info_file = "info.txt"
image_dir = "imagenes"

# ---------------------------------------------------------------------------
# Validation
# ---------------------------------------------------------------------------
[validation]
# Accepted image extensions; overrides the strictness default set.
# extensions = ["jpg", "jpeg", "png", "webp"]

# ---------------------------------------------------------------------------
# Image optimization (optimize, sizes)
# ---------------------------------------------------------------------------
[optimize]
# "webp" or "jpeg"
format = "webp"
# Images are shrunk to fit; never enlarged.
max_width = 800
# max_height = 800
webp_quality = 80
# WebP encoder effort, 0 (fast) to 6 (small).
webp_effort = 6
jpeg_quality = 85

# Named widths for the sizes command: <name>-<bucket>.<format>
[optimize.sizes]
large = 1200
medium = 800
thumbnail = 400

# ---------------------------------------------------------------------------
# Legacy HEIC/HEIF conversion (convert)
# ---------------------------------------------------------------------------
[convert]
webp_quality = 85
webp_effort = 6
jpeg_quality = 90

# ---------------------------------------------------------------------------
# Rendered page (render, build --render)
# ---------------------------------------------------------------------------
[site]
title = "Catálogo"
currency_symbol = "$"
# whatsapp_phone = "5491100000000"
whatsapp_message = "Hola, quiero comprar"

# [site.shipping]
# free_threshold = 50000
# flat_fee = 3500
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = CatalogConfig::default();
        assert_eq!(config.strictness, Strictness::Strict);
        assert_eq!(config.catalog.output_file, "catalogo.json");
        assert_eq!(config.optimize.format, OutputFormat::Webp);
        assert_eq!(config.optimize.max_width, Some(800));
        assert_eq!(config.optimize.sizes.get("medium"), Some(&800));
        assert_eq!(config.convert.jpeg_quality, 90);
        assert!(config.site.shipping.is_none());
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.strictness, Strictness::Strict);
        assert_eq!(config.optimize.webp_quality, 80);
    }

    #[test]
    fn load_config_reads_partial_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
strictness = "lenient"

[optimize]
format = "jpeg"
jpeg_quality = 70
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.strictness, Strictness::Lenient);
        assert_eq!(config.optimize.format, OutputFormat::Jpeg);
        assert_eq!(config.optimize.jpeg_quality, 70);
        // untouched keys keep defaults
        assert_eq!(config.optimize.webp_quality, 80);
        assert_eq!(config.optimize.sizes.len(), 3);
    }

    #[test]
    fn load_config_reads_shipping() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "[site.shipping]\nfree_threshold = 50000\nflat_fee = 3500\n",
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        let shipping = config.site.shipping.unwrap();
        assert_eq!(shipping.cost_for(60000), 0);
        assert_eq!(shipping.cost_for(50000), 0);
        assert_eq!(shipping.cost_for(100), 3500);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "strictness = [").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[optimize]\nqualty = 3\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[server]\nport = 80\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn unknown_strictness_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "strictness = \"loose\"\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn validate_quality_out_of_range() {
        let mut config = CatalogConfig::default();
        config.optimize.webp_quality = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = CatalogConfig::default();
        config.convert.jpeg_quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_effort_out_of_range() {
        let mut config = CatalogConfig::default();
        config.optimize.webp_effort = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_sizes() {
        let mut config = CatalogConfig::default();
        config.optimize.sizes.clear();
        assert!(config.validate().is_err());

        let mut config = CatalogConfig::default();
        config.optimize.sizes.insert("tiny".to_string(), 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_empty_extension_override() {
        let mut config = CatalogConfig::default();
        config.validation.extensions = Some(vec![]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(CatalogConfig::default().validate().is_ok());
    }

    #[test]
    fn scan_rules_follow_strictness() {
        let strict = CatalogConfig::default().scan_rules();
        assert_eq!(strict.min_name_len, 2);
        assert_eq!(strict.min_description_len, 5);
        assert!(strict.extensions.iter().any(|e| e == "tiff"));

        let lenient = CatalogConfig {
            strictness: Strictness::Lenient,
            ..Default::default()
        }
        .scan_rules();
        assert_eq!(lenient.min_description_len, 0);
        assert!(!lenient.extensions.iter().any(|e| e == "tiff"));
    }

    #[test]
    fn scan_rules_extension_override_is_normalized() {
        let config = CatalogConfig {
            validation: ValidationConfig {
                extensions: Some(vec![".JPG".to_string(), "png".to_string()]),
            },
            ..Default::default()
        };
        assert_eq!(config.scan_rules().extensions, vec!["jpg", "png"]);
    }

    #[test]
    fn encode_spec_picks_format_quality() {
        let config = OptimizeConfig::default();
        let webp = config.encode_spec(OutputFormat::Webp);
        assert_eq!(webp.quality.value(), 80);
        assert_eq!(webp.effort, 6);
        let jpeg = config.encode_spec(OutputFormat::Jpeg);
        assert_eq!(jpeg.quality.value(), 85);
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_scalar_override() {
        let merged = merge_toml(toml::Value::Integer(1), toml::Value::Integer(2));
        assert_eq!(merged.as_integer(), Some(2));
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let value: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config = resolve_config(stock_defaults_value(), Some(value)).unwrap();
        let defaults = CatalogConfig::default();
        assert_eq!(config.strictness, defaults.strictness);
        assert_eq!(config.optimize.sizes, defaults.optimize.sizes);
        assert_eq!(config.optimize.max_width, defaults.optimize.max_width);
        assert_eq!(config.convert.webp_quality, defaults.convert.webp_quality);
        assert_eq!(config.site.title, defaults.site.title);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let value = stock_defaults_value();
        let table = value.as_table().unwrap();
        for key in ["strictness", "catalog", "validation", "optimize", "convert", "site"] {
            assert!(table.contains_key(key), "missing {key}");
        }
    }
}
