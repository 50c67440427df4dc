//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how*. They are the interface
//! between [`operations`](super::operations), which decides which files to
//! produce, and the [`backend`](super::backend), which does the pixel work.
//!
//! - [`Quality`]: lossy encoding quality (1–100). Clamped on construction.
//! - [`OutputFormat`]: target encoding, WebP or JPEG.
//! - [`EncodeSpec`]: format + quality + WebP effort.
//! - [`TranscodeParams`]: source, output, optional bounding box, encoding.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Web output encodings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Webp,
    Jpeg,
}

impl OutputFormat {
    /// File extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Webp => "webp",
            OutputFormat::Jpeg => "jpeg",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// How to encode an output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSpec {
    pub format: OutputFormat,
    pub quality: Quality,
    /// WebP method, 0 (fast) to 6 (smallest). Ignored for JPEG.
    pub effort: u32,
}

impl Default for EncodeSpec {
    fn default() -> Self {
        Self {
            format: OutputFormat::Webp,
            quality: Quality::default(),
            effort: 6,
        }
    }
}

/// Parameters for a decode → optional shrink → encode operation.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Bounding box; the image is shrunk to fit, never enlarged.
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub encode: EncodeSpec,
}
