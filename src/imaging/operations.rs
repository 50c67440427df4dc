//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::reduction_percent;
use super::params::{EncodeSpec, TranscodeParams};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Bounding box applied before encoding. `None` sides are unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resize {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

/// Byte sizes before and after a transcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeChange {
    pub original_bytes: u64,
    pub output_bytes: u64,
}

impl SizeChange {
    /// Percentage saved; negative when the output grew.
    pub fn reduction_percent(&self) -> f64 {
        reduction_percent(self.original_bytes, self.output_bytes)
    }
}

/// Plan a transcode without executing it.
pub fn plan_transcode(
    source: &Path,
    output: &Path,
    resize: Resize,
    encode: EncodeSpec,
) -> TranscodeParams {
    TranscodeParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        max_width: resize.max_width,
        max_height: resize.max_height,
        encode,
    }
}

/// Output path for `source` inside `output_dir`: same stem, format extension.
pub fn output_path_for(source: &Path, output_dir: &Path, encode: &EncodeSpec) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{}.{}", stem, encode.format.extension()))
}

/// Transcode one image and report the size change.
pub fn optimize_image(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    resize: Resize,
    encode: EncodeSpec,
) -> Result<SizeChange> {
    backend.transcode(&plan_transcode(source, output, resize, encode))?;
    Ok(SizeChange {
        original_bytes: std::fs::metadata(source)?.len(),
        output_bytes: std::fs::metadata(output)?.len(),
    })
}

/// One file produced by [`generate_sizes`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedVariant {
    pub bucket: String,
    pub max_width: u32,
    pub path: PathBuf,
    pub size: SizeChange,
}

/// A bucket that could not be written.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedVariant {
    pub bucket: String,
    pub error: String,
}

/// Everything [`generate_sizes`] did for one source image.
#[derive(Debug, Clone, PartialEq)]
pub struct SizesResult {
    /// Source dimensions, `(width, height)`.
    pub source: (u32, u32),
    pub variants: Vec<GeneratedVariant>,
    pub failed: Vec<FailedVariant>,
}

/// Produce one file per named width bucket: `<stem>-<bucket>.<ext>`.
///
/// Buckets are processed smallest first. Images narrower than a bucket are
/// written at their original size. A failing bucket is recorded and the
/// remaining buckets still run; only an unreadable source is an error.
pub fn generate_sizes(
    backend: &impl ImageBackend,
    source: &Path,
    output_dir: &Path,
    filename_stem: &str,
    buckets: &BTreeMap<String, u32>,
    encode: EncodeSpec,
) -> Result<SizesResult> {
    let dimensions = get_dimensions(backend, source)?;

    let mut ordered: Vec<(&String, &u32)> = buckets.iter().collect();
    ordered.sort_by_key(|(name, width)| (**width, (*name).clone()));

    let mut result = SizesResult {
        source: dimensions,
        variants: Vec::new(),
        failed: Vec::new(),
    };
    for (bucket, &width) in ordered {
        let path = output_dir.join(format!(
            "{}-{}.{}",
            filename_stem,
            bucket,
            encode.format.extension()
        ));
        let resize = Resize {
            max_width: Some(width),
            max_height: None,
        };
        match optimize_image(backend, source, &path, resize, encode) {
            Ok(size) => result.variants.push(GeneratedVariant {
                bucket: bucket.clone(),
                max_width: width,
                path,
                size,
            }),
            Err(e) => {
                tracing::warn!(bucket = %bucket, error = %e, "size variant failed");
                result.failed.push(FailedVariant {
                    bucket: bucket.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(result)
}
