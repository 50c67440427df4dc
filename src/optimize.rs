//! Image optimization over a mirrored directory tree.
//!
//! Stage 2 of the catalog pipeline. Walks the catalog source tree and writes
//! a transcoded copy of every recognized raster image into a destination
//! tree with the same directory layout. The source tree is never modified.
//!
//! ## Output Structure
//!
//! ```text
//! Catalogo/                          CatalogoOptimizado/
//! ├── Sillas/                        ├── Sillas/
//! │   └── SillaRoja/                 │   └── SillaRoja/
//! │       ├── info.txt               │       └── imagenes/
//! │       └── imagenes/              │           ├── 1.webp
//! │           ├── 1.jpg      ──►     │           └── 2.webp
//! │           └── 2.HEIC             └── ...
//! ```
//!
//! Non-image files are not copied. Output files keep the source stem and take
//! the extension of the target format. When two sources in one directory
//! share a stem (`1.jpg`, `1.png`), the first in walk order is written and
//! the others fail with a collision error.
//!
//! ## Failure model
//!
//! A single file that fails to decode or encode is reported as an
//! [`OptimizeEvent::Failed`] and counted; the walk continues. Only a missing
//! source directory, or failing to create a destination directory, aborts.
//!
//! ## Re-runs
//!
//! There is no incremental state: every matching file is re-encoded and its
//! output overwritten on each run.

use crate::imaging::{
    EncodeSpec, ImageBackend, LEGACY_EXTENSIONS, Resize, SizeChange, optimize_image,
    output_path_for,
};
use crate::naming::natural_cmp;
use crate::scan::{extension_of, is_hidden};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),
}

/// Raster formats picked up by [`optimize_tree`].
pub const OPTIMIZE_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "bmp", "tiff", "heic", "heif"];

/// Formats counted by [`size_report`] on both sides of the comparison.
pub const REPORT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "webp"];

/// What to transcode and how.
#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    /// Lowercase extensions without the dot.
    pub extensions: Vec<String>,
    pub resize: Resize,
    pub encode: EncodeSpec,
}

impl OptimizeOptions {
    /// Build options from the `[optimize]` config section.
    pub fn from_config(config: &crate::config::OptimizeConfig) -> Self {
        Self {
            extensions: OPTIMIZE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            resize: Resize {
                max_width: config.max_width,
                max_height: config.max_height,
            },
            encode: config.encode_spec(config.format),
        }
    }

    /// Legacy conversion: only HEIC/HEIF, original dimensions kept.
    pub fn legacy(encode: EncodeSpec) -> Self {
        Self {
            extensions: LEGACY_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            resize: Resize::default(),
            encode,
        }
    }

    fn accepts(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.extensions.iter().any(|e| *e == ext))
    }
}

/// Progress events emitted while walking the tree.
#[derive(Debug, Clone)]
pub enum OptimizeEvent {
    /// A file was written. Paths are relative to the source and destination roots.
    Transcoded {
        source: String,
        output: String,
        size: SizeChange,
    },
    Failed { source: String, error: String },
}

/// One successfully written output.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedFile {
    pub source: PathBuf,
    pub output: PathBuf,
    pub size: SizeChange,
}

/// Totals for one optimizer run.
#[derive(Debug, Default)]
pub struct OptimizeResult {
    pub processed: usize,
    pub failed: usize,
    pub outputs: Vec<OptimizedFile>,
}

impl OptimizeResult {
    pub fn original_bytes(&self) -> u64 {
        self.outputs.iter().map(|o| o.size.original_bytes).sum()
    }

    pub fn output_bytes(&self) -> u64 {
        self.outputs.iter().map(|o| o.size.output_bytes).sum()
    }
}

/// Transcode every matching file under `source` into the mirrored tree at `dest`.
pub fn optimize_tree(
    backend: &impl ImageBackend,
    source: &Path,
    dest: &Path,
    options: &OptimizeOptions,
    events: Option<Sender<OptimizeEvent>>,
) -> Result<OptimizeResult, OptimizeError> {
    if !source.is_dir() {
        return Err(OptimizeError::SourceNotFound(source.to_path_buf()));
    }
    fs::create_dir_all(dest)?;

    let emit = |event: OptimizeEvent| {
        if let Some(tx) = &events {
            // Receiver gone means nobody is printing; keep working.
            tx.send(event).ok();
        }
    };

    let mut result = OptimizeResult::default();
    // output path -> relative source that claimed it
    let mut claimed: HashMap<PathBuf, String> = HashMap::new();
    for entry in walk(source) {
        let entry = entry?;
        let rel = entry.path().strip_prefix(source).unwrap_or(entry.path());

        if entry.file_type().is_dir() {
            tracing::debug!(dir = %entry.path().display(), "optimizing directory");
            fs::create_dir_all(dest.join(rel))?;
            continue;
        }
        if !entry.file_type().is_file() || !options.accepts(entry.path()) {
            continue;
        }

        let dest_dir = rel.parent().map_or_else(|| dest.to_path_buf(), |p| dest.join(p));
        let output = output_path_for(entry.path(), &dest_dir, &options.encode);
        if let Some(owner) = claimed.get(&output) {
            let error = format!("output {} collides with {}", relative(&output, dest), owner);
            tracing::warn!(path = %entry.path().display(), %error, "transcode skipped");
            result.failed += 1;
            emit(OptimizeEvent::Failed {
                source: display_path(rel),
                error,
            });
            continue;
        }
        claimed.insert(output.clone(), display_path(rel));

        match optimize_image(backend, entry.path(), &output, options.resize, options.encode) {
            Ok(size) => {
                result.processed += 1;
                emit(OptimizeEvent::Transcoded {
                    source: display_path(rel),
                    output: relative(&output, dest),
                    size,
                });
                result.outputs.push(OptimizedFile {
                    source: entry.path().to_path_buf(),
                    output,
                    size,
                });
            }
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), error = %e, "transcode failed");
                result.failed += 1;
                emit(OptimizeEvent::Failed {
                    source: display_path(rel),
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        processed = result.processed,
        failed = result.failed,
        "optimization finished"
    );
    Ok(result)
}

/// Convert HEIC/HEIF files under `source` into `dest` without resizing.
pub fn convert_legacy(
    backend: &impl ImageBackend,
    source: &Path,
    dest: &Path,
    encode: EncodeSpec,
    events: Option<Sender<OptimizeEvent>>,
) -> Result<OptimizeResult, OptimizeError> {
    optimize_tree(backend, source, dest, &OptimizeOptions::legacy(encode), events)
}

/// One legacy-format file found by [`analyze_legacy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyFile {
    /// Path relative to the analyzed root, `/`-separated.
    pub relative: String,
    pub bytes: u64,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct LegacyReport {
    pub files: Vec<LegacyFile>,
}

impl LegacyReport {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.bytes).sum()
    }
}

/// List HEIC/HEIF files under `root` without converting them.
pub fn analyze_legacy(root: &Path) -> Result<LegacyReport, OptimizeError> {
    if !root.is_dir() {
        return Err(OptimizeError::SourceNotFound(root.to_path_buf()));
    }
    let files = files_with_extensions(root, LEGACY_EXTENSIONS)?
        .into_iter()
        .map(|(path, bytes)| LegacyFile {
            relative: relative(&path, root),
            bytes,
        })
        .collect();
    Ok(LegacyReport { files })
}

/// Before/after byte totals of the source and optimized trees.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SizeReport {
    pub source_files: usize,
    pub source_bytes: u64,
    pub optimized_files: usize,
    pub optimized_bytes: u64,
}

impl SizeReport {
    pub fn saving_percent(&self) -> f64 {
        crate::imaging::reduction_percent(self.source_bytes, self.optimized_bytes)
    }
}

/// Compare raster sizes under `source` against `optimized`. Both must exist.
pub fn size_report(source: &Path, optimized: &Path) -> Result<SizeReport, OptimizeError> {
    for dir in [source, optimized] {
        if !dir.is_dir() {
            return Err(OptimizeError::SourceNotFound(dir.to_path_buf()));
        }
    }
    let source_files = files_with_extensions(source, REPORT_EXTENSIONS)?;
    let optimized_files = files_with_extensions(optimized, REPORT_EXTENSIONS)?;
    Ok(SizeReport {
        source_files: source_files.len(),
        source_bytes: source_files.iter().map(|(_, b)| b).sum(),
        optimized_files: optimized_files.len(),
        optimized_bytes: optimized_files.iter().map(|(_, b)| b).sum(),
    })
}

/// Every file under `root` with one of `extensions`, with its byte size.
fn files_with_extensions(
    root: &Path,
    extensions: &[&str],
) -> Result<Vec<(PathBuf, u64)>, OptimizeError> {
    let mut found = Vec::new();
    for entry in walk(root) {
        let entry = entry?;
        let matches = extension_of(entry.path())
            .is_some_and(|ext| extensions.contains(&ext.as_str()));
        if entry.file_type().is_file() && matches {
            found.push((entry.path().to_path_buf(), entry.metadata()?.len()));
        }
    }
    Ok(found)
}

/// Depth-first walk in natural name order, hidden entries pruned.
fn walk(root: &Path) -> impl Iterator<Item = Result<DirEntry, walkdir::Error>> {
    WalkDir::new(root)
        .sort_by(|a, b| {
            natural_cmp(
                &a.file_name().to_string_lossy(),
                &b.file_name().to_string_lossy(),
            )
        })
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
}

fn display_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// `path` relative to `root`, `/`-separated for display.
fn relative(path: &Path, root: &Path) -> String {
    display_path(path.strip_prefix(root).unwrap_or(path))
}
