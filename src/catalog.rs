//! Catalog build: scan, summarize, write `catalogo.json`.
//!
//! The JSON file is written once, after the whole tree has been scanned, via
//! a sibling temporary file and a rename. A reader never observes a partially
//! written catalog.

use crate::config::CatalogConfig;
use crate::scan::{self, ScanError, Skipped};
use crate::types::ProductRecord;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Informational totals for one build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSummary {
    pub total: usize,
    /// Product count per category, in the order categories were emitted.
    pub per_category: Vec<(String, usize)>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub image_count: usize,
    pub skipped: Vec<Skipped>,
}

impl CatalogSummary {
    pub fn from_records(records: &[ProductRecord], skipped: Vec<Skipped>) -> Self {
        let mut per_category: Vec<(String, usize)> = Vec::new();
        for record in records {
            match per_category.iter_mut().find(|(c, _)| *c == record.category) {
                Some((_, n)) => *n += 1,
                None => per_category.push((record.category.clone(), 1)),
            }
        }

        Self {
            total: records.len(),
            per_category,
            min_price: records.iter().map(|r| r.price).min(),
            max_price: records.iter().map(|r| r.price).max(),
            image_count: records.iter().map(|r| r.images.len()).sum(),
            skipped,
        }
    }
}

/// Result of [`build_catalog`].
#[derive(Debug)]
pub struct CatalogBuild {
    pub records: Vec<ProductRecord>,
    pub summary: CatalogSummary,
    pub output: PathBuf,
}

/// Scan `root` and write the catalog JSON to `output`.
///
/// Per-product problems end up in `summary.skipped`; only a missing root or a
/// failed write is an error.
pub fn build_catalog(
    root: &Path,
    output: &Path,
    config: &CatalogConfig,
) -> Result<CatalogBuild, CatalogError> {
    let report = scan::scan(root, &config.scan_rules())?;
    write_catalog(&report.products, output)?;

    let summary = CatalogSummary::from_records(&report.products, report.skipped);
    tracing::info!(
        products = summary.total,
        skipped = summary.skipped.len(),
        output = %output.display(),
        "catalog written"
    );

    Ok(CatalogBuild {
        records: report.products,
        summary,
        output: output.to_path_buf(),
    })
}

/// Write records as 2-space indented JSON, replacing `path` atomically.
pub fn write_catalog(records: &[ProductRecord], path: &Path) -> Result<(), CatalogError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(records)?;
    let tmp = tmp_path(path);
    fs::write(&tmp, json)?;
    if let Err(e) = fs::rename(&tmp, path) {
        fs::remove_file(&tmp).ok();
        return Err(e.into());
    }
    Ok(())
}

/// Load a previously written catalog.
pub fn read_catalog(path: &Path) -> Result<Vec<ProductRecord>, CatalogError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
