//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Products lead with
//! their positional index and name; prices, image counts and paths follow as
//! indented context lines.
//!
//! # Output Format
//!
//! ## Build / Check
//!
//! ```text
//! Catalog
//! 001 sillas (2 products)
//!     001 Silla Roja
//!         Price: $15.000
//!         Images: 3
//!     002 Silla Azul
//!         Price: $12.500
//!         Images: 1
//!
//! Skipped
//!     Catalogo/Mesas/Corta: info file has 2 non-blank lines, at least 3 required
//!
//! 2 products, 4 images, prices $12.500 to $15.000
//! ```
//!
//! ## Optimize / Convert
//!
//! ```text
//! Sillas/SillaRoja/imagenes/1.jpg → Sillas/SillaRoja/imagenes/1.webp
//!     245301 → 80211 bytes (67.3% reduction)
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure;
//! no I/O, no side effects.

use crate::catalog::CatalogSummary;
use crate::generate::format_price;
use crate::imaging::SizesResult;
use crate::optimize::{LegacyReport, OptimizeEvent, OptimizeResult, SizeReport};
use crate::types::ProductRecord;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Bytes as megabytes with two decimals.
fn format_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 1: Catalog output
// ============================================================================

/// Format the catalog inventory, skipped products and totals.
pub fn format_catalog_output(
    records: &[ProductRecord],
    summary: &CatalogSummary,
    currency: &str,
) -> Vec<String> {
    let mut lines = vec!["Catalog".to_string()];

    for (cat_idx, (category, count)) in summary.per_category.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(cat_idx + 1),
            category,
            plural(*count, "product", "products")
        ));
        let products = records.iter().filter(|r| r.category == *category);
        for (idx, product) in products.enumerate() {
            lines.push(format!("{}{} {}", indent(1), format_index(idx + 1), product.name));
            lines.push(format!(
                "{}Price: {}",
                indent(2),
                format_price(product.price, currency)
            ));
            lines.push(format!("{}Images: {}", indent(2), product.images.len()));
        }
    }
    if summary.per_category.is_empty() {
        lines.push(format!("{}(no products)", indent(1)));
    }

    if !summary.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for skip in &summary.skipped {
            lines.push(format!(
                "{}{}: {}",
                indent(1),
                skip.path.display(),
                skip.reason
            ));
        }
    }

    lines.push(String::new());
    lines.push(format_totals(summary, currency));
    lines
}

fn format_totals(summary: &CatalogSummary, currency: &str) -> String {
    let mut line = format!(
        "{}, {}",
        plural(summary.total, "product", "products"),
        plural(summary.image_count, "image", "images")
    );
    if let (Some(min), Some(max)) = (summary.min_price, summary.max_price) {
        line.push_str(&format!(
            ", prices {} to {}",
            format_price(min, currency),
            format_price(max, currency)
        ));
    }
    if !summary.skipped.is_empty() {
        line.push_str(&format!(", {} skipped", summary.skipped.len()));
    }
    line
}

/// Print catalog output to stdout.
pub fn print_catalog_output(records: &[ProductRecord], summary: &CatalogSummary, currency: &str) {
    print_lines(format_catalog_output(records, summary, currency));
}

// ============================================================================
// Stage 2: Optimize output
// ============================================================================

/// Format a single optimizer progress event as display lines.
pub fn format_optimize_event(event: &OptimizeEvent) -> Vec<String> {
    match event {
        OptimizeEvent::Transcoded {
            source,
            output,
            size,
        } => vec![
            format!("{} \u{2192} {}", source, output),
            format!(
                "{}{} \u{2192} {} bytes ({:.1}% reduction)",
                indent(1),
                size.original_bytes,
                size.output_bytes,
                size.reduction_percent()
            ),
        ],
        OptimizeEvent::Failed { source, error } => vec![
            source.clone(),
            format!("{}Failed: {}", indent(1), error),
        ],
    }
}

/// Format the end-of-run totals of an optimizer or conversion run.
pub fn format_optimize_result(result: &OptimizeResult) -> Vec<String> {
    let mut lines = vec![format!(
        "{}, {} failed",
        plural(result.processed, "image written", "images written"),
        result.failed
    )];
    if result.processed > 0 {
        lines.push(format!(
            "{} \u{2192} {} ({:.1}% reduction)",
            format_mb(result.original_bytes()),
            format_mb(result.output_bytes()),
            crate::imaging::reduction_percent(result.original_bytes(), result.output_bytes())
        ));
    }
    lines
}

/// Format the output of `sizes` for one image.
///
/// ```text
/// Source: 1600x1200
/// thumbnail (400px) → out/silla-thumbnail.webp (800 bytes)
/// medium: Failed: ...
/// ```
pub fn format_sizes_output(result: &SizesResult) -> Vec<String> {
    let (width, height) = result.source;
    let mut lines = vec![format!("Source: {}x{}", width, height)];
    for v in &result.variants {
        lines.push(format!(
            "{} ({}px) \u{2192} {} ({} bytes)",
            v.bucket,
            v.max_width,
            v.path.display(),
            v.size.output_bytes
        ));
    }
    for f in &result.failed {
        lines.push(format!("{}: Failed: {}", f.bucket, f.error));
    }
    lines
}

/// Format the legacy-file analysis.
pub fn format_legacy_report(report: &LegacyReport) -> Vec<String> {
    if report.files.is_empty() {
        return vec!["No HEIC/HEIF files found".to_string()];
    }

    let mut lines = vec![format!("Legacy files: {}", report.files.len())];
    for (idx, file) in report.files.iter().enumerate() {
        let name = file.relative.rsplit('/').next().unwrap_or(&file.relative);
        lines.push(format!(
            "{}{} {} ({})",
            indent(1),
            format_index(idx + 1),
            name,
            format_mb(file.bytes)
        ));
        lines.push(format!("{}Source: {}", indent(2), file.relative));
    }
    lines.push(format!("Total: {}", format_mb(report.total_bytes())));
    lines.push("Run `convert webp` to make them browser friendly".to_string());
    lines
}

/// Format the source vs optimized size comparison.
pub fn format_size_report(report: &SizeReport) -> Vec<String> {
    vec![
        format!(
            "Images: {} source, {} optimized",
            report.source_files, report.optimized_files
        ),
        format!("Source size: {}", format_mb(report.source_bytes)),
        format!("Optimized size: {}", format_mb(report.optimized_bytes)),
        format!("Saving: {:.1}%", report.saving_percent()),
    ]
}

pub fn print_optimize_result(result: &OptimizeResult) {
    print_lines(format_optimize_result(result));
}

pub fn print_sizes_output(result: &SizesResult) {
    print_lines(format_sizes_output(result));
}

pub fn print_legacy_report(report: &LegacyReport) {
    print_lines(format_legacy_report(report));
}

pub fn print_size_report(report: &SizeReport) {
    print_lines(format_size_report(report));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{FailedVariant, GeneratedVariant, SizeChange};
    use crate::optimize::LegacyFile;
    use crate::scan::{SkipReason, Skipped};
    use std::path::PathBuf;

    fn product(category: &str, name: &str, price: u64, images: usize) -> ProductRecord {
        ProductRecord {
            category: category.to_string(),
            name: name.to_string(),
            price,
            description: "Descripcion".to_string(),
            images: (1..=images).map(|i| format!("{i}.jpg")).collect(),
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn mb_two_decimals() {
        assert_eq!(format_mb(0), "0.00 MB");
        assert_eq!(format_mb(1024 * 1024 * 3 / 2), "1.50 MB");
    }

    // =========================================================================
    // Catalog output tests
    // =========================================================================

    #[test]
    fn catalog_output_groups_products() {
        let records = vec![
            product("sillas", "Silla Roja", 15000, 3),
            product("sillas", "Silla Azul", 12500, 1),
            product("mesas", "Mesa", 40000, 2),
        ];
        let summary = CatalogSummary::from_records(&records, Vec::new());
        let lines = format_catalog_output(&records, &summary, "$");

        assert_eq!(lines[0], "Catalog");
        assert_eq!(lines[1], "001 sillas (2 products)");
        assert_eq!(lines[2], "    001 Silla Roja");
        assert_eq!(lines[3], "        Price: $15.000");
        assert_eq!(lines[4], "        Images: 3");
        assert_eq!(lines[5], "    002 Silla Azul");
        assert_eq!(lines[8], "002 mesas (1 product)");
        assert_eq!(
            lines.last().unwrap(),
            "3 products, 6 images, prices $12.500 to $40.000"
        );
    }

    #[test]
    fn catalog_output_lists_skips() {
        let skipped = vec![Skipped {
            path: PathBuf::from("Catalogo/Mesas/Corta"),
            reason: SkipReason::TooFewLines(2),
        }];
        let summary = CatalogSummary::from_records(&[], skipped);
        let lines = format_catalog_output(&[], &summary, "$");

        assert!(lines.contains(&"    (no products)".to_string()));
        assert!(lines.contains(&"Skipped".to_string()));
        assert!(lines.contains(
            &"    Catalogo/Mesas/Corta: info file has 2 non-blank lines, at least 3 required"
                .to_string()
        ));
        assert_eq!(lines.last().unwrap(), "0 products, 0 images, 1 skipped");
    }

    // =========================================================================
    // Optimize output tests
    // =========================================================================

    #[test]
    fn optimize_event_transcoded() {
        let event = OptimizeEvent::Transcoded {
            source: "Sillas/A/imagenes/1.jpg".to_string(),
            output: "Sillas/A/imagenes/1.webp".to_string(),
            size: SizeChange {
                original_bytes: 1000,
                output_bytes: 250,
            },
        };
        let lines = format_optimize_event(&event);
        assert_eq!(
            lines,
            vec![
                "Sillas/A/imagenes/1.jpg \u{2192} Sillas/A/imagenes/1.webp",
                "    1000 \u{2192} 250 bytes (75.0% reduction)",
            ]
        );
    }

    #[test]
    fn optimize_event_failed() {
        let event = OptimizeEvent::Failed {
            source: "x/broken.jpg".to_string(),
            error: "Processing failed: bad data".to_string(),
        };
        let lines = format_optimize_event(&event);
        assert_eq!(lines[0], "x/broken.jpg");
        assert_eq!(lines[1], "    Failed: Processing failed: bad data");
    }

    #[test]
    fn optimize_result_without_outputs() {
        let result = OptimizeResult {
            processed: 0,
            failed: 2,
            outputs: Vec::new(),
        };
        assert_eq!(format_optimize_result(&result), vec!["0 images written, 2 failed"]);
    }

    #[test]
    fn sizes_output_lists_variants_and_failures() {
        let result = SizesResult {
            source: (1600, 1200),
            variants: vec![GeneratedVariant {
                bucket: "thumbnail".to_string(),
                max_width: 400,
                path: PathBuf::from("out/silla-thumbnail.webp"),
                size: SizeChange {
                    original_bytes: 5000,
                    output_bytes: 800,
                },
            }],
            failed: vec![FailedVariant {
                bucket: "large".to_string(),
                error: "disk full".to_string(),
            }],
        };
        assert_eq!(
            format_sizes_output(&result),
            vec![
                "Source: 1600x1200",
                "thumbnail (400px) \u{2192} out/silla-thumbnail.webp (800 bytes)",
                "large: Failed: disk full",
            ]
        );
    }

    #[test]
    fn legacy_report_lists_files() {
        let report = LegacyReport {
            files: vec![LegacyFile {
                relative: "Sillas/A/imagenes/x.heic".to_string(),
                bytes: 2 * 1024 * 1024,
            }],
        };
        let lines = format_legacy_report(&report);
        assert_eq!(lines[0], "Legacy files: 1");
        assert_eq!(lines[1], "    001 x.heic (2.00 MB)");
        assert_eq!(lines[2], "        Source: Sillas/A/imagenes/x.heic");
        assert_eq!(lines[3], "Total: 2.00 MB");
    }

    #[test]
    fn legacy_report_empty() {
        let lines = format_legacy_report(&LegacyReport::default());
        assert_eq!(lines, vec!["No HEIC/HEIF files found"]);
    }

    #[test]
    fn size_report_lines() {
        let report = SizeReport {
            source_files: 4,
            source_bytes: 4 * 1024 * 1024,
            optimized_files: 4,
            optimized_bytes: 1024 * 1024,
        };
        assert_eq!(
            format_size_report(&report),
            vec![
                "Images: 4 source, 4 optimized",
                "Source size: 4.00 MB",
                "Optimized size: 1.00 MB",
                "Saving: 75.0%",
            ]
        );
    }
}
