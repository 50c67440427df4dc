//! Pure calculation functions for image dimensions and size reports.
//!
//! All functions here are pure and testable without any I/O or images.

/// Fit `source` inside an optional bounding box, preserving aspect ratio.
///
/// Never upscales: a source already inside the box is returned unchanged.
/// Missing bounds are unconstrained. Each side is at least 1px.
///
/// ```
/// # use simple_catalog::imaging::fit_within;
/// assert_eq!(fit_within((1600, 1200), Some(800), None), (800, 600));
/// assert_eq!(fit_within((400, 300), Some(800), None), (400, 300));
/// assert_eq!(fit_within((1000, 2000), Some(800), Some(800)), (400, 800));
/// ```
pub fn fit_within(source: (u32, u32), max_width: Option<u32>, max_height: Option<u32>) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 {
        return source;
    }

    let scale_w = max_width.map_or(1.0, |m| m as f64 / src_w as f64);
    let scale_h = max_height.map_or(1.0, |m| m as f64 / src_h as f64);
    let scale = scale_w.min(scale_h).min(1.0);
    if scale >= 1.0 {
        return source;
    }

    let w = ((src_w as f64 * scale).round() as u32).max(1);
    let h = ((src_h as f64 * scale).round() as u32).max(1);
    (w, h)
}

/// Percentage of bytes saved going from `original` to `output`.
///
/// Negative when the output grew. Zero for an empty original.
pub fn reduction_percent(original: u64, output: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (original as f64 - output as f64) / original as f64 * 100.0
}
