//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Fit `source` inside `bound`, keeping the aspect ratio and never enlarging.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bound` - Bounding box (width, height)
///
/// # Returns
/// * `(width, height)` - Output dimensions, each at least 1
///
/// # Examples
/// ```
/// # use postcard_pipeline::imaging::fit_within;
/// // Landscape 1200x800 into a 300 box → 300x200
/// assert_eq!(fit_within((1200, 800), (300, 300)), (300, 200));
///
/// // Already small enough → unchanged
/// assert_eq!(fit_within((120, 80), (300, 300)), (120, 80));
/// ```
pub fn fit_within(source: (u32, u32), bound: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bound;

    if src_w == 0 || src_h == 0 || (src_w <= max_w && src_h <= max_h) {
        return source;
    }

    let scale = f64::min(max_w as f64 / src_w as f64, max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}
