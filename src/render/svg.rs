//! SVG output.
//!
//! The symbol becomes a single stroked path: every horizontal run of dark
//! modules is one `h` segment drawn along the middle of its row, which keeps
//! the markup small and lets `shape-rendering="crispEdges"` snap it to pixels.

use core::fmt::Write as _;

use super::{Color, RenderOptions};
use crate::qrcode::QrCode;

/// Returns a complete `<svg>` document for `qr`, ending in a newline.
///
/// # Example
///
/// ```rust
/// use pairqr::render::{svg, RenderOptions};
/// use pairqr::{QrCode, QrOptions};
///
/// let qr = QrCode::create("HELLO WORLD", &QrOptions::default()).unwrap();
/// let doc = svg::to_string(&qr, &RenderOptions::default());
/// assert!(doc.contains(r#"viewBox="0 0 29 29""#));
/// ```
pub fn to_string(qr: &QrCode, opts: &RenderOptions) -> String {
    let total = opts.total_modules(qr.size());
    let mut result = String::new();
    result += "<svg xmlns=\"http://www.w3.org/2000/svg\" ";
    if let Some(w) = opts.effective_width() {
        let _ = write!(result, "width=\"{w}\" height=\"{w}\" ");
    }
    let _ = write!(result, "viewBox=\"0 0 {total} {total}\" shape-rendering=\"crispEdges\">");
    if opts.color.light.a > 0 {
        let _ = write!(
            result,
            "<path {} d=\"M0 0h{total}v{total}H0z\"/>",
            paint(&opts.color.light, "fill")
        );
    }
    let _ = write!(
        result,
        "<path {} d=\"{}\"/>",
        paint(&opts.color.dark, "stroke"),
        path_data(qr, opts.margin)
    );
    result += "</svg>\n";
    result
}

/// Path commands for the dark modules, offset by `margin`.
///
/// A run starting a new row moves absolutely to its left edge; a later run
/// in the same row moves relatively past the light gap before it.
pub fn path_data(qr: &QrCode, margin: u32) -> String {
    let size = qr.size() as i32;
    let margin = margin as i32;
    let mut result = String::new();
    let mut gap: u32 = 0;
    for y in 0..size {
        let mut new_row = true;
        let mut run: u32 = 0;
        for x in 0..size {
            if !qr.get_module(x, y) {
                gap += 1;
                continue;
            }
            run += 1;
            if !qr.get_module(x - 1, y) {
                if new_row {
                    let _ = write!(result, "M{} {}.5", x + margin, y + margin);
                } else {
                    let _ = write!(result, "m{gap} 0");
                }
                gap = 0;
                new_row = false;
            }
            if !qr.get_module(x + 1, y) {
                let _ = write!(result, "h{run}");
                run = 0;
            }
        }
    }
    result
}

/// `fill="#rrggbb"` plus an opacity attribute when the colour is translucent.
pub(crate) fn paint(color: &Color, attr: &str) -> String {
    let mut result = format!("{attr}=\"{}\"", color.hex());
    if !color.is_opaque() {
        let opacity = format!("{:.2}", f64::from(color.a) / 255.0);
        let _ = write!(result, " {attr}-opacity=\"{}\"", opacity.trim_start_matches('0'));
    }
    result
}
