//! Rendering of analysis results
//!
//! - **HTML**: the result block shown in the page, or a standalone report document
//! - **Text**: terminal output with the same section order
//! - **JSON**: the normalized result for programmatic consumption
//!
//! # Usage
//!
//! ```ignore
//! use sentiview::report;
//!
//! // Automatically picks format based on extension
//! report::generate("result.html", &result, preview.as_deref())?;  // HTML
//! report::generate("result.json", &result, None)?;                // JSON
//! report::generate("result.txt", &result, None)?;                 // Text
//! ```

pub mod html;
pub mod json;
pub mod text;

use crate::analysis::AnalysisResult;
use std::io;
use std::path::Path;

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(
    path: P,
    result: &AnalysisResult,
    image_src: Option<&str>,
) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "html" | "htm" => html::write(&mut file, result, image_src),
        "json" => json::write(&mut file, result),
        _ => text::write(&mut file, result),
    }
}

/// Format a probability as a percentage with one decimal place.
///
/// `0.3333` → `"33.3%"`, `1.0` → `"100.0%"`. Exact ties round half up,
/// as the browser's `toFixed(1)` does (`0.0025` → `"0.3%"`), not to even.
pub fn percent_format(p: f64) -> String {
    if !p.is_finite() {
        return "-".to_string();
    }
    let tenths = (p * 1000.0).round();
    // Avoid "-0.0%"
    let tenths = if tenths == 0.0 { 0.0 } else { tenths };
    format!("{:.1}%", tenths / 10.0)
}

/// Escape text for interpolation into HTML content or attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
