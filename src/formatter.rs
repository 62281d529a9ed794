//! Rendering of merged entries into output lines.
//!
//! Every line of an entry gets its source's prefix and, when colors are
//! enabled, its source's 256-color code, so a multi-line entry reads as one
//! colored block:
//!
//! ```text
//! primary 2023-01-01 00:00:00,500 world
//! backup 2023-01-01 00:00:01,000 hello
//! backup   continuation
//! ```

use std::fmt::Write;

use owo_colors::{OwoColorize, XtermColors};

use crate::segment::Entry;

/// Default round-robin palette of xterm 256-color codes (no black, white or
/// greys).
pub const DEFAULT_PALETTE: &[u8] = &[1, 2, 3, 4, 5, 6, 9, 10, 11, 12, 13, 14];

/// Color for the source at `index`, cycling through `palette`.
pub fn palette_color(palette: &[u8], index: usize) -> Option<u8> {
    if palette.is_empty() {
        return None;
    }
    Some(palette[index % palette.len()])
}

/// Render one raw line into `out`.
///
/// `prefix` is followed by a single space. Color is applied only when both
/// `use_color` is set and the source has a color.
pub fn render_line(
    line: &str,
    prefix: Option<&str>,
    color: Option<u8>,
    use_color: bool,
    out: &mut String,
) {
    let text = match prefix {
        Some(prefix) => format!("{prefix} {line}"),
        None => line.to_string(),
    };

    match color {
        Some(code) if use_color => {
            let _ = write!(out, "{}", text.color(XtermColors::from(code)));
        }
        _ => out.push_str(&text),
    }
}

/// Render every line of `entry`, appending to `out`.
pub fn render_into(
    entry: &Entry,
    prefix: Option<&str>,
    color: Option<u8>,
    use_color: bool,
    out: &mut Vec<String>,
) {
    for line in &entry.lines {
        let mut rendered = String::with_capacity(line.len() + 16);
        render_line(line, prefix, color, use_color, &mut rendered);
        out.push(rendered);
    }
}

/// Render `entry` into a fresh list of output lines.
pub fn render(
    entry: &Entry,
    prefix: Option<&str>,
    color: Option<u8>,
    use_color: bool,
) -> Vec<String> {
    let mut out = Vec::with_capacity(entry.lines.len());
    render_into(entry, prefix, color, use_color, &mut out);
    out
}
