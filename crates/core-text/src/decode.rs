//! Raw text to glyph decoding.
//!
//! Rows are split on `'\n'`; each row is segmented into grapheme clusters and
//! every cluster becomes one glyph cell. Single-character clusters consult
//! the substitution table first so that special characters (tab) pick up
//! their rendered stand-in while keeping their logical form.

use unicode_segmentation::UnicodeSegmentation;

use crate::glyph::{Glyph, SpecialGlyphs};
use crate::{Line, TextBuffer};

/// Decode one row of raw text (no newlines) into glyph cells.
pub fn decode_line(raw: &str, specials: &SpecialGlyphs, color: u32) -> Line {
    let mut cells = Line::new();
    for cluster in raw.graphemes(true) {
        let mut chars = cluster.chars();
        if let (Some(c), None) = (chars.next(), chars.next())
            && let Some(special) = specials.get(c)
        {
            cells.push(special.clone());
            continue;
        }
        cells.push(Glyph::with_color(cluster, color));
    }
    cells
}

/// Decode a whole raw string into a buffer, splitting rows on every `'\n'`.
/// A trailing newline therefore yields a trailing empty row; file loading
/// uses line-based splitting instead (see `Document::load_from_file`).
pub fn decode(raw: &str, specials: &SpecialGlyphs, color: u32) -> TextBuffer {
    TextBuffer::from_lines(
        raw.split('\n')
            .map(|row| decode_line(row, specials, color))
            .collect(),
    )
}
