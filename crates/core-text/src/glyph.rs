//! Glyph cells: the atomic addressable unit of a line.
//!
//! A glyph carries two forms. The *logical* form is what the cell means and
//! what gets compared, hashed, and saved. The *rendered* form is what the
//! renderer draws and differs from the logical form only for substitution
//! glyphs (a tab renders as an arrow but remains a tab on disk). Colors are
//! packed RGBA, most significant byte first.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use unicode_width::UnicodeWidthStr;

/// Color applied to glyphs when no configuration is in play (opaque white).
pub const DEFAULT_TEXT_COLOR: u32 = 0xFFFF_FFFF;
/// Color of substitution glyphs such as the tab arrow.
pub const SPECIAL_GLYPH_COLOR: u32 = 0x8888_88FF;

/// One column's character unit: a decoded grapheme cluster with an
/// independent rendered form and an RGBA color attribute.
#[derive(Debug, Clone)]
pub struct Glyph {
    logical: String,
    rendered: String,
    color: u32,
}

impl Glyph {
    /// A glyph whose rendered form equals its logical form.
    pub fn new(cluster: &str) -> Self {
        Self::with_color(cluster, DEFAULT_TEXT_COLOR)
    }

    pub fn with_color(cluster: &str, color: u32) -> Self {
        Self {
            logical: cluster.to_owned(),
            rendered: cluster.to_owned(),
            color,
        }
    }

    /// A substitution glyph: drawn as `rendered`, compared and saved as
    /// `logical`.
    pub fn substitution(logical: &str, rendered: &str, color: u32) -> Self {
        Self {
            logical: logical.to_owned(),
            rendered: rendered.to_owned(),
            color,
        }
    }

    pub fn logical(&self) -> &str {
        &self.logical
    }

    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn set_color(&mut self, color: u32) {
        self.color = color;
    }

    /// Terminal cell width of the rendered form, for the rendering
    /// collaborator. Buffer geometry itself is cell-count based.
    pub fn render_width(&self) -> usize {
        self.rendered.width()
    }
}

/// Equality is defined solely on the logical form; rendered form and color
/// are presentation attributes.
impl PartialEq for Glyph {
    fn eq(&self, other: &Self) -> bool {
        self.logical == other.logical
    }
}

impl Eq for Glyph {}

impl Hash for Glyph {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.logical.hash(state);
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.logical)
    }
}

const WORD_DELIMITERS: &str = " \t\n()[]<>\"'.,:;!?@$%^&_|\\/`~#*-+=";

/// Whether this glyph terminates a word for word-wise motions.
pub fn is_word_delimiter(glyph: &Glyph) -> bool {
    glyph
        .logical
        .chars()
        .next()
        .is_some_and(|c| WORD_DELIMITERS.contains(c))
}

/// Substitution table consulted while decoding raw text: maps a source
/// character to the glyph that stands in for it.
#[derive(Debug, Clone)]
pub struct SpecialGlyphs {
    map: HashMap<char, Glyph>,
}

impl SpecialGlyphs {
    /// The standard table: tab draws as an arrow while staying a tab
    /// logically.
    pub fn standard() -> Self {
        let mut map = HashMap::new();
        map.insert(
            '\t',
            Glyph::substitution("\t", "\u{2192}", SPECIAL_GLYPH_COLOR),
        );
        Self { map }
    }

    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn insert(&mut self, source: char, glyph: Glyph) {
        self.map.insert(source, glyph);
    }

    pub fn get(&self, source: char) -> Option<&Glyph> {
        self.map.get(&source)
    }
}

impl Default for SpecialGlyphs {
    fn default() -> Self {
        Self::standard()
    }
}
