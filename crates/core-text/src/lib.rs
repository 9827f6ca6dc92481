//! Line-oriented editable text buffer.
//!
//! The buffer is an ordered collection of lines of glyph cells; it owns all
//! structural mutation (insert, remove, split, newline add/remove) under two
//! selection geometries: contiguous `TextLike` spans and columnar
//! `Rectangular` blocks.
//!
//! Invariants (must hold after every public call):
//! * The buffer always has at least one row, even for empty content.
//! * `max_row_width` is recomputed after every structural mutation.
//!
//! Out-of-range positions are caller-validated preconditions and are only
//! debug-asserted here; the editing layer clamps cursor and selection
//! positions against buffer bounds before calling. `SelectionShape::None`
//! reaching a span operation is an exhaustiveness bug and panics.

use std::cmp::Ordering;
use std::fmt;

mod decode;
mod glyph;

pub use decode::{decode, decode_line};
pub use glyph::{
    DEFAULT_TEXT_COLOR, Glyph, SPECIAL_GLYPH_COLOR, SpecialGlyphs, is_word_delimiter,
};

/// One row of the buffer; insertion order is column order.
pub type Line = Vec<Glyph>;

/// Zero-based `(x = column, y = row)` buffer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub const fn origin() -> Self {
        Self { x: 0, y: 0 }
    }
}

/// Row-major ordering: by row, then by column.
impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Geometry used to interpret a two-point span.
///
/// `None` is a sentinel for non-span edits (newline add/remove) and is
/// rejected by span operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionShape {
    None,
    TextLike,
    Rectangular,
}

/// Ordered rows of glyph cells with a cached maximum row width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<Line>,
    max_row_width: usize,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    /// An empty buffer: one empty row.
    pub fn new() -> Self {
        Self {
            lines: vec![Line::new()],
            max_row_width: 0,
        }
    }

    /// Build a buffer from rows. An empty row set collapses to the empty
    /// buffer so the at-least-one-row invariant holds from construction.
    pub fn from_lines(mut lines: Vec<Line>) -> Self {
        if lines.is_empty() {
            lines.push(Line::new());
        }
        let mut buffer = Self {
            lines,
            max_row_width: 0,
        };
        buffer.recalc_max_row_width();
        buffer
    }

    pub fn total_rows(&self) -> usize {
        self.lines.len()
    }

    /// Cell count of a row. Negative rows index from the end: `-1` is the
    /// last row.
    pub fn row_width(&self, row: isize) -> usize {
        let row = self.resolve_row(row);
        self.lines[row].len()
    }

    pub fn max_row_width(&self) -> usize {
        self.max_row_width
    }

    /// The row addressed by `pos` (column ignored for row lookup).
    pub fn row_at(&self, pos: Position) -> &Line {
        &self.lines[pos.y]
    }

    pub fn rows(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    /// True for the freshly constructed single empty row.
    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    /// Where a fragment equal to `self`, applied at `start`, logically ends.
    pub fn end_from(&self, start: Position, shape: SelectionShape) -> Position {
        let last_row = self.total_rows() - 1;
        match shape {
            SelectionShape::TextLike => {
                let mut x = self.row_width(last_row as isize);
                if last_row == 0 {
                    x += start.x;
                }
                Position::new(x, start.y + last_row)
            }
            SelectionShape::Rectangular => {
                Position::new(start.x + self.max_row_width(), start.y + last_row)
            }
            SelectionShape::None => panic!("span end requested for SelectionShape::None"),
        }
    }

    /// Insert `fragment` at `pos`.
    ///
    /// `TextLike` splits the target row at `pos.x`, splices the fragment's
    /// rows in, and reattaches the displaced suffix onto the last inserted
    /// row; the row count grows by `fragment.total_rows() - 1`.
    ///
    /// `Rectangular` inserts each fragment row's cells at column `pos.x` of
    /// the corresponding buffer row, clamping the column to the row's last
    /// valid index when the row is shorter; no rows are created.
    pub fn insert(&mut self, pos: Position, fragment: &TextBuffer, shape: SelectionShape) {
        match shape {
            SelectionShape::TextLike => {
                debug_assert!(pos.y < self.lines.len());
                debug_assert!(pos.x <= self.lines[pos.y].len());
                let displaced = self.lines[pos.y].split_off(pos.x);
                self.lines[pos.y].extend(fragment.lines[0].iter().cloned());
                let at = pos.y + 1;
                self.lines
                    .splice(at..at, fragment.lines[1..].iter().cloned());
                let last = pos.y + fragment.lines.len() - 1;
                self.lines[last].extend(displaced);
            }
            SelectionShape::Rectangular => {
                let finish_row = pos.y + fragment.total_rows() - 1;
                debug_assert!(finish_row < self.lines.len());
                for row in pos.y..=finish_row {
                    let width = self.lines[row].len();
                    let col = pos.x.min(width.saturating_sub(1));
                    let cells = fragment.lines[row - pos.y].iter().cloned();
                    self.lines[row].splice(col..col, cells);
                }
            }
            SelectionShape::None => panic!("insert called with SelectionShape::None"),
        }
        self.recalc_max_row_width();
    }

    /// Remove the span `[from, to)` and return the removed content.
    ///
    /// Callers must pass `from <= to` in row-major order (`Document`
    /// normalizes). `Rectangular` normalizes columns itself, records an empty
    /// row for every row shorter than the start column, and clamps the
    /// exclusive end column to the row's last valid index.
    pub fn remove(&mut self, from: Position, to: Position, shape: SelectionShape) -> TextBuffer {
        let mut deleted: Vec<Line> = Vec::new();

        match shape {
            SelectionShape::TextLike => {
                debug_assert!(from <= to);
                debug_assert!(to.y < self.lines.len());
                if from.y == to.y {
                    let removed: Line = self.lines[from.y].drain(from.x..to.x).collect();
                    deleted.push(removed);
                } else {
                    deleted.push(self.lines[from.y][from.x..].to_vec());
                    for row in from.y + 1..to.y {
                        deleted.push(self.lines[row].clone());
                    }
                    deleted.push(self.lines[to.y][..to.x].to_vec());

                    let suffix: Line = self.lines[to.y][to.x..].to_vec();
                    self.lines.drain(from.y + 1..=to.y);
                    self.lines[from.y].truncate(from.x);
                    self.lines[from.y].extend(suffix);
                }
            }
            SelectionShape::Rectangular => {
                let (start_col, finish_col) = if from.x <= to.x {
                    (from.x, to.x)
                } else {
                    (to.x, from.x)
                };
                let finish_row = to.y.min(self.total_rows() - 1);
                for row in from.y..=finish_row {
                    let width = self.lines[row].len();
                    if start_col >= width {
                        deleted.push(Line::new());
                        continue;
                    }
                    let end = finish_col.min(width - 1);
                    let removed: Line = self.lines[row].drain(start_col..end).collect();
                    deleted.push(removed);
                }
            }
            SelectionShape::None => panic!("remove called with SelectionShape::None"),
        }
        self.recalc_max_row_width();

        TextBuffer::from_lines(deleted)
    }

    /// Split the row at `pos.x`; the tail becomes a new row immediately
    /// after.
    pub fn add_newline(&mut self, pos: Position) {
        debug_assert!(pos.y < self.lines.len());
        debug_assert!(pos.x <= self.lines[pos.y].len());
        let tail = self.lines[pos.y].split_off(pos.x);
        self.lines.insert(pos.y + 1, tail);
        self.recalc_max_row_width();
    }

    /// Merge row `pos.y + 1` onto the end of row `pos.y`.
    pub fn remove_newline(&mut self, pos: Position) {
        debug_assert!(pos.y + 1 < self.lines.len());
        let next = self.lines.remove(pos.y + 1);
        self.lines[pos.y].extend(next);
        self.recalc_max_row_width();
    }

    /// Partition into two buffers at `pos` without mutating `self`: the
    /// first ends just before the split cell, the second begins at it. A
    /// position past the content returns `(self, empty)`.
    pub fn split(&self, pos: Position) -> (TextBuffer, TextBuffer) {
        if pos.y >= self.lines.len() || pos.x >= self.lines[pos.y].len() {
            return (self.clone(), TextBuffer::new());
        }

        let mut before: Vec<Line> = self.lines[..pos.y].to_vec();
        before.push(self.lines[pos.y][..pos.x].to_vec());

        let mut after: Vec<Line> = vec![self.lines[pos.y][pos.x..].to_vec()];
        after.extend(self.lines[pos.y + 1..].iter().cloned());

        (TextBuffer::from_lines(before), TextBuffer::from_lines(after))
    }

    /// Merge `other` onto the end: its first row joins the last row, its
    /// remaining rows append. Used by history squashing, not by edit paths.
    pub fn concat(&mut self, other: &TextBuffer) {
        if let Some((first, rest)) = other.lines.split_first() {
            let last = self.lines.len() - 1;
            self.lines[last].extend(first.iter().cloned());
            self.lines.extend(rest.iter().cloned());
        }
        self.recalc_max_row_width();
    }

    /// Encode to the persisted format: each row's logical forms followed by
    /// a newline.
    pub fn to_contents(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            for cell in line {
                out.push_str(cell.logical());
            }
            out.push('\n');
        }
        out
    }

    fn resolve_row(&self, row: isize) -> usize {
        if row >= 0 {
            row as usize
        } else {
            let resolved = self.lines.len() as isize + row;
            debug_assert!(resolved >= 0);
            resolved as usize
        }
    }

    fn recalc_max_row_width(&mut self) {
        self.max_row_width = self.lines.iter().map(Vec::len).max().unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(raw: &str) -> TextBuffer {
        decode(raw, &SpecialGlyphs::standard(), DEFAULT_TEXT_COLOR)
    }

    fn rows(text: &TextBuffer) -> Vec<String> {
        text.rows()
            .map(|line| line.iter().map(Glyph::logical).collect())
            .collect()
    }

    #[test]
    fn fresh_buffer_has_one_row() {
        let text = TextBuffer::new();
        assert_eq!(text.total_rows(), 1);
        assert_eq!(text.max_row_width(), 0);
        assert!(text.is_empty());
        assert_eq!(TextBuffer::from_lines(Vec::new()).total_rows(), 1);
    }

    #[test]
    fn negative_rows_index_from_the_end() {
        let text = buffer("ab\ncde\nf");
        assert_eq!(text.row_width(-1), 1);
        assert_eq!(text.row_width(-2), 3);
        assert_eq!(text.row_width(0), 2);
    }

    #[test]
    fn end_from_text_like() {
        let single = buffer("xyz");
        assert_eq!(
            single.end_from(Position::new(2, 1), SelectionShape::TextLike),
            Position::new(5, 1)
        );
        let multi = buffer("xy\nz");
        assert_eq!(
            multi.end_from(Position::new(2, 1), SelectionShape::TextLike),
            Position::new(1, 2)
        );
    }

    #[test]
    fn end_from_rectangular() {
        let block = buffer("ab\ncde");
        assert_eq!(
            block.end_from(Position::new(1, 1), SelectionShape::Rectangular),
            Position::new(4, 2)
        );
    }

    #[test]
    #[should_panic(expected = "SelectionShape::None")]
    fn end_from_rejects_none_shape() {
        buffer("ab").end_from(Position::origin(), SelectionShape::None);
    }

    #[test]
    fn insert_text_like_single_row() {
        let mut text = buffer("ab\ncd");
        text.insert(
            Position::new(1, 0),
            &buffer("X"),
            SelectionShape::TextLike,
        );
        assert_eq!(rows(&text), ["aXb", "cd"]);
        assert_eq!(text.max_row_width(), 3);
    }

    #[test]
    fn insert_text_like_multi_row_reattaches_suffix() {
        let mut text = buffer("print_if_you_want\nHello\nWorld!");
        let fragment = buffer("load from\nanother file");
        text.insert(Position::new(2, 1), &fragment, SelectionShape::TextLike);

        assert_eq!(text.total_rows(), 4);
        assert_eq!(rows(&text)[1], "Heload from");
        assert_eq!(rows(&text)[2], "another filello");
        assert_eq!(text.row_width(1), 2 + fragment.row_width(0));
        assert_eq!(text.row_width(2), fragment.row_width(-1) + 5 - 2);
    }

    #[test]
    fn insert_rectangular_one_column_per_row() {
        let mut text = buffer("ab\ncd");
        text.insert(
            Position::new(1, 0),
            &buffer("1\n2"),
            SelectionShape::Rectangular,
        );
        assert_eq!(rows(&text), ["a1b", "c2d"]);
        assert_eq!(text.total_rows(), 2);
    }

    #[test]
    fn insert_rectangular_clamps_to_last_valid_index() {
        let mut text = buffer("abcd\nx");
        text.insert(
            Position::new(3, 0),
            &buffer("1\n2"),
            SelectionShape::Rectangular,
        );
        // Second row is shorter than the target column; the cell lands at
        // the row's last valid index, not at its width.
        assert_eq!(rows(&text), ["abc1d", "2x"]);
    }

    #[test]
    fn remove_text_like_single_row() {
        let mut text = buffer("print_if_you_want\nHello\nWorld!");
        let removed = text.remove(
            Position::new(3, 0),
            Position::new(10, 0),
            SelectionShape::TextLike,
        );
        assert_eq!(text.total_rows(), 3);
        assert_eq!(text.row_width(0), 10);
        assert_eq!(rows(&removed), ["nt_if_y"]);
    }

    #[test]
    fn remove_text_like_multi_row_joins_edges() {
        let mut text = buffer("print_if_you_want\nHello\nWorld!");
        let removed = text.remove(
            Position::new(3, 0),
            Position::new(2, 1),
            SelectionShape::TextLike,
        );
        assert_eq!(text.total_rows(), 2);
        assert_eq!(rows(&text)[0], "prillo");
        assert_eq!(rows(&removed), ["nt_if_you_want", "He"]);
    }

    #[test]
    fn remove_rectangular_skips_short_rows() {
        let mut text = buffer("abcdef\nx\nqwerty");
        let removed = text.remove(
            Position::new(2, 0),
            Position::new(5, 2),
            SelectionShape::Rectangular,
        );
        // Row "x" is shorter than the start column: recorded as empty,
        // untouched. Long rows lose [2, min(5, width-1)).
        assert_eq!(rows(&text), ["abf", "x", "qwy"]);
        assert_eq!(rows(&removed), ["cde", "", "ert"]);
    }

    #[test]
    fn remove_rectangular_normalizes_columns() {
        let mut text = buffer("abcdef\nqwerty");
        let removed = text.remove(
            Position::new(4, 0),
            Position::new(1, 1),
            SelectionShape::Rectangular,
        );
        assert_eq!(rows(&text), ["aef", "qty"]);
        assert_eq!(rows(&removed), ["bcd", "wer"]);
    }

    #[test]
    fn insert_then_remove_is_identity() {
        let original = buffer("print_if_you_want\nHello\nWorld!");
        let fragment = buffer("load from\nanother file");
        let pos = Position::new(2, 1);

        let mut text = original.clone();
        text.insert(pos, &fragment, SelectionShape::TextLike);
        let end = fragment.end_from(pos, SelectionShape::TextLike);
        text.remove(pos, end, SelectionShape::TextLike);
        assert_eq!(text, original);
    }

    #[test]
    fn split_then_concat_is_identity() {
        let original = buffer("print_if_you_want\nHello\nWorld!");
        let pos = Position::new(2, 1);

        let (mut before, after) = original.split(pos);
        assert_eq!(before.total_rows(), pos.y + 1);
        assert_eq!(after.total_rows(), original.total_rows() - pos.y);
        assert_eq!(rows(&after)[0], "llo");

        before.concat(&after);
        assert_eq!(before, original);
    }

    #[test]
    fn split_past_content_returns_whole_buffer() {
        let original = buffer("ab\ncd");
        let (before, after) = original.split(Position::new(9, 0));
        assert_eq!(before, original);
        assert!(after.is_empty());
    }

    #[test]
    fn newline_add_then_remove_is_identity() {
        let original = buffer("print_if_you_want\nHello\nWorld!");
        let pos = Position::new(2, 1);

        let mut text = original.clone();
        text.add_newline(pos);
        assert_eq!(text.total_rows(), 4);
        assert_eq!(text.row_width(1), 2);
        assert_eq!(text.row_width(2), 3);

        text.remove_newline(pos);
        assert_eq!(text, original);
    }

    #[test]
    fn max_row_width_tracks_newline_ops() {
        let mut text = buffer("abcdef\nxy");
        text.add_newline(Position::new(3, 0));
        assert_eq!(text.max_row_width(), 3);
        text.remove_newline(Position::new(0, 0));
        assert_eq!(text.max_row_width(), 6);
    }

    #[test]
    fn concat_joins_first_row_onto_last() {
        let mut left = buffer("ab\ncd");
        let right = buffer("EF\ngh");
        left.concat(&right);
        assert_eq!(rows(&left), ["ab", "cdEF", "gh"]);
        assert_eq!(left.max_row_width(), 4);
    }

    #[test]
    fn to_contents_emits_logical_forms() {
        let text = buffer("a\tb\ncd");
        assert_eq!(text.to_contents(), "a\tb\ncd\n");
    }
}
