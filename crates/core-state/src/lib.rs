//! Document facade: buffer + history + persistent storage.
//!
//! `Document` exclusively owns one `TextBuffer` and one `EditHistory` and is
//! the single entry point through which all editing flows. Every mutating
//! call takes a `remember` flag: the normal edit paths pass `true` so a
//! record capturing enough state to invert the operation is appended to the
//! history; undo/redo replay stored records back through the same calls with
//! `remember = false` so replay is never re-recorded.
//!
//! File load failure is recoverable: the operation is a no-op, buffer and
//! history stay untouched, and the failure is reported to the caller. A
//! successful load replaces the buffer wholesale and resets the history by
//! constructing a fresh one.

use std::fs;
use std::mem;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use core_config::Config;
use core_text::{
    Glyph, Line, Position, SelectionShape, SpecialGlyphs, TextBuffer, decode, decode_line,
};
use tracing::{debug, error, trace};

pub mod history;
pub use history::{EditHistory, EditKind, EditRecord};

const DEFAULT_PATH: &str = "out.txt";

pub struct Document {
    buffer: TextBuffer,
    history: EditHistory,
    path: PathBuf,
    specials: SpecialGlyphs,
    text_color: u32,
    history_capacity: usize,
    squash_window: Duration,
}

impl Document {
    pub fn new(config: &Config) -> Self {
        let squash_window = Duration::from_millis(config.history.squash_window_ms);
        Self {
            buffer: TextBuffer::new(),
            history: EditHistory::new(config.history.capacity, squash_window),
            path: PathBuf::from(DEFAULT_PATH),
            specials: SpecialGlyphs::standard(),
            text_color: config.colors.text,
            history_capacity: config.history.capacity,
            squash_window,
        }
    }

    pub fn glyph_at(&self, pos: Position) -> &Glyph {
        &self.row_at(pos)[pos.x]
    }

    pub fn row_at(&self, pos: Position) -> &Line {
        self.buffer.row_at(pos)
    }

    pub fn total_rows(&self) -> usize {
        self.buffer.total_rows()
    }

    pub fn row_width(&self, row: isize) -> usize {
        self.buffer.row_width(row)
    }

    pub fn max_row_width(&self) -> usize {
        self.buffer.max_row_width()
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Retarget where `save_to_file` writes.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    pub fn specials(&self) -> &SpecialGlyphs {
        &self.specials
    }

    /// Decode raw text into a buffer fragment using this document's
    /// substitution table and text color (for paste and tests); does not
    /// touch the document.
    pub fn decode_str(&self, raw: &str) -> TextBuffer {
        decode(raw, &self.specials, self.text_color)
    }

    /// The whole buffer in the persisted format.
    pub fn contents(&self) -> String {
        self.buffer.to_contents()
    }

    /// Replace the buffer with the decoded contents of `path` and reset the
    /// history. On read failure nothing changes and the error is reported.
    pub fn load_from_file(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) => {
                error!(target: "state.document", path = %path.display(), %err, "cannot load file");
                return Err(err).with_context(|| format!("cannot load file: {}", path.display()));
            }
        };

        // Line-based split: a trailing newline does not become a trailing
        // empty row, so a save/load round trip is the identity.
        let rows: Vec<Line> = raw
            .lines()
            .map(|row| decode_line(row, &self.specials, self.text_color))
            .collect();
        self.buffer = TextBuffer::from_lines(rows);
        self.history = EditHistory::new(self.history_capacity, self.squash_window);
        self.path = path;
        debug!(
            target: "state.document",
            path = %self.path.display(),
            rows = self.buffer.total_rows(),
            "loaded"
        );
        Ok(())
    }

    /// Write the buffer to the document's path, each row's logical forms
    /// followed by a newline.
    pub fn save_to_file(&self) -> Result<()> {
        fs::write(&self.path, self.buffer.to_contents())
            .with_context(|| format!("cannot save to file: {}", self.path.display()))?;
        debug!(target: "state.document", path = %self.path.display(), "saved");
        Ok(())
    }

    /// Single-cell convenience wrapper around `insert_text`.
    pub fn insert_glyph(
        &mut self,
        pos: Position,
        glyph: Glyph,
        cursor: Position,
        shape: SelectionShape,
        remember: bool,
    ) {
        let fragment = TextBuffer::from_lines(vec![vec![glyph]]);
        self.insert_text(pos, &fragment, cursor, shape, remember);
    }

    pub fn insert_text(
        &mut self,
        pos: Position,
        fragment: &TextBuffer,
        cursor: Position,
        shape: SelectionShape,
        remember: bool,
    ) {
        if remember {
            self.history
                .push(EditRecord::add_text(pos, fragment.clone(), cursor, shape));
        }
        self.buffer.insert(pos, fragment, shape);
        trace!(target: "state.document", %pos, ?shape, remember, "insert_text");
    }

    /// Remove the span between `from` and `to` (normalized to row-major
    /// order) and return the removed fragment.
    pub fn remove_text(
        &mut self,
        mut from: Position,
        mut to: Position,
        cursor: Position,
        shape: SelectionShape,
        remember: bool,
    ) -> TextBuffer {
        if from > to {
            mem::swap(&mut from, &mut to);
        }

        let removed = self.buffer.remove(from, to, shape);
        if remember {
            self.history
                .push(EditRecord::remove_text(from, removed.clone(), cursor, shape));
        }
        trace!(target: "state.document", %from, %to, ?shape, remember, "remove_text");
        removed
    }

    pub fn add_newline(&mut self, pos: Position, cursor: Position, remember: bool) {
        self.buffer.add_newline(pos);
        if remember {
            self.history.push(EditRecord::add_newline(pos, cursor));
        }
        trace!(target: "state.document", %pos, remember, "add_newline");
    }

    pub fn remove_newline(&mut self, pos: Position, cursor: Position, remember: bool) {
        self.buffer.remove_newline(pos);
        if remember {
            self.history.push(EditRecord::remove_newline(pos, cursor));
        }
        trace!(target: "state.document", %pos, remember, "remove_newline");
    }

    /// Revert the record under the history cursor, if any, and step the
    /// cursor back. Returns the cursor position captured at edit time so the
    /// editing layer can restore it.
    pub fn undo(&mut self) -> Option<Position> {
        let record = self.history.current().cloned()?;
        record.undo(self);
        self.history.step_back();
        trace!(target: "state.document", record = %record, "undo");
        Some(record.cursor())
    }

    /// Re-apply the record after the history cursor, if any, and step the
    /// cursor forward.
    pub fn redo(&mut self) -> Option<Position> {
        let record = self.history.peek_next().cloned()?;
        record.redo(self);
        self.history.step_forward();
        trace!(target: "state.document", record = %record, "redo");
        Some(record.cursor())
    }

    /// Dump the history log through structured logging.
    pub fn log_history(&self) {
        self.history.log_records();
    }
}
