//! Bounded, branch-discarding undo/redo log with time-windowed squashing.
//!
//! The log is an owned vector of records plus a plain integer cursor; element
//! 0 is the permanent `Head` sentinel ("no edits applied") and is never
//! evicted or stepped past. Pushing while the cursor sits anywhere before
//! the tail discards the abandoned redo branch; pushing while it sits on
//! `Head` wipes the whole log. On overflow the record immediately after
//! `Head` (the oldest live record) is evicted silently.
//!
//! Squashing merges a new record into the record under the cursor when the
//! two form one temporally and spatially contiguous logical edit, so rapid
//! typing or repeated deletes undo as a unit. An isolated space insertion
//! never merges, which keeps word-boundary undo granularity.

use std::fmt;
use std::time::{Duration, Instant};

use core_text::{Position, SelectionShape, TextBuffer};
use tracing::{debug, trace};

use crate::Document;

/// Maximum live records kept when no configuration is supplied.
pub const DEFAULT_CAPACITY: usize = 1024;
/// Merge window between two records' creation timestamps.
pub const DEFAULT_SQUASH_WINDOW: Duration = Duration::from_millis(1000);

/// What a record did to the buffer. Squash eligibility and undo/redo replay
/// dispatch on this exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Non-mutating sentinel at the front of the log.
    Head,
    AddText,
    RemoveText,
    AddNewline,
    RemoveNewline,
}

/// One structured edit: enough captured state to invert the operation.
#[derive(Debug, Clone)]
pub struct EditRecord {
    kind: EditKind,
    pos: Position,
    payload: TextBuffer,
    cursor: Position,
    shape: SelectionShape,
    created_at: Instant,
}

impl EditRecord {
    fn new(
        kind: EditKind,
        pos: Position,
        payload: TextBuffer,
        cursor: Position,
        shape: SelectionShape,
    ) -> Self {
        Self {
            kind,
            pos,
            payload,
            cursor,
            shape,
            created_at: Instant::now(),
        }
    }

    pub(crate) fn head() -> Self {
        Self::new(
            EditKind::Head,
            Position::origin(),
            TextBuffer::new(),
            Position::origin(),
            SelectionShape::None,
        )
    }

    pub fn add_text(
        pos: Position,
        payload: TextBuffer,
        cursor: Position,
        shape: SelectionShape,
    ) -> Self {
        Self::new(EditKind::AddText, pos, payload, cursor, shape)
    }

    pub fn remove_text(
        pos: Position,
        payload: TextBuffer,
        cursor: Position,
        shape: SelectionShape,
    ) -> Self {
        Self::new(EditKind::RemoveText, pos, payload, cursor, shape)
    }

    pub fn add_newline(pos: Position, cursor: Position) -> Self {
        Self::new(
            EditKind::AddNewline,
            pos,
            TextBuffer::new(),
            cursor,
            SelectionShape::None,
        )
    }

    pub fn remove_newline(pos: Position, cursor: Position) -> Self {
        Self::new(
            EditKind::RemoveNewline,
            pos,
            TextBuffer::new(),
            cursor,
            SelectionShape::None,
        )
    }

    pub fn kind(&self) -> EditKind {
        self.kind
    }

    pub fn pos(&self) -> Position {
        self.pos
    }

    /// Cursor position at the moment the edit was made; undo/redo hand this
    /// back so the editing layer can restore it.
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn shape(&self) -> SelectionShape {
        self.shape
    }

    pub fn payload(&self) -> &TextBuffer {
        &self.payload
    }

    /// Where the recorded span ends, for replay.
    pub fn end(&self) -> Position {
        self.payload.end_from(self.pos, SelectionShape::TextLike)
    }

    /// Where forward-contiguous typing (or backspacing) would continue after
    /// this record. Unlike `end`, the start column is always added; the two
    /// agree for the single-row payloads squashing compares.
    fn contiguous_end(&self) -> Position {
        Position::new(
            self.pos.x + self.payload.row_width(-1),
            self.pos.y + self.payload.total_rows() - 1,
        )
    }

    fn is_lone_space(&self) -> bool {
        self.payload.total_rows() == 1
            && self.payload.row_width(0) == 1
            && self.payload.row_at(Position::origin())[0].logical() == " "
    }

    /// Try to absorb `other` into `self` in place. Returns whether the merge
    /// happened.
    fn squash(&mut self, other: &EditRecord, window: Duration) -> bool {
        if other.created_at.duration_since(self.created_at) > window {
            return false;
        }
        match (self.kind, other.kind) {
            (EditKind::AddText, EditKind::AddText) => {
                // An isolated space never merges: word-boundary granularity.
                if other.is_lone_space() {
                    return false;
                }
                if self.contiguous_end() == other.pos {
                    self.payload.concat(&other.payload);
                    return true;
                }
                false
            }
            (EditKind::RemoveText, EditKind::RemoveText) => {
                if self.pos == other.pos {
                    // Repeated forward delete at a fixed position.
                    self.payload.concat(&other.payload);
                    return true;
                }
                if other.contiguous_end() == self.pos {
                    // Repeated backspace: the new span ends where ours began.
                    let mut merged = other.payload.clone();
                    merged.concat(&self.payload);
                    self.payload = merged;
                    self.pos = other.pos;
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    /// Replay the exact inverse of this edit, with recording disabled.
    pub fn undo(&self, doc: &mut Document) {
        match self.kind {
            EditKind::Head => {}
            EditKind::AddText => {
                doc.remove_text(
                    self.pos,
                    self.end(),
                    self.cursor,
                    SelectionShape::TextLike,
                    false,
                );
            }
            EditKind::RemoveText => {
                doc.insert_text(
                    self.pos,
                    &self.payload,
                    self.cursor,
                    SelectionShape::TextLike,
                    false,
                );
            }
            EditKind::AddNewline => doc.remove_newline(self.pos, self.cursor, false),
            EditKind::RemoveNewline => doc.add_newline(self.pos, self.cursor, false),
        }
    }

    /// Re-apply this edit, with recording disabled.
    pub fn redo(&self, doc: &mut Document) {
        match self.kind {
            EditKind::Head => {}
            EditKind::AddText => {
                doc.insert_text(
                    self.pos,
                    &self.payload,
                    self.cursor,
                    SelectionShape::TextLike,
                    false,
                );
            }
            EditKind::RemoveText => {
                doc.remove_text(
                    self.pos,
                    self.end(),
                    self.cursor,
                    SelectionShape::TextLike,
                    false,
                );
            }
            EditKind::AddNewline => doc.add_newline(self.pos, self.cursor, false),
            EditKind::RemoveNewline => doc.remove_newline(self.pos, self.cursor, false),
        }
    }

    fn payload_summary(&self) -> String {
        let mut out = String::new();
        let rows = self.payload.total_rows();
        for (i, row) in self.payload.rows().enumerate() {
            for cell in row {
                out.push_str(cell.logical());
            }
            if i + 1 < rows {
                out.push_str("\\n");
            }
        }
        out
    }
}

impl fmt::Display for EditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EditKind::Head => write!(f, "Head[]"),
            EditKind::AddText | EditKind::RemoveText => write!(
                f,
                "{:?}[pos={}, text=\"{}\", shape={:?}, c={}]",
                self.kind,
                self.pos,
                self.payload_summary(),
                self.shape,
                self.cursor
            ),
            EditKind::AddNewline | EditKind::RemoveNewline => {
                write!(f, "{:?}[pos={}, c={}]", self.kind, self.pos, self.cursor)
            }
        }
    }
}

/// The undo/redo log: records plus a movable "present" cursor.
#[derive(Debug)]
pub struct EditHistory {
    /// `records[0]` is always the `Head` sentinel.
    records: Vec<EditRecord>,
    cursor: usize,
    capacity: usize,
    squash_window: Duration,
}

impl EditHistory {
    pub fn new(capacity: usize, squash_window: Duration) -> Self {
        Self {
            records: vec![EditRecord::head()],
            cursor: 0,
            capacity,
            squash_window,
        }
    }

    /// Live records, excluding the head sentinel.
    pub fn len(&self) -> usize {
        self.records.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn squash_window(&self) -> Duration {
        self.squash_window
    }

    /// Truncate to the head sentinel and reset the cursor.
    pub fn clear(&mut self) {
        self.records.truncate(1);
        self.cursor = 0;
    }

    /// Append a record, discarding any abandoned redo branch, evicting the
    /// oldest record on overflow, and squashing into the record under the
    /// cursor when the two form one contiguous logical edit.
    pub fn push(&mut self, record: EditRecord) {
        if self.cursor == 0 {
            // A new edit issued while sitting on Head abandons everything.
            if self.len() > 0 {
                trace!(target: "state.history", dropped = self.len(), "edit at head wiped the log");
            }
            self.clear();
        } else if self.cursor + 1 < self.records.len() {
            let dropped = self.records.len() - self.cursor - 1;
            self.records.truncate(self.cursor + 1);
            trace!(target: "state.history", dropped, "redo branch discarded");
        }

        if self.records.len() > 1 && self.records.len() == self.capacity + 1 {
            self.records.remove(1);
            self.cursor -= 1;
            trace!(target: "state.history", capacity = self.capacity, "oldest record evicted");
        }

        let window = self.squash_window;
        let absorbed = self.cursor > 0 && {
            let last = self.records.len() - 1;
            self.records[last].squash(&record, window)
        };
        if absorbed {
            trace!(target: "state.history", record = %record, "record squashed into predecessor");
        } else {
            trace!(target: "state.history", record = %record, "record pushed");
            self.records.push(record);
        }
        self.cursor = self.records.len() - 1;
    }

    /// The record at the cursor, or none while sitting on `Head`.
    pub fn current(&self) -> Option<&EditRecord> {
        if self.cursor == 0 {
            return None;
        }
        self.records.get(self.cursor)
    }

    /// The record immediately after the cursor, if any.
    pub fn peek_next(&self) -> Option<&EditRecord> {
        self.records.get(self.cursor + 1)
    }

    /// Move the cursor toward `Head`, clamped.
    pub fn step_back(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move the cursor toward the newest record, clamped.
    pub fn step_forward(&mut self) {
        if self.cursor + 1 < self.records.len() {
            self.cursor += 1;
        }
    }

    /// Live records in log order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &EditRecord> {
        self.records.iter().skip(1)
    }

    /// Dump the whole log with a marker on the cursor.
    pub fn log_records(&self) {
        let mut rendered = String::from("document history:");
        for (i, record) in self.records.iter().enumerate() {
            let marker = if i == self.cursor { " -> " } else { "    " };
            rendered.push('\n');
            rendered.push_str(marker);
            rendered.push_str(&record.to_string());
        }
        debug!(target: "state.history", "{rendered}");
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_SQUASH_WINDOW)
    }
}
