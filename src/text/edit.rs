//! Editable buffer: mutation with deterministic cursor movement.
//!
//! [`EditBuffer`] owns a [`TextBuffer`] and layers on a logical cursor, a
//! selection, and grouped undo/redo. Every mutation leaves the cursor on a
//! grapheme cluster boundary; every movement clamps instead of failing.
//! Visual (wrap-aware) cursor movement lives one layer up in
//! [`EditorView`](super::EditorView), which owns the wrap state.

use crate::error::{Error, Result};
use crate::text::buffer::{TextBuffer, floor_boundary};
use crate::text::view::Selection;
use crate::unicode::{self, WidthMethod};

/// Logical cursor: row, display column, byte offset. The three fields are
/// kept consistent; `offset` is authoritative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogicalCursor {
    pub row: u32,
    pub col: u32,
    pub offset: u32,
}

/// An edit operation for undo/redo.
#[derive(Clone, Debug)]
enum EditOp {
    Insert { offset: usize, text: String },
    Delete { offset: usize, text: String },
}

impl EditOp {
    fn invert(&self) -> Self {
        match self {
            Self::Insert { offset, text } => Self::Delete {
                offset: *offset,
                text: text.clone(),
            },
            Self::Delete { offset, text } => Self::Insert {
                offset: *offset,
                text: text.clone(),
            },
        }
    }
}

/// Default maximum number of undo groups to retain.
const DEFAULT_MAX_HISTORY_DEPTH: usize = 1000;

/// Grouped edit history with bounded depth.
#[derive(Clone, Debug)]
struct History {
    undo_stack: Vec<Vec<EditOp>>,
    redo_stack: Vec<Vec<EditOp>>,
    current_group: Vec<EditOp>,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            current_group: Vec::new(),
            max_depth: DEFAULT_MAX_HISTORY_DEPTH,
        }
    }
}

impl History {
    fn push(&mut self, op: EditOp) {
        self.current_group.push(op);
        self.redo_stack.clear();
    }

    fn commit(&mut self) {
        if !self.current_group.is_empty() {
            self.undo_stack
                .push(std::mem::take(&mut self.current_group));
            if self.undo_stack.len() > self.max_depth {
                let excess = self.undo_stack.len() - self.max_depth;
                self.undo_stack.drain(..excess);
            }
        }
    }

    fn pop_undo(&mut self) -> Option<Vec<EditOp>> {
        self.commit();
        self.undo_stack.pop()
    }

    fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_group.clear();
    }
}

/// Text buffer with editing operations, cursor, selection, and undo/redo.
pub struct EditBuffer {
    buffer: TextBuffer,
    cursor: LogicalCursor,
    selection: Option<Selection>,
    history: History,
}

impl EditBuffer {
    /// Create an empty edit buffer under a width method.
    #[must_use]
    pub fn new(method: WidthMethod) -> Self {
        Self {
            buffer: TextBuffer::new(method),
            cursor: LogicalCursor::default(),
            selection: None,
            history: History::default(),
        }
    }

    /// Create an edit buffer with initial text, cursor at the start.
    #[must_use]
    pub fn with_text(text: &str, method: WidthMethod) -> Self {
        Self {
            buffer: TextBuffer::with_text(text, method),
            cursor: LogicalCursor::default(),
            selection: None,
            history: History::default(),
        }
    }

    /// The underlying text buffer.
    #[must_use]
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// The full text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    /// Destroy the buffer; later operations fail loudly.
    pub fn destroy(&mut self) {
        self.buffer.destroy();
        self.cursor = LogicalCursor::default();
        self.selection = None;
        self.history.clear();
    }

    /// Replace the content, resetting cursor, selection, and history.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        self.buffer.set_text(text)?;
        self.cursor = LogicalCursor::default();
        self.selection = None;
        self.history.clear();
        Ok(())
    }

    /// Current cursor.
    #[must_use]
    pub fn cursor(&self) -> LogicalCursor {
        self.cursor
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.buffer.is_destroyed() {
            Err(Error::destroyed("edit buffer"))
        } else {
            Ok(())
        }
    }

    /// Move the cursor to a byte offset, snapping to a cluster boundary.
    pub fn set_cursor_by_offset(&mut self, byte_offset: usize) -> Result<()> {
        self.ensure_alive()?;
        self.cursor = self.cursor_at_offset(byte_offset);
        Ok(())
    }

    /// Jump to the start of a row (clamped to the last row).
    pub fn goto_line(&mut self, row: u32) -> Result<()> {
        self.ensure_alive()?;
        let row = row.min(self.buffer.line_count().saturating_sub(1));
        let offset = self.buffer.line_start(row as usize);
        self.cursor = LogicalCursor {
            row,
            col: 0,
            offset: offset as u32,
        };
        Ok(())
    }

    /// Recompute a full cursor for an arbitrary byte offset.
    fn cursor_at_offset(&self, byte_offset: usize) -> LogicalCursor {
        let offset = floor_boundary(self.buffer.text(), byte_offset);
        let row = self.buffer.row_at_offset(offset);
        let line_start = self.buffer.line_start(row as usize);
        let content_len = self.buffer.line_content_len(row as usize);
        // Clamp into the content (an offset inside a terminator snaps to
        // EOL), then back to the nearest cluster start.
        let mut rel = offset.saturating_sub(line_start).min(content_len);
        let content = self.buffer.line_content(row as usize);
        if rel < content_len {
            // A rel inside a cluster snaps back to that cluster's start.
            let mut boundary = 0usize;
            for (start, _) in unicode::clusters(content, self.buffer.width_method()) {
                if start > rel {
                    break;
                }
                boundary = start;
                if start == rel {
                    break;
                }
            }
            rel = boundary;
        }
        let col = unicode::calculate_text_width(
            &content[..rel],
            u32::from(self.buffer.tab_width()),
            self.buffer.width_method(),
        );
        LogicalCursor {
            row,
            col,
            offset: (line_start + rel) as u32,
        }
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Insert text at the cursor; the cursor lands after the insertion.
    pub fn insert_text(&mut self, text: &str) -> Result<()> {
        self.ensure_alive()?;
        if text.is_empty() {
            return Ok(());
        }
        let offset = self.cursor.offset as usize;
        self.buffer.insert(offset, text)?;
        self.history.push(EditOp::Insert {
            offset,
            text: text.to_string(),
        });
        self.cursor = self.cursor_at_offset(offset + text.len());
        Ok(())
    }

    /// Insert a single character at the cursor.
    pub fn insert_char(&mut self, ch: char) -> Result<()> {
        let mut utf8 = [0u8; 4];
        self.insert_text(ch.encode_utf8(&mut utf8))
    }

    /// Insert a line break; the cursor lands at column 0 of the new row.
    pub fn new_line(&mut self) -> Result<()> {
        self.insert_text("\n")
    }

    /// Delete the cluster before the cursor. At column 0 of row `R > 0`,
    /// the line terminator goes instead, merging `R` into `R - 1`.
    pub fn delete_char_backward(&mut self) -> Result<()> {
        self.ensure_alive()?;
        let offset = self.cursor.offset as usize;
        if offset == 0 {
            return Ok(());
        }
        let row = self.cursor.row as usize;
        let line_start = self.buffer.line_start(row);
        let from = if offset == line_start {
            // Remove the previous row's terminator.
            let term = self.buffer.line_terminator(self.cursor.row - 1)?;
            offset - term.len()
        } else {
            let content = self.buffer.line_content(row);
            let rel = offset - line_start;
            match unicode::get_prev_grapheme_start(
                &content[..rel],
                rel,
                u32::from(self.buffer.tab_width()),
                self.buffer.width_method(),
            ) {
                Some((start, _)) => line_start + start,
                None => line_start,
            }
        };
        self.delete_range(from, offset)
    }

    /// Delete the cluster after the cursor. At the end of row `R`, the
    /// terminator goes instead, merging `R + 1` into `R`.
    pub fn delete_char_forward(&mut self) -> Result<()> {
        self.ensure_alive()?;
        let offset = self.cursor.offset as usize;
        if offset >= self.buffer.text().len() {
            return Ok(());
        }
        let row = self.cursor.row as usize;
        let line_start = self.buffer.line_start(row);
        let content_len = self.buffer.line_content_len(row);
        let rel = offset - line_start;
        let to = if rel >= content_len {
            let term = self.buffer.line_terminator(self.cursor.row)?;
            offset + term.len()
        } else {
            let content = self.buffer.line_content(row);
            let mut cluster_end = content_len;
            for (start, cl) in unicode::clusters(content, self.buffer.width_method()) {
                if start == rel {
                    cluster_end = start + cl.len();
                    break;
                }
                if start > rel {
                    break;
                }
            }
            line_start + cluster_end
        };
        self.delete_range(offset, to)
    }

    /// Delete an arbitrary byte range, recording it for undo.
    pub fn delete_range(&mut self, start: usize, end: usize) -> Result<()> {
        self.ensure_alive()?;
        let max = self.buffer.text().len();
        let start = start.min(max);
        let end = end.min(max);
        if start >= end {
            return Ok(());
        }
        let removed = self.buffer.text()[start..end].to_string();
        self.buffer.delete(start..end)?;
        self.history.push(EditOp::Delete {
            offset: start,
            text: removed,
        });
        self.cursor = self.cursor_at_offset(start);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Cursor movement (logical)
    // ------------------------------------------------------------------

    /// Move one cluster left; crosses line starts onto the previous row's
    /// end. A no-op at the start of the buffer.
    pub fn move_cursor_left(&mut self) -> Result<()> {
        self.ensure_alive()?;
        let offset = self.cursor.offset as usize;
        if offset == 0 {
            return Ok(());
        }
        let row = self.cursor.row as usize;
        let line_start = self.buffer.line_start(row);
        let target = if offset == line_start {
            // Land on the previous row's end-of-content.
            let prev = row - 1;
            self.buffer.line_start(prev) + self.buffer.line_content_len(prev)
        } else {
            let content = self.buffer.line_content(row);
            let rel = offset - line_start;
            match unicode::get_prev_grapheme_start(
                &content[..rel],
                rel,
                u32::from(self.buffer.tab_width()),
                self.buffer.width_method(),
            ) {
                Some((start, _)) => line_start + start,
                None => line_start,
            }
        };
        self.cursor = self.cursor_at_offset(target);
        Ok(())
    }

    /// Move one cluster right; crosses line ends onto the next row's
    /// start. A no-op at the end of the buffer.
    pub fn move_cursor_right(&mut self) -> Result<()> {
        self.ensure_alive()?;
        let offset = self.cursor.offset as usize;
        if offset >= self.buffer.text().len() {
            return Ok(());
        }
        let row = self.cursor.row as usize;
        let line_start = self.buffer.line_start(row);
        let content_len = self.buffer.line_content_len(row);
        let rel = offset - line_start;
        let target = if rel >= content_len {
            // Cross the terminator to the next row's start.
            let term = self.buffer.line_terminator(self.cursor.row)?;
            offset + term.len().max(1)
        } else {
            let content = self.buffer.line_content(row);
            let mut next = content_len;
            for (start, cl) in unicode::clusters(content, self.buffer.width_method()) {
                if start >= rel {
                    next = start + cl.len();
                    break;
                }
            }
            line_start + next
        };
        self.cursor = self.cursor_at_offset(target);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Word boundaries
    // ------------------------------------------------------------------

    /// Byte offset of the next word boundary after the cursor.
    #[must_use]
    pub fn get_next_word_boundary(&self) -> u32 {
        self.buffer.next_word_boundary(self.cursor.offset as usize) as u32
    }

    /// Byte offset of the previous word boundary before the cursor.
    #[must_use]
    pub fn get_prev_word_boundary(&self) -> u32 {
        self.buffer.prev_word_boundary(self.cursor.offset as usize) as u32
    }

    /// Byte offset of the end of the cursor's logical line.
    #[must_use]
    pub fn get_eol(&self) -> u32 {
        let row = self.cursor.row as usize;
        (self.buffer.line_start(row) + self.buffer.line_content_len(row)) as u32
    }

    /// Move the cursor to the next word boundary.
    pub fn move_word_right(&mut self) -> Result<()> {
        let boundary = self.get_next_word_boundary();
        self.set_cursor_by_offset(boundary as usize)
    }

    /// Move the cursor to the previous word boundary.
    pub fn move_word_left(&mut self) -> Result<()> {
        let boundary = self.get_prev_word_boundary();
        self.set_cursor_by_offset(boundary as usize)
    }

    /// Delete from the cursor to the next word boundary.
    pub fn delete_word_forward(&mut self) -> Result<()> {
        let end = self.get_next_word_boundary() as usize;
        let start = self.cursor.offset as usize;
        if end > start {
            self.delete_range(start, end)
        } else {
            Ok(())
        }
    }

    /// Delete from the previous word boundary to the cursor.
    pub fn delete_word_backward(&mut self) -> Result<()> {
        let start = self.get_prev_word_boundary() as usize;
        let end = self.cursor.offset as usize;
        if start < end {
            self.delete_range(start, end)
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Set the selection as a byte range.
    pub fn set_selection(&mut self, start: usize, end: usize) {
        let max = self.buffer.text().len();
        self.selection = Some(Selection::new(start.min(max), end.min(max), None, None));
    }

    /// Move the selection focus, keeping the anchor.
    pub fn update_selection(&mut self, end: usize) {
        let max = self.buffer.text().len();
        if let Some(sel) = self.selection.as_mut() {
            sel.end = end.min(max);
        }
    }

    /// Clear the selection.
    pub fn reset_selection(&mut self) {
        self.selection = None;
    }

    /// Current selection.
    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Delete the selected bytes; the cursor lands at the range start.
    pub fn delete_selected_text(&mut self) -> Result<()> {
        let Some(sel) = self.selection.map(|s| s.normalized()) else {
            return Ok(());
        };
        self.selection = None;
        if sel.is_empty() {
            return Ok(());
        }
        self.delete_range(sel.start, sel.end)
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Close the current undo group.
    pub fn commit(&mut self) {
        self.history.commit();
    }

    /// Undo the last group. Returns whether anything was undone.
    pub fn undo(&mut self) -> bool {
        let Some(ops) = self.history.pop_undo() else {
            return false;
        };
        let mut redo_ops = Vec::with_capacity(ops.len());
        for op in ops.into_iter().rev() {
            self.apply_op(&op.invert());
            redo_ops.push(op);
        }
        redo_ops.reverse();
        self.history.redo_stack.push(redo_ops);
        true
    }

    /// Redo the last undone group. Returns whether anything was redone.
    pub fn redo(&mut self) -> bool {
        let Some(ops) = self.history.redo_stack.pop() else {
            return false;
        };
        for op in &ops {
            self.apply_op(op);
        }
        self.history.undo_stack.push(ops);
        true
    }

    /// Whether undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.history.undo_stack.is_empty() || !self.history.current_group.is_empty()
    }

    /// Whether redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.history.redo_stack.is_empty()
    }

    /// Drop all history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn apply_op(&mut self, op: &EditOp) {
        let result = match op {
            EditOp::Insert { offset, text } => {
                let r = self.buffer.insert(*offset, text);
                self.cursor = self.cursor_at_offset(offset + text.len());
                r
            }
            EditOp::Delete { offset, text } => {
                let r = self.buffer.delete(*offset..offset + text.len());
                self.cursor = self.cursor_at_offset(*offset);
                r
            }
        };
        // History replay over a healthy buffer only fails on OOM; the
        // cursor was already re-clamped above.
        let _ = result;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(text: &str) -> EditBuffer {
        EditBuffer::with_text(text, WidthMethod::Unicode)
    }

    #[test]
    fn test_insert_advances_cursor() {
        let mut e = EditBuffer::new(WidthMethod::Unicode);
        e.insert_text("Hello").unwrap();
        assert_eq!(e.text(), "Hello");
        assert_eq!(e.cursor().offset, 5);
        assert_eq!(e.cursor().col, 5);
    }

    #[test]
    fn test_insert_at_offset_scenario() {
        // Cursor at offset 1 in "abc"; inserting "XY" lands it at offset 3.
        let mut e = edit("abc");
        e.set_cursor_by_offset(1).unwrap();
        e.insert_text("XY").unwrap();
        assert_eq!(e.text(), "aXYbc");
        assert_eq!(e.cursor().offset, 3);
    }

    #[test]
    fn test_new_line_cursor_at_column_zero() {
        let mut e = edit("abc");
        e.set_cursor_by_offset(2).unwrap();
        e.new_line().unwrap();
        assert_eq!(e.text(), "ab\nc");
        assert_eq!(e.cursor().row, 1);
        assert_eq!(e.cursor().col, 0);
        assert_eq!(e.cursor().offset, 3);
    }

    #[test]
    fn test_delete_backward_cluster() {
        let mut e = edit("cafe\u{0301}");
        e.set_cursor_by_offset(6).unwrap();
        e.delete_char_backward().unwrap();
        // The whole e + combining acute goes.
        assert_eq!(e.text(), "caf");
        assert_eq!(e.cursor().offset, 3);
    }

    #[test]
    fn test_delete_backward_merges_rows() {
        let mut e = edit("ab\ncd");
        e.goto_line(1).unwrap();
        assert_eq!(e.cursor().col, 0);
        e.delete_char_backward().unwrap();
        assert_eq!(e.text(), "abcd");
        assert_eq!(e.cursor(), LogicalCursor { row: 0, col: 2, offset: 2 });
    }

    #[test]
    fn test_delete_backward_merges_crlf_row() {
        let mut e = edit("ab\r\ncd");
        e.goto_line(1).unwrap();
        e.delete_char_backward().unwrap();
        // Both terminator bytes go.
        assert_eq!(e.text(), "abcd");
    }

    #[test]
    fn test_delete_forward_at_eol_merges() {
        let mut e = edit("ab\ncd");
        e.set_cursor_by_offset(2).unwrap();
        e.delete_char_forward().unwrap();
        assert_eq!(e.text(), "abcd");
        assert_eq!(e.cursor().offset, 2);
    }

    #[test]
    fn test_delete_forward_cluster() {
        let mut e = edit("a👋b");
        e.set_cursor_by_offset(1).unwrap();
        e.delete_char_forward().unwrap();
        assert_eq!(e.text(), "ab");
    }

    #[test]
    fn test_delete_at_bounds_is_noop() {
        let mut e = edit("ab");
        e.set_cursor_by_offset(0).unwrap();
        e.delete_char_backward().unwrap();
        assert_eq!(e.text(), "ab");
        e.set_cursor_by_offset(2).unwrap();
        e.delete_char_forward().unwrap();
        assert_eq!(e.text(), "ab");
    }

    #[test]
    fn test_move_left_right_clusters() {
        let mut e = edit("a世b");
        e.set_cursor_by_offset(0).unwrap();
        e.move_cursor_right().unwrap();
        assert_eq!(e.cursor().offset, 1);
        e.move_cursor_right().unwrap();
        assert_eq!(e.cursor().offset, 4);
        assert_eq!(e.cursor().col, 3);
        e.move_cursor_left().unwrap();
        assert_eq!(e.cursor().offset, 1);
        assert_eq!(e.cursor().col, 1);
    }

    #[test]
    fn test_move_across_lines() {
        let mut e = edit("ab\ncd");
        e.set_cursor_by_offset(2).unwrap();
        e.move_cursor_right().unwrap();
        assert_eq!(e.cursor(), LogicalCursor { row: 1, col: 0, offset: 3 });
        e.move_cursor_left().unwrap();
        assert_eq!(e.cursor(), LogicalCursor { row: 0, col: 2, offset: 2 });
    }

    #[test]
    fn test_move_at_bounds_is_noop() {
        let mut e = edit("ab");
        e.set_cursor_by_offset(0).unwrap();
        e.move_cursor_left().unwrap();
        assert_eq!(e.cursor().offset, 0);
        e.set_cursor_by_offset(2).unwrap();
        e.move_cursor_right().unwrap();
        assert_eq!(e.cursor().offset, 2);
    }

    #[test]
    fn test_cursor_snaps_to_cluster_boundary() {
        let mut e = edit("a世b");
        // Offset 2 is inside 世.
        e.set_cursor_by_offset(2).unwrap();
        assert_eq!(e.cursor().offset, 1);
    }

    #[test]
    fn test_cursor_col_counts_display_columns() {
        let mut e = edit("a\tb");
        e.set_cursor_by_offset(2).unwrap();
        // a (1) + tab (4) = col 5.
        assert_eq!(e.cursor().col, 5);
    }

    #[test]
    fn test_word_boundaries() {
        let mut e = edit("hello world");
        e.set_cursor_by_offset(0).unwrap();
        assert_eq!(e.get_next_word_boundary(), 5);
        e.set_cursor_by_offset(8).unwrap();
        assert_eq!(e.get_prev_word_boundary(), 6);
    }

    #[test]
    fn test_word_boundaries_unicode() {
        let mut e = edit("héllo wörld");
        e.set_cursor_by_offset(0).unwrap();
        assert_eq!(e.get_next_word_boundary(), 6); // after héllo
    }

    #[test]
    fn test_word_moves_and_deletes() {
        let mut e = edit("hello world test");
        e.set_cursor_by_offset(0).unwrap();
        e.move_word_right().unwrap();
        assert_eq!(e.cursor().offset, 5);
        e.move_word_right().unwrap();
        assert_eq!(e.cursor().offset, 11);
        e.move_word_left().unwrap();
        assert_eq!(e.cursor().offset, 6);

        e.set_cursor_by_offset(0).unwrap();
        e.delete_word_forward().unwrap();
        assert_eq!(e.text(), " world test");

        e.set_cursor_by_offset(6).unwrap();
        e.delete_word_backward().unwrap();
        assert_eq!(e.text(), "  test");
    }

    #[test]
    fn test_goto_line_clamps() {
        let mut e = edit("a\nb\nc");
        e.goto_line(99).unwrap();
        assert_eq!(e.cursor().row, 2);
        assert_eq!(e.cursor().col, 0);
    }

    #[test]
    fn test_get_eol() {
        let mut e = edit("abc\ndef");
        e.set_cursor_by_offset(1).unwrap();
        assert_eq!(e.get_eol(), 3);
        e.goto_line(1).unwrap();
        assert_eq!(e.get_eol(), 7);
    }

    #[test]
    fn test_selection_delete() {
        let mut e = edit("hello world");
        e.set_selection(5, 11);
        e.delete_selected_text().unwrap();
        assert_eq!(e.text(), "hello");
        assert_eq!(e.cursor().offset, 5);
        assert!(e.selection().is_none());
    }

    #[test]
    fn test_selection_update_moves_focus_only() {
        let mut e = edit("abcdef");
        e.set_selection(1, 2);
        e.update_selection(5);
        let sel = e.selection().unwrap();
        assert_eq!((sel.start, sel.end), (1, 5));
    }

    #[test]
    fn test_undo_redo() {
        let mut e = EditBuffer::new(WidthMethod::Unicode);
        e.insert_text("Hello").unwrap();
        e.commit();
        e.insert_text(" World").unwrap();
        e.commit();
        assert_eq!(e.text(), "Hello World");

        assert!(e.undo());
        assert_eq!(e.text(), "Hello");
        assert!(e.undo());
        assert_eq!(e.text(), "");
        assert!(!e.undo());

        assert!(e.redo());
        assert_eq!(e.text(), "Hello");
        assert!(e.redo());
        assert_eq!(e.text(), "Hello World");
        assert!(!e.redo());
    }

    #[test]
    fn test_undo_restores_deletion() {
        let mut e = edit("Hello World");
        e.set_cursor_by_offset(11).unwrap();
        e.delete_char_backward().unwrap();
        e.commit();
        assert_eq!(e.text(), "Hello Worl");
        e.undo();
        assert_eq!(e.text(), "Hello World");
    }

    #[test]
    fn test_set_text_resets_state() {
        let mut e = edit("old");
        e.insert_text("x").unwrap();
        e.set_text("new").unwrap();
        assert_eq!(e.cursor().offset, 0);
        assert!(!e.can_undo());
    }
}
