//! Editor view: wrap-aware cursor movement over an edit buffer.
//!
//! [`EditorView`] owns an [`EditBuffer`] plus the visual state an editor
//! widget needs: wrap configuration, viewport, goal column for vertical
//! movement, placeholder chunks, and the tab indicator. Horizontal movement
//! and edits delegate to the edit buffer; vertical movement walks virtual
//! (wrapped) rows and re-lands the cursor at the remembered goal column.

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::style::StyledChunk;
use crate::text::buffer::LineInfo;
use crate::text::edit::{EditBuffer, LogicalCursor};
use crate::text::layout::{Layout, TextMeasure, WrapMode};
use crate::text::view::Viewport;
use crate::unicode;
use std::cell::RefCell;

/// Cursor position in the wrapped (visual) coordinate system.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisualCursor {
    pub visual_row: u32,
    pub visual_col: u32,
    pub logical_row: u32,
    pub logical_col: u32,
    pub offset: u32,
}

/// Editor view wrapping an [`EditBuffer`] with visual cursor handling.
pub struct EditorView {
    edit: EditBuffer,
    viewport: Viewport,
    wrap_mode: WrapMode,
    wrap_width: Option<u32>,
    goal_col: Option<u32>,
    placeholder: Vec<StyledChunk>,
    tab_indicator: Option<char>,
    tab_indicator_color: Rgba,
    layout: RefCell<Layout>,
    destroyed: bool,
}

impl EditorView {
    /// Create an editor view over an edit buffer.
    #[must_use]
    pub fn new(edit: EditBuffer) -> Self {
        Self {
            edit,
            viewport: Viewport::default(),
            wrap_mode: WrapMode::None,
            wrap_width: None,
            goal_col: None,
            placeholder: Vec::new(),
            tab_indicator: None,
            tab_indicator_color: Rgba::WHITE,
            layout: RefCell::new(Layout::default()),
            destroyed: false,
        }
    }

    /// The wrapped edit buffer.
    #[must_use]
    pub fn edit_buffer(&self) -> &EditBuffer {
        &self.edit
    }

    /// Mutable access to the wrapped edit buffer. Direct edits through
    /// this keep cursor invariants (the buffer maintains them) but bypass
    /// the goal column, which resets on the next vertical move anyway.
    pub fn edit_buffer_mut(&mut self) -> &mut EditBuffer {
        self.goal_col = None;
        &mut self.edit
    }

    /// The full text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.edit.text()
    }

    /// Destroy the view and its buffer.
    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.edit.destroy();
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.destroyed {
            Err(Error::destroyed("editor view"))
        } else {
            Ok(())
        }
    }

    /// Set the wrap mode.
    pub fn set_wrap_mode(&mut self, mode: WrapMode) {
        self.wrap_mode = mode;
    }

    /// Set an explicit wrap width; `None` derives it from the viewport.
    pub fn set_wrap_width(&mut self, width: Option<u32>) {
        self.wrap_width = width;
    }

    /// Set the viewport rectangle.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Replace the placeholder chunk list (shown when the buffer is empty).
    pub fn set_placeholder(&mut self, chunks: Vec<StyledChunk>) {
        self.placeholder = chunks;
    }

    /// Placeholder chunks to render, or `None` while the buffer has text.
    #[must_use]
    pub fn placeholder_chunks(&self) -> Option<&[StyledChunk]> {
        if self.edit.buffer().is_empty() && !self.placeholder.is_empty() {
            Some(&self.placeholder)
        } else {
            None
        }
    }

    /// Set the tab indicator glyph and color.
    pub fn set_tab_indicator(&mut self, glyph: char, color: Rgba) {
        self.tab_indicator = Some(glyph);
        self.tab_indicator_color = color;
    }

    /// Current tab indicator, if set.
    #[must_use]
    pub fn tab_indicator_glyph(&self) -> Option<(char, Rgba)> {
        self.tab_indicator.map(|g| (g, self.tab_indicator_color))
    }

    fn effective_wrap_width(&self) -> u32 {
        self.wrap_width.unwrap_or(self.viewport.width)
    }

    fn with_layout<R>(&self, f: impl FnOnce(&Layout) -> R) -> R {
        let mut layout = self.layout.borrow_mut();
        layout.configure(self.wrap_mode, self.effective_wrap_width());
        layout.ensure(self.edit.buffer());
        f(&layout)
    }

    // ------------------------------------------------------------------
    // Edits (all reset the goal column)
    // ------------------------------------------------------------------

    /// Insert text at the cursor.
    pub fn insert_text(&mut self, text: &str) -> Result<()> {
        self.ensure_alive()?;
        self.goal_col = None;
        self.edit.insert_text(text)
    }

    /// Insert one character at the cursor.
    pub fn insert_char(&mut self, ch: char) -> Result<()> {
        self.ensure_alive()?;
        self.goal_col = None;
        self.edit.insert_char(ch)
    }

    /// Insert a line break.
    pub fn new_line(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.goal_col = None;
        self.edit.new_line()
    }

    /// Delete the cluster before the cursor (or merge rows at column 0).
    pub fn delete_char_backward(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.goal_col = None;
        self.edit.delete_char_backward()
    }

    /// Delete the cluster after the cursor (or merge rows at end of line).
    pub fn delete_char_forward(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.goal_col = None;
        self.edit.delete_char_forward()
    }

    /// Delete the selected bytes.
    pub fn delete_selected_text(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.goal_col = None;
        self.edit.delete_selected_text()
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Set the selection as a byte range.
    pub fn set_selection(&mut self, start: usize, end: usize) -> Result<()> {
        self.ensure_alive()?;
        self.edit.set_selection(start, end);
        Ok(())
    }

    /// Move the selection focus, keeping the anchor.
    pub fn update_selection(&mut self, end: usize) -> Result<()> {
        self.ensure_alive()?;
        self.edit.update_selection(end);
        Ok(())
    }

    /// Clear the selection.
    pub fn reset_selection(&mut self) {
        self.edit.reset_selection();
    }

    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    /// Current logical cursor.
    #[must_use]
    pub fn get_cursor(&self) -> LogicalCursor {
        self.edit.cursor()
    }

    /// Current cursor in visual coordinates.
    pub fn get_visual_cursor(&self) -> Result<VisualCursor> {
        self.ensure_alive()?;
        let cursor = self.edit.cursor();
        let (visual_row, visual_col) =
            self.with_layout(|l| l.offset_to_visual(self.edit.buffer(), cursor.offset as usize));
        Ok(VisualCursor {
            visual_row,
            visual_col,
            logical_row: cursor.row,
            logical_col: cursor.col,
            offset: cursor.offset,
        })
    }

    /// Move the cursor to a byte offset, snapping to a cluster boundary.
    pub fn set_cursor_by_offset(&mut self, byte_offset: usize) -> Result<()> {
        self.ensure_alive()?;
        self.goal_col = None;
        self.edit.set_cursor_by_offset(byte_offset)
    }

    /// Jump to the start of a row.
    pub fn goto_line(&mut self, row: u32) -> Result<()> {
        self.ensure_alive()?;
        self.goal_col = None;
        self.edit.goto_line(row)
    }

    /// Move one cluster left.
    pub fn move_cursor_left(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.goal_col = None;
        self.edit.move_cursor_left()
    }

    /// Move one cluster right.
    pub fn move_cursor_right(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.goal_col = None;
        self.edit.move_cursor_right()
    }

    /// Move one *visual* row up, keeping the goal column. A no-op on the
    /// first visual row.
    pub fn move_cursor_up(&mut self) -> Result<()> {
        self.move_vertical(-1)
    }

    /// Move one *visual* row down, keeping the goal column. A no-op on the
    /// last visual row.
    pub fn move_cursor_down(&mut self) -> Result<()> {
        self.move_vertical(1)
    }

    fn move_vertical(&mut self, delta: i32) -> Result<()> {
        self.ensure_alive()?;
        let cursor_offset = self.edit.cursor().offset as usize;
        let buffer = self.edit.buffer();
        let target_offset = {
            let tab_width = u32::from(buffer.tab_width());
            let method = buffer.width_method();
            self.with_layout(|layout| {
                let (vrow, vcol) = layout.offset_to_visual(buffer, cursor_offset);
                let count = layout.virtual_line_count();
                let target = vrow as i64 + i64::from(delta);
                if target < 0 || target >= i64::from(count) {
                    return None;
                }
                let goal = self.goal_col.unwrap_or(vcol);
                let vline = layout.virtual_line(target as u32);
                let text =
                    &buffer.text()[vline.byte_start as usize..vline.byte_end as usize];
                // Snap to the cluster start at or before the goal column;
                // a goal inside a wide glyph lands on the glyph's start.
                let pos = unicode::find_pos_by_width(text, goal, false, tab_width, method);
                Some((goal, vline.byte_start as usize + pos.byte_offset))
            })
        };
        if let Some((goal, offset)) = target_offset {
            self.edit.set_cursor_by_offset(offset)?;
            self.goal_col = Some(goal);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Position queries
    // ------------------------------------------------------------------

    /// Byte offset of the next word boundary after the cursor.
    #[must_use]
    pub fn get_next_word_boundary(&self) -> u32 {
        self.edit.get_next_word_boundary()
    }

    /// Byte offset of the previous word boundary before the cursor.
    #[must_use]
    pub fn get_prev_word_boundary(&self) -> u32 {
        self.edit.get_prev_word_boundary()
    }

    /// Byte offset of the end of the cursor's logical line.
    #[must_use]
    pub fn get_eol(&self) -> u32 {
        self.edit.get_eol()
    }

    /// Byte offset of the start of the cursor's virtual line.
    pub fn get_visual_sol(&self) -> Result<u32> {
        self.ensure_alive()?;
        let offset = self.edit.cursor().offset as usize;
        Ok(self.with_layout(|l| l.visual_sol(self.edit.buffer(), offset)) as u32)
    }

    /// Byte offset of the end of the cursor's virtual line.
    pub fn get_visual_eol(&self) -> Result<u32> {
        self.ensure_alive()?;
        let offset = self.edit.cursor().offset as usize;
        Ok(self.with_layout(|l| l.visual_eol(self.edit.buffer(), offset)) as u32)
    }

    // ------------------------------------------------------------------
    // Layout export
    // ------------------------------------------------------------------

    /// Number of virtual lines under the current wrap state.
    pub fn virtual_line_count(&self) -> Result<u32> {
        self.ensure_alive()?;
        Ok(self.with_layout(Layout::virtual_line_count))
    }

    /// Per-virtual-line parallel arrays for the renderer.
    pub fn line_info(&self) -> Result<LineInfo> {
        self.ensure_alive()?;
        Ok(self.with_layout(Layout::line_info))
    }

    /// Measure the layout for a candidate viewport size.
    pub fn measure_for_dimensions(&self, width: u32, height: u32) -> Result<Option<TextMeasure>> {
        self.ensure_alive()?;
        Ok(self.with_layout(|l| l.measure_for_dimensions(self.edit.buffer(), width, height)))
    }
}
