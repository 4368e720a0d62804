//! Read-side view of a text buffer: viewport, wrapping, selection, export.
//!
//! A [`TextBufferView`] borrows its buffer and owns everything the renderer
//! needs that is not document content: the viewport rectangle, wrap
//! configuration, selection state, placeholder chunks, and the tab
//! indicator. The wrapped layout is cached behind a `RefCell` and re-keyed
//! on the buffer revision, so a view held across edits re-layouts lazily on
//! the next read.

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::style::StyledChunk;
use crate::text::buffer::{LineInfo, TextBuffer};
use crate::text::layout::{Layout, TextMeasure, WrapMode};
use crate::unicode;
use std::cell::{Ref, RefCell};

/// Viewport rectangle in visual cells. `{x, y}` doubles as the scroll
/// origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Create a new viewport.
    #[must_use]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Byte-offset selection `[start, end)` with optional colors.
///
/// `start` is the anchor and `end` the focus; `end < start` is a legal
/// in-progress state. Use [`Selection::normalized`] for range arithmetic.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
    pub fg: Option<Rgba>,
    pub bg: Option<Rgba>,
}

impl Selection {
    /// Create a new selection.
    #[must_use]
    pub fn new(start: usize, end: usize, fg: Option<Rgba>, bg: Option<Rgba>) -> Self {
        Self { start, end, fg, bg }
    }

    /// True when the selection covers no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Anchor/focus put in ascending order.
    #[must_use]
    pub fn normalized(&self) -> Self {
        if self.start <= self.end {
            *self
        } else {
            Self {
                start: self.end,
                end: self.start,
                ..*self
            }
        }
    }

    /// Whether a byte offset falls inside the selection.
    #[must_use]
    pub fn contains(&self, byte_offset: usize) -> bool {
        let norm = self.normalized();
        byte_offset >= norm.start && byte_offset < norm.end
    }
}

/// Selection expressed as visual anchor/focus cells.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocalSelection {
    pub anchor_x: u32,
    pub anchor_y: u32,
    pub focus_x: u32,
    pub focus_y: u32,
    pub fg: Option<Rgba>,
    pub bg: Option<Rgba>,
}

/// View of a text buffer with viewport, wrapping, and selection.
pub struct TextBufferView<'a> {
    buffer: &'a TextBuffer,
    viewport: Viewport,
    wrap_mode: WrapMode,
    wrap_width: Option<u32>,
    truncate: bool,
    selection: Option<Selection>,
    local_selection: Option<LocalSelection>,
    placeholder: Vec<StyledChunk>,
    tab_indicator: Option<char>,
    tab_indicator_color: Rgba,
    layout: RefCell<Layout>,
    destroyed: bool,
}

impl<'a> TextBufferView<'a> {
    /// Create a view of a buffer.
    #[must_use]
    pub fn new(buffer: &'a TextBuffer) -> Self {
        Self {
            buffer,
            viewport: Viewport::default(),
            wrap_mode: WrapMode::None,
            wrap_width: None,
            truncate: false,
            selection: None,
            local_selection: None,
            placeholder: Vec::new(),
            tab_indicator: None,
            tab_indicator_color: Rgba::WHITE,
            layout: RefCell::new(Layout::default()),
            destroyed: false,
        }
    }

    /// Builder: set the viewport.
    #[must_use]
    pub fn viewport(mut self, x: u32, y: u32, width: u32, height: u32) -> Self {
        self.viewport = Viewport::new(x, y, width, height);
        self
    }

    /// Builder: set the wrap mode.
    #[must_use]
    pub fn wrap_mode(mut self, mode: WrapMode) -> Self {
        self.wrap_mode = mode;
        self
    }

    /// Builder: set an explicit wrap width (overrides the viewport width).
    #[must_use]
    pub fn wrap_width(mut self, width: u32) -> Self {
        self.wrap_width = Some(width);
        self
    }

    /// Builder: enable or disable no-wrap truncation.
    #[must_use]
    pub fn truncate(mut self, enabled: bool) -> Self {
        self.truncate = enabled;
        self
    }

    /// Builder: set the tab indicator glyph and color.
    #[must_use]
    pub fn tab_indicator(mut self, glyph: char, color: Rgba) -> Self {
        self.tab_indicator = Some(glyph);
        self.tab_indicator_color = color;
        self
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

    /// Current viewport.
    #[must_use]
    pub fn viewport_rect(&self) -> Viewport {
        self.viewport
    }

    /// Set no-wrap truncation.
    pub fn set_truncate(&mut self, enabled: bool) {
        self.truncate = enabled;
    }

    /// Whether no-wrap truncation is on.
    #[must_use]
    pub fn truncate_enabled(&self) -> bool {
        self.truncate
    }

    /// Set the tab indicator glyph and color.
    pub fn set_tab_indicator(&mut self, glyph: char, color: Rgba) {
        self.tab_indicator = Some(glyph);
        self.tab_indicator_color = color;
    }

    /// Remove the tab indicator.
    pub fn clear_tab_indicator(&mut self) {
        self.tab_indicator = None;
    }

    /// Current tab indicator, if set.
    #[must_use]
    pub fn tab_indicator_glyph(&self) -> Option<(char, Rgba)> {
        self.tab_indicator.map(|g| (g, self.tab_indicator_color))
    }

    /// Replace the placeholder chunk list (shown when the buffer is empty).
    pub fn set_placeholder(&mut self, chunks: Vec<StyledChunk>) {
        self.placeholder = chunks;
    }

    /// Placeholder chunks to render, or `None` while the buffer has text.
    #[must_use]
    pub fn placeholder_chunks(&self) -> Option<&[StyledChunk]> {
        if self.buffer.is_empty() && !self.placeholder.is_empty() {
            Some(&self.placeholder)
        } else {
            None
        }
    }

    /// Destroy the view. Every later operation fails with
    /// [`Error::Destroyed`].
    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.layout.borrow_mut().configure(WrapMode::None, 0);
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.destroyed {
            Err(Error::destroyed("text buffer view"))
        } else {
            Ok(())
        }
    }

    /// Explicit wrap width if set, else the viewport width. Zero disables
    /// wrapping (the layout treats it as no-wrap).
    fn effective_wrap_width(&self) -> u32 {
        self.wrap_width.unwrap_or(self.viewport.width)
    }

    fn layout(&self) -> Ref<'_, Layout> {
        {
            let mut layout = self.layout.borrow_mut();
            layout.configure(self.wrap_mode, self.effective_wrap_width());
            layout.ensure(self.buffer);
        }
        self.layout.borrow()
    }

    /// Number of virtual (wrapped) lines.
    pub fn virtual_line_count(&self) -> Result<u32> {
        self.ensure_alive()?;
        Ok(self.layout().virtual_line_count())
    }

    /// Per-virtual-line parallel arrays for the renderer.
    pub fn line_info(&self) -> Result<LineInfo> {
        self.ensure_alive()?;
        Ok(self.layout().line_info())
    }

    /// Per-logical-line parallel arrays, wrap positions included.
    pub fn logical_line_info(&self) -> Result<LineInfo> {
        self.ensure_alive()?;
        let mut info = self.buffer.logical_line_info()?;
        info.wraps = self.layout().line_info().wraps;
        Ok(info)
    }

    /// Measure the layout for a candidate viewport size.
    pub fn measure_for_dimensions(&self, width: u32, height: u32) -> Result<Option<TextMeasure>> {
        self.ensure_alive()?;
        Ok(self.layout().measure_for_dimensions(self.buffer, width, height))
    }

    /// Visual position of a byte offset under the current wrap state.
    pub fn visual_position_for_offset(&self, byte_offset: usize) -> Result<(u32, u32)> {
        self.ensure_alive()?;
        Ok(self.layout().offset_to_visual(self.buffer, byte_offset))
    }

    /// Map a visual cell to `(logical_row, logical_col, byte_offset)`.
    pub fn visual_to_logical(&self, visual_row: u32, visual_col: u32) -> Result<(u32, u32, usize)> {
        self.ensure_alive()?;
        Ok(self
            .layout()
            .visual_to_logical(self.buffer, visual_row, visual_col))
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Set the selection as a byte range with optional colors.
    pub fn set_selection(
        &mut self,
        start: usize,
        end: usize,
        fg: Option<Rgba>,
        bg: Option<Rgba>,
    ) -> Result<()> {
        self.ensure_alive()?;
        let max = self.buffer.text().len();
        self.selection = Some(Selection::new(start.min(max), end.min(max), fg, bg));
        Ok(())
    }

    /// Move the focus of an in-progress selection; the anchor stays.
    pub fn update_selection(&mut self, end: usize) -> Result<()> {
        self.ensure_alive()?;
        let max = self.buffer.text().len();
        if let Some(sel) = self.selection.as_mut() {
            sel.end = end.min(max);
        }
        Ok(())
    }

    /// Clear the selection.
    pub fn reset_selection(&mut self) {
        self.selection = None;
        self.local_selection = None;
    }

    /// Current selection, if any.
    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Set a selection from visual anchor/focus cells.
    ///
    /// The conversion snaps to cluster boundaries: the leading endpoint
    /// snaps backward and the trailing endpoint forward, so a drag through
    /// the middle of a wide glyph selects the whole glyph.
    pub fn set_local_selection(
        &mut self,
        anchor_x: u32,
        anchor_y: u32,
        focus_x: u32,
        focus_y: u32,
        fg: Option<Rgba>,
        bg: Option<Rgba>,
    ) -> Result<()> {
        self.ensure_alive()?;
        let (start, end) = {
            let layout = self.layout();
            let anchor_first =
                (anchor_y, anchor_x) <= (focus_y, focus_x);
            let (back_x, back_y, fwd_x, fwd_y) = if anchor_first {
                (anchor_x, anchor_y, focus_x, focus_y)
            } else {
                (focus_x, focus_y, anchor_x, anchor_y)
            };
            let (_, _, start) = layout.visual_to_logical(self.buffer, back_y, back_x);
            let end = {
                let vline = layout.virtual_line(fwd_y);
                let text = &self.buffer.text()[vline.byte_start as usize..vline.byte_end as usize];
                let pos = unicode::find_pos_by_width(
                    text,
                    fwd_x,
                    true,
                    u32::from(self.buffer.tab_width()),
                    self.buffer.width_method(),
                );
                vline.byte_start as usize + pos.byte_offset
            };
            (start, end)
        };
        self.local_selection = Some(LocalSelection {
            anchor_x,
            anchor_y,
            focus_x,
            focus_y,
            fg,
            bg,
        });
        self.selection = Some(Selection::new(start, end, fg, bg));
        Ok(())
    }

    /// Current local selection, if any.
    #[must_use]
    pub fn local_selection(&self) -> Option<LocalSelection> {
        self.local_selection
    }

    // ------------------------------------------------------------------
    // Text export
    // ------------------------------------------------------------------

    /// Selected bytes, up to `max`. `None` without a non-empty selection.
    pub fn get_selected_text_bytes(&self, max: usize) -> Result<Option<Vec<u8>>> {
        self.ensure_alive()?;
        let Some(sel) = self.selection.map(|s| s.normalized()) else {
            return Ok(None);
        };
        if sel.is_empty() || self.buffer.is_empty() {
            return Ok(None);
        }
        let end = sel.end.min(self.buffer.text().len());
        let take = (end - sel.start).min(max);
        Ok(Some(
            self.buffer.text().as_bytes()[sel.start..sel.start + take].to_vec(),
        ))
    }

    /// Selected text as a string. `None` without a non-empty selection.
    pub fn selected_text(&self) -> Result<Option<String>> {
        let bytes = self.get_selected_text_bytes(usize::MAX)?;
        Ok(bytes.map(|b| String::from_utf8_lossy(&b).into_owned()))
    }

    /// The document bytes, up to `max`. `None` when the buffer is empty.
    pub fn get_plain_text_bytes(&self, max: usize) -> Result<Option<Vec<u8>>> {
        self.ensure_alive()?;
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let take = self.buffer.text().len().min(max);
        Ok(Some(self.buffer.text().as_bytes()[..take].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unicode::WidthMethod;

    fn buf(text: &str) -> TextBuffer {
        TextBuffer::with_text(text, WidthMethod::Unicode)
    }

    #[test]
    fn test_view_basic_counts() {
        let b = buf("Hello\nWorld");
        let view = TextBufferView::new(&b).viewport(0, 0, 80, 24);
        assert_eq!(view.virtual_line_count().unwrap(), 2);
    }

    #[test]
    fn test_view_wrap_width_from_viewport() {
        let b = buf("abcdefgh");
        let view = TextBufferView::new(&b)
            .viewport(0, 0, 3, 10)
            .wrap_mode(WrapMode::Char);
        assert_eq!(view.virtual_line_count().unwrap(), 3);
    }

    #[test]
    fn test_view_explicit_wrap_width_overrides() {
        let b = buf("abcdefgh");
        let view = TextBufferView::new(&b)
            .viewport(0, 0, 3, 10)
            .wrap_mode(WrapMode::Char)
            .wrap_width(4);
        assert_eq!(view.virtual_line_count().unwrap(), 2);
    }

    #[test]
    fn test_line_info_parallel_arrays() {
        let b = buf("abcd");
        let view = TextBufferView::new(&b)
            .viewport(0, 0, 2, 10)
            .wrap_mode(WrapMode::Char);
        let info = view.line_info().unwrap();
        assert_eq!(info.starts, vec![0, 2]);
        assert_eq!(info.widths, vec![2, 2]);
        assert_eq!(info.sources, vec![0, 0]);
        assert_eq!(info.max_width, 2);
    }

    #[test]
    fn test_logical_line_info_has_wraps() {
        let b = buf("abcd\nef");
        let view = TextBufferView::new(&b)
            .viewport(0, 0, 2, 10)
            .wrap_mode(WrapMode::Char);
        let info = view.logical_line_info().unwrap();
        assert_eq!(info.starts.len(), 2); // logical rows
        assert!(!info.wraps.is_empty());
    }

    #[test]
    fn test_selection_roundtrip() {
        let b = buf("Hello, World!");
        let mut view = TextBufferView::new(&b);
        view.set_selection(0, 5, None, None).unwrap();
        assert_eq!(view.selected_text().unwrap().as_deref(), Some("Hello"));
        view.update_selection(12).unwrap();
        assert_eq!(
            view.selected_text().unwrap().as_deref(),
            Some("Hello, World")
        );
        view.reset_selection();
        assert!(view.selected_text().unwrap().is_none());
    }

    #[test]
    fn test_selection_reversed_normalizes() {
        let b = buf("abcdef");
        let mut view = TextBufferView::new(&b);
        view.set_selection(4, 1, None, None).unwrap();
        assert_eq!(view.selected_text().unwrap().as_deref(), Some("bcd"));
    }

    #[test]
    fn test_selection_clamps() {
        let b = buf("abc");
        let mut view = TextBufferView::new(&b);
        view.set_selection(1, 999, None, None).unwrap();
        assert_eq!(view.selected_text().unwrap().as_deref(), Some("bc"));
    }

    #[test]
    fn test_local_selection_snaps_through_wide_glyphs() {
        let b = buf("世界ab");
        let mut view = TextBufferView::new(&b).viewport(0, 0, 80, 1);
        // Drag from inside 世 (col 1) to inside 界 (col 3): both glyphs.
        view.set_local_selection(1, 0, 3, 0, None, None).unwrap();
        assert_eq!(view.selected_text().unwrap().as_deref(), Some("世界"));
    }

    #[test]
    fn test_local_selection_reversed_direction() {
        let b = buf("abcdef");
        let mut view = TextBufferView::new(&b).viewport(0, 0, 80, 1);
        view.set_local_selection(4, 0, 1, 0, None, None).unwrap();
        let sel = view.selection().unwrap().normalized();
        assert_eq!((sel.start, sel.end), (1, 4));
    }

    #[test]
    fn test_get_plain_text_bytes() {
        let b = buf("hello");
        let view = TextBufferView::new(&b);
        assert_eq!(
            view.get_plain_text_bytes(usize::MAX).unwrap(),
            Some(b"hello".to_vec())
        );
        assert_eq!(view.get_plain_text_bytes(2).unwrap(), Some(b"he".to_vec()));

        let empty = TextBuffer::new(WidthMethod::Unicode);
        let view = TextBufferView::new(&empty);
        assert_eq!(view.get_plain_text_bytes(usize::MAX).unwrap(), None);
    }

    #[test]
    fn test_placeholder_only_when_empty() {
        let empty = TextBuffer::new(WidthMethod::Unicode);
        let mut view = TextBufferView::new(&empty);
        view.set_placeholder(vec![StyledChunk::plain("type here…")]);
        assert!(view.placeholder_chunks().is_some());

        let b = buf("content");
        let mut view = TextBufferView::new(&b);
        view.set_placeholder(vec![StyledChunk::plain("type here…")]);
        assert!(view.placeholder_chunks().is_none());
    }

    #[test]
    fn test_destroyed_view_errors() {
        let b = buf("abc");
        let mut view = TextBufferView::new(&b);
        view.destroy();
        assert!(matches!(
            view.line_info(),
            Err(Error::Destroyed { .. })
        ));
        assert!(matches!(
            view.get_plain_text_bytes(10),
            Err(Error::Destroyed { .. })
        ));
    }

    #[test]
    fn test_measure_empty_buffer_with_height() {
        let empty = TextBuffer::new(WidthMethod::Unicode);
        let view = TextBufferView::new(&empty);
        let m = view.measure_for_dimensions(10, 5).unwrap().unwrap();
        assert_eq!(m.line_count, 1);
        assert_eq!(m.max_width, 0);
    }

    #[test]
    fn test_tab_indicator_accessors() {
        let b = buf("a\tb");
        let mut view = TextBufferView::new(&b).tab_indicator('→', Rgba::WHITE);
        assert_eq!(view.tab_indicator_glyph(), Some(('→', Rgba::WHITE)));
        view.clear_tab_indicator();
        assert_eq!(view.tab_indicator_glyph(), None);
    }
}
