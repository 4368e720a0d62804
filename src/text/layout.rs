//! Wrap engine: virtual lines and the visual/logical/offset mappings.
//!
//! A [`Layout`] projects a buffer's logical lines into virtual (wrapped)
//! lines for one `(wrap mode, wrap width)` configuration. Per-logical-line
//! span lists are cached relative to the line start and keyed by the line's
//! generation stamp, so an edit to one line recomputes that line only;
//! untouched lines keep their spans and merely shift. Re-layout is lazy:
//! nothing happens until the next read.

use crate::text::buffer::{LineInfo, TextBuffer, WRAP_SENTINEL};
use crate::unicode::scan;
use crate::unicode::{self, WidthMethod};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::trace;

/// Text wrapping mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    /// No wrapping: one virtual line per logical line.
    #[default]
    None,
    /// Wrap at cluster boundaries.
    Char,
    /// Wrap at word boundaries, with a char fallback inside long words.
    Word,
}

/// How a virtual line came to start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapKind {
    /// First virtual line of its logical line.
    Hard,
    /// Continuation created by a character-boundary break.
    SoftChar,
    /// Continuation created by a word-boundary break.
    SoftWord,
}

/// One row of the wrapped layout, in absolute byte offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VirtualLine {
    pub logical_row: u32,
    pub byte_start: u32,
    pub byte_end: u32,
    pub width: u32,
    pub kind: WrapKind,
}

/// Measurement result for a viewport size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextMeasure {
    pub line_count: u32,
    pub max_width: u32,
}

/// Line-relative span of one virtual line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Span {
    rel_start: u32,
    rel_end: u32,
    width: u32,
    kind: WrapKind,
}

#[derive(Clone, Debug)]
struct PerLine {
    generation: u32,
    spans: SmallVec<[Span; 2]>,
}

/// Cached wrapped layout of a buffer for one wrap configuration.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    wrap_mode: WrapMode,
    wrap_width: u32,
    tab_width: u8,
    per_line: Vec<PerLine>,
    flat: Vec<VirtualLine>,
    /// First flat index of each logical row.
    first_virtual: Vec<u32>,
    revision: u64,
    valid: bool,
}

impl Layout {
    /// New layout for a wrap configuration. A zero `wrap_width` disables
    /// wrapping regardless of mode.
    #[must_use]
    pub fn new(wrap_mode: WrapMode, wrap_width: u32) -> Self {
        Self {
            wrap_mode,
            wrap_width,
            ..Self::default()
        }
    }

    /// Change the wrap configuration; the next read re-layouts.
    pub fn configure(&mut self, wrap_mode: WrapMode, wrap_width: u32) {
        if self.wrap_mode != wrap_mode || self.wrap_width != wrap_width {
            self.wrap_mode = wrap_mode;
            self.wrap_width = wrap_width;
            self.per_line.clear();
            self.valid = false;
        }
    }

    #[must_use]
    pub fn wrap_mode(&self) -> WrapMode {
        self.wrap_mode
    }

    #[must_use]
    pub fn wrap_width(&self) -> u32 {
        self.wrap_width
    }

    fn effective_width(&self) -> Option<u32> {
        match self.wrap_mode {
            WrapMode::None => None,
            WrapMode::Char | WrapMode::Word if self.wrap_width == 0 => None,
            _ => Some(self.wrap_width),
        }
    }

    /// Bring the layout up to date with the buffer. Only lines whose
    /// generation changed are re-wrapped.
    pub fn ensure(&mut self, buffer: &TextBuffer) {
        if self.valid
            && self.revision == buffer.revision()
            && self.tab_width == buffer.tab_width()
        {
            return;
        }
        let tab_changed = self.tab_width != buffer.tab_width();
        if tab_changed {
            self.per_line.clear();
        }
        self.tab_width = buffer.tab_width();

        let rows = buffer.line_count() as usize;
        let width = self.effective_width();
        let method = buffer.width_method();
        let mut rewrapped = 0usize;

        // Generations are unique per line, so cached spans can be claimed
        // by generation no matter how the edit shifted row indices.
        let mut old: FxHashMap<u32, PerLine> = std::mem::take(&mut self.per_line)
            .into_iter()
            .map(|p| (p.generation, p))
            .collect();
        self.per_line = Vec::with_capacity(rows);
        for row in 0..rows {
            let generation = buffer.line_generation(row);
            if let Some(per) = old.remove(&generation) {
                self.per_line.push(per);
            } else {
                rewrapped += 1;
                self.per_line.push(PerLine {
                    generation,
                    spans: wrap_line(
                        buffer.line_content(row),
                        self.wrap_mode,
                        width,
                        u32::from(self.tab_width),
                        method,
                    ),
                });
            }
        }
        trace!(rows, rewrapped, "layout refreshed");

        self.flat.clear();
        self.first_virtual.clear();
        for (row, per) in self.per_line.iter().enumerate() {
            let base = buffer.line_start(row) as u32;
            self.first_virtual.push(self.flat.len() as u32);
            for span in &per.spans {
                self.flat.push(VirtualLine {
                    logical_row: row as u32,
                    byte_start: base + span.rel_start,
                    byte_end: base + span.rel_end,
                    width: span.width,
                    kind: span.kind,
                });
            }
        }
        self.revision = buffer.revision();
        self.valid = true;
    }

    /// Number of virtual lines.
    #[must_use]
    pub fn virtual_line_count(&self) -> u32 {
        self.flat.len() as u32
    }

    /// One virtual line; the index clamps to the last.
    #[must_use]
    pub fn virtual_line(&self, index: u32) -> VirtualLine {
        let clamped = (index as usize).min(self.flat.len().saturating_sub(1));
        self.flat.get(clamped).copied().unwrap_or(VirtualLine {
            logical_row: 0,
            byte_start: 0,
            byte_end: 0,
            width: 0,
            kind: WrapKind::Hard,
        })
    }

    /// All virtual lines.
    #[must_use]
    pub fn virtual_lines(&self) -> &[VirtualLine] {
        &self.flat
    }

    /// Index of the virtual line containing a byte offset. Offsets in the
    /// gap between a line's end and the next line's start (a collapsed
    /// soft-wrap space) belong to the earlier line's end; offsets at or
    /// past EOF land on the last line.
    #[must_use]
    pub fn virtual_row_of_offset(&self, buffer: &TextBuffer, byte_offset: usize) -> u32 {
        if self.flat.is_empty() {
            return 0;
        }
        let row = (buffer.row_at_offset(byte_offset) as usize).min(self.per_line.len() - 1);
        let first = self.first_virtual[row] as usize;
        let count = self.per_line[row].spans.len();
        let offset = byte_offset as u32;
        for k in (first..first + count).rev() {
            if self.flat[k].byte_start <= offset {
                return k as u32;
            }
        }
        first as u32
    }

    /// Parallel-array export: one entry per virtual line plus the sentinel
    /// separated soft-wrap positions per logical row (line-relative).
    #[must_use]
    pub fn line_info(&self) -> LineInfo {
        let mut info = LineInfo::default();
        for vline in &self.flat {
            info.starts.push(vline.byte_start);
            info.widths.push(vline.width);
            info.sources.push(vline.logical_row);
            info.max_width = info.max_width.max(vline.width);
        }
        if self.wrap_mode != WrapMode::None {
            for per in &self.per_line {
                for span in per.spans.iter().skip(1) {
                    info.wraps.push(span.rel_start);
                }
                info.wraps.push(WRAP_SENTINEL);
            }
        }
        info
    }

    /// Visual position of a byte offset.
    #[must_use]
    pub fn offset_to_visual(&self, buffer: &TextBuffer, byte_offset: usize) -> (u32, u32) {
        if self.flat.is_empty() {
            return (0, 0);
        }
        let offset = byte_offset.min(buffer.text().len());
        let vrow = self.virtual_row_of_offset(buffer, offset);
        let vline = self.flat[vrow as usize];
        let start = vline.byte_start as usize;
        let clamped = offset.max(start).min(vline.byte_end as usize);
        let prefix = &buffer.text()[start..clamped];
        let col = unicode::calculate_text_width(
            prefix,
            u32::from(self.tab_width),
            buffer.width_method(),
        );
        (vrow, col)
    }

    /// Map a visual position to `(logical_row, logical_col, byte_offset)`,
    /// snapping to the cluster boundary at or before the column.
    #[must_use]
    pub fn visual_to_logical(
        &self,
        buffer: &TextBuffer,
        visual_row: u32,
        visual_col: u32,
    ) -> (u32, u32, usize) {
        let vline = self.virtual_line(visual_row);
        let text = &buffer.text()[vline.byte_start as usize..vline.byte_end as usize];
        let pos = unicode::find_pos_by_width(
            text,
            visual_col,
            false,
            u32::from(self.tab_width),
            buffer.width_method(),
        );
        let offset = vline.byte_start as usize + pos.byte_offset;
        let row = vline.logical_row;
        let line_start = buffer.line_start(row as usize);
        let col = unicode::calculate_text_width(
            &buffer.text()[line_start..offset],
            u32::from(self.tab_width),
            buffer.width_method(),
        );
        (row, col, offset)
    }

    /// Map a logical position to `(visual_row, visual_col)`.
    #[must_use]
    pub fn logical_to_visual(
        &self,
        buffer: &TextBuffer,
        logical_row: u32,
        logical_col: u32,
    ) -> (u32, u32) {
        let row = (logical_row as usize).min(self.per_line.len().saturating_sub(1));
        let text = buffer.line_content(row);
        let pos = unicode::find_pos_by_width(
            text,
            logical_col,
            false,
            u32::from(self.tab_width),
            buffer.width_method(),
        );
        self.offset_to_visual(buffer, buffer.line_start(row) + pos.byte_offset)
    }

    /// Byte offset of the start of the virtual line containing `offset`.
    #[must_use]
    pub fn visual_sol(&self, buffer: &TextBuffer, byte_offset: usize) -> usize {
        let vrow = self.virtual_row_of_offset(buffer, byte_offset.min(buffer.text().len()));
        self.virtual_line(vrow).byte_start as usize
    }

    /// Byte offset of the end of the virtual line containing `offset`.
    #[must_use]
    pub fn visual_eol(&self, buffer: &TextBuffer, byte_offset: usize) -> usize {
        let vrow = self.virtual_row_of_offset(buffer, byte_offset.min(buffer.text().len()));
        self.virtual_line(vrow).byte_end as usize
    }

    /// Byte offset of the end of the logical line containing `offset`
    /// (before its terminator).
    #[must_use]
    pub fn logical_eol(&self, buffer: &TextBuffer, byte_offset: usize) -> usize {
        let row = buffer.row_at_offset(byte_offset) as usize;
        buffer.line_start(row) + buffer.line_content_len(row)
    }

    /// Measure for a viewport: how many virtual lines fit in `height` and
    /// the max width over those. An alive empty buffer measures `{1, 0}`.
    #[must_use]
    pub fn measure_for_dimensions(
        &self,
        buffer: &TextBuffer,
        width: u32,
        height: u32,
    ) -> Option<TextMeasure> {
        if height == 0 {
            return None;
        }
        let mut probe = Layout::new(self.wrap_mode, if self.wrap_mode == WrapMode::None {
            0
        } else {
            width
        });
        probe.ensure(buffer);
        let total = probe.virtual_line_count();
        let line_count = total.min(height);
        let max_width = probe
            .virtual_lines()
            .iter()
            .take(line_count as usize)
            .map(|v| v.width)
            .max()
            .unwrap_or(0);
        Some(TextMeasure {
            line_count,
            max_width,
        })
    }
}

/// Wrap one logical line's content into line-relative spans.
fn wrap_line(
    text: &str,
    mode: WrapMode,
    wrap_width: Option<u32>,
    tab_width: u32,
    method: WidthMethod,
) -> SmallVec<[Span; 2]> {
    let mut spans: SmallVec<[Span; 2]> = SmallVec::new();
    let Some(limit) = wrap_width else {
        return SmallVec::from_elem(
            Span {
                rel_start: 0,
                rel_end: text.len() as u32,
                width: unicode::calculate_text_width(text, tab_width, method),
                kind: WrapKind::Hard,
            },
            1,
        );
    };

    let mut consumed = 0usize;
    let mut kind = WrapKind::Hard;
    loop {
        let remaining = &text[consumed..];
        if remaining.is_empty() {
            if spans.is_empty() {
                spans.push(Span {
                    rel_start: 0,
                    rel_end: 0,
                    width: 0,
                    kind: WrapKind::Hard,
                });
            }
            break;
        }

        let fit = unicode::find_wrap_pos_by_width(remaining, limit, tab_width, method);
        let mut take = fit.byte_offset;
        let mut width = fit.columns_used;
        let mut next_kind = WrapKind::SoftChar;

        if take == 0 {
            // A single cluster wider than the limit becomes its own virtual
            // line; the renderer clips it.
            if let Some((_, cluster)) = unicode::clusters(remaining, method).next() {
                take = cluster.len();
                width = unicode::cluster_width(cluster, tab_width, method);
            } else {
                break;
            }
        } else if take < remaining.len() && mode == WrapMode::Word {
            // Retreat to the last wrap-break opportunity inside the prefix;
            // the break lands after the break character.
            let prefix = &remaining[..take];
            let mut best: Option<usize> = None;
            for wb in scan::find_wrap_breaks(prefix.as_bytes(), method) {
                let (_, ch_len) = scan::decode_utf8_unchecked(prefix.as_bytes(), wb.byte_offset);
                let after = wb.byte_offset + ch_len;
                if after < take {
                    best = Some(after);
                } else if after == take {
                    best = Some(after);
                }
            }
            if let Some(break_at) = best {
                if break_at < take {
                    take = break_at;
                    width = unicode::calculate_text_width(
                        &remaining[..take],
                        tab_width,
                        method,
                    );
                }
                next_kind = WrapKind::SoftWord;
            }
        }

        spans.push(Span {
            rel_start: consumed as u32,
            rel_end: (consumed + take) as u32,
            width,
            kind,
        });
        consumed += take;

        // Collapse at most one leading ASCII space of the continuation.
        if consumed < text.len() && text.as_bytes()[consumed] == b' ' {
            consumed += 1;
        }
        kind = next_kind;
    }
    spans
}
