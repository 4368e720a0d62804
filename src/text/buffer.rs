//! UTF-8 document store with an incrementally maintained line index.
//!
//! [`TextBuffer`] owns the document bytes (always valid UTF-8; byte input
//! is decoded lossily, so malformed sequences land as U+FFFD, never stored
//! raw) plus two derived structures:
//!
//! - the **logical line index**: one entry per span between hard terminators
//!   (`\n`, `\r`, `\r\n`), holding the start offset, content length,
//!   terminator kind, and a generation stamp;
//! - the **grapheme cache**: per line, the display width and the list of
//!   non-trivial clusters (tabs and multi-byte clusters), built lazily and
//!   invalidated by generation.
//!
//! Edits splice the line index: only rows overlapping the edit are
//! re-scanned for terminators, rows after it shift by the byte delta. A
//! terminator split or joined at a splice boundary (`\r` meeting `\n`) is
//! caught by widening the re-scan by one row.

use crate::error::{Error, Result};
use crate::grapheme_pool::{self, GraphemeHandle};
use crate::unicode::scan::{self, LineBreakKind};
use crate::unicode::{self, GraphemeInfo, WidthMethod};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::ops::Range;
use tracing::debug;

/// Sentinel separating per-line wrap position runs in [`LineInfo::wraps`].
pub const WRAP_SENTINEL: u32 = 0xFFFF_FFFF;

/// Hard terminator kind of a logical line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Terminator {
    /// Final line: terminated by end of buffer.
    #[default]
    None,
    Lf,
    Cr,
    CrLf,
}

impl Terminator {
    /// Terminator length in bytes.
    #[must_use]
    pub fn len(self) -> usize {
        match self {
            Self::None => 0,
            Self::Lf | Self::Cr => 1,
            Self::CrLf => 2,
        }
    }

    /// The terminator bytes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Lf => "\n",
            Self::Cr => "\r",
            Self::CrLf => "\r\n",
        }
    }
}

/// Snapshot of one logical line for callers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LogicalLine {
    /// Byte offset of the line start.
    pub start: u32,
    /// Content length in bytes, terminator excluded.
    pub len: u32,
    /// Display width under the buffer's method and tab width.
    pub width: u32,
    /// Non-trivial clusters (tabs and multi-byte); ASCII runs are implicit.
    pub clusters: Vec<GraphemeInfo>,
}

/// Parallel-array line export for the renderer.
///
/// At the buffer level `wraps` is always empty; views fill it with
/// [`WRAP_SENTINEL`]-separated soft-wrap byte positions per logical line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineInfo {
    /// Byte offset of each line start.
    pub starts: Vec<u32>,
    /// Display column width of each line.
    pub widths: Vec<u32>,
    /// Logical row that produced each line.
    pub sources: Vec<u32>,
    /// Sentinel-separated soft-wrap byte positions inside each logical row.
    pub wraps: Vec<u32>,
    /// Max over `widths`.
    pub max_width: u32,
}

impl LineInfo {
    /// Number of exported lines.
    #[must_use]
    pub fn virtual_line_count(&self) -> usize {
        self.starts.len()
    }

    /// First exported line produced by a logical row.
    #[must_use]
    pub fn source_to_virtual(&self, source_row: u32) -> Option<usize> {
        self.sources.iter().position(|&s| s == source_row)
    }

    /// Logical row that produced an exported line.
    #[must_use]
    pub fn virtual_to_source(&self, virtual_row: usize) -> Option<u32> {
        self.sources.get(virtual_row).copied()
    }

    /// How many exported lines a logical row produced.
    #[must_use]
    pub fn virtual_lines_for_source(&self, source_row: u32) -> usize {
        self.sources.iter().filter(|&&s| s == source_row).count()
    }
}

#[derive(Clone, Copy, Debug)]
struct LineMeta {
    start: u32,
    content_len: u32,
    term: Terminator,
    generation: u32,
}

impl LineMeta {
    fn end_with_term(&self) -> usize {
        self.start as usize + self.content_len as usize + self.term.len()
    }

    fn content_range(&self) -> Range<usize> {
        self.start as usize..(self.start + self.content_len) as usize
    }
}

/// Cached layout of one line: width plus the non-trivial cluster list, with
/// the pool handles the entry holds references on.
#[derive(Clone, Debug)]
struct LineCacheEntry {
    generation: u32,
    tab_width: u8,
    ascii: bool,
    width: u32,
    clusters: SmallVec<[GraphemeInfo; 4]>,
    handles: SmallVec<[GraphemeHandle; 4]>,
}

fn release_entry(entry: &LineCacheEntry) {
    for &h in &entry.handles {
        let _ = grapheme_pool::release(h);
    }
}

/// UTF-8 document store with logical line index and grapheme cache.
///
/// The width method is fixed at construction; the tab width is mutable.
/// Mutating operations are transactional: on allocation failure the buffer
/// is unchanged. Out-of-range offsets clamp, offsets inside a codepoint
/// snap to a boundary, and malformed byte input decodes to U+FFFD.
#[derive(Debug)]
pub struct TextBuffer {
    doc: String,
    lines: Vec<LineMeta>,
    cache: RefCell<Vec<Option<LineCacheEntry>>>,
    tab_width: u8,
    method: WidthMethod,
    revision: u64,
    next_generation: u32,
    destroyed: bool,
}

impl TextBuffer {
    /// Create an empty buffer under a width method.
    #[must_use]
    pub fn new(method: WidthMethod) -> Self {
        Self {
            doc: String::new(),
            lines: vec![LineMeta {
                start: 0,
                content_len: 0,
                term: Terminator::None,
                generation: 0,
            }],
            cache: RefCell::new(vec![None]),
            tab_width: 4,
            method,
            revision: 0,
            next_generation: 1,
            destroyed: false,
        }
    }

    /// Create a buffer with initial text. Falls back to an empty buffer if
    /// the initial allocation fails; use [`set_text`](Self::set_text) to
    /// observe the error instead.
    #[must_use]
    pub fn with_text(text: &str, method: WidthMethod) -> Self {
        let mut buffer = Self::new(method);
        if buffer.set_text(text).is_err() {
            buffer.doc.clear();
        }
        buffer
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.destroyed {
            Err(Error::destroyed("text buffer"))
        } else {
            Ok(())
        }
    }

    /// Width method, fixed at construction.
    #[must_use]
    pub fn width_method(&self) -> WidthMethod {
        self.method
    }

    /// Whether `destroy` has been called.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Tab width in columns (fixed expansion, not column-relative).
    #[must_use]
    pub fn tab_width(&self) -> u8 {
        self.tab_width
    }

    /// Set the tab width. Cached line widths are rebuilt on next access.
    pub fn set_tab_width(&mut self, width: u8) {
        let width = width.max(1);
        if self.tab_width != width {
            self.tab_width = width;
            self.revision = self.revision.wrapping_add(1);
        }
    }

    /// Document size in bytes.
    #[must_use]
    pub fn byte_size(&self) -> u64 {
        self.doc.len() as u64
    }

    /// True when the document holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }

    /// Number of logical lines. An empty buffer has one empty line.
    #[must_use]
    pub fn line_count(&self) -> u32 {
        self.lines.len() as u32
    }

    /// Monotonic revision, bumped by every mutation.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The whole document.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.doc
    }

    /// The document bytes (always valid UTF-8).
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.doc.as_bytes()
    }

    /// Destroy the buffer: release pool references and reject further use.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        for entry in self.cache.get_mut().iter().flatten() {
            release_entry(entry);
        }
        // Keep one empty line so internal accessors stay total; the
        // destroyed flag rejects every public operation.
        *self.cache.get_mut() = vec![None];
        self.doc = String::new();
        self.lines = vec![LineMeta {
            start: 0,
            content_len: 0,
            term: Terminator::None,
            generation: self.next_generation,
        }];
        self.destroyed = true;
        debug!("text buffer destroyed");
    }

    /// Replace the entire content.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        self.ensure_alive()?;
        let mut doc = String::new();
        doc.try_reserve_exact(text.len())
            .map_err(|e| Error::alloc("byte store", e))?;
        doc.push_str(text);

        for entry in self.cache.get_mut().iter().flatten() {
            release_entry(entry);
        }
        self.doc = doc;
        self.rebuild_index();
        self.revision = self.revision.wrapping_add(1);
        Ok(())
    }

    /// Replace the entire content from raw bytes; malformed UTF-8 becomes
    /// U+FFFD.
    pub fn set_text_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        match std::str::from_utf8(bytes) {
            Ok(s) => self.set_text(s),
            Err(_) => {
                let owned = String::from_utf8_lossy(bytes).into_owned();
                self.set_text(&owned)
            }
        }
    }

    /// Insert text at a byte offset. Beyond-EOF offsets append; an offset
    /// inside a codepoint snaps back to its start.
    pub fn insert(&mut self, byte_offset: usize, text: &str) -> Result<()> {
        self.ensure_alive()?;
        if text.is_empty() {
            return Ok(());
        }
        let offset = floor_boundary(&self.doc, byte_offset);
        self.splice(offset, offset, text)
    }

    /// Insert raw bytes; malformed UTF-8 becomes U+FFFD.
    pub fn insert_bytes(&mut self, byte_offset: usize, bytes: &[u8]) -> Result<()> {
        match std::str::from_utf8(bytes) {
            Ok(s) => self.insert(byte_offset, s),
            Err(_) => {
                let owned = String::from_utf8_lossy(bytes).into_owned();
                self.insert(byte_offset, &owned)
            }
        }
    }

    /// Append text at the end of the document.
    pub fn append(&mut self, text: &str) -> Result<()> {
        self.insert(usize::MAX, text)
    }

    /// Delete a byte range. The range clamps at EOF; partial codepoints are
    /// widened to whole ones.
    pub fn delete(&mut self, range: Range<usize>) -> Result<()> {
        self.ensure_alive()?;
        let start = floor_boundary(&self.doc, range.start);
        let end = ceil_boundary(&self.doc, range.end.min(self.doc.len()));
        if start >= end {
            return Ok(());
        }
        self.splice(start, end, "")
    }

    /// Row containing a byte offset (greatest row whose start is at or
    /// before it). Offsets past EOF land on the last row.
    #[must_use]
    pub fn row_at_offset(&self, byte_offset: usize) -> u32 {
        let offset = byte_offset.min(self.doc.len()) as u32;
        match self.lines.binary_search_by(|m| m.start.cmp(&offset)) {
            Ok(row) => row as u32,
            Err(next) => next.saturating_sub(1) as u32,
        }
    }

    /// Snapshot of one logical line. The row clamps to the last line.
    pub fn line(&self, row: u32) -> Result<LogicalLine> {
        self.ensure_alive()?;
        let row = (row as usize).min(self.lines.len() - 1);
        let meta = self.lines[row];
        let (width, clusters) = self.line_layout(row);
        Ok(LogicalLine {
            start: meta.start,
            len: meta.content_len,
            width,
            clusters,
        })
    }

    /// Content of one logical line, terminator excluded.
    pub fn line_text(&self, row: u32) -> Result<&str> {
        self.ensure_alive()?;
        let row = (row as usize).min(self.lines.len() - 1);
        Ok(&self.doc[self.lines[row].content_range()])
    }

    /// Display width of one logical line.
    pub fn line_width(&self, row: u32) -> Result<u32> {
        self.ensure_alive()?;
        let row = (row as usize).min(self.lines.len() - 1);
        Ok(self.line_layout(row).0)
    }

    /// Whether a line is printable ASCII only (byte == column arithmetic).
    pub fn line_is_ascii(&self, row: u32) -> Result<bool> {
        self.ensure_alive()?;
        let row = (row as usize).min(self.lines.len() - 1);
        self.ensure_cached(row);
        Ok(self
            .cache
            .borrow()
            .get(row)
            .and_then(|e| e.as_ref())
            .is_some_and(|e| e.ascii))
    }

    /// Terminator kind of one logical line.
    pub fn line_terminator(&self, row: u32) -> Result<Terminator> {
        self.ensure_alive()?;
        let row = (row as usize).min(self.lines.len() - 1);
        Ok(self.lines[row].term)
    }

    /// Per-logical-line parallel arrays. `wraps` stays empty here; views
    /// overlay soft-wrap positions.
    pub fn logical_line_info(&self) -> Result<LineInfo> {
        self.ensure_alive()?;
        let mut info = LineInfo::default();
        for row in 0..self.lines.len() {
            let meta = self.lines[row];
            let (width, _) = self.line_layout(row);
            info.starts.push(meta.start);
            info.widths.push(width);
            info.sources.push(row as u32);
            info.max_width = info.max_width.max(width);
        }
        Ok(info)
    }

    /// Byte offset of the next word boundary after `from`. A word is a
    /// maximal run of alphanumeric codepoints; the boundary is the end of
    /// the first word at or after `from`.
    #[must_use]
    pub fn next_word_boundary(&self, from: usize) -> usize {
        let start = floor_boundary(&self.doc, from);
        let mut in_word = false;
        for (idx, ch) in self.doc[start..].char_indices() {
            let word_char = ch.is_alphanumeric();
            if in_word && !word_char {
                return start + idx;
            }
            if word_char {
                in_word = true;
            }
        }
        self.doc.len()
    }

    /// Byte offset of the previous word boundary before `from`: the start
    /// of the last word beginning before it.
    #[must_use]
    pub fn prev_word_boundary(&self, from: usize) -> usize {
        let end = floor_boundary(&self.doc, from);
        let mut boundary = 0usize;
        let mut run_start: Option<usize> = None;
        for (idx, ch) in self.doc[..end].char_indices() {
            if ch.is_alphanumeric() {
                if run_start.is_none() {
                    run_start = Some(idx);
                }
            } else {
                run_start = None;
            }
            if let Some(s) = run_start {
                boundary = s;
            }
        }
        boundary
    }

    // ------------------------------------------------------------------
    // Line index maintenance
    // ------------------------------------------------------------------

    fn fresh_generation(&mut self) -> u32 {
        let g = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        g
    }

    fn rebuild_index(&mut self) {
        let mut generation = self.next_generation;
        self.lines.clear();
        let breaks = scan::find_line_breaks(self.doc.as_bytes());
        let mut start = 0usize;
        for brk in &breaks {
            let (content_end, term) = match brk.kind {
                LineBreakKind::Lf => (brk.pos, Terminator::Lf),
                LineBreakKind::Cr => (brk.pos, Terminator::Cr),
                LineBreakKind::CrLf => (brk.pos - 1, Terminator::CrLf),
            };
            self.lines.push(LineMeta {
                start: start as u32,
                content_len: (content_end - start) as u32,
                term,
                generation,
            });
            generation = generation.wrapping_add(1);
            start = brk.pos + 1;
        }
        self.lines.push(LineMeta {
            start: start as u32,
            content_len: (self.doc.len() - start) as u32,
            term: Terminator::None,
            generation,
        });
        self.next_generation = generation.wrapping_add(1);
        *self.cache.get_mut() = vec![None; self.lines.len()];
    }

    /// Replace `doc[start..end]` with `insert`, splicing the line index.
    fn splice(&mut self, start: usize, end: usize, insert: &str) -> Result<()> {
        let removed = end - start;
        if insert.len() > removed {
            self.doc
                .try_reserve(insert.len() - removed)
                .map_err(|e| Error::alloc("byte store", e))?;
        }

        // Rows overlapping the edit, widened one row back when the edit
        // starts exactly at a line start (a `\r` on the previous row may
        // join an inserted or newly exposed `\n`).
        let mut first = self.row_at_offset(start) as usize;
        if first > 0 && self.lines[first].start as usize == start {
            first -= 1;
        }
        let last = self.row_at_offset(end) as usize;
        let delta = insert.len() as isize - removed as isize;

        let scan_start = self.lines[first].start as usize;
        let scan_end_new = (self.lines[last].end_with_term() as isize + delta) as usize;

        self.doc.replace_range(start..end, insert);
        debug!(
            start,
            removed,
            inserted = insert.len(),
            rows = last - first + 1,
            "buffer spliced"
        );

        // Re-scan the affected region for terminators.
        let region = &self.doc.as_bytes()[scan_start..scan_end_new];
        let breaks = scan::find_line_breaks(region);
        let mut new_lines: Vec<LineMeta> = Vec::new();
        let mut piece_start = 0usize;
        for brk in &breaks {
            let (content_end, term) = match brk.kind {
                LineBreakKind::Lf => (brk.pos, Terminator::Lf),
                LineBreakKind::Cr => (brk.pos, Terminator::Cr),
                LineBreakKind::CrLf => (brk.pos - 1, Terminator::CrLf),
            };
            new_lines.push(LineMeta {
                start: (scan_start + piece_start) as u32,
                content_len: (content_end - piece_start) as u32,
                term,
                generation: 0, // stamped below
            });
            piece_start = brk.pos + 1;
        }
        // The tail piece after the last terminator in the region.
        let tail_len = region.len() - piece_start;
        let has_following = last + 1 < self.lines.len();
        let mut consumed_following = false;
        if has_following {
            if tail_len == 0 && !breaks.is_empty() {
                // Region ends on a terminator; the following row survives.
            } else {
                // The region tail lost its terminator: it merges with the
                // following row's content.
                let next = self.lines[last + 1];
                new_lines.push(LineMeta {
                    start: (scan_start + piece_start) as u32,
                    content_len: (tail_len + next.content_len as usize) as u32,
                    term: next.term,
                    generation: 0,
                });
                consumed_following = true;
            }
        } else {
            new_lines.push(LineMeta {
                start: (scan_start + piece_start) as u32,
                content_len: tail_len as u32,
                term: Terminator::None,
                generation: 0,
            });
        }
        for meta in &mut new_lines {
            meta.generation = self.fresh_generation();
        }

        // Splice the index and shift the rows after the edit.
        let replace_to = if consumed_following { last + 2 } else { last + 1 };
        let new_count = new_lines.len();
        self.lines.splice(first..replace_to, new_lines);
        for meta in &mut self.lines[first + new_count..] {
            meta.start = (meta.start as isize + delta) as u32;
        }

        // Mirror the splice in the cache, releasing replaced entries.
        let cache = self.cache.get_mut();
        for entry in cache[first..replace_to.min(cache.len())].iter().flatten() {
            release_entry(entry);
        }
        cache.splice(
            first..replace_to.min(cache.len()),
            std::iter::repeat_with(|| None).take(new_count),
        );

        self.revision = self.revision.wrapping_add(1);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Grapheme cache
    // ------------------------------------------------------------------

    fn ensure_cached(&self, row: usize) {
        let meta = self.lines[row];
        {
            let cache = self.cache.borrow();
            if let Some(Some(entry)) = cache.get(row) {
                if entry.generation == meta.generation && entry.tab_width == self.tab_width {
                    return;
                }
            }
        }

        let text = &self.doc[meta.content_range()];
        let ascii = scan::is_ascii_only(text.as_bytes());
        let (width, clusters) = if ascii {
            (text.len() as u32, SmallVec::<[GraphemeInfo; 4]>::new())
        } else {
            let infos = unicode::find_grapheme_info(text, u32::from(self.tab_width), self.method);
            let width =
                unicode::calculate_text_width(text, u32::from(self.tab_width), self.method);
            (width, SmallVec::from_vec(infos))
        };

        // Intern multi-byte clusters so repeated content shares identity.
        let mut handles: SmallVec<[GraphemeHandle; 4]> = SmallVec::new();
        for info in &clusters {
            if info.byte_len > 1 {
                let cluster_start = info.byte_offset as usize;
                let cluster = &text[cluster_start..cluster_start + info.byte_len as usize];
                if let Ok(handle) = grapheme_pool::intern(cluster, info.width) {
                    handles.push(handle);
                }
            }
        }

        let mut cache = self.cache.borrow_mut();
        if let Some(slot) = cache.get_mut(row) {
            if let Some(old) = slot.take() {
                release_entry(&old);
            }
            *slot = Some(LineCacheEntry {
                generation: meta.generation,
                tab_width: self.tab_width,
                ascii,
                width,
                clusters,
                handles,
            });
        }
    }

    // Infallible crate-internal accessors for the layout engine, which runs
    // behind a liveness check in the owning view.

    pub(crate) fn line_generation(&self, row: usize) -> u32 {
        self.lines[row.min(self.lines.len() - 1)].generation
    }

    pub(crate) fn line_start(&self, row: usize) -> usize {
        self.lines[row.min(self.lines.len() - 1)].start as usize
    }

    pub(crate) fn line_content(&self, row: usize) -> &str {
        &self.doc[self.lines[row.min(self.lines.len() - 1)].content_range()]
    }

    pub(crate) fn line_content_len(&self, row: usize) -> usize {
        self.lines[row.min(self.lines.len() - 1)].content_len as usize
    }

    fn line_layout(&self, row: usize) -> (u32, Vec<GraphemeInfo>) {
        self.ensure_cached(row);
        let cache = self.cache.borrow();
        match cache.get(row).and_then(|e| e.as_ref()) {
            Some(entry) => (entry.width, entry.clusters.to_vec()),
            None => (0, Vec::new()),
        }
    }
}

impl Drop for TextBuffer {
    fn drop(&mut self) {
        if !self.destroyed {
            for entry in self.cache.get_mut().iter().flatten() {
                release_entry(entry);
            }
        }
    }
}

/// Snap an offset back to the nearest char boundary at or before it.
#[must_use]
pub fn floor_boundary(s: &str, byte_offset: usize) -> usize {
    let mut i = byte_offset.min(s.len());
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Snap an offset forward to the nearest char boundary at or after it.
#[must_use]
pub fn ceil_boundary(s: &str, byte_offset: usize) -> usize {
    let mut i = byte_offset.min(s.len());
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}
