//! Grapheme cluster segmentation and cluster widths under three policies.
//!
//! | Policy    | Segmentation                   | Cluster width                     |
//! |-----------|--------------------------------|-----------------------------------|
//! | `WcWidth` | UAX #29                        | sum of codepoint widths (tmux)    |
//! | `Unicode` | UAX #29                        | base codepoint width, VS16 1→2,   |
//! |           |                                | conjunct summation, RI pair = 2   |
//! | `NoZwj`   | UAX #29 with ZWJ forced apart  | as `Unicode`                      |
//!
//! Dispatch is a flat `match` on the method at each entry point; the hot
//! loops stay branch-predictable. Tab width is a fixed per-call integer;
//! the engine never computes tab stops relative to the current column.

use crate::unicode::scan;
use crate::unicode::tables::{self, BreakState, VS16, ZWJ};

/// Width calculation policy. Fixed per buffer at construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WidthMethod {
    /// Per-codepoint width summation, tmux-compatible.
    #[default]
    WcWidth,
    /// UAX #29 clusters with emoji-aware cluster widths.
    Unicode,
    /// As `Unicode`, but ZWJ never joins (each joinee renders separately).
    NoZwj,
}

/// Grapheme metadata for one non-trivial cluster within a line.
///
/// Only clusters that break the byte-per-column identity are recorded: tabs
/// and anything longer than one byte. Narrow fields saturate (clusters are
/// rarely anywhere near 255 bytes, widths are 0..=2 or a tab width).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphemeInfo {
    /// Byte offset of the cluster start, relative to the line.
    pub byte_offset: u32,
    /// Cluster length in bytes.
    pub byte_len: u8,
    /// Cluster width in columns.
    pub width: u8,
    /// Display column of the cluster start.
    pub col_offset: u32,
}

/// Atomic `(width, codepoint)` pair for renderers that draw per-cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodedChar {
    pub width: u8,
    pub ch: u32,
}

/// Result of a width-limited prefix search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WrapPos {
    /// Byte length of the included prefix.
    pub byte_offset: usize,
    /// Number of clusters in the prefix.
    pub grapheme_count: u32,
    /// Column sum of the prefix.
    pub columns_used: u32,
}

/// Is there a cluster boundary between `prev` and `curr` under `method`?
///
/// `NoZwj` severs the join on both sides of a ZWJ; the ZWJ becomes its own
/// zero-width cluster. The shared [`BreakState`] must still be advanced so
/// Regional-Indicator parity survives the policy override.
#[must_use]
pub fn cluster_break(prev: u32, curr: u32, state: &mut BreakState, method: WidthMethod) -> bool {
    let uax = tables::grapheme_break(prev, curr, state);
    if method == WidthMethod::NoZwj && (prev == ZWJ || curr == ZWJ) {
        return true;
    }
    uax
}

/// Iterator over grapheme clusters of a string under a width method.
///
/// Yields `(byte_offset, cluster)` pairs.
pub struct Clusters<'a> {
    text: &'a str,
    iter: std::str::CharIndices<'a>,
    pending: Option<(usize, char)>,
    state: BreakState,
    method: WidthMethod,
}

impl<'a> Clusters<'a> {
    fn new(text: &'a str, method: WidthMethod) -> Self {
        let mut iter = text.char_indices();
        let pending = iter.next();
        Self {
            text,
            iter,
            pending,
            state: BreakState::new(),
            method,
        }
    }
}

impl<'a> Iterator for Clusters<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let (start, first) = self.pending?;
        let mut prev = u32::from(first);
        let mut end = start + first.len_utf8();
        loop {
            match self.iter.next() {
                None => {
                    self.pending = None;
                    return Some((start, &self.text[start..end]));
                }
                Some((idx, ch)) => {
                    let cp = u32::from(ch);
                    if cluster_break(prev, cp, &mut self.state, self.method) {
                        self.pending = Some((idx, ch));
                        return Some((start, &self.text[start..idx]));
                    }
                    prev = cp;
                    end = idx + ch.len_utf8();
                }
            }
        }
    }
}

/// Iterate grapheme clusters with byte offsets.
#[must_use]
pub fn clusters(text: &str, method: WidthMethod) -> Clusters<'_> {
    Clusters::new(text, method)
}

/// Width of one cluster in columns. A lone tab reports the given tab width.
#[must_use]
pub fn cluster_width(cluster: &str, tab_width: u32, method: WidthMethod) -> u32 {
    if cluster == "\t" {
        return tab_width;
    }
    match method {
        WidthMethod::WcWidth => cluster
            .chars()
            .map(|c| u32::from(tables::char_width(u32::from(c)).max(0) as u8))
            .sum(),
        WidthMethod::Unicode | WidthMethod::NoZwj => cluster_width_unicode(cluster),
    }
}

fn cluster_width_unicode(cluster: &str) -> u32 {
    let mut chars = cluster.chars().map(u32::from);
    let Some(base) = chars.next() else {
        return 0;
    };

    // A Regional-Indicator pair is one flag, two cells.
    if tables::is_regional_indicator(base) {
        return 2;
    }

    let mut width = u32::from(tables::char_width(base).max(0) as u8);
    let mut saw_vs16 = base == VS16;
    let mut after_virama = false;
    for cp in chars {
        if cp == VS16 {
            saw_vs16 = true;
        }
        if after_virama {
            // Conjunct summation: each consonant joined by a virama adds
            // its own width.
            width += u32::from(tables::char_width(cp).max(0) as u8);
        }
        after_virama = tables::is_virama(cp);
    }
    if saw_vs16 && width == 1 {
        width = 2;
    }
    width
}

/// Total display width of a string.
#[must_use]
pub fn calculate_text_width(text: &str, tab_width: u32, method: WidthMethod) -> u32 {
    if scan::is_ascii_only(text.as_bytes()) {
        return text.len() as u32;
    }
    clusters(text, method)
        .map(|(_, cl)| cluster_width(cl, tab_width, method))
        .sum()
}

/// Width of the cluster starting exactly at `byte_offset`.
///
/// Returns 0 when `byte_offset` points mid-cluster or past the end.
#[must_use]
pub fn get_width_at(text: &str, byte_offset: usize, tab_width: u32, method: WidthMethod) -> u32 {
    if byte_offset >= text.len() {
        return 0;
    }
    if scan::is_ascii_only(text.as_bytes()) {
        return 1;
    }
    for (start, cl) in clusters(text, method) {
        if start == byte_offset {
            return cluster_width(cl, tab_width, method);
        }
        if start > byte_offset {
            break;
        }
    }
    0
}

/// Longest prefix whose column sum fits in `max_columns`, never splitting a
/// cluster: the scan stops *before* any cluster that would push past the
/// limit. Empty input or a zero limit yields all zeros.
#[must_use]
pub fn find_wrap_pos_by_width(
    text: &str,
    max_columns: u32,
    tab_width: u32,
    method: WidthMethod,
) -> WrapPos {
    let mut pos = WrapPos::default();
    if text.is_empty() || max_columns == 0 {
        return pos;
    }
    for (start, cl) in clusters(text, method) {
        let w = cluster_width(cl, tab_width, method);
        if pos.columns_used + w > max_columns {
            return pos;
        }
        pos.byte_offset = start + cl.len();
        pos.grapheme_count += 1;
        pos.columns_used += w;
    }
    pos
}

/// Width-limited prefix with selection-endpoint snapping.
///
/// `include_start_before == true` is the selection-*end* rule: any cluster
/// that starts at a column below `max_columns` is taken whole, snapping
/// forward through wide glyphs. `false` is the selection-*start* rule: a
/// cluster whose end column would exceed the limit is excluded, snapping
/// backward.
#[must_use]
pub fn find_pos_by_width(
    text: &str,
    max_columns: u32,
    include_start_before: bool,
    tab_width: u32,
    method: WidthMethod,
) -> WrapPos {
    let mut pos = WrapPos::default();
    if text.is_empty() || max_columns == 0 {
        return pos;
    }
    for (start, cl) in clusters(text, method) {
        let w = cluster_width(cl, tab_width, method);
        let take = if include_start_before {
            pos.columns_used < max_columns
        } else {
            pos.columns_used + w <= max_columns
        };
        if !take {
            return pos;
        }
        pos.byte_offset = start + cl.len();
        pos.grapheme_count += 1;
        pos.columns_used += w;
    }
    pos
}

/// Start offset and width of the cluster ending at (or spanning) the byte
/// just before `byte_offset`. `None` at the start of the string.
#[must_use]
pub fn get_prev_grapheme_start(
    text: &str,
    byte_offset: usize,
    tab_width: u32,
    method: WidthMethod,
) -> Option<(usize, u32)> {
    if byte_offset == 0 || text.is_empty() {
        return None;
    }
    let limit = byte_offset.min(text.len());
    let mut prev: Option<(usize, &str)> = None;
    for (start, cl) in clusters(text, method) {
        if start >= limit {
            break;
        }
        prev = Some((start, cl));
    }
    prev.map(|(start, cl)| (start, cluster_width(cl, tab_width, method)))
}

/// Enumerate the clusters that break the byte-per-column identity: tabs and
/// anything longer than one byte (which covers combining-mark-bearing ASCII
/// in every method). Plain printable ASCII runs are elided; the caller
/// reconstructs their columns arithmetically.
#[must_use]
pub fn find_grapheme_info(text: &str, tab_width: u32, method: WidthMethod) -> Vec<GraphemeInfo> {
    let mut infos = Vec::new();
    if scan::is_ascii_only(text.as_bytes()) {
        return infos;
    }
    let mut col = 0u32;
    for (start, cl) in clusters(text, method) {
        let w = cluster_width(cl, tab_width, method);
        if cl.len() > 1 || cl == "\t" {
            infos.push(GraphemeInfo {
                byte_offset: start as u32,
                byte_len: cl.len().min(usize::from(u8::MAX)) as u8,
                width: w.min(u32::from(u8::MAX)) as u8,
                col_offset: col,
            });
        }
        col += w;
    }
    infos
}

/// Per-cluster `(width, base codepoint)` export for cell renderers.
#[must_use]
pub fn encoded_chars(text: &str, tab_width: u32, method: WidthMethod) -> Vec<EncodedChar> {
    clusters(text, method)
        .map(|(_, cl)| {
            let (cp, _) = scan::decode_utf8_unchecked(cl.as_bytes(), 0);
            EncodedChar {
                width: cluster_width(cl, tab_width, method).min(u32::from(u8::MAX)) as u8,
                ch: cp,
            }
        })
        .collect()
}
