//! Unicode machinery: width tables, byte scanning, grapheme segmentation.
//!
//! Layered leaves-first: [`tables`] is pure per-codepoint data, [`scan`]
//! walks raw bytes, [`grapheme`] assembles clusters and widths under the
//! three policies.

pub mod grapheme;
pub mod scan;
pub mod tables;

pub use grapheme::{
    Clusters, EncodedChar, GraphemeInfo, WidthMethod, WrapPos, calculate_text_width, cluster_break,
    cluster_width, clusters, encoded_chars, find_grapheme_info, find_pos_by_width,
    find_wrap_pos_by_width, get_prev_grapheme_start, get_width_at,
};
pub use scan::{
    LineBreak, LineBreakKind, WrapBreak, decode_utf8_unchecked, find_line_breaks, find_tab_stops,
    find_wrap_breaks, is_ascii_only,
};
pub use tables::{
    BreakClass, BreakState, EastAsianWidth, GeneralCategory, break_class, char_width,
    east_asian_width, general_category, grapheme_break,
};
