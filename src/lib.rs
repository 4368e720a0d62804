//! `termtext` - Unicode-correct text engine for terminal user interfaces
//!
//! termtext owns an editable UTF-8 document and answers everything a
//! terminal UI needs to know about it: grapheme cluster boundaries, display
//! widths, line wrapping, cursor positions in logical and visual
//! coordinates, and selection arithmetic. It renders nothing itself; a
//! renderer consumes its parallel-array exports.
//!
//! # How This Crate Fits In
//!
//! This is the text core of a TUI toolkit. The component tree, flex layout,
//! input parsing, and cell-buffer renderer are external collaborators: they
//! hand bytes and viewport rectangles in, and read line info, cursors, and
//! measurements out.
//!
//! # Architecture At A Glance
//!
//! - `unicode::tables`: per-codepoint widths, East-Asian width, grapheme
//!   break properties (frozen range tables)
//! - `unicode::scan`: SWAR scans for line breaks, tabs, wrap breaks, and
//!   UTF-8 decoding over raw bytes
//! - `unicode::grapheme`: cluster segmentation and widths under the three
//!   width policies (`wcwidth`, `unicode`, `no_zwj`)
//! - `grapheme_pool`: process-wide interning of multi-byte clusters
//! - `text`: the buffer, wrap engine, views, and editor layers
//! - `color` / `style` / `error`: the small shared vocabulary
//!
//! # Data Flow
//!
//! ```text
//! bytes enter TextBuffer
//!     -> line index splices, grapheme cache invalidates
//!     -> Layout re-wraps the dirty logical lines lazily
//!     -> views export line info / cursors / measurements
//! ```
//!
//! # Example
//!
//! ```
//! use termtext::{TextBuffer, TextBufferView, WidthMethod, WrapMode};
//!
//! let buffer = TextBuffer::with_text("The quick brown fox", WidthMethod::Unicode);
//! let view = TextBufferView::new(&buffer)
//!     .viewport(0, 0, 10, 4)
//!     .wrap_mode(WrapMode::Word);
//!
//! let info = view.line_info().unwrap();
//! assert_eq!(info.virtual_line_count(), 2);
//! ```

// Crate-level lint configuration
#![warn(unsafe_code)]
#![allow(clippy::cast_possible_truncation)] // Intentional offset/width casts
#![allow(clippy::cast_sign_loss)] // Intentional coordinate conversions
#![allow(clippy::cast_possible_wrap)] // Intentional coordinate conversions
#![allow(clippy::module_name_repetitions)] // TextBuffer, TextBufferView etc
#![allow(clippy::missing_errors_doc)] // The error model is documented once
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::len_without_is_empty)] // Terminator::len is byte length
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference

pub mod color;
pub mod error;
pub mod grapheme_pool;
pub mod style;
pub mod text;
pub mod unicode;

// Re-export core types at crate root
pub use color::Rgba;
pub use error::{Error, Result};
pub use grapheme_pool::{GraphemeHandle, PoolStats};
pub use style::{StyledChunk, TextAttributes};
pub use text::{
    EditBuffer, EditorView, LineInfo, LocalSelection, LogicalCursor, LogicalLine, Selection,
    Terminator, TextBuffer, TextBufferView, TextMeasure, Viewport, VirtualLine, VisualCursor,
    WrapKind, WrapMode,
};
pub use unicode::{EncodedChar, GraphemeInfo, WidthMethod};
