//! Text storage, wrapping, and editing.
//!
//! The layering is strict composition:
//!
//! - [`TextBuffer`]: the document bytes plus the logical line index and
//!   grapheme cache
//! - [`Layout`]: virtual (wrapped) lines for one wrap configuration
//! - [`TextBufferView`]: read-side viewport, selection, and renderer export
//! - [`EditBuffer`]: mutation with a logical cursor and undo/redo
//! - [`EditorView`]: wrap-aware cursor movement and editor chrome
//!
//! # Examples
//!
//! ```
//! use termtext::{EditBuffer, WidthMethod};
//!
//! let mut editor = EditBuffer::with_text("Hello", WidthMethod::Unicode);
//! editor.set_cursor_by_offset(5).unwrap();
//! editor.insert_text(" World").unwrap();
//! assert_eq!(editor.text(), "Hello World");
//!
//! editor.undo();
//! assert_eq!(editor.text(), "Hello");
//! ```

mod buffer;
mod edit;
mod editor;
mod layout;
mod view;

pub use buffer::{LineInfo, LogicalLine, Terminator, TextBuffer, WRAP_SENTINEL, ceil_boundary, floor_boundary};
pub use edit::{EditBuffer, LogicalCursor};
pub use editor::{EditorView, VisualCursor};
pub use layout::{Layout, TextMeasure, VirtualLine, WrapKind, WrapMode};
pub use view::{LocalSelection, Selection, TextBufferView, Viewport};
