//! End-to-end scenarios across the engine: widths, wrapping, cursors,
//! selections, and the renderer exports, driven through the public API the
//! way a TUI framework drives it.

use termtext::text::WRAP_SENTINEL;
use termtext::unicode::{
    calculate_text_width, find_wrap_pos_by_width, get_prev_grapheme_start, get_width_at,
};
use termtext::{
    EditBuffer, EditorView, Rgba, StyledChunk, TextBuffer, TextBufferView, WidthMethod, WrapMode,
};

const TAB: u32 = 4;

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Width scenarios
// ============================================================================

#[test]
fn test_mixed_script_width() {
    init_tracing();
    // H e l l o ␣ (6) + 世 界 (4) + ! ␣ (2) + 👋 (2)
    let width = calculate_text_width("Hello 世界! 👋", TAB, WidthMethod::Unicode);
    assert_eq!(width, 14);
}

#[test]
fn test_tab_width_fixed_expansion() {
    let width = calculate_text_width("a\tb", TAB, WidthMethod::Unicode);
    assert_eq!(width, 6);
    assert_eq!(get_width_at("a\tb", 1, TAB, WidthMethod::Unicode), 4);
}

#[test]
fn test_combining_accent_clusters() {
    let text = "cafe\u{0301}";
    let buffer = TextBuffer::with_text(text, WidthMethod::Unicode);
    let line = buffer.line(0).unwrap();
    assert_eq!(line.width, 4);
    // One non-trivial cluster: the accented e.
    assert_eq!(line.clusters.len(), 1);
    assert_eq!(line.clusters[0].byte_offset, 3);
    assert_eq!(line.clusters[0].width, 1);

    let prev = get_prev_grapheme_start(text, 6, TAB, WidthMethod::Unicode);
    assert_eq!(prev, Some((3, 1)));
}

#[test]
fn test_wrap_pos_emoji_scenario() {
    let pos = find_wrap_pos_by_width("Hello 🌍 World", 7, TAB, WidthMethod::Unicode);
    assert_eq!((pos.byte_offset, pos.columns_used), (6, 6));
    let pos = find_wrap_pos_by_width("Hello 🌍 World", 8, TAB, WidthMethod::Unicode);
    assert_eq!((pos.byte_offset, pos.columns_used), (10, 8));
}

// ============================================================================
// View scenarios
// ============================================================================

#[test]
fn test_word_wrap_scenario() {
    init_tracing();
    let buffer = TextBuffer::with_text("The quick brown fox", WidthMethod::Unicode);
    let view = TextBufferView::new(&buffer)
        .viewport(0, 0, 10, 4)
        .wrap_mode(WrapMode::Word);

    let info = view.line_info().unwrap();
    assert_eq!(info.virtual_line_count(), 2);

    let text = buffer.text();
    let first = &text[info.starts[0] as usize..info.starts[0] as usize + 10];
    assert_eq!(first, "The quick ");
    let second = &text[info.starts[1] as usize..];
    assert_eq!(second, "brown fox");
    assert_eq!(info.widths, vec![10, 9]);
    assert_eq!(info.max_width, 10);
}

#[test]
fn test_line_info_export_shape() {
    let buffer = TextBuffer::with_text("abcdef\ngh", WidthMethod::Unicode);
    let view = TextBufferView::new(&buffer)
        .viewport(0, 0, 3, 10)
        .wrap_mode(WrapMode::Char);

    let info = view.line_info().unwrap();
    assert_eq!(info.starts, vec![0, 3, 7]);
    assert_eq!(info.widths, vec![3, 3, 2]);
    assert_eq!(info.sources, vec![0, 0, 1]);
    // Soft-wrap positions per logical row, sentinel terminated.
    assert_eq!(info.wraps, vec![3, WRAP_SENTINEL, WRAP_SENTINEL]);
    assert_eq!(info.max_width, 3);
}

#[test]
fn test_oversized_cluster_is_one_virtual_line() {
    let buffer = TextBuffer::with_text("👋", WidthMethod::Unicode);
    let view = TextBufferView::new(&buffer)
        .viewport(0, 0, 1, 4)
        .wrap_mode(WrapMode::Char);
    let info = view.line_info().unwrap();
    assert_eq!(info.virtual_line_count(), 1);
    assert_eq!(info.widths, vec![2]); // wider than the viewport; clipped later
}

#[test]
fn test_empty_buffer_boundaries() {
    let buffer = TextBuffer::new(WidthMethod::Unicode);
    assert_eq!(buffer.line_count(), 1);
    assert_eq!(buffer.line(0).unwrap().width, 0);

    let view = TextBufferView::new(&buffer);
    let measure = view.measure_for_dimensions(80, 24).unwrap().unwrap();
    assert_eq!((measure.line_count, measure.max_width), (1, 0));
    assert!(view.get_plain_text_bytes(usize::MAX).unwrap().is_none());
}

#[test]
fn test_crlf_assembled_across_appends() {
    // A chunked writer may split the \r\n pair across appends; the line
    // index must still see one CRLF terminator.
    let mut buffer = TextBuffer::new(WidthMethod::Unicode);
    buffer.append("first\r").unwrap();
    buffer.append("\nsecond").unwrap();
    assert_eq!(buffer.line_count(), 2);
    assert_eq!(buffer.line_text(0).unwrap(), "first");
    assert_eq!(buffer.line_text(1).unwrap(), "second");
    assert_eq!(
        buffer.line_terminator(0).unwrap(),
        termtext::Terminator::CrLf
    );
}

#[test]
fn test_plain_text_roundtrips_through_lines() {
    // Reassembling every logical line with its own terminator must
    // reproduce the exported document bytes exactly.
    let text = "alpha\nbeta\r\ngamma\rdelta\n";
    let buffer = TextBuffer::with_text(text, WidthMethod::Unicode);
    let view = TextBufferView::new(&buffer);

    let mut rebuilt = String::new();
    for row in 0..buffer.line_count() {
        rebuilt.push_str(buffer.line_text(row).unwrap());
        rebuilt.push_str(buffer.line_terminator(row).unwrap().as_str());
    }
    assert_eq!(rebuilt.as_bytes(), text.as_bytes());
    assert_eq!(
        view.get_plain_text_bytes(usize::MAX).unwrap(),
        Some(text.as_bytes().to_vec())
    );
}

#[test]
fn test_selection_export_with_colors() {
    let buffer = TextBuffer::with_text("Hello World", WidthMethod::Unicode);
    let mut view = TextBufferView::new(&buffer);
    view.set_selection(0, 5, Some(Rgba::WHITE), Some(Rgba::BLACK))
        .unwrap();
    assert_eq!(
        view.get_selected_text_bytes(usize::MAX).unwrap(),
        Some(b"Hello".to_vec())
    );
    // Truncated export.
    assert_eq!(
        view.get_selected_text_bytes(3).unwrap(),
        Some(b"Hel".to_vec())
    );
    let sel = view.selection().unwrap();
    assert_eq!(sel.fg, Some(Rgba::WHITE));
    assert_eq!(sel.bg, Some(Rgba::BLACK));
}

// ============================================================================
// Editor scenarios
// ============================================================================

#[test]
fn test_edit_scenario_insert_advances_cursor() {
    init_tracing();
    let mut edit = EditBuffer::with_text("abc", WidthMethod::Unicode);
    let revision_before = edit.buffer().revision();
    edit.set_cursor_by_offset(1).unwrap();
    edit.insert_text("XY").unwrap();
    assert_eq!(edit.text(), "aXYbc");
    assert_eq!(edit.cursor().offset, 3);
    assert_ne!(edit.buffer().revision(), revision_before);
}

#[test]
fn test_editor_full_session() {
    let mut editor = EditorView::new(EditBuffer::new(WidthMethod::Unicode));
    editor.set_wrap_mode(WrapMode::Word);
    editor.set_wrap_width(Some(10));
    editor.set_placeholder(vec![StyledChunk::fg("Say something…", Rgba::WHITE)]);
    assert!(editor.placeholder_chunks().is_some());

    editor.insert_text("The quick brown fox").unwrap();
    assert!(editor.placeholder_chunks().is_none());
    assert_eq!(editor.virtual_line_count().unwrap(), 2);

    // Cursor sits at the end of the wrapped text.
    let vc = editor.get_visual_cursor().unwrap();
    assert_eq!(vc.visual_row, 1);
    assert_eq!(vc.visual_col, 9);
    assert_eq!(vc.offset, 19);

    // Walk up; the goal column clamps into the first row.
    editor.move_cursor_up().unwrap();
    let vc = editor.get_visual_cursor().unwrap();
    assert_eq!(vc.visual_row, 0);

    // Insert a newline mid-word and verify the merge undoes it.
    editor.set_cursor_by_offset(3).unwrap();
    editor.new_line().unwrap();
    assert_eq!(&editor.text()[..5], "The\n ");
    editor.delete_char_backward().unwrap();
    assert_eq!(editor.text(), "The quick brown fox");
}

#[test]
fn test_editor_tab_indicator_roundtrip() {
    let mut editor = EditorView::new(EditBuffer::with_text("a\tb", WidthMethod::Unicode));
    editor.set_tab_indicator('→', Rgba::WHITE);
    assert_eq!(editor.tab_indicator_glyph(), Some(('→', Rgba::WHITE)));
    let vc = {
        editor.set_cursor_by_offset(2).unwrap();
        editor.get_visual_cursor().unwrap()
    };
    // Cursor after the tab: column 5 under tab width 4.
    assert_eq!(vc.visual_col, 5);
}

#[test]
fn test_wcwidth_policy_differs_on_vs16() {
    // Heavy black heart + VS16: emoji presentation is 2 under `unicode`,
    // but wcwidth sums codepoints (1 + 0).
    let uni = TextBuffer::with_text("\u{2764}\u{FE0F}", WidthMethod::Unicode);
    let wc = TextBuffer::with_text("\u{2764}\u{FE0F}", WidthMethod::WcWidth);
    assert_eq!(uni.line(0).unwrap().width, 2);
    assert_eq!(wc.line(0).unwrap().width, 1);
}

#[test]
fn test_no_zwj_policy_splits_families() {
    let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
    let joined = TextBuffer::with_text(family, WidthMethod::Unicode);
    assert_eq!(joined.line(0).unwrap().width, 2);

    let split = TextBuffer::with_text(family, WidthMethod::NoZwj);
    // Three people render separately; the ZWJs occupy no columns.
    assert_eq!(split.line(0).unwrap().width, 6);
}

#[test]
fn test_goal_column_through_wrapped_rows() {
    let mut editor = EditorView::new(EditBuffer::with_text(
        "aaaaaaaa\nbb\ncccccccc",
        WidthMethod::Unicode,
    ));
    editor.set_cursor_by_offset(6).unwrap(); // col 6 of row 0
    editor.move_cursor_down().unwrap();
    assert_eq!(editor.get_cursor().col, 2); // clamped by the short row
    editor.move_cursor_down().unwrap();
    assert_eq!(editor.get_cursor().col, 6); // goal restored
}
