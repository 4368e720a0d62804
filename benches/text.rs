//! Buffer editing and layout performance benchmarks.

#![allow(clippy::semicolon_if_nothing_returned)]

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use termtext::text::{Layout, WrapMode};
use termtext::{EditBuffer, TextBuffer, WidthMethod};

fn prose(lines: usize) -> String {
    let mut s = String::new();
    for i in 0..lines {
        s.push_str("The quick brown fox jumps over the lazy dog number ");
        s.push_str(&i.to_string());
        s.push('\n');
    }
    s
}

fn buffer_edits(c: &mut Criterion) {
    let text = prose(500);

    c.bench_function("buffer_set_text_500_lines", |b| {
        b.iter(|| TextBuffer::with_text(black_box(&text), WidthMethod::Unicode));
    });

    c.bench_function("buffer_insert_middle", |b| {
        let mut buffer = TextBuffer::with_text(&text, WidthMethod::Unicode);
        let middle = text.len() / 2;
        b.iter(|| {
            buffer.insert(black_box(middle), "x").unwrap();
            buffer.delete(middle..middle + 1).unwrap();
        });
    });

    c.bench_function("buffer_append_line", |b| {
        let mut buffer = TextBuffer::new(WidthMethod::Unicode);
        b.iter(|| buffer.append(black_box("another line of text\n")).unwrap());
    });
}

fn layout_wrap(c: &mut Criterion) {
    let text = prose(200);
    let buffer = TextBuffer::with_text(&text, WidthMethod::Unicode);

    for (name, mode) in [("char", WrapMode::Char), ("word", WrapMode::Word)] {
        c.bench_function(&format!("layout_full_wrap_{name}_200_lines"), |b| {
            b.iter(|| {
                let mut layout = Layout::new(mode, 40);
                layout.ensure(black_box(&buffer));
                layout.virtual_line_count()
            });
        });
    }

    c.bench_function("layout_incremental_one_line_edit", |b| {
        let mut buffer = TextBuffer::with_text(&text, WidthMethod::Unicode);
        let mut layout = Layout::new(WrapMode::Word, 40);
        layout.ensure(&buffer);
        b.iter(|| {
            buffer.insert(10, "x").unwrap();
            buffer.delete(10..11).unwrap();
            layout.ensure(black_box(&buffer));
        });
    });
}

fn editor_typing(c: &mut Criterion) {
    c.bench_function("edit_type_100_chars", |b| {
        b.iter(|| {
            let mut edit = EditBuffer::new(WidthMethod::Unicode);
            for _ in 0..100 {
                edit.insert_char(black_box('q')).unwrap();
            }
            edit.text().len()
        });
    });
}

criterion_group!(benches, buffer_edits, layout_wrap, editor_typing);
criterion_main!(benches);
