//! Text attributes and styled chunks.
//!
//! Attribute bits are opaque to the engine: they are carried on placeholder
//! chunks and forwarded to the renderer unchanged. The named flags here are
//! the conventional assignments terminals understand.

use crate::color::Rgba;
use bitflags::bitflags;

bitflags! {
    /// Text attribute bitmask forwarded to the renderer.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TextAttributes: u32 {
        const BOLD          = 1 << 0;
        const DIM           = 1 << 1;
        const ITALIC        = 1 << 2;
        const UNDERLINE     = 1 << 3;
        const BLINK         = 1 << 4;
        const INVERSE       = 1 << 5;
        const HIDDEN        = 1 << 6;
        const STRIKETHROUGH = 1 << 7;
    }
}

/// A chunk of text with optional colors and attributes.
///
/// Used as placeholder input: a placeholder is a list of chunks rendered in
/// order when the buffer is empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyledChunk {
    /// The text content.
    pub text: String,
    /// Optional foreground color.
    pub fg: Option<Rgba>,
    /// Optional background color.
    pub bg: Option<Rgba>,
    /// Attribute bitmask, forwarded opaquely.
    pub attributes: u32,
}

impl StyledChunk {
    /// Create an unstyled chunk.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Create a chunk with a foreground color.
    #[must_use]
    pub fn fg(text: impl Into<String>, fg: Rgba) -> Self {
        Self {
            text: text.into(),
            fg: Some(fg),
            ..Self::default()
        }
    }

    /// Set the background color.
    #[must_use]
    pub fn with_bg(mut self, bg: Rgba) -> Self {
        self.bg = Some(bg);
        self
    }

    /// Set the attribute bitmask.
    #[must_use]
    pub fn with_attributes(mut self, attributes: TextAttributes) -> Self {
        self.attributes = attributes.bits();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_builders() {
        let chunk = StyledChunk::fg("hint", Rgba::WHITE)
            .with_bg(Rgba::BLACK)
            .with_attributes(TextAttributes::DIM | TextAttributes::ITALIC);
        assert_eq!(chunk.text, "hint");
        assert_eq!(chunk.fg, Some(Rgba::WHITE));
        assert_eq!(chunk.bg, Some(Rgba::BLACK));
        assert_eq!(
            chunk.attributes,
            (TextAttributes::DIM | TextAttributes::ITALIC).bits()
        );
    }

    #[test]
    fn test_attributes_are_plain_bits() {
        assert_eq!(TextAttributes::BOLD.bits(), 1);
        assert_eq!(TextAttributes::STRIKETHROUGH.bits(), 128);
    }
}
