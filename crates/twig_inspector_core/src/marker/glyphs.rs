//! Box-drawing glyph palettes used as marker prefixes.
//!
//! The glyphs only make adjacent nested regions distinguishable when reading
//! raw HTML. The client never interprets them beyond "start" or "end".

/// `[start, repeat, end]` glyph triples, rotated on nesting changes.
pub const CHARSETS: [[char; 3]; 4] = [
    ['┏', '━', '┗'],
    ['╭', '─', '╰'],
    ['╔', '═', '╚'],
    ['┎', '─', '┖'],
];

/// Every glyph that opens a marked region, in charset order.
pub fn start_glyphs() -> String {
    CHARSETS.iter().map(|set| set[0]).collect()
}

/// Every glyph that closes a marked region, in charset order.
pub fn end_glyphs() -> String {
    CHARSETS.iter().map(|set| set[2]).collect()
}

/// Stateful prefix generator mirroring the renderer's rotation rules.
///
/// # Invariants
/// - Depth 0 always resets to the first charset.
/// - Reaching the last charset wraps back to the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphPalette {
    charset_index: usize,
    depth: usize,
}

impl GlyphPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a nesting change and advances the charset.
    pub fn block_changed(&mut self, depth: usize) {
        self.depth = depth;
        self.charset_index += 1;
        if depth == 0 || self.charset_index == CHARSETS.len() - 1 {
            self.charset_index = 0;
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn start_prefix(&self) -> String {
        self.prefix(0)
    }

    pub fn end_prefix(&self) -> String {
        self.prefix(2)
    }

    fn prefix(&self, slot: usize) -> String {
        let set = CHARSETS[self.charset_index];
        let mut out = String::with_capacity((self.depth + 1) * 3);
        out.push(set[slot]);
        out.extend(std::iter::repeat(set[1]).take(self.depth));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{end_glyphs, start_glyphs, GlyphPalette};

    #[test]
    fn fresh_palette_uses_heavy_charset_without_repeat() {
        let palette = GlyphPalette::new();
        assert_eq!(palette.start_prefix(), "┏");
        assert_eq!(palette.end_prefix(), "┗");
    }

    #[test]
    fn nesting_rotates_and_repeats() {
        let mut palette = GlyphPalette::new();
        palette.block_changed(1);
        assert_eq!(palette.start_prefix(), "╭─");
        assert_eq!(palette.end_prefix(), "╰─");

        palette.block_changed(2);
        assert_eq!(palette.start_prefix(), "╔══");

        // third change lands on the last charset index and wraps
        palette.block_changed(3);
        assert_eq!(palette.start_prefix(), "┏━━━");
    }

    #[test]
    fn depth_zero_resets_rotation() {
        let mut palette = GlyphPalette::new();
        palette.block_changed(1);
        palette.block_changed(0);
        assert_eq!(palette.start_prefix(), "┏");
        assert_eq!(palette.depth(), 0);
    }

    #[test]
    fn glyph_classes_follow_charsets() {
        assert_eq!(start_glyphs(), "┏╭╔┎");
        assert_eq!(end_glyphs(), "┗╰╚┖");
        assert!(!start_glyphs().contains('━'));
    }
}
