use crate::colour::Colour;
use crate::font::{FontFace, FontSet};
use crate::units::Pt;
use crate::{ExportError, Result};
use std::ops::Range;

const TABSIZE: usize = 4;

/// Everything needed to measure and draw one block of text. Each block builds its own style
/// rather than mutating a shared one, so nothing leaks from one block into the next.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size: Pt,
    pub colour: Colour,
    /// Multiplier applied to the font's natural line height
    pub line_spacing: f32,
    /// Added to every line after the multiplier
    pub extra_spacing: Pt,
}

impl TextStyle {
    pub fn new(face: FontFace, size: Pt, colour: Colour) -> TextStyle {
        TextStyle {
            face,
            size,
            colour,
            line_spacing: 1.0,
            extra_spacing: Pt(0.0),
        }
    }

    pub fn with_line_spacing(mut self, line_spacing: f32) -> TextStyle {
        self.line_spacing = line_spacing;
        self
    }

    pub fn with_extra_spacing(mut self, extra_spacing: Pt) -> TextStyle {
        self.extra_spacing = extra_spacing;
        self
    }
}

/// The result of measuring a block of text: where each line starts and ends, and the height
/// shared by every line of the block
#[derive(Debug, Clone, PartialEq)]
pub struct LineBreaks {
    lines: Vec<Range<usize>>,
    pub line_height: Pt,
}

impl LineBreaks {
    pub fn new(lines: Vec<Range<usize>>, line_height: Pt) -> LineBreaks {
        LineBreaks { lines, line_height }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Byte range of line `i` within the measured text, end-exclusive.
    ///
    /// # Panics
    ///
    /// If `i >= self.line_count()`
    pub fn line(&self, i: usize) -> Range<usize> {
        self.lines[i].clone()
    }

    pub fn lines(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.lines.iter().cloned()
    }

    /// The text of line `i`, given the same text that was measured
    pub fn line_text<'t>(&self, text: &'t str, i: usize) -> &'t str {
        text.get(self.line(i)).unwrap_or_default()
    }

    pub fn total_height(&self) -> Pt {
        self.line_height * self.line_count() as f32
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Breaks text into lines for a given style and wrap width
pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle, wrap_width: Pt) -> Result<LineBreaks>;
}

/// Measures text with the metrics of the fonts that will be embedded in the document
#[derive(Clone)]
pub struct FontMeasurer {
    fonts: FontSet,
}

impl FontMeasurer {
    pub fn new(fonts: FontSet) -> FontMeasurer {
        FontMeasurer { fonts }
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }
}

impl TextMeasurer for FontMeasurer {
    fn measure(&self, text: &str, style: &TextStyle, wrap_width: Pt) -> Result<LineBreaks> {
        if wrap_width <= Pt(0.0) {
            return Err(ExportError::MeasurementFailure(format!(
                "cannot wrap text into a width of {wrap_width}pt"
            )));
        }
        let font = self.fonts.get(style.face).ok_or_else(|| {
            ExportError::MeasurementFailure(format!("no font loaded for {:?}", style.face))
        })?;

        let lines = wrap_lines(text, wrap_width, |ch| font.advance(ch, style.size));
        let line_height = font.line_height(style.size) * style.line_spacing + style.extra_spacing;
        Ok(LineBreaks::new(lines, line_height))
    }
}

/// Characters after which a line may be broken without splitting a word. Ideographic scripts
/// can break between any two characters.
fn is_break_after(ch: char) -> bool {
    (ch.is_whitespace() && ch != '\n')
        || matches!(ch,
            '\u{2E80}'..='\u{9FFF}'
            | '\u{AC00}'..='\u{D7AF}'
            | '\u{F900}'..='\u{FAFF}'
            | '\u{FF00}'..='\u{FFEF}'
            | '\u{20000}'..='\u{2FA1F}')
}

/// Wraps `text` into lines no wider than `wrap_width`, returning byte ranges into `text`.
///
/// Lines are broken at the most recent break point when a character would overflow; if the
/// line has none, the character is pushed onto the next line instead. Whitespace is allowed
/// to hang past the right edge. `\n` always ends a line and is not part of either line. Blank
/// text has no lines at all.
pub(crate) fn wrap_lines<F>(text: &str, wrap_width: Pt, advance: F) -> Vec<Range<usize>>
where
    F: Fn(char) -> Pt,
{
    if text.trim().is_empty() {
        return Vec::new();
    }

    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let width_of = |ch: char| match ch {
        '\t' => advance(' ') * TABSIZE as f32,
        '\r' => Pt(0.0),
        ch => advance(ch),
    };

    let mut lines: Vec<Range<usize>> = Vec::new();
    let mut start = 0usize;
    let mut x = Pt(0.0);
    // (index into `chars` to resume from, byte offset the next line starts at)
    let mut last_break: Option<(usize, usize)> = None;

    let mut ci = 0usize;
    while ci < chars.len() {
        let (offset, ch) = chars[ci];

        if ch == '\n' {
            let end = if text[start..offset].ends_with('\r') {
                offset - 1
            } else {
                offset
            };
            lines.push(start..end);
            start = offset + 1;
            x = Pt(0.0);
            last_break = None;
            ci += 1;
            continue;
        }

        let hadv = width_of(ch);
        if x + hadv > wrap_width && offset > start && !ch.is_whitespace() {
            match last_break.take() {
                Some((resume, byte)) => {
                    lines.push(start..byte);
                    start = byte;
                    ci = resume;
                }
                None => {
                    lines.push(start..offset);
                    start = offset;
                }
            }
            x = Pt(0.0);
            continue;
        }

        x += hadv;
        if is_break_after(ch) {
            last_break = Some((ci + 1, offset + ch.len_utf8()));
        }
        ci += 1;
    }

    if start < text.len() {
        lines.push(start..text.len());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colours;
    use crate::testing::FixedAdvanceMeasurer;

    fn wrap(text: &str, width: f32) -> Vec<&str> {
        wrap_lines(text, Pt(width), |_| Pt(1.0))
            .into_iter()
            .map(|r| &text[r])
            .collect()
    }

    #[test]
    fn breaks_at_whitespace() {
        assert_eq!(wrap("asdf asdf", 6.0), vec!["asdf ", "asdf"]);
        assert_eq!(wrap("one two three", 8.0), vec!["one two ", "three"]);
    }

    #[test]
    fn long_words_fall_back_to_character_breaks() {
        assert_eq!(wrap("abcdefgh", 3.0), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn ideographs_break_anywhere() {
        assert_eq!(wrap("我告诉你这么多", 3.0), vec!["我告诉", "你这么", "多"]);
    }

    #[test]
    fn hard_breaks_are_honoured() {
        assert_eq!(wrap("a\n\nb\r\nc", 10.0), vec!["a", "", "b", "c"]);
        assert_eq!(wrap("trailing\n", 10.0), vec!["trailing"]);
    }

    #[test]
    fn tabs_expand_to_spaces() {
        // a tab is four columns wide
        assert_eq!(wrap("a\tb", 6.0), vec!["a\tb"]);
        assert_eq!(wrap("a\tb", 5.0), vec!["a\t", "b"]);
    }

    #[test]
    fn blank_text_has_no_lines() {
        assert!(wrap("", 10.0).is_empty());
        assert!(wrap("  \n\t", 10.0).is_empty());
    }

    #[test]
    fn every_line_fits_the_wrap_width() {
        let text = "the quick brown fox jumps over the lazy dog, again and again";
        for line in wrap(text, 12.0) {
            assert!(line.trim_end().chars().count() <= 12, "{line:?}");
        }
    }

    #[test]
    fn line_heights_sum_to_the_block_height() {
        let measurer = FixedAdvanceMeasurer::new(Pt(1.0));
        let style = TextStyle::new(FontFace::Body, Pt(14.0), colours::BLACK)
            .with_line_spacing(1.6)
            .with_extra_spacing(Pt(2.0));
        for text in ["a", "abc def ghi", "one\ntwo\nthree four five six"] {
            let breaks = measurer.measure(text, &style, Pt(5.0)).unwrap();
            assert!(breaks.line_count() > 0);
            let summed: Pt = (0..breaks.line_count()).map(|_| breaks.line_height).sum();
            assert!((summed.0 - breaks.total_height().0).abs() < 1e-3);
        }
    }

    #[test]
    fn line_text_slices_the_measured_text() {
        let breaks = LineBreaks::new(vec![0..4, 4..7], Pt(10.0));
        assert_eq!(breaks.line_text("abcdefg", 1), "efg");
        assert_eq!(breaks.total_height(), Pt(20.0));
    }

    #[test]
    fn missing_fonts_fail_measurement() {
        let measurer = FontMeasurer::new(FontSet::default());
        let style = TextStyle::new(FontFace::Body, Pt(12.0), colours::BLACK);
        let err = measurer.measure("hello", &style, Pt(100.0)).unwrap_err();
        assert!(matches!(err, ExportError::MeasurementFailure(_)));
    }
}
