//! Conversion of page contents into PDF content stream operators.

use crate::colour::Colour;
use crate::font::FontSet;
use crate::page::{ImageLayout, LineLayout, PageContents, RoundRectLayout, SpanLayout};
use crate::rect::Rect;
use crate::units::Pt;
use crate::{ExportError, Result};
use std::io::Write;

/// Bézier control point distance approximating a quarter circle
const KAPPA: f32 = 0.552_284_8;

/// Renders page contents to a PDF content stream.
#[allow(clippy::write_with_newline)]
pub(crate) fn render_contents(contents: &[PageContents], fonts: &FontSet) -> Result<Vec<u8>> {
    let mut content: Vec<u8> = Vec::default();

    for page_content in contents.iter() {
        match page_content {
            PageContents::Text(span) => render_span(&mut content, span, fonts)?,
            PageContents::Image(image) => render_image(&mut content, image)?,
            PageContents::Line(line) => render_line(&mut content, line)?,
            PageContents::RoundRect(rect) => render_round_rect(&mut content, rect)?,
        }
    }

    Ok(content)
}

#[allow(clippy::write_with_newline)]
fn render_span(content: &mut Vec<u8>, span: &SpanLayout, fonts: &FontSet) -> Result<()> {
    let face = span.font.face;
    let font = fonts.get(face).ok_or(ExportError::FontMissing(face))?;
    let index = fonts
        .resource_index(face)
        .ok_or(ExportError::FontMissing(face))?;

    write!(content, "q\n")?;
    write_fill_colour(content, span.colour)?;
    write!(content, "BT\n")?;
    write!(content, "/F{} {} Tf\n", index, span.font.size)?;
    write!(content, "{} {} Td\n", span.coords.0, span.coords.1)?;
    write!(content, "<")?;
    for ch in span.text.chars().filter(|ch| !ch.is_control()) {
        write!(content, "{:04x}", font.glyph_id_or_fallback(ch))?;
    }
    write!(content, "> Tj\n")?;
    write!(content, "ET\n")?;
    write!(content, "Q\n")?;
    Ok(())
}

#[allow(clippy::write_with_newline)]
fn render_image(content: &mut Vec<u8>, image: &ImageLayout) -> Result<()> {
    let position = &image.position;
    write!(content, "q\n")?;
    if let Some(radius) = image.corner_radius {
        // clip to the rounded rectangle, then paint the image through it
        write_round_rect_path(content, position, radius)?;
        write!(content, "W n\n")?;
    }
    write!(
        content,
        "{} 0 0 {} {} {} cm\n",
        position.width(),
        position.height(),
        position.x1,
        position.y1
    )?;
    write!(content, "/I{} Do\n", image.image_id.index())?;
    write!(content, "Q\n")?;
    Ok(())
}

#[allow(clippy::write_with_newline)]
fn render_line(content: &mut Vec<u8>, line: &LineLayout) -> Result<()> {
    write!(content, "q\n")?;
    write_stroke_colour(content, line.colour)?;
    write!(content, "{} w\n", line.width)?;
    // round caps
    write!(content, "1 J\n")?;
    write!(content, "{} {} m\n", line.from.0, line.from.1)?;
    write!(content, "{} {} l\n", line.to.0, line.to.1)?;
    write!(content, "S\n")?;
    write!(content, "Q\n")?;
    Ok(())
}

#[allow(clippy::write_with_newline)]
fn render_round_rect(content: &mut Vec<u8>, rect: &RoundRectLayout) -> Result<()> {
    write!(content, "q\n")?;
    write_fill_colour(content, rect.colour)?;
    write_round_rect_path(content, &rect.rect, rect.radius)?;
    write!(content, "f\n")?;
    write!(content, "Q\n")?;
    Ok(())
}

/// Traces a closed rounded rectangle, counter-clockwise from the bottom edge
#[allow(clippy::write_with_newline)]
fn write_round_rect_path(content: &mut Vec<u8>, rect: &Rect, radius: Pt) -> Result<()> {
    let r = radius
        .max(Pt(0.0))
        .min(rect.width() / 2.0)
        .min(rect.height() / 2.0);
    let k = r * KAPPA;
    let (x1, y1, x2, y2) = (rect.x1, rect.y1, rect.x2, rect.y2);

    write!(content, "{} {} m\n", x1 + r, y1)?;
    write!(content, "{} {} l\n", x2 - r, y1)?;
    write!(content, "{} {} {} {} {} {} c\n", x2 - r + k, y1, x2, y1 + r - k, x2, y1 + r)?;
    write!(content, "{} {} l\n", x2, y2 - r)?;
    write!(content, "{} {} {} {} {} {} c\n", x2, y2 - r + k, x2 - r + k, y2, x2 - r, y2)?;
    write!(content, "{} {} l\n", x1 + r, y2)?;
    write!(content, "{} {} {} {} {} {} c\n", x1 + r - k, y2, x1, y2 - r + k, x1, y2 - r)?;
    write!(content, "{} {} l\n", x1, y1 + r)?;
    write!(content, "{} {} {} {} {} {} c\n", x1, y1 + r - k, x1 + r - k, y1, x1 + r, y1)?;
    write!(content, "h\n")?;
    Ok(())
}

#[allow(clippy::write_with_newline)]
fn write_fill_colour(content: &mut Vec<u8>, colour: Colour) -> Result<()> {
    match colour {
        Colour::RGB { r, g, b } => write!(content, "{r} {g} {b} rg\n")?,
        Colour::Grey { g } => write!(content, "{g} g\n")?,
    }
    Ok(())
}

#[allow(clippy::write_with_newline)]
fn write_stroke_colour(content: &mut Vec<u8>, colour: Colour) -> Result<()> {
    match colour {
        Colour::RGB { r, g, b } => write!(content, "{r} {g} {b} RG\n")?,
        Colour::Grey { g } => write!(content, "{g} G\n")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colours;
    use crate::font::FontFace;
    use crate::page::SpanFont;

    fn render(contents: &[PageContents]) -> String {
        String::from_utf8(render_contents(contents, &FontSet::default()).unwrap()).unwrap()
    }

    #[test]
    fn lines_are_stroked_with_round_caps() {
        let out = render(&[PageContents::Line(LineLayout {
            from: (Pt(24.0), Pt(100.0)),
            to: (Pt(571.0), Pt(100.0)),
            width: Pt(1.0),
            colour: colours::BLACK,
        })]);
        assert!(out.contains("1 J\n"));
        assert!(out.contains("24 100 m\n571 100 l\nS\n"));
    }

    #[test]
    fn rounded_rects_are_closed_and_filled() {
        let out = render(&[PageContents::RoundRect(RoundRectLayout {
            rect: Rect::from_size(Pt(10.0), Pt(10.0), Pt(100.0), Pt(50.0)),
            radius: Pt(14.0),
            colour: colours::WHITE,
        })]);
        assert!(out.starts_with("q\n1 g\n24 10 m\n96 10 l\n"));
        assert_eq!(out.matches(" c\n").count(), 4);
        assert!(out.ends_with("h\nf\nQ\n"));
    }

    #[test]
    fn text_without_a_font_is_an_error() {
        let result = render_contents(
            &[PageContents::Text(SpanLayout {
                text: "hi".into(),
                font: SpanFont {
                    face: FontFace::Body,
                    size: Pt(12.0),
                },
                colour: colours::BLACK,
                coords: (Pt(0.0), Pt(0.0)),
            })],
            &FontSet::default(),
        );
        assert!(matches!(result, Err(ExportError::FontMissing(FontFace::Body))));
    }
}
