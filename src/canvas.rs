//! Drawing onto a [Page] in canvas coordinates.
//!
//! Layout works top-down: the origin is the top-left corner of the page and y grows downward.
//! Pages store PDF coordinates (origin bottom-left), so every call here flips y against the
//! page height before recording anything.

use crate::bitmap::Bitmap;
use crate::colour::Colour;
use crate::image::Image;
use crate::layout::TextStyle;
use crate::page::{ImageLayout, LineLayout, Page, RoundRectLayout, SpanFont, SpanLayout};
use crate::rect::Rect;
use crate::units::Pt;
use id_arena::{Arena, Id};

/// How a bitmap is composited onto the page
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CompositeMode {
    /// Painted as is over the destination rectangle
    Normal,
    /// Painted through a rounded rectangle mask with the given corner radius
    RoundedClip(Pt),
}

/// A drawing surface over the current page of a document
pub struct Canvas<'a> {
    page: &'a mut Page,
    images: &'a mut Arena<Image>,
}

impl<'a> Canvas<'a> {
    pub fn new(page: &'a mut Page, images: &'a mut Arena<Image>) -> Canvas<'a> {
        Canvas { page, images }
    }

    pub fn width(&self) -> Pt {
        self.page.width()
    }

    pub fn height(&self) -> Pt {
        self.page.height()
    }

    fn flip_y(&self, y: Pt) -> Pt {
        self.page.height() - y
    }

    fn flip_rect(&self, rect: Rect) -> Rect {
        Rect {
            x1: rect.x1,
            y1: self.flip_y(rect.y2),
            x2: rect.x2,
            y2: self.flip_y(rect.y1),
        }
    }

    /// Draw a single line of text with its baseline at `(x, baseline)`. Line terminators are
    /// dropped; nothing is recorded for blank text.
    pub fn draw_text(&mut self, text: &str, x: Pt, baseline: Pt, style: &TextStyle) {
        let text = text.trim_end_matches(['\r', '\n']);
        if text.trim().is_empty() {
            return;
        }
        let coords = (x, self.flip_y(baseline));
        self.page.add_span(SpanLayout {
            text: text.to_string(),
            font: SpanFont {
                face: style.face,
                size: style.size,
            },
            colour: style.colour,
            coords,
        });
    }

    /// Stroke a straight line with round caps
    pub fn draw_line(&mut self, from: (Pt, Pt), to: (Pt, Pt), width: Pt, colour: Colour) {
        let from = (from.0, self.flip_y(from.1));
        let to = (to.0, self.flip_y(to.1));
        self.page.add_line(LineLayout {
            from,
            to,
            width,
            colour,
        });
    }

    /// Fill a rectangle with rounded corners
    pub fn draw_round_rect(&mut self, rect: Rect, radius: Pt, colour: Colour) {
        let rect = self.flip_rect(rect);
        self.page.add_round_rect(RoundRectLayout {
            rect,
            radius,
            colour,
        });
    }

    /// Stretch `bitmap` over `dest`. The bitmap is encoded into the document straight away, so it
    /// can be released as soon as this returns.
    pub fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: Rect, mode: CompositeMode) -> Id<Image> {
        let image_id = self.images.alloc(Image::encode(bitmap));
        self.draw_image(image_id, dest, mode);
        image_id
    }

    /// Stretch an image already embedded in the document over `dest`
    pub fn draw_image(&mut self, image_id: Id<Image>, dest: Rect, mode: CompositeMode) {
        let corner_radius = match mode {
            CompositeMode::Normal => None,
            CompositeMode::RoundedClip(radius) => Some(radius),
        };
        let position = self.flip_rect(dest);
        self.page.add_image(ImageLayout {
            image_id,
            position,
            corner_radius,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colours;
    use crate::font::FontFace;
    use crate::page::PageContents;
    use crate::pagesize;
    use image::DynamicImage;

    #[test]
    fn text_baselines_are_flipped() {
        let mut page = Page::new(pagesize::A4, None);
        let mut images = Arena::new();
        let style = TextStyle::new(FontFace::Body, Pt(14.0), colours::BLACK);
        let mut canvas = Canvas::new(&mut page, &mut images);
        canvas.draw_text("hello\n", Pt(24.0), Pt(41.0), &style);
        canvas.draw_text("   ", Pt(24.0), Pt(60.0), &style);

        let spans: Vec<&SpanLayout> = page.spans().collect();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "hello");
        assert_eq!(spans[0].coords, (Pt(24.0), Pt(800.0)));
    }

    #[test]
    fn rectangles_keep_their_size() {
        let mut page = Page::new(pagesize::A4, None);
        let mut images = Arena::new();
        Canvas::new(&mut page, &mut images).draw_round_rect(
            Rect::from_size(Pt(10.0), Pt(10.0), Pt(575.0), Pt(242.0)),
            Pt(14.0),
            colours::BLACK,
        );
        let PageContents::RoundRect(rect) = &page.contents[0] else {
            panic!("expected a rounded rectangle");
        };
        assert_eq!(rect.rect.y2, Pt(831.0));
        assert_eq!(rect.rect.y1, Pt(589.0));
        assert_eq!(rect.rect.height(), Pt(242.0));
    }

    #[test]
    fn clipped_bitmaps_carry_their_radius() {
        let mut page = Page::new(pagesize::A4, None);
        let mut images = Arena::new();
        let bitmap = Bitmap::new(DynamicImage::new_rgb8(2, 3));
        let id = Canvas::new(&mut page, &mut images).draw_bitmap(
            &bitmap,
            Rect::from_size(Pt(40.0), Pt(20.0), Pt(100.0), Pt(140.0)),
            CompositeMode::RoundedClip(Pt(14.0)),
        );
        let image = page.images().next().unwrap();
        assert_eq!(image.image_id, id);
        assert_eq!(image.corner_radius, Some(Pt(14.0)));
        assert_eq!(image.position.y2, Pt(821.0));
        assert_eq!(images[id].width, 2);
    }

    #[test]
    fn embedded_images_can_be_drawn_again() {
        let mut page = Page::new(pagesize::A4, None);
        let mut images = Arena::new();
        let bitmap = Bitmap::new(DynamicImage::new_rgb8(2, 3));
        let mut canvas = Canvas::new(&mut page, &mut images);
        let dest = Rect::from_size(Pt(34.0), Pt(20.0), Pt(100.0), Pt(150.0));
        let id = canvas.draw_bitmap(&bitmap, dest, CompositeMode::Normal);
        canvas.draw_image(id, dest, CompositeMode::Normal);

        assert_eq!(images.len(), 1);
        let ids: Vec<_> = page.images().map(|i| i.image_id).collect();
        assert_eq!(ids, vec![id, id]);
    }
}
