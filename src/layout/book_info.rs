use crate::bitmap::Bitmap;
use crate::canvas::CompositeMode;
use crate::colour::Colour;
use crate::config::LayoutConfig;
use crate::font::FontFace;
use crate::layout::{LineBreaks, RenderTarget, TextMeasurer, TextStyle};
use crate::model::Book;
use crate::rect::Rect;
use crate::units::Pt;
use crate::{ExportError, Result};

/// Where the parts of the book info block go, in canvas coordinates
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BookInfoGeometry {
    pub background: Rect,
    pub cover: Rect,
    /// The area right of the cover that metadata is centred in
    pub region: Rect,
}

impl BookInfoGeometry {
    pub fn new(config: &LayoutConfig, page_width: Pt, page_height: Pt) -> BookInfoGeometry {
        let margin = config.margin;
        let inner = config.book_info_inner_margin;
        let height = (page_height * config.book_info_height_ratio).trunc();

        let background = Rect {
            x1: margin,
            y1: margin,
            x2: page_width - margin,
            y2: height,
        };

        let cover_height = height - inner * 2.0;
        let cover_width = cover_height / config.cover_aspect_ratio;
        let cover = Rect::from_size(
            margin + inner,
            margin / 2.0 + (height - cover_height) / 2.0,
            cover_width,
            cover_height,
        );

        let region = Rect {
            x1: (margin + inner + cover_width + inner).trunc(),
            y1: margin + inner,
            x2: page_width - inner - margin,
            y2: margin + height,
        };

        BookInfoGeometry {
            background,
            cover,
            region,
        }
    }
}

/// A metadata field that has something to show, measured
struct Field {
    text: String,
    style: TextStyle,
    breaks: LineBreaks,
}

/// The block at the top of the first page: a rounded background, the cover, the book's
/// metadata, and a count of the notes below it
pub struct BookInfoLayout<'a> {
    config: &'a LayoutConfig,
    measurer: &'a dyn TextMeasurer,
}

impl<'a> BookInfoLayout<'a> {
    pub fn new(config: &'a LayoutConfig, measurer: &'a dyn TextMeasurer) -> BookInfoLayout<'a> {
        BookInfoLayout { config, measurer }
    }

    /// Measure the fields with a value, in drawing order. Blank fields are skipped entirely.
    fn fields(&self, book: &Book, wrap_width: Pt) -> Result<Vec<Field>> {
        let config = self.config;
        let labels = &config.labels;
        let title = TextStyle::new(
            FontFace::Title,
            config.title_text_size,
            config.title_text_colour,
        );
        let body = TextStyle::new(
            FontFace::Body,
            config.book_info_text_size,
            config.book_info_text_colour,
        );

        let candidates = [
            ("", &book.name, title),
            (labels.author.as_str(), &book.author, body),
            (labels.translator.as_str(), &book.translator, body),
            (labels.press.as_str(), &book.press, body),
            (labels.pub_date.as_str(), &book.pub_date, body),
            (labels.isbn.as_str(), &book.isbn, body),
        ];

        candidates
            .into_iter()
            .filter(|(_, value, _)| !value.trim().is_empty())
            .map(|(label, value, style)| -> Result<Field> {
                let text = format!("{label}{value}");
                let breaks = self.measurer.measure(&text, &style, wrap_width)?;
                Ok(Field {
                    text,
                    style,
                    breaks,
                })
            })
            .collect()
    }

    /// Height the metadata is centred with: the title's top margin and every field's height,
    /// plus a gap for each field after the first two
    fn total_height(&self, fields: &[Field]) -> Pt {
        let heights: Pt = fields.iter().map(|f| f.breaks.total_height()).sum();
        let gaps = fields.len().saturating_sub(2) as f32;
        self.config.title_top_margin + heights + self.config.field_gap * gaps
    }

    /// Draw the block onto the first page of `target` and leave the cursor below the note
    /// count. `background` is the colour resolved from the cover; the cover itself is left out
    /// when it could not be decoded.
    pub fn draw(
        &self,
        target: &mut RenderTarget,
        book: &Book,
        cover: Option<&Bitmap>,
        background: Colour,
    ) -> Result<BookInfoGeometry> {
        let config = self.config;
        let geometry =
            BookInfoGeometry::new(config, target.page_width(), target.page_height());
        let region = geometry.region;
        if geometry.cover.height() <= Pt(0.0) {
            return Err(ExportError::InvalidGeometry(format!(
                "the book info block leaves the cover {}pt tall",
                geometry.cover.height()
            )));
        }

        let count_style = TextStyle::new(
            FontFace::Body,
            config.note_count_text_size,
            config.note_count_text_colour,
        )
        .with_extra_spacing(config.note_count_text_size);
        let count = config.labels.note_count(book.notes.len());
        let count_height = self
            .measurer
            .measure(&count, &count_style, config.draw_width())?
            .total_height();
        let below = region.y2 + count_height * 2.0;
        let bottom = target.page_height() - config.margin;
        if below > bottom {
            return Err(ExportError::InvalidGeometry(format!(
                "the book info block and note count reach {below}pt, past the bottom margin at {bottom}pt"
            )));
        }

        let mut canvas = target.canvas();
        canvas.draw_round_rect(geometry.background, config.book_info_bg_radius, background);
        if let Some(bitmap) = cover {
            canvas.draw_bitmap(
                bitmap,
                geometry.cover,
                CompositeMode::RoundedClip(config.cover_corner_radius),
            );
        }

        let fields = self.fields(book, region.width())?;
        let first_height = fields.first().map(|f| f.breaks.total_height());
        let last_height = fields.last().map(|f| f.breaks.total_height());
        let total = self.total_height(&fields);

        // centred with a bias towards the top, matching how the block has always looked
        let mut y = (region.height()
            - total
            - first_height.unwrap_or_default()
            - last_height.unwrap_or_default() * 2.0)
            / 2.0
            + region.y1;

        for (k, field) in fields.iter().enumerate() {
            y += if k == 1 {
                config.title_top_margin
            } else {
                config.field_gap
            };
            let line_height = field.breaks.line_height;
            for i in 0..field.breaks.line_count() {
                let line = field.breaks.line_text(&field.text, i);
                canvas.draw_text(line, region.x1, y + line_height, &field.style);
                y += line_height;
            }
        }

        let left = config.content_left();
        canvas.draw_text(&count, left, region.y2 + count_height, &count_style);

        let cursor = target.cursor_mut();
        cursor.start_x = left;
        cursor.start_y = below;

        Ok(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::testing::FixedAdvanceMeasurer;
    use crate::{colours, PageContents};
    use image::DynamicImage;

    fn book() -> Book {
        Book {
            name: "小王子".into(),
            author: "安东尼·德·圣-埃克苏佩里".into(),
            translator: "".into(),
            press: "浙江文艺出版社".into(),
            pub_date: "2017-3-1".into(),
            isbn: "9787533947279".into(),
            ..Book::default()
        }
    }

    fn target(config: &LayoutConfig) -> RenderTarget {
        RenderTarget::new(
            Document::default(),
            config.page_size(),
            config.margin,
            config.content_left(),
        )
        .unwrap()
    }

    #[test]
    fn geometry_on_a4() {
        let geometry = BookInfoGeometry::new(&LayoutConfig::default(), Pt(595.0), Pt(841.0));
        assert_eq!(geometry.background.y2, Pt(252.0));
        assert_eq!(geometry.background.x2, Pt(585.0));
        assert_eq!(geometry.cover.height(), Pt(192.0));
        assert_eq!(geometry.cover.y1, Pt(35.0));
        assert_eq!(geometry.region.x1, Pt(207.0));
        assert_eq!(geometry.region, Rect {
            x1: Pt(207.0),
            y1: Pt(40.0),
            x2: Pt(555.0),
            y2: Pt(262.0),
        });
    }

    #[test]
    fn blank_translator_is_skipped_and_centring_uses_rendered_fields() {
        let config = LayoutConfig::default();
        let measurer = FixedAdvanceMeasurer::new(Pt(1.0));
        let mut target = target(&config);
        BookInfoLayout::new(&config, &measurer)
            .draw(&mut target, &book(), None, colours::BLACK)
            .unwrap();

        let page_height = target.page_height();
        let spans: Vec<(String, Pt)> = target
            .page()
            .spans()
            .map(|s| (s.text.clone(), page_height - s.coords.1))
            .collect();

        // five metadata lines, then the note count
        assert_eq!(spans.len(), 6);
        assert!(spans.iter().all(|(text, _)| !text.starts_with("Translator")));
        assert_eq!(spans[1].0, "Author: 安东尼·德·圣-埃克苏佩里");

        // total = 24 + 24 + 4 * 16 + 3 * 4 = 124, so y starts at (222 - 124 - 24 - 32) / 2 + 40
        let baselines: Vec<Pt> = spans.iter().take(5).map(|(_, y)| *y).collect();
        assert_eq!(
            baselines,
            vec![Pt(89.0), Pt(129.0), Pt(149.0), Pt(169.0), Pt(189.0)]
        );

        // the note count is measured with extra spacing equal to its size: 14 + 14
        assert_eq!(spans[5], ("0 notes".to_string(), Pt(262.0 + 28.0)));
        assert_eq!(target.cursor().start_y, Pt(262.0 + 56.0));
        assert_eq!(target.cursor().start_x, Pt(24.0));
    }

    #[test]
    fn background_comes_first_and_cover_is_clipped() {
        let config = LayoutConfig::default();
        let measurer = FixedAdvanceMeasurer::new(Pt(1.0));
        let mut target = target(&config);
        let cover = Bitmap::new(DynamicImage::new_rgb8(3, 4));
        let background = Colour::new_rgb_bytes(0x50, 0x48, 0x60);
        BookInfoLayout::new(&config, &measurer)
            .draw(&mut target, &book(), Some(&cover), background)
            .unwrap();

        let contents = &target.page().contents;
        let PageContents::RoundRect(rect) = &contents[0] else {
            panic!("background should be drawn first");
        };
        assert_eq!(rect.colour, background);
        assert_eq!(rect.radius, Pt(14.0));
        let PageContents::Image(image) = &contents[1] else {
            panic!("cover should be drawn over the background");
        };
        assert_eq!(image.corner_radius, Some(Pt(14.0)));
    }

    #[test]
    fn title_only_books_still_centre() {
        let config = LayoutConfig::default();
        let measurer = FixedAdvanceMeasurer::new(Pt(1.0));
        let mut target = target(&config);
        let book = Book {
            name: "Untitled".into(),
            ..Book::default()
        };
        BookInfoLayout::new(&config, &measurer)
            .draw(&mut target, &book, None, colours::BLACK)
            .unwrap();
        // total = 24 + 24; y = (222 - 48 - 24 - 48) / 2 + 40 = 91, then the title's gap
        let span = target.page().spans().next().unwrap();
        assert_eq!(target.page_height() - span.coords.1, Pt(91.0 + 4.0 + 24.0));
    }

    #[test]
    fn blocks_too_tall_for_the_first_page_are_refused() {
        // 10 + 798 + 2 * 28 runs past 831
        let config = LayoutConfig {
            book_info_height_ratio: 0.95,
            ..LayoutConfig::default()
        };
        let measurer = FixedAdvanceMeasurer::new(Pt(1.0));
        let mut target = target(&config);
        let err = BookInfoLayout::new(&config, &measurer)
            .draw(&mut target, &book(), None, colours::BLACK)
            .unwrap_err();
        assert!(matches!(err, ExportError::InvalidGeometry(_)));
        assert!(target.page().contents.is_empty());
    }

    #[test]
    fn blocks_with_no_room_for_the_cover_are_refused() {
        let config = LayoutConfig {
            book_info_height_ratio: 0.05,
            ..LayoutConfig::default()
        };
        let measurer = FixedAdvanceMeasurer::new(Pt(1.0));
        let mut target = target(&config);
        let result = BookInfoLayout::new(&config, &measurer).draw(
            &mut target,
            &book(),
            None,
            colours::BLACK,
        );
        assert!(matches!(result, Err(ExportError::InvalidGeometry(_))));
    }
}
