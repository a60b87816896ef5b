use crate::bitmap::{with_bitmap, Bitmap, ImageSource};
use crate::colour::Colour;
use crate::config::LayoutConfig;
use crate::document::Document;
use crate::font::FontSet;
use crate::info::Info;
use crate::layout::{BookInfoLayout, NoteListLayout, RenderTarget, TextMeasurer};
use crate::model::Book;
use crate::palette::ColourResolver;
use crate::Result;
use log::{info, warn};
use std::io::Write;

/// Lays a book's notes out into a PDF document: the book info block at the top of the first
/// page, then every note in order.
pub struct PaginationEngine<'a> {
    config: &'a LayoutConfig,
    measurer: &'a dyn TextMeasurer,
    images: &'a dyn ImageSource,
    colours: &'a dyn ColourResolver,
}

impl<'a> PaginationEngine<'a> {
    pub fn new(
        config: &'a LayoutConfig,
        measurer: &'a dyn TextMeasurer,
        images: &'a dyn ImageSource,
        colours: &'a dyn ColourResolver,
    ) -> PaginationEngine<'a> {
        PaginationEngine {
            config,
            measurer,
            images,
            colours,
        }
    }

    /// Lay out `book`, drawing text with `fonts`
    pub fn paginate(&self, book: &Book, fonts: FontSet) -> Result<Document> {
        self.config.validate()?;
        info!(
            "laying out {} notes from {:?}",
            book.notes.len(),
            book.name
        );

        let mut document = Document::new(fonts);
        document.set_info(Info::for_book(book));
        let mut target = RenderTarget::new(
            document,
            self.config.page_size(),
            self.config.margin,
            self.config.content_left(),
        )?;

        self.draw_book_info(&mut target, book)?;
        NoteListLayout::new(self.config, self.measurer, self.images)
            .draw(&mut target, &book.notes)?;

        let document = target.finish();
        info!("laid out {} pages", document.page_count());
        Ok(document)
    }

    /// Lay out `book` and write the PDF to `w`, returning the number of pages
    pub fn export<W: Write>(&self, book: &Book, fonts: FontSet, w: W) -> Result<usize> {
        let document = self.paginate(book, fonts)?;
        let pages = document.page_count();
        document.write(w)?;
        Ok(pages)
    }

    /// The background colour is resolved from the cover before anything is drawn. Without a
    /// usable cover the block is drawn without one, on the default background.
    fn draw_book_info(&self, target: &mut RenderTarget, book: &Book) -> Result<()> {
        let layout = BookInfoLayout::new(self.config, self.measurer);
        let fallback = self.config.default_background_colour;

        let drawn = with_bitmap(self.images, &book.cover, |cover| {
            let background = self.background(cover);
            layout.draw(target, book, Some(cover), background)
        });
        match drawn {
            Ok(_) => Ok(()),
            Err(e) if e.is_recoverable() => {
                warn!("drawing the book info without a cover: {e}");
                layout.draw(target, book, None, fallback).map(|_| ())
            }
            Err(e) => Err(e),
        }
    }

    fn background(&self, cover: &Bitmap) -> Colour {
        self.colours
            .dominant_dark_colour(cover)
            .unwrap_or(self.config.default_background_colour)
    }
}
