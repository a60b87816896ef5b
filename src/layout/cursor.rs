use crate::canvas::Canvas;
use crate::document::Document;
use crate::image::Image;
use crate::layout::Margins;
use crate::page::Page;
use crate::pagesize::PageSize;
use crate::units::Pt;
use crate::{ExportError, Result};
use id_arena::Id;
use log::debug;
use std::path::Path;

/// The write position on the current page, in canvas coordinates (origin top-left)
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PageCursor {
    pub start_x: Pt,
    pub start_y: Pt,
    page_height: Pt,
    margin: Pt,
    content_left: Pt,
}

impl PageCursor {
    /// A cursor at the top of a page, `margin` below its top edge
    pub fn new(page_height: Pt, margin: Pt, content_left: Pt) -> PageCursor {
        PageCursor {
            start_x: content_left,
            start_y: margin,
            page_height,
            margin,
            content_left,
        }
    }

    pub fn page_height(&self) -> Pt {
        self.page_height
    }

    pub fn margin(&self) -> Pt {
        self.margin
    }

    /// Whether `height` more content would run into the bottom margin
    pub fn would_overflow(&self, height: Pt) -> bool {
        self.would_overflow_with(height, self.margin)
    }

    /// Whether `height` more content followed by `gap` would run off the page
    pub fn would_overflow_with(&self, height: Pt, gap: Pt) -> bool {
        self.start_y + height + gap > self.page_height
    }

    pub fn advance(&mut self, delta: Pt) {
        self.start_y += delta;
    }

    /// Back to the top left of a fresh page
    pub fn reset(&mut self) {
        self.start_x = self.content_left;
        self.start_y = self.margin;
    }

    /// Drawable height of an empty page
    pub fn available(&self) -> Pt {
        self.page_height - self.margin * 2.0
    }
}

/// The page being drawn on, the document finished pages go to, and the cursor.
///
/// A render target always has exactly one open page. [RenderTarget::break_page] closes it and
/// opens the next one from the same template, and [RenderTarget::finish] closes the last page
/// and hands back the document, after which nothing more can be drawn.
pub struct RenderTarget {
    document: Document,
    size: PageSize,
    margins: Margins,
    page: Page,
    cursor: PageCursor,
}

impl RenderTarget {
    pub fn new(document: Document, size: PageSize, margin: Pt, content_left: Pt) -> Result<Self> {
        let (width, height) = size;
        if width <= Pt(0.0) || height <= margin * 2.0 {
            return Err(ExportError::InvalidGeometry(format!(
                "a {width}x{height}pt page with a {margin}pt margin has no room for content"
            )));
        }

        let margins = Margins::all(margin);
        Ok(RenderTarget {
            document,
            size,
            margins,
            page: Page::new(size, Some(margins)),
            cursor: PageCursor::new(height, margin, content_left),
        })
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut PageCursor {
        &mut self.cursor
    }

    pub fn page_width(&self) -> Pt {
        self.size.0
    }

    pub fn page_height(&self) -> Pt {
        self.size.1
    }

    /// The open page
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Pages closed so far
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Number of pages including the open one
    pub fn page_count(&self) -> usize {
        self.document.page_count() + 1
    }

    /// Close the current page and continue at the top of a new one
    pub fn break_page(&mut self) {
        let page = std::mem::replace(&mut self.page, Page::new(self.size, Some(self.margins)));
        self.document.add_page(page);
        self.cursor.reset();
        debug!("page break, starting page {}", self.page_count());
    }

    /// Make sure `height` fits below the cursor, breaking the page first if it does not. Content
    /// that does not even fit on an empty page is a layout defect.
    pub fn ensure_room(&mut self, height: Pt) -> Result<()> {
        if !self.cursor.would_overflow(height) {
            return Ok(());
        }
        self.break_page();
        if self.cursor.would_overflow(height) {
            return Err(ExportError::PageOverflow {
                height,
                available: self.cursor.available(),
            });
        }
        Ok(())
    }

    pub fn advance(&mut self, delta: Pt) {
        self.cursor.advance(delta);
    }

    /// Record that the image decoded from `path` is embedded as `image_id`
    pub fn remember_image(&mut self, path: &Path, image_id: Id<Image>) {
        self.document.remember_image(path, image_id);
    }

    /// Draw on the open page
    pub fn canvas(&mut self) -> Canvas<'_> {
        Canvas::new(&mut self.page, &mut self.document.images)
    }

    /// Close the last page and hand back the finished document
    pub fn finish(self) -> Document {
        let RenderTarget {
            mut document, page, ..
        } = self;
        document.add_page(page);
        document
    }
}
