use crate::bitmap::{with_bitmap, ImageSource};
use crate::canvas::CompositeMode;
use crate::config::LayoutConfig;
use crate::font::FontFace;
use crate::layout::{group_images, LineBreaks, RenderTarget, RowScaler, TextMeasurer, TextStyle};
use crate::model::{Note, NoteImage};
use crate::rect::Rect;
use crate::Result;
use log::{debug, warn};
use std::path::Path;

/// Lays out notes one after another, breaking pages as they fill up.
///
/// Each note is its content, an optional idea, its images in rows, and a footer with where the
/// note was taken from, followed by a divider unless it is the last note. Lines and image rows
/// never straddle a page break; a note as a whole may.
pub struct NoteListLayout<'a> {
    config: &'a LayoutConfig,
    measurer: &'a dyn TextMeasurer,
    images: &'a dyn ImageSource,
}

impl<'a> NoteListLayout<'a> {
    pub fn new(
        config: &'a LayoutConfig,
        measurer: &'a dyn TextMeasurer,
        images: &'a dyn ImageSource,
    ) -> NoteListLayout<'a> {
        NoteListLayout {
            config,
            measurer,
            images,
        }
    }

    /// Draw every note, continuing from the current cursor position. A failure is reported
    /// with the index of the note it happened in.
    pub fn draw(&self, target: &mut RenderTarget, notes: &[Note]) -> Result<()> {
        let scaler = RowScaler::new(
            self.config.draw_width(),
            self.config.image_count_of_line,
            self.config.image_space,
            target.page_height(),
            self.config.margin,
        )?;

        for (index, note) in notes.iter().enumerate() {
            let is_last = index + 1 == notes.len();
            self.draw_note(target, &scaler, note, is_last)
                .map_err(|e| e.in_note(index))?;
        }
        Ok(())
    }

    fn content_style(&self) -> TextStyle {
        TextStyle::new(
            FontFace::Body,
            self.config.content_text_size,
            self.config.content_text_colour,
        )
        .with_line_spacing(self.config.line_spacing)
    }

    fn idea_style(&self) -> TextStyle {
        TextStyle::new(
            FontFace::Bold,
            self.config.idea_text_size,
            self.config.idea_text_colour,
        )
        .with_line_spacing(self.config.line_spacing)
    }

    fn note_info_style(&self) -> TextStyle {
        TextStyle::new(
            FontFace::Body,
            self.config.note_info_text_size,
            self.config.note_info_text_colour,
        )
        .with_line_spacing(self.config.line_spacing)
    }

    fn draw_note(
        &self,
        target: &mut RenderTarget,
        scaler: &RowScaler,
        note: &Note,
        is_last: bool,
    ) -> Result<()> {
        let config = self.config;
        let left = config.content_left();
        let draw_width = config.draw_width();
        target.cursor_mut().start_x = left;

        let content_style = self.content_style();
        let content = self.measurer.measure(&note.content, &content_style, draw_width)?;
        self.draw_lines(target, &note.content, &content, &content_style)?;

        if !note.idea.trim().is_empty() {
            target.advance(config.note_top_margin);
            let idea_style = self.idea_style();
            let idea = self.measurer.measure(&note.idea, &idea_style, draw_width)?;
            self.draw_lines(target, &note.idea, &idea, &idea_style)?;
        }

        if !note.images.is_empty() {
            target.advance(config.margin);
            self.draw_images(target, scaler, &note.images)?;
        }

        target.advance(config.image_space + config.margin);

        let divider = self.draw_footer(target, &note.position)?;
        if !divider || is_last {
            return Ok(());
        }

        // a divider with no room below it is dropped, and the next note starts a new page
        if target.cursor().would_overflow(config.note_space) {
            target.break_page();
        } else {
            let y = target.cursor().start_y + config.note_space / 2.0;
            target.canvas().draw_line(
                (left, y),
                (left + draw_width, y),
                config.divider_line_height,
                config.divider_colour,
            );
            target.advance(config.note_space);
        }

        Ok(())
    }

    /// Draw measured lines, breaking the page before any line that does not fit
    fn draw_lines(
        &self,
        target: &mut RenderTarget,
        text: &str,
        breaks: &LineBreaks,
        style: &TextStyle,
    ) -> Result<()> {
        let line_height = breaks.line_height;
        for i in 0..breaks.line_count() {
            target.ensure_room(line_height)?;
            target.advance(line_height);
            let (x, baseline) = (target.cursor().start_x, target.cursor().start_y);
            target
                .canvas()
                .draw_text(breaks.line_text(text, i), x, baseline, style);
        }
        Ok(())
    }

    /// Draw the images of a note in rows. Images that cannot be found or decoded are skipped,
    /// and rows are formed from the images that remain.
    fn draw_images(
        &self,
        target: &mut RenderTarget,
        scaler: &RowScaler,
        images: &[NoteImage],
    ) -> Result<()> {
        let mut sized: Vec<(&NoteImage, (u32, u32))> = Vec::with_capacity(images.len());
        for image in images {
            match self.images.decode_size(&image.path) {
                Ok(size) => sized.push((image, size)),
                Err(e) if e.is_recoverable() => warn!("skipping image: {e}"),
                Err(e) => return Err(e),
            }
        }
        if sized.is_empty() {
            return Ok(());
        }

        let left = self.config.content_left();
        for row in group_images(&sized, self.config.image_count_of_line) {
            let sizes: Vec<(u32, u32)> = row.iter().map(|(_, size)| *size).collect();
            target.ensure_room(scaler.row_height(&sizes))?;

            let layout = scaler.layout(&sizes, left, target.cursor().start_y);
            debug!(
                "placing a row of {} images, {}pt tall, at y {}",
                sizes.len(),
                layout.height,
                target.cursor().start_y
            );
            for placement in &layout.placements {
                let (image, _) = row[placement.index];
                let drawn = self.draw_image(target, &image.path, placement.rect);
                match drawn {
                    Ok(()) => {}
                    Err(e) if e.is_recoverable() => warn!("leaving an empty slot: {e}"),
                    Err(e) => return Err(e),
                }
            }

            target.advance(layout.height + self.config.image_space);
        }
        Ok(())
    }

    /// Draw one image, embedding it only the first time its path is seen
    fn draw_image(&self, target: &mut RenderTarget, path: &Path, dest: Rect) -> Result<()> {
        if let Some(image_id) = target.document().image_for(path) {
            target
                .canvas()
                .draw_image(image_id, dest, CompositeMode::Normal);
            return Ok(());
        }
        with_bitmap(self.images, path, |bitmap| {
            let image_id = target
                .canvas()
                .draw_bitmap(bitmap, dest, CompositeMode::Normal);
            target.remember_image(path, image_id);
            Ok(())
        })
    }

    /// Draw the lines saying where the note is from. A line that does not leave room for the
    /// divider, but does fit above the bottom margin, stays on this page and the divider is
    /// dropped. Returns whether the divider should still be drawn.
    fn draw_footer(&self, target: &mut RenderTarget, position: &str) -> Result<bool> {
        let config = self.config;
        let style = self.note_info_style();
        let breaks = self
            .measurer
            .measure(position, &style, config.draw_width())?;
        let line_height = breaks.line_height;
        let mut divider = true;

        for i in 0..breaks.line_count() {
            let line = breaks.line_text(position, i);
            let cursor = *target.cursor();

            if cursor.would_overflow_with(line_height, config.note_space) {
                if !cursor.would_overflow(line_height) {
                    target.canvas().draw_text(
                        line,
                        cursor.start_x,
                        cursor.start_y + line_height,
                        &style,
                    );
                    target.advance(line_height);
                    divider = false;
                    continue;
                }
                target.break_page();
            }

            let cursor = *target.cursor();
            target
                .canvas()
                .draw_text(line, cursor.start_x, cursor.start_y + line_height, &style);
            target.advance(line_height + config.margin);
        }

        Ok(divider)
    }
}
