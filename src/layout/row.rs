use crate::rect::Rect;
use crate::units::Pt;
use crate::{ExportError, Result};

/// Where one image of a row is drawn, in canvas coordinates (origin top-left)
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Placement {
    /// Position of the image within the row it was laid out from
    pub index: usize,
    pub rect: Rect,
}

/// A laid out row of images
#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    /// The height the cursor has to make room for, excluding spacing
    pub height: Pt,
    pub placements: Vec<Placement>,
}

/// Scales rows of images to a fixed column width.
///
/// Images taller than a page can hold are clamped to `max_image_height`. Images in a row are
/// bottom-aligned to the tallest one, except that an image clamped to `max_image_height` is
/// top-aligned at the start of the row. The two only differ when a row mixes a clamped image
/// with shorter ones, and the inconsistency is kept on purpose until someone decides which
/// alignment long images should get.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RowScaler {
    /// Width of every image in a row
    pub image_width: Pt,
    /// Tallest an image may be drawn
    pub max_image_height: Pt,
    /// Gap around images, both horizontally and above each row
    pub image_space: Pt,
}

impl RowScaler {
    /// Derive column width and height clamp from the page geometry
    pub fn new(
        draw_width: Pt,
        per_row: usize,
        image_space: Pt,
        page_height: Pt,
        margin: Pt,
    ) -> Result<RowScaler> {
        let per_row = per_row.max(1) as f32;
        let image_width = (draw_width - image_space * (per_row + 1.0)) / per_row;
        let max_image_height = page_height - margin * 2.0 - image_space * 2.0;

        if image_width <= Pt(0.0) {
            return Err(ExportError::InvalidGeometry(format!(
                "no room for {per_row} images per row in {draw_width}pt"
            )));
        }
        if max_image_height <= Pt(0.0) {
            return Err(ExportError::InvalidGeometry(format!(
                "a {page_height}pt page leaves no room for images"
            )));
        }

        Ok(RowScaler {
            image_width,
            max_image_height,
            image_space,
        })
    }

    /// Height of an image of the given natural size once scaled to the column width, before
    /// clamping
    pub fn scaled_height(&self, (width, height): (u32, u32)) -> Pt {
        if width == 0 {
            return Pt(0.0);
        }
        Pt(height as f32) * (self.image_width.0 / width as f32)
    }

    /// Height of the tallest image of a row, clamped
    pub fn row_height(&self, sizes: &[(u32, u32)]) -> Pt {
        sizes
            .iter()
            .map(|size| self.scaled_height(*size))
            .fold(Pt(0.0), Pt::max)
            .min(self.max_image_height)
    }

    /// Lay out a row of images given their natural sizes in pixels. `left` is the left edge of
    /// the content area and `row_top` the cursor position the row starts at.
    pub fn layout(&self, sizes: &[(u32, u32)], left: Pt, row_top: Pt) -> RowLayout {
        let scaled: Vec<Pt> = sizes.iter().map(|size| self.scaled_height(*size)).collect();
        let height = self.row_height(sizes);

        let mut x = left + self.image_space;
        let placements = scaled
            .iter()
            .enumerate()
            .map(|(index, scaled_height)| {
                let image_height = scaled_height.min(self.max_image_height);
                let offset = if *scaled_height >= self.max_image_height {
                    Pt(0.0)
                } else {
                    height - image_height
                };
                let rect = Rect::from_size(
                    x,
                    row_top + offset + self.image_space,
                    self.image_width,
                    image_height,
                );
                x += self.image_space + self.image_width;
                Placement { index, rect }
            })
            .collect();

        RowLayout { height, placements }
    }
}
