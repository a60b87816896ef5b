//! Stand-ins for fonts and image files, so layout can be tested without either.

use crate::bitmap::{Bitmap, ImageSource};
use crate::colour::Colour;
use crate::font::FontFace;
use crate::layout::{wrap_lines, LineBreaks, TextMeasurer, TextStyle};
use crate::palette::ColourResolver;
use crate::units::Pt;
use crate::{ExportError, Result};
use image::DynamicImage;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Measures every character as `advance` wide and every line as `size * line_spacing` plus the
/// style's extra spacing
pub(crate) struct FixedAdvanceMeasurer {
    advance: Pt,
    failing: Option<FontFace>,
}

impl FixedAdvanceMeasurer {
    pub(crate) fn new(advance: Pt) -> FixedAdvanceMeasurer {
        FixedAdvanceMeasurer {
            advance,
            failing: None,
        }
    }

    /// Fail to measure anything set in `face`
    pub(crate) fn failing_on(mut self, face: FontFace) -> FixedAdvanceMeasurer {
        self.failing = Some(face);
        self
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn measure(&self, text: &str, style: &TextStyle, wrap_width: Pt) -> Result<LineBreaks> {
        if self.failing == Some(style.face) {
            return Err(ExportError::MeasurementFailure(format!(
                "no glyphs for {:?}",
                style.face
            )));
        }
        let lines = wrap_lines(text, wrap_width, |_| self.advance);
        let line_height = style.size * style.line_spacing + style.extra_spacing;
        Ok(LineBreaks::new(lines, line_height))
    }
}

/// Images of known sizes, decoded as blank bitmaps. Paths that were never added are missing,
/// and paths marked corrupt report their size but fail to decode.
#[derive(Default)]
pub(crate) struct MemoryImageSource {
    sizes: HashMap<PathBuf, (u32, u32)>,
    corrupt: HashSet<PathBuf>,
    released: Cell<usize>,
}

impl MemoryImageSource {
    pub(crate) fn with(mut self, path: &str, width: u32, height: u32) -> MemoryImageSource {
        self.sizes.insert(path.into(), (width, height));
        self
    }

    pub(crate) fn corrupt(mut self, path: &str) -> MemoryImageSource {
        self.corrupt.insert(path.into());
        self
    }

    /// How many bitmaps have been handed back
    pub(crate) fn released(&self) -> usize {
        self.released.get()
    }
}

impl ImageSource for MemoryImageSource {
    fn decode_size(&self, path: &Path) -> Result<(u32, u32)> {
        self.sizes
            .get(path)
            .copied()
            .ok_or_else(|| ExportError::ResourceNotFound(path.to_path_buf()))
    }

    fn decode_bitmap(&self, path: &Path) -> Result<Bitmap> {
        let (width, height) = self.decode_size(path)?;
        if self.corrupt.contains(path) {
            let source = image::ImageError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "truncated image data",
            ));
            return Err(ExportError::DecodeFailure {
                path: path.to_path_buf(),
                source,
            });
        }
        Ok(Bitmap::new(DynamicImage::new_rgb8(width, height)))
    }

    fn release_bitmap(&self, bitmap: Bitmap) {
        drop(bitmap);
        self.released.set(self.released.get() + 1);
    }
}

/// Resolves every cover to the same colour
pub(crate) struct FixedColour(pub(crate) Option<Colour>);

impl ColourResolver for FixedColour {
    fn dominant_dark_colour(&self, _bitmap: &Bitmap) -> Option<Colour> {
        self.0
    }
}
