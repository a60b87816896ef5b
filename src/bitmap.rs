//! Decoding of the images a book refers to.
//!
//! Layout only needs an image's natural size to place it; pixels are decoded at draw time and
//! released as soon as they have been encoded into the document, see [with_bitmap].

use crate::{ExportError, Result};
use image::{ColorType, DynamicImage, ImageFormat};
use std::fmt;
use std::path::{Path, PathBuf};

/// A decoded image, plus the original bytes when they can be embedded into a PDF untouched
pub struct Bitmap {
    pub image: DynamicImage,
    /// Baseline RGB JPEG data, which PDF readers decode natively
    pub jpeg: Option<Vec<u8>>,
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("jpeg", &self.jpeg.is_some())
            .finish()
    }
}

impl Bitmap {
    pub fn new(image: DynamicImage) -> Bitmap {
        Bitmap { image, jpeg: None }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Where images come from. Paths are the ones stored in the book, which implementations may
/// resolve however they like.
pub trait ImageSource {
    /// The natural (width, height) of the image in pixels, without decoding pixel data
    fn decode_size(&self, path: &Path) -> Result<(u32, u32)>;

    /// Fully decode the image
    fn decode_bitmap(&self, path: &Path) -> Result<Bitmap>;

    /// Hand a bitmap back once it has been drawn. The default simply drops it.
    fn release_bitmap(&self, bitmap: Bitmap) {
        drop(bitmap);
    }
}

/// Releases the held bitmap through its source when dropped, whichever way the draw step exits
struct BitmapGuard<'s, S: ImageSource + ?Sized> {
    source: &'s S,
    bitmap: Option<Bitmap>,
}

impl<S: ImageSource + ?Sized> Drop for BitmapGuard<'_, S> {
    fn drop(&mut self) {
        if let Some(bitmap) = self.bitmap.take() {
            self.source.release_bitmap(bitmap);
        }
    }
}

/// Decode the image at `path`, lend it to `draw`, then release it. The bitmap is released even
/// if `draw` fails or panics.
pub fn with_bitmap<S, T, F>(source: &S, path: &Path, draw: F) -> Result<T>
where
    S: ImageSource + ?Sized,
    F: FnOnce(&Bitmap) -> Result<T>,
{
    let mut guard = BitmapGuard {
        source,
        bitmap: None,
    };
    let bitmap = guard.bitmap.insert(source.decode_bitmap(path)?);
    draw(bitmap)
}

/// Reads images from a directory on disk
#[derive(Debug, Clone)]
pub struct DiskImageSource {
    root: PathBuf,
}

impl DiskImageSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> DiskImageSource {
        DiskImageSource { root: root.into() }
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        let full = self.root.join(path);
        if full.is_file() {
            Ok(full)
        } else {
            Err(ExportError::ResourceNotFound(full))
        }
    }
}

impl ImageSource for DiskImageSource {
    fn decode_size(&self, path: &Path) -> Result<(u32, u32)> {
        let path = self.resolve(path)?;
        image::image_dimensions(&path).map_err(|source| ExportError::DecodeFailure { path, source })
    }

    fn decode_bitmap(&self, path: &Path) -> Result<Bitmap> {
        let path = self.resolve(path)?;
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) => {
                let source = image::ImageError::IoError(e);
                return Err(ExportError::DecodeFailure { path, source });
            }
        };

        let decoded = image::guess_format(&data).and_then(|format| {
            image::load_from_memory_with_format(&data, format).map(|image| (format, image))
        });
        let (format, image) = match decoded {
            Ok(decoded) => decoded,
            Err(source) => return Err(ExportError::DecodeFailure { path, source }),
        };

        let jpeg = match (format, image.color()) {
            (ImageFormat::Jpeg, ColorType::Rgb8) => Some(data),
            _ => None,
        };
        Ok(Bitmap { image, jpeg })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingSource {
        released: Cell<usize>,
        failing: bool,
    }

    impl ImageSource for CountingSource {
        fn decode_size(&self, _path: &Path) -> Result<(u32, u32)> {
            Ok((2, 2))
        }

        fn decode_bitmap(&self, path: &Path) -> Result<Bitmap> {
            if self.failing {
                return Err(ExportError::ResourceNotFound(path.to_path_buf()));
            }
            Ok(Bitmap::new(DynamicImage::new_rgb8(2, 2)))
        }

        fn release_bitmap(&self, _bitmap: Bitmap) {
            self.released.set(self.released.get() + 1);
        }
    }

    #[test]
    fn bitmap_is_released_after_drawing() {
        let source = CountingSource {
            released: Cell::new(0),
            failing: false,
        };
        let width = with_bitmap(&source, Path::new("a.png"), |b| Ok(b.width())).unwrap();
        assert_eq!(width, 2);
        assert_eq!(source.released.get(), 1);
    }

    #[test]
    fn bitmap_is_released_when_drawing_fails() {
        let source = CountingSource {
            released: Cell::new(0),
            failing: false,
        };
        let result: Result<()> = with_bitmap(&source, Path::new("a.png"), |_| {
            Err(ExportError::MeasurementFailure("boom".into()))
        });
        assert!(result.is_err());
        assert_eq!(source.released.get(), 1);
    }

    #[test]
    fn bitmaps_debug_as_their_size() {
        let bitmap = Bitmap::new(DynamicImage::new_rgb8(3, 5));
        assert_eq!(
            format!("{bitmap:?}"),
            "Bitmap { width: 3, height: 5, jpeg: false }"
        );
    }

    #[test]
    fn failed_decodes_release_nothing() {
        let source = CountingSource {
            released: Cell::new(0),
            failing: true,
        };
        let result = with_bitmap(&source, Path::new("a.png"), |b| Ok(b.width()));
        assert!(matches!(result, Err(ExportError::ResourceNotFound(_))));
        assert_eq!(source.released.get(), 0);
    }

    #[test]
    fn missing_files_are_reported_as_not_found() {
        let source = DiskImageSource::new(std::env::temp_dir());
        let err = source
            .decode_size(Path::new("definitely-not-here-7f3a.png"))
            .unwrap_err();
        assert!(matches!(err, ExportError::ResourceNotFound(_)));
        assert!(err.is_recoverable());
    }
}
