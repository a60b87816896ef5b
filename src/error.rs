use crate::font::FontFace;
use crate::units::Pt;
use std::path::PathBuf;
use thiserror::Error;

/// All errors that the crate can generate
#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsing(#[from] owned_ttf_parser::FaceParsingError),

    #[error(transparent)]
    /// [image] failed to read or convert an image
    Image(#[from] image::ImageError),

    #[error(transparent)]
    /// A book or layout configuration could not be parsed
    Json(#[from] serde_json::Error),

    #[error("image not found: {}", .0.display())]
    /// An image referenced by the book does not exist on disk
    ResourceNotFound(PathBuf),

    #[error("failed to decode image {}: {source}", path.display())]
    /// An image exists but could not be decoded
    DecodeFailure {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("text measurement failed: {0}")]
    /// Text could not be measured; there is no safe fallback geometry
    MeasurementFailure(String),

    #[error("a {height}pt block cannot fit on a page with {available}pt of drawable height")]
    /// A single atomic unit (a line, an image row) is taller than an empty page. Image rows are
    /// clamped before this can happen, so hitting this indicates a layout defect.
    PageOverflow { height: Pt, available: Pt },

    #[error("invalid page geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("no font was registered for the {0:?} face")]
    FontMissing(FontFace),

    #[error("failed to lay out note #{index}")]
    /// A fatal error raised while laying out the note at `index`
    Note {
        index: usize,
        #[source]
        source: Box<ExportError>,
    },
}

pub type Result<T> = std::result::Result<T, ExportError>;

impl ExportError {
    /// Whether the error concerns a single image and layout can carry on without it
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExportError::ResourceNotFound(_) | ExportError::DecodeFailure { .. }
        )
    }

    pub(crate) fn in_note(self, index: usize) -> ExportError {
        match self {
            ExportError::Note { .. } => self,
            other => ExportError::Note {
                index,
                source: Box::new(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn only_image_errors_are_recoverable() {
        assert!(ExportError::ResourceNotFound("a.png".into()).is_recoverable());
        assert!(!ExportError::MeasurementFailure("no glyphs".into()).is_recoverable());
        assert!(!ExportError::FontMissing(FontFace::Bold).is_recoverable());
    }

    #[test]
    fn note_errors_keep_the_cause_and_the_first_index() {
        let err = ExportError::MeasurementFailure("no glyphs".into())
            .in_note(3)
            .in_note(7);
        assert_eq!(err.to_string(), "failed to lay out note #3");
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("text measurement failed: no glyphs"));
    }
}
