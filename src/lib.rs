//! Lays reading notes out onto PDF pages.
//!
//! A [Book] is a cover, some metadata and a list of [Note]s, each an excerpt with an optional
//! idea, photos and a footer saying where it was taken from. [PaginationEngine] draws the book's
//! details in a block at the top of the first page and then flows the notes below it, breaking
//! pages whenever the next line or row of images would run into the bottom margin.
//!
//! Text measurement, image decoding and cover colour picking are behind the [TextMeasurer],
//! [ImageSource] and [ColourResolver] traits; [FontMeasurer], [DiskImageSource] and
//! [MutedSwatchResolver] are the implementations used for real exports.
//!
//! [TextMeasurer]: layout::TextMeasurer
//! [FontMeasurer]: layout::FontMeasurer

mod bitmap;
pub use bitmap::*;

mod canvas;
pub use canvas::*;

mod colour;
pub use colour::*;

mod config;
pub use config::*;

pub(crate) mod content;

mod document;
pub use document::*;

mod engine;
pub use engine::*;

mod font;
pub use font::*;

mod image;
pub use self::image::*;

mod info;
pub use info::*;

/// Measuring text, arranging images and paginating notes
pub mod layout;

mod model;
pub use model::*;

mod page;
pub use page::*;

/// Common page sizes, in points
pub mod pagesize;

mod palette;
pub use palette::*;

mod rect;
pub use rect::*;

pub(crate) mod refs;

mod units;
pub use units::*;

mod error;
pub use error::*;

#[cfg(test)]
pub(crate) mod testing;

/// Re-export PDF-writer functionality
pub use pdf_writer;
