//! Layout configuration.
//!
//! Every dimension, size and colour the layout uses lives in [LayoutConfig]. The defaults
//! reproduce the reading-notes export this crate was written for; a JSON file only needs to
//! name the options it changes:
//!
//! ```
//! use notes_pdf::{LayoutConfig, Pt};
//!
//! let config: LayoutConfig =
//!     serde_json::from_str(r#"{"margin": 20, "imageCountOfLine": 3}"#).unwrap();
//! assert_eq!(config.margin, Pt(20.0));
//! assert_eq!(config.image_count_of_line, 3);
//! assert_eq!(config.image_space, Pt(10.0));
//! ```

use crate::colour::Colour;
use crate::pagesize::{self, PageSize};
use crate::units::Pt;
use crate::{ExportError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The paper the notes are laid out on
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSizeOption {
    #[default]
    A4,
    A5,
    Letter,
    /// Any size, in points
    Custom { width: Pt, height: Pt },
}

impl PageSizeOption {
    pub fn dimensions(&self) -> PageSize {
        match *self {
            PageSizeOption::A4 => pagesize::A4,
            PageSizeOption::A5 => pagesize::A5,
            PageSizeOption::Letter => pagesize::LETTER,
            PageSizeOption::Custom { width, height } => (width, height),
        }
    }
}

/// Prefixes drawn before the book's metadata, and the note count summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Labels {
    pub author: String,
    pub translator: String,
    pub press: String,
    pub pub_date: String,
    pub isbn: String,
    /// `{count}` is replaced with the number of notes
    pub note_count: String,
}

impl Labels {
    pub fn english() -> Labels {
        Labels {
            author: "Author: ".into(),
            translator: "Translator: ".into(),
            press: "Publisher: ".into(),
            pub_date: "Published: ".into(),
            isbn: "ISBN: ".into(),
            note_count: "{count} notes".into(),
        }
    }

    pub fn chinese() -> Labels {
        Labels {
            author: "作者：".into(),
            translator: "译者：".into(),
            press: "出版社：".into(),
            pub_date: "出版年：".into(),
            isbn: "ISBN: ".into(),
            note_count: "共 {count} 条书摘".into(),
        }
    }

    pub fn note_count(&self, count: usize) -> String {
        self.note_count.replace("{count}", &count.to_string())
    }
}

impl Default for Labels {
    fn default() -> Labels {
        Labels::english()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub page_size: PageSizeOption,
    /// Gap between the page edges and any content
    pub margin: Pt,

    /// Height of the book info block as a fraction of the page height
    pub book_info_height_ratio: f32,
    /// Corner radius of the book info background. Note text is inset by the same amount.
    pub book_info_bg_radius: Pt,
    pub book_info_inner_margin: Pt,
    /// Height of the cover divided by its width
    pub cover_aspect_ratio: f32,
    pub cover_corner_radius: Pt,
    /// Gap between the title and the first metadata field
    pub title_top_margin: Pt,
    /// Gap between metadata fields
    pub field_gap: Pt,
    pub title_text_size: Pt,
    pub book_info_text_size: Pt,
    pub note_count_text_size: Pt,

    pub content_text_size: Pt,
    pub idea_text_size: Pt,
    pub note_info_text_size: Pt,
    /// Gap between a note's content and its idea
    pub note_top_margin: Pt,
    /// Vertical room taken by the divider between notes
    pub note_space: Pt,
    pub image_count_of_line: usize,
    pub image_space: Pt,
    /// Line height multiplier for note text
    pub line_spacing: f32,
    pub divider_line_height: Pt,

    pub title_text_colour: Colour,
    pub book_info_text_colour: Colour,
    pub note_count_text_colour: Colour,
    pub content_text_colour: Colour,
    pub idea_text_colour: Colour,
    pub note_info_text_colour: Colour,
    pub divider_colour: Colour,
    /// Book info background when no colour can be taken from the cover
    pub default_background_colour: Colour,

    pub labels: Labels,
}

impl Default for LayoutConfig {
    fn default() -> LayoutConfig {
        LayoutConfig {
            page_size: PageSizeOption::A4,
            margin: Pt(10.0),
            book_info_height_ratio: 0.3,
            book_info_bg_radius: Pt(14.0),
            book_info_inner_margin: Pt(30.0),
            cover_aspect_ratio: 1.4,
            cover_corner_radius: Pt(14.0),
            title_top_margin: Pt(24.0),
            field_gap: Pt(4.0),
            title_text_size: Pt(24.0),
            book_info_text_size: Pt(16.0),
            note_count_text_size: Pt(14.0),
            content_text_size: Pt(14.0),
            idea_text_size: Pt(14.0),
            note_info_text_size: Pt(12.0),
            note_top_margin: Pt(10.0),
            note_space: Pt(20.0),
            image_count_of_line: 4,
            image_space: Pt(10.0),
            line_spacing: 1.6,
            divider_line_height: Pt(1.0),
            title_text_colour: Colour::new_rgb_bytes(0xFF, 0xFF, 0xFF),
            book_info_text_colour: Colour::new_rgb_bytes(0xFF, 0xFF, 0xFF),
            note_count_text_colour: Colour::over_white(0x54, 0, 0, 0),
            content_text_colour: Colour::new_rgb_bytes(0x1F, 0x1F, 0x1F),
            idea_text_colour: Colour::new_rgb_bytes(0x76, 0x76, 0x76),
            note_info_text_colour: Colour::new_rgb_bytes(0x76, 0x76, 0x76),
            divider_colour: Colour::over_white(0x10, 0, 0, 0),
            default_background_colour: Colour::new_rgb_bytes(0x0E, 0x0E, 0x0E),
            labels: Labels::default(),
        }
    }
}

impl LayoutConfig {
    /// Read a configuration from a JSON file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<LayoutConfig> {
        let json = std::fs::read_to_string(path)?;
        let config: LayoutConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size.dimensions()
    }

    /// Width available to note text and image rows
    pub fn draw_width(&self) -> Pt {
        let (width, _) = self.page_size();
        (width - self.margin * 2.0 - self.book_info_bg_radius * 2.0).trunc()
    }

    /// Left edge of note text and image rows
    pub fn content_left(&self) -> Pt {
        self.margin + self.book_info_bg_radius
    }

    /// Reject configurations no page could be laid out with
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(ExportError::Config(msg));
        let (width, height) = self.page_size();

        if width <= Pt(0.0) || height <= Pt(0.0) {
            return fail(format!("page size {width}x{height} must be positive"));
        }
        if self.margin < Pt(0.0) {
            return fail(format!("margin {} cannot be negative", self.margin));
        }
        if height - self.margin * 2.0 <= Pt(0.0) {
            return fail(format!(
                "a margin of {} leaves no room on a {height}pt tall page",
                self.margin
            ));
        }
        if self.draw_width() <= Pt(0.0) {
            return fail(format!(
                "a margin of {} leaves no room on a {width}pt wide page",
                self.margin
            ));
        }
        if self.image_count_of_line == 0 {
            return fail("imageCountOfLine must be at least 1".into());
        }
        if !(self.book_info_height_ratio > 0.0 && self.book_info_height_ratio <= 1.0) {
            return fail(format!(
                "bookInfoHeightRatio {} must be within (0, 1]",
                self.book_info_height_ratio
            ));
        }
        if self.cover_aspect_ratio <= 0.0 {
            return fail("coverAspectRatio must be positive".into());
        }
        if self.line_spacing <= 0.0 {
            return fail("lineSpacing must be positive".into());
        }

        // the book info block and the note count below it have to share the first page
        let block = (height * self.book_info_height_ratio).trunc();
        if block <= self.book_info_inner_margin * 2.0 {
            return fail(format!(
                "a {block}pt book info block leaves no room for the cover inside its {}pt margins",
                self.book_info_inner_margin
            ));
        }
        let count_lines = self.note_count_text_size * 2.0 * 2.0;
        if self.margin + block + count_lines > height - self.margin {
            return fail(format!(
                "a {block}pt book info block and its note count do not fit on a {height}pt page"
            ));
        }

        let sizes = [
            self.title_text_size,
            self.book_info_text_size,
            self.note_count_text_size,
            self.content_text_size,
            self.idea_text_size,
            self.note_info_text_size,
        ];
        if sizes.iter().any(|size| *size <= Pt(0.0)) {
            return fail("text sizes must be positive".into());
        }
        Ok(())
    }
}
