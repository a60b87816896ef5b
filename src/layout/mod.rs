//! Flow layout and pagination of a book's notes.
//!
//! Layout works in canvas coordinates: the origin is the top-left corner of the page and y grows
//! downward. A [RenderTarget] owns the open page and a [PageCursor]; every block checks that it
//! fits below the cursor before drawing, and breaks the page first when it does not.
//!
//! - [BookInfoLayout] draws the cover and metadata block at the top of the first page
//! - [NoteListLayout] draws notes one after another across as many pages as they need
//! - [TextMeasurer] breaks text into lines, [group_images] and [RowScaler] arrange images

mod book_info;
mod cursor;
mod grouper;
mod margins;
mod note_list;
mod row;
mod text;

pub use book_info::*;
pub use cursor::*;
pub use grouper::*;
pub use margins::*;
pub use note_list::*;
pub use row::*;
pub use text::*;
