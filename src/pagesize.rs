//! Pre-defined page sizes for common paper formats.
//!
//! All sizes are provided in portrait orientation as (width, height) in whole points, the way a
//! print framework reports a media size converted from thousandths of an inch at 72 DPI and
//! truncated to integers.
//!
//! # Example
//!
//! ```
//! use notes_pdf::pagesize::{A4, LETTER};
//! use notes_pdf::Pt;
//!
//! assert_eq!(A4, (Pt(595.0), Pt(841.0)));
//! assert_eq!(LETTER.0, Pt(612.0));
//! ```

use crate::units::*;

/// Page dimensions as (width, height) in points.
pub type PageSize = (Pt, Pt);

/// ISO A4, 8267 × 11692 mils
pub const A4: PageSize = (Pt(595.0), Pt(841.0));
/// ISO A5, 5827 × 8267 mils
pub const A5: PageSize = (Pt(419.0), Pt(595.0));
/// North American letter, 8.5 × 11 inches
pub const LETTER: PageSize = (Pt(612.0), Pt(792.0));
