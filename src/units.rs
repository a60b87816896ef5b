use derive_more::{
    Add, AddAssign, Deref, DerefMut, Display, Div, From, Into, Mul, MulAssign, Sub, SubAssign, Sum,
};
use serde::{Deserialize, Serialize};

/// A length in PDF points (1/72 of an inch). All layout in this crate is done in points.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Add,
    AddAssign,
    Sub,
    SubAssign,
    Mul,
    MulAssign,
    Div,
    Sum,
    Display,
    From,
    Into,
    Deref,
    DerefMut,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Pt(pub f32);

impl Pt {
    pub fn max(self, other: Pt) -> Pt {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }

    pub fn min(self, other: Pt) -> Pt {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }

    /// Rounds towards zero, mirroring the integer pixel maths of canvas based layouts
    pub fn trunc(self) -> Pt {
        Pt(self.0.trunc())
    }
}
