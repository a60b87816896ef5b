use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A colour, expressed in RGB or grey colour spaces
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Colour {
    /// DeviceRGB colour; r, g, b, range from 0.0 to 1.0
    RGB { r: f32, g: f32, b: f32 },
    /// DeviceGray colour; g ranges from 0.0 to 1.0
    Grey { g: f32 },
}

#[derive(Error, Debug, PartialEq)]
#[error("`{0}` is not a #RRGGBB or #AARRGGBB colour")]
pub struct ParseColourError(pub String);

impl Colour {
    /// Create a new colour in the RGB space. r, g, and b range from 0.0 to 1.0
    pub fn new_rgb(r: f32, g: f32, b: f32) -> Colour {
        Colour::RGB { r, g, b }
    }

    /// Create a new colour in the RGB space. r, g, and b range from 0 to 255
    pub fn new_rgb_bytes(r: u8, g: u8, b: u8) -> Colour {
        Colour::RGB {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Create a new colour in the Gray space, g ranges from 0.0 to 1.0
    pub fn new_grey(g: f32) -> Colour {
        Colour::Grey { g }
    }

    /// Composite a translucent RGB colour over a white page. PDF pages drawn by this crate are
    /// always white, so ARGB colours are flattened up front rather than carried as soft masks.
    pub fn over_white(a: u8, r: u8, g: u8, b: u8) -> Colour {
        let alpha = a as f32 / 255.0;
        let blend = |c: u8| (c as f32 / 255.0) * alpha + (1.0 - alpha);
        Colour::RGB {
            r: blend(r),
            g: blend(g),
            b: blend(b),
        }
    }

    /// The colour as 8-bit RGB components
    pub fn to_rgb_bytes(self) -> [u8; 3] {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        match self {
            Colour::RGB { r, g, b } => [byte(r), byte(g), byte(b)],
            Colour::Grey { g } => [byte(g); 3],
        }
    }
}

impl FromStr for Colour {
    type Err = ParseColourError;

    /// Parses `#RRGGBB` or `#AARRGGBB`, where the alpha byte comes first
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColourError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        match hex.len() {
            6 => Ok(Colour::new_rgb_bytes(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Colour::over_white(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Colour {
    type Error = ParseColourError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_rgb_bytes();
        write!(f, "#{r:02X}{g:02X}{b:02X}")
    }
}

impl From<Colour> for String {
    fn from(c: Colour) -> String {
        c.to_string()
    }
}

/// A list of pre-defined colour constants
pub mod colours {
    use super::*;

    pub const BLACK: Colour = Colour::Grey { g: 0.0 };
    pub const WHITE: Colour = Colour::Grey { g: 1.0 };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_opaque_hex() {
        let c: Colour = "#1F1F1F".parse().unwrap();
        assert_eq!(c.to_rgb_bytes(), [0x1F, 0x1F, 0x1F]);
    }

    #[test]
    fn flattens_alpha_over_white() {
        // #10000000 is a faint black divider: 16/255 of black over white
        let c: Colour = "#10000000".parse().unwrap();
        assert_eq!(c.to_rgb_bytes(), [239, 239, 239]);

        let opaque: Colour = "#ff504860".parse().unwrap();
        assert_eq!(opaque.to_rgb_bytes(), [0x50, 0x48, 0x60]);
    }

    #[test]
    fn rejects_garbage() {
        assert!("1F1F1F".parse::<Colour>().is_err());
        assert!("#12345".parse::<Colour>().is_err());
        assert!("#GG0000".parse::<Colour>().is_err());
    }

    #[test]
    fn serialises_as_hex_string() {
        let c = Colour::new_rgb_bytes(0x0E, 0x0E, 0x0E);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#0E0E0E\"");
        let back: Colour = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
