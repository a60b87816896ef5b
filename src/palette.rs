//! Picking a background colour from a book cover.

use crate::bitmap::Bitmap;
use crate::colour::Colour;
use std::collections::HashMap;

/// Finds the colour a cover should be framed with
pub trait ColourResolver {
    /// The dominant dark, muted colour of `bitmap`, if it has one
    fn dominant_dark_colour(&self, bitmap: &Bitmap) -> Option<Colour>;
}

/// A colour bucket and how many sampled pixels fell into it
#[derive(Debug, Copy, Clone, PartialEq)]
struct Swatch {
    rgb: [u8; 3],
    population: u32,
}

impl Swatch {
    /// (hue in degrees, saturation, lightness)
    fn hsl(&self) -> (f32, f32, f32) {
        let [r, g, b] = self.rgb.map(|c| c as f32 / 255.0);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        if max == min {
            return (0.0, 0.0, l);
        }
        let d = max - min;
        let s = d / (1.0 - (2.0 * l - 1.0).abs());
        let h = if max == r {
            ((g - b) / d).rem_euclid(6.0)
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        (h * 60.0, s, l)
    }
}

/// Buckets a downscaled cover into 15-bit colours and scores every bucket against a dark,
/// muted target, weighing saturation, lightness and population.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MutedSwatchResolver {
    /// Covers are downscaled to fit this many pixels along their longest side before sampling
    pub sample_size: u32,
    pub target_lightness: f32,
    pub max_lightness: f32,
    pub target_saturation: f32,
    pub max_saturation: f32,
}

impl Default for MutedSwatchResolver {
    fn default() -> MutedSwatchResolver {
        MutedSwatchResolver {
            sample_size: 100,
            target_lightness: 0.26,
            max_lightness: 0.45,
            target_saturation: 0.3,
            max_saturation: 0.4,
        }
    }
}

const WEIGHT_SATURATION: f32 = 0.24;
const WEIGHT_LIGHTNESS: f32 = 0.52;
const WEIGHT_POPULATION: f32 = 0.24;

impl MutedSwatchResolver {
    fn swatches(&self, bitmap: &Bitmap) -> Vec<Swatch> {
        let image = &bitmap.image;
        let sample = if image.width() > self.sample_size || image.height() > self.sample_size {
            image.thumbnail(self.sample_size, self.sample_size).to_rgba8()
        } else {
            image.to_rgba8()
        };

        // 5 bits per channel, summing the channels so each bucket reports its mean colour
        let mut buckets: HashMap<u16, ([u32; 3], u32)> = HashMap::new();
        for pixel in sample.pixels() {
            let [r, g, b, a] = pixel.0;
            if a < 128 {
                continue;
            }
            let key = ((r as u16 >> 3) << 10) | ((g as u16 >> 3) << 5) | (b as u16 >> 3);
            let (sum, count) = buckets.entry(key).or_insert(([0; 3], 0));
            sum[0] += r as u32;
            sum[1] += g as u32;
            sum[2] += b as u32;
            *count += 1;
        }

        buckets
            .into_values()
            .map(|(sum, count)| Swatch {
                rgb: sum.map(|c| (c / count) as u8),
                population: count,
            })
            .filter(|swatch| !is_filtered(swatch.hsl()))
            .collect()
    }

    fn score(&self, swatch: &Swatch, max_population: u32) -> Option<f32> {
        let (_, s, l) = swatch.hsl();
        if l > self.max_lightness || s > self.max_saturation {
            return None;
        }
        let population = swatch.population as f32 / max_population.max(1) as f32;
        Some(
            WEIGHT_SATURATION * (1.0 - (s - self.target_saturation).abs())
                + WEIGHT_LIGHTNESS * (1.0 - (l - self.target_lightness).abs())
                + WEIGHT_POPULATION * population,
        )
    }
}

/// Near black, near white, and the skin tone band are never picked
fn is_filtered((h, s, l): (f32, f32, f32)) -> bool {
    l <= 0.05 || l >= 0.95 || ((10.0..=37.0).contains(&h) && s <= 0.82)
}

impl ColourResolver for MutedSwatchResolver {
    fn dominant_dark_colour(&self, bitmap: &Bitmap) -> Option<Colour> {
        let swatches = self.swatches(bitmap);
        let max_population = swatches.iter().map(|s| s.population).max()?;

        swatches
            .iter()
            .filter_map(|swatch| self.score(swatch, max_population).map(|score| (score, swatch)))
            .max_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, swatch)| {
                let [r, g, b] = swatch.rgb;
                Colour::new_rgb_bytes(r, g, b)
            })
    }
}
