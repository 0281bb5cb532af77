//! Colours for people in the visualization.
//!
//! Distances fade from the infected red toward white along an exponential decay
//! that levels off at `MIN_FILL`, so even far away people stay slightly tinted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const INFECTED_COLOUR: Rgb = Rgb::new(255, 0, 0);
pub const HEALTHY_COLOUR: Rgb = Rgb::new(255, 255, 255);

/// Upper bound of the fill toward white
pub const MIN_FILL: f64 = 0.95;
/// How quickly distances fade
pub const STRETCH: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `0xRRGGBB`
    pub fn packed(&self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// `rgb(r, g, b)` as understood by CSS and plotting libraries
    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    /// Channels scaled to `[0, 1]` for shaders
    pub fn to_unit(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl From<Rgb> for (u8, u8, u8) {
    fn from(c: Rgb) -> Self {
        (c.r, c.g, c.b)
    }
}

/// Colour for a person `degrees_apart` hops from the nearest infection.
/// `None` (unreachable or not computed) is white, `0` is [`INFECTED_COLOUR`].
pub fn distance_to_colour(degrees_apart: Option<u32>) -> Rgb {
    let degrees = match degrees_apart {
        None => return HEALTHY_COLOUR,
        Some(0) => return INFECTED_COLOUR,
        Some(d) => d as f64,
    };

    let offset = MIN_FILL.ln();
    let percent_fill = MIN_FILL - (-(STRETCH * degrees - offset)).exp();

    let blend = |c: u8| (c as f64 + (255.0 - c as f64) * percent_fill) as u8;
    Rgb::new(
        blend(INFECTED_COLOUR.r),
        blend(INFECTED_COLOUR.g),
        blend(INFECTED_COLOUR.b),
    )
}

pub fn infection_to_colour(infected: bool) -> Rgb {
    if infected {
        INFECTED_COLOUR
    } else {
        HEALTHY_COLOUR
    }
}

/// Memo table in front of [`distance_to_colour`].
/// Owned by whoever renders many frames; results are identical with or without it.
#[derive(Debug, Default, Clone)]
pub struct ColourMapper {
    cache: HashMap<Option<u32>, Rgb>,
}

impl ColourMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distance(&mut self, degrees_apart: Option<u32>) -> Rgb {
        *self
            .cache
            .entry(degrees_apart)
            .or_insert_with(|| distance_to_colour(degrees_apart))
    }

    pub fn infection(&self, infected: bool) -> Rgb {
        infection_to_colour(infected)
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fixed_points() {
        assert_eq!(distance_to_colour(None), Rgb::new(255, 255, 255));
        assert_eq!(distance_to_colour(Some(0)), Rgb::new(255, 0, 0));
        assert_eq!(distance_to_colour(Some(1)), Rgb::new(255, 109, 109));
        assert_eq!(distance_to_colour(Some(2)), Rgb::new(255, 169, 169));
    }

    #[test]
    fn test_monotonic_toward_white() {
        let mut prev = distance_to_colour(Some(0));
        for d in 1..200 {
            let c = distance_to_colour(Some(d));
            assert!(c.r >= prev.r && c.g >= prev.g && c.b >= prev.b, "d = {d}");
            prev = c;
        }
        // levels off at the fill floor, never white
        assert_eq!(prev, Rgb::new(255, 242, 242));
        assert_ne!(prev, HEALTHY_COLOUR);
    }

    #[test]
    fn test_infection_colour() {
        assert_eq!(infection_to_colour(true), INFECTED_COLOUR);
        assert_eq!(infection_to_colour(false), HEALTHY_COLOUR);
    }

    #[test]
    fn test_conversions() {
        let c = Rgb::new(255, 169, 8);
        assert_eq!(c.packed(), 0xFFA908);
        assert_eq!(c.to_css(), "rgb(255, 169, 8)");
        assert_eq!(HEALTHY_COLOUR.to_unit(), [1.0, 1.0, 1.0]);
        assert_eq!(<(u8, u8, u8)>::from(c), (255, 169, 8));
    }

    #[test]
    fn test_mapper_matches_pure_function() {
        let mut mapper = ColourMapper::new();
        for d in [None, Some(0), Some(3), Some(3), Some(7)] {
            assert_eq!(mapper.distance(d), distance_to_colour(d));
        }
        assert_eq!(mapper.cached(), 4);
        assert_eq!(mapper.infection(true), INFECTED_COLOUR);
    }
}
