//! Quantization of hourly step counts into display intensity levels
//!
//! A count is mapped onto `num_levels` ordinal levels relative to a goal:
//! zero steps is level 0, reaching the goal is the top level, and everything
//! in between is spread linearly.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::RgbColor;

use crate::config::{MAX_LEVELS, TrackerConfig};
use crate::error::TrackerError;

/// Intensity level for `count` steps against `goal`.
///
/// `min(count * (num_levels - 1) / goal, num_levels - 1)`, computed in 64 bits.
/// A zero goal or zero levels both yield level 0.
pub const fn level_of(count: u32, goal: u32, num_levels: u8) -> u8 {
    if goal == 0 || num_levels == 0 {
        return 0;
    }
    let top = num_levels as u64 - 1;
    let level = count as u64 * top / goal as u64;
    if level > top { top as u8 } else { level as u8 }
}

/// Goal and level count for one quantization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntensityScale {
    pub goal: u32,
    pub num_levels: u8,
}

impl IntensityScale {
    pub const fn new(goal: u32, num_levels: u8) -> Self {
        Self { goal, num_levels }
    }

    /// Scale for a single hour's bucket.
    pub const fn hourly(config: &TrackerConfig) -> Self {
        Self::new(config.hourly_goal, config.num_levels)
    }

    /// Scale for the whole day's total.
    pub const fn daily(config: &TrackerConfig) -> Self {
        Self::new(config.daily_goal, config.num_levels)
    }

    pub const fn level(&self, count: u32) -> u8 {
        level_of(count, self.goal, self.num_levels)
    }

    pub const fn top_level(&self) -> u8 {
        self.num_levels.saturating_sub(1)
    }
}

// RGB565 format: R(5 bits), G(6 bits), B(5 bits)
// Convert from 8-bit RGB: R>>3, G>>2, B>>3
const CHROME_YELLOW: Rgb565 = Rgb565::new(255 >> 3, 170 >> 2, 0);
const YELLOW: Rgb565 = Rgb565::new(255 >> 3, 255 >> 2, 0);

/// Colors for each intensity level, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb565; MAX_LEVELS as usize],
    len: u8,
}

impl Palette {
    /// Black, red, chrome yellow, yellow, green.
    ///
    /// Only five colors are distinct; pair it with at most five levels.
    pub const DEFAULT: Self = Self {
        colors: [
            Rgb565::BLACK,
            Rgb565::RED,
            CHROME_YELLOW,
            YELLOW,
            Rgb565::GREEN,
            Rgb565::GREEN,
            Rgb565::GREEN,
            Rgb565::GREEN,
        ],
        len: 5,
    };

    /// Build a palette from up to eight colors. Extra colors are ignored.
    pub fn new(colors: &[Rgb565]) -> Self {
        let mut palette = Self {
            colors: [Rgb565::BLACK; MAX_LEVELS as usize],
            len: 0,
        };
        for (slot, color) in palette.colors.iter_mut().zip(colors) {
            *slot = *color;
            palette.len += 1;
        }
        palette
    }

    pub const fn len(&self) -> usize {
        self.len as usize
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reject a level count this palette cannot tell apart.
    pub const fn check_levels(&self, num_levels: u8) -> Result<(), TrackerError> {
        if num_levels > self.len {
            return Err(TrackerError::InvalidConfig(
                "num_levels exceeds the palette's colors",
            ));
        }
        Ok(())
    }

    /// Color for `level`; levels past the end reuse the last color.
    pub fn color(&self, level: u8) -> Rgb565 {
        if self.len == 0 {
            return Rgb565::BLACK;
        }
        let index = (level as usize).min(self.len as usize - 1);
        self.colors[index]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_midpoint() {
        assert_eq!(level_of(125, 250, 5), 2);
    }

    #[test]
    fn test_level_bounds() {
        assert_eq!(level_of(0, 250, 5), 0);
        assert_eq!(level_of(250, 250, 5), 4);
        assert_eq!(level_of(10_000, 250, 5), 4);
        assert_eq!(level_of(u32::MAX, 250, 5), 4);
        assert_eq!(level_of(62, 250, 5), 0);
        assert_eq!(level_of(63, 250, 5), 1);
    }

    #[test]
    fn test_level_monotonic() {
        let mut previous = 0;
        for count in 0..=600 {
            let level = level_of(count, 250, 5);
            assert!(level >= previous, "level dropped at {}", count);
            assert!(level < 5);
            previous = level;
        }
        assert_eq!(previous, 4);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(level_of(100, 0, 5), 0);
        assert_eq!(level_of(100, 250, 0), 0);
        assert_eq!(level_of(100, 250, 1), 0);
    }

    #[test]
    fn test_scales_from_config() {
        let config = TrackerConfig::DEFAULT;
        assert_eq!(IntensityScale::hourly(&config).level(250), 4);
        assert_eq!(IntensityScale::daily(&config).level(5_000), 2);
        assert_eq!(IntensityScale::daily(&config).top_level(), 4);
    }

    #[test]
    fn test_palette_lookup() {
        let palette = Palette::DEFAULT;
        assert_eq!(palette.len(), 5);
        assert_eq!(palette.color(0), Rgb565::BLACK);
        assert_eq!(palette.color(4), Rgb565::GREEN);
        assert_eq!(palette.color(7), Rgb565::GREEN);

        let custom = Palette::new(&[Rgb565::BLUE, Rgb565::WHITE]);
        assert_eq!(custom.len(), 2);
        assert_eq!(custom.color(1), Rgb565::WHITE);
        assert_eq!(custom.color(3), Rgb565::WHITE);
    }

    #[test]
    fn test_palette_rejects_extra_levels() {
        let palette = Palette::DEFAULT;
        assert_eq!(palette.check_levels(5), Ok(()));
        assert_eq!(palette.check_levels(3), Ok(()));
        assert!(matches!(
            palette.check_levels(6),
            Err(TrackerError::InvalidConfig(_))
        ));

        let full = Palette::new(&[Rgb565::BLACK; MAX_LEVELS as usize]);
        assert_eq!(full.check_levels(MAX_LEVELS), Ok(()));
    }

}
