//! Grid of colored cells, one per tracked hour.
//!
//! Hours run top to bottom, then left to right: with the default 16-hour
//! window and 8 rows, 06:00-13:00 fill the first column and 14:00-21:00 the
//! second. Cells are square, sized from the height of the target rectangle.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use heapless::Vec;

use crate::intensity::Palette;
use crate::storage::BUCKET_COUNT;

/// Number of rows before wrapping into a new column
pub const GRID_ROWS: u32 = 8;

pub struct StepGrid {
    bounds: Rectangle,
    palette: Palette,
    levels: Vec<u8, BUCKET_COUNT>,
}

impl StepGrid {
    pub fn new(bounds: Rectangle, palette: Palette) -> Self {
        Self {
            bounds,
            palette,
            levels: Vec::new(),
        }
    }

    /// Replace the levels shown, in window order. Entries past 24 are dropped.
    pub fn set_levels<I: IntoIterator<Item = u8>>(&mut self, levels: I) {
        self.levels.clear();
        for level in levels {
            if self.levels.push(level).is_err() {
                break;
            }
        }
    }

    /// Edge length of one cell in pixels.
    pub fn cell_size(&self) -> u32 {
        self.bounds.size.height / GRID_ROWS
    }

    /// Columns needed for the levels currently set.
    pub fn columns(&self) -> u32 {
        (self.levels.len() as u32).div_ceil(GRID_ROWS)
    }

    /// Pixel width actually covered by the cells.
    pub fn used_width(&self) -> u32 {
        self.columns() * self.cell_size()
    }

    /// Screen rectangle for the `index`-th hour of the window.
    pub fn cell_bounds(&self, index: usize) -> Rectangle {
        let cell = self.cell_size();
        let col = index as u32 / GRID_ROWS;
        let row = index as u32 % GRID_ROWS;
        Rectangle::new(
            self.bounds.top_left + Point::new((col * cell) as i32, (row * cell) as i32),
            Size::new(cell, cell),
        )
    }

    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }
}

impl Drawable for StepGrid {
    type Color = Rgb565;
    type Output = ();

    fn draw<D>(&self, target: &mut D) -> Result<Self::Output, D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        for (index, &level) in self.levels.iter().enumerate() {
            self.cell_bounds(index)
                .into_styled(PrimitiveStyle::with_fill(self.palette.color(level)))
                .draw(target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    fn grid() -> StepGrid {
        StepGrid::new(
            Rectangle::new(Point::new(1, 1), Size::new(40, 16)),
            Palette::DEFAULT,
        )
    }

    #[test]
    fn test_cell_layout() {
        let grid = grid();
        assert_eq!(grid.cell_size(), 2);
        assert_eq!(grid.cell_bounds(0).top_left, Point::new(1, 1));
        assert_eq!(grid.cell_bounds(7).top_left, Point::new(1, 15));
        assert_eq!(grid.cell_bounds(8).top_left, Point::new(3, 1));
        assert_eq!(grid.cell_bounds(15).top_left, Point::new(3, 15));
    }

    #[test]
    fn test_draws_level_colors() {
        let mut grid = grid();
        grid.set_levels([0, 4, 2, 0, 0, 0, 0, 0, 1, 3]);

        let mut display: MockDisplay<Rgb565> = MockDisplay::new();
        grid.draw(&mut display).unwrap();

        let palette = Palette::DEFAULT;
        assert_eq!(display.get_pixel(Point::new(1, 1)), Some(palette.color(0)));
        assert_eq!(display.get_pixel(Point::new(2, 4)), Some(palette.color(4)));
        assert_eq!(display.get_pixel(Point::new(1, 5)), Some(palette.color(2)));
        assert_eq!(display.get_pixel(Point::new(3, 1)), Some(palette.color(1)));
        assert_eq!(display.get_pixel(Point::new(4, 3)), Some(palette.color(3)));
        // Nothing beyond the supplied levels
        assert_eq!(display.get_pixel(Point::new(3, 5)), None);
        assert_eq!(display.get_pixel(Point::new(0, 0)), None);
    }

    #[test]
    fn test_columns_follow_window_length() {
        let mut grid = grid();
        assert_eq!(grid.columns(), 0);

        grid.set_levels([0; 16]);
        assert_eq!(grid.columns(), 2);
        assert_eq!(grid.used_width(), 4);

        grid.set_levels([0; 17]);
        assert_eq!(grid.columns(), 3);

        grid.set_levels([0; BUCKET_COUNT]);
        assert_eq!(grid.columns(), 3);
        assert_eq!(grid.used_width(), 6);
        let last = grid.cell_bounds(BUCKET_COUNT - 1);
        assert_eq!(last.top_left.x + last.size.width as i32, 1 + 6);
    }

    #[test]
    fn test_set_levels_caps_at_bucket_count() {
        let mut grid = grid();
        grid.set_levels(core::iter::repeat(1).take(40));
        assert_eq!(grid.levels.len(), BUCKET_COUNT);
    }
}
