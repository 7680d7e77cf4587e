//! Pixel ↔ square transforms. Pixels are screen coordinates with the y axis
//! pointing down, matching pointer events.

use std::ops::{Add, Sub};

use crate::Square;

/// Rendered size of one board cell.
pub const CELL_SIZE: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pixel {
    pub x: f32,
    pub y: f32,
}

impl Pixel {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }
}

impl Add for Pixel {
    type Output = Pixel;

    fn add(self, rhs: Pixel) -> Pixel {
        Pixel::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Pixel {
    type Output = Pixel;

    fn sub(self, rhs: Pixel) -> Pixel {
        Pixel::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// `floor((pointer - origin) / cell_size)` per axis. No bounds clamping.
pub fn pixel_to_square(pointer: Pixel, origin: Pixel, cell_size: f32) -> Square {
    let offset = pointer - origin;
    Square::new(
        (offset.x / cell_size).floor() as i32,
        (offset.y / cell_size).floor() as i32,
    )
}

/// Centre of the square's cell.
pub fn square_to_pixel(square: Square, origin: Pixel, cell_size: f32) -> Pixel {
    Pixel::new(
        origin.x + (square.file as f32 + 0.5) * cell_size,
        origin.y + (square.rank as f32 + 0.5) * cell_size,
    )
}

/// Clamps `value` into `[min, max]`. NaN maps to `min`.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() || value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Where the board is drawn on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardRect {
    pub origin: Pixel,
    pub cell_size: f32,
}

impl BoardRect {
    pub const fn new(origin: Pixel, cell_size: f32) -> Self {
        Self { origin, cell_size }
    }

    pub fn size(&self) -> f32 {
        self.cell_size * 8.0
    }

    pub fn square_at(&self, pointer: Pixel) -> Square {
        pixel_to_square(pointer, self.origin, self.cell_size)
    }

    pub fn center_of(&self, square: Square) -> Pixel {
        square_to_pixel(square, self.origin, self.cell_size)
    }

    /// Top-left corner of a square's cell.
    pub fn corner_of(&self, square: Square) -> Pixel {
        self.center_of(square) - Pixel::splat(self.cell_size / 2.0)
    }

    /// Keeps the top-left corner of a cell-sized element within the board,
    /// allowing `margin` of overhang on every side.
    pub fn clamp_element(&self, corner: Pixel, margin: f32) -> Pixel {
        let min = self.origin - Pixel::splat(margin);
        let max = self.origin + Pixel::splat(self.size() - self.cell_size + margin);
        Pixel::new(
            clamp(corner.x, min.x, max.x),
            clamp(corner.y, min.y, max.y),
        )
    }
}

impl Default for BoardRect {
    fn default() -> Self {
        Self::new(Pixel::default(), CELL_SIZE)
    }
}
