use bevy::prelude::*;

/// Type alias for tile indices (0 is reserved for the empty cell)
pub type TileId = u16;

/// Cell position in grid coordinates (not pixel coordinates)
///
/// Signed so that pointer positions left of or above the surface map to
/// out-of-bounds cells instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPos {
    pub row: i32,
    pub col: i32,
}

impl CellPos {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Convert a pixel position (origin at the surface's top-left) to a cell position
    pub fn from_pixel(pixel: Vec2, cell_size: u32) -> Self {
        let size = cell_size as f32;
        Self {
            row: (pixel.y / size).floor() as i32,
            col: (pixel.x / size).floor() as i32,
        }
    }

    /// Top-left pixel of this cell on the surface
    pub fn to_pixel(&self, cell_size: u32) -> IVec2 {
        IVec2::new(
            self.col * cell_size as i32,
            self.row * cell_size as i32,
        )
    }

    /// Chebyshev distance (max of row/col differences)
    /// This is the number of steps a line between the two cells takes
    pub fn chebyshev_distance(&self, other: &CellPos) -> i32 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }
}

impl From<(i32, i32)> for CellPos {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pixel() {
        let cell_size = 16;

        // Origin cell
        assert_eq!(CellPos::from_pixel(Vec2::new(0.0, 0.0), cell_size), CellPos::new(0, 0));

        // Truncates within a cell
        assert_eq!(CellPos::from_pixel(Vec2::new(15.9, 15.9), cell_size), CellPos::new(0, 0));

        // x is the column, y is the row
        assert_eq!(CellPos::from_pixel(Vec2::new(40.0, 17.0), cell_size), CellPos::new(1, 2));

        // Negative positions stay negative
        assert_eq!(CellPos::from_pixel(Vec2::new(-1.0, -1.0), cell_size), CellPos::new(-1, -1));
    }

    #[test]
    fn test_to_pixel() {
        assert_eq!(CellPos::new(2, 3).to_pixel(16), IVec2::new(48, 32));
    }

    #[test]
    fn test_chebyshev_distance() {
        let a = CellPos::new(0, 0);
        assert_eq!(a.chebyshev_distance(&CellPos::new(2, 4)), 4);
        assert_eq!(a.chebyshev_distance(&CellPos::new(3, 0)), 3);
        assert_eq!(a.chebyshev_distance(&a), 0);
    }
}
