use crate::tiles::{TextureRegistry, TileGrid, CELL_SIZE, CLEAR_COLOR, GRIDLINE_COLOR};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// RGBA drawing surface the grid is rasterized onto
/// Pixel dimensions follow the viewport, not the grid
#[derive(Debug, Clone)]
pub struct Surface {
    image: RgbaImage,
    gridlines_shown: bool,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(CLEAR_COLOR)),
            gridlines_shown: false,
        }
    }

    /// Reallocate to a new viewport size (content is cleared)
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Whether the last render drew the gridline overlay
    pub fn gridlines_shown(&self) -> bool {
        self.gridlines_shown
    }

    /// Redraw the whole surface from the grid
    /// Cells whose tile index has no texture yet are left clear
    pub fn render(&mut self, grid: &TileGrid, textures: &TextureRegistry, show_gridlines: bool) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba(CLEAR_COLOR);
        }

        for (pos, tile_id) in grid.iter_painted() {
            let Some(texture) = textures.get(tile_id) else {
                continue;
            };
            let origin = pos.to_pixel(CELL_SIZE);
            image::imageops::overlay(
                &mut self.image,
                &texture.tile,
                origin.x as i64,
                origin.y as i64,
            );
        }

        if show_gridlines {
            self.draw_gridlines(grid.rows(), grid.cols());
        }
        self.gridlines_shown = show_gridlines;
    }

    /// Encode the current surface as PNG bytes
    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    fn draw_gridlines(&mut self, rows: usize, cols: usize) {
        let (width, height) = self.image.dimensions();
        let color = Rgba(GRIDLINE_COLOR);

        // Horizontal lines span the full surface width
        for i in 0..=rows as u32 {
            let y = i * CELL_SIZE;
            if y >= height {
                break;
            }
            for x in 0..width {
                self.image.put_pixel(x, y, color);
            }
        }

        // Vertical lines span the full surface height
        for j in 0..=cols as u32 {
            let x = j * CELL_SIZE;
            if x >= width {
                break;
            }
            for y in 0..height {
                self.image.put_pixel(x, y, color);
            }
        }
    }
}
