/// Pixel size of each grid cell (cells are square)
pub const CELL_SIZE: u32 = 16;

// Tile index constants
/// Empty cell / eraser selection
pub const TILE_EMPTY: u16 = 0;

/// First identifier handed out by the texture registry
pub const FIRST_TEXTURE_ID: u16 = 1;

/// Selection active when a session starts (the first texture slot)
pub const DEFAULT_SELECTION: u16 = FIRST_TEXTURE_ID;

// Gridline overlay
/// Gridline colour (#cccccc, opaque)
pub const GRIDLINE_COLOR: [u8; 4] = [0xcc, 0xcc, 0xcc, 0xff];

/// Cleared surface colour (fully transparent)
pub const CLEAR_COLOR: [u8; 4] = [0, 0, 0, 0];

// Persistence
/// Store key the grid is saved under
pub const SAVE_KEY: &str = "pixelArtGame";

/// File name used for PNG exports
pub const EXPORT_FILE_NAME: &str = "pixel_art.png";
