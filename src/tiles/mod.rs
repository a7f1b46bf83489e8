pub mod constants;
pub mod grid;
pub mod registry;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use grid::{GridShapeError, TileGrid};
pub use registry::{PendingTexture, Texture, TextureError, TextureRegistry, TextureSource};
pub use types::{CellPos, TileId};
