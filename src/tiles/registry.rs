use super::{constants::*, types::TileId};
use image::{imageops::FilterType, RgbaImage};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a texture's image bytes come from
#[derive(Debug, Clone)]
pub enum TextureSource {
    /// Image file bundled with the application (read from disk on decode)
    Bundled(PathBuf),
    /// Raw bytes of an uploaded/dropped file
    Bytes { name: String, bytes: Vec<u8> },
}

impl TextureSource {
    /// Human-readable name for logs and the palette
    pub fn name(&self) -> String {
        match self {
            TextureSource::Bundled(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            TextureSource::Bytes { name, .. } => name.clone(),
        }
    }
}

/// Error type for texture registration
#[derive(Debug)]
pub enum TextureError {
    Io(std::io::Error),
    Decode(image::ImageError),
    UnsupportedFormat(String),
    /// Every tile index has already been handed out this session
    IdsExhausted,
}

impl From<std::io::Error> for TextureError {
    fn from(err: std::io::Error) -> Self {
        TextureError::Io(err)
    }
}

impl From<image::ImageError> for TextureError {
    fn from(err: image::ImageError) -> Self {
        TextureError::Decode(err)
    }
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::Io(e) => write!(f, "IO error: {}", e),
            TextureError::Decode(e) => write!(f, "Decode error: {}", e),
            TextureError::UnsupportedFormat(name) => write!(f, "Unsupported image format: {}", name),
            TextureError::IdsExhausted => write!(f, "No tile indices left to assign"),
        }
    }
}

impl std::error::Error for TextureError {}

/// A decoded texture bound to a tile index
#[derive(Debug, Clone)]
pub struct Texture {
    pub id: TileId,
    pub name: String,
    /// Image as decoded, used for palette previews
    pub image: RgbaImage,
    /// Image scaled to CELL_SIZE x CELL_SIZE, used by the rasterizer
    pub tile: RgbaImage,
}

/// A registration whose id is reserved but whose image is not decoded yet
#[derive(Debug, Clone)]
pub struct PendingTexture {
    pub id: TileId,
    pub source: TextureSource,
}

impl PendingTexture {
    /// Decode the image; safe to run off the main thread
    pub fn decode(self) -> Result<Texture, TextureError> {
        let name = self.source.name();
        let image = match self.source {
            TextureSource::Bundled(path) => {
                let bytes = std::fs::read(&path)?;
                decode_bytes(&path, &bytes)?
            }
            TextureSource::Bytes { name, bytes } => decode_bytes(Path::new(&name), &bytes)?,
        };
        let tile = image::imageops::resize(&image, CELL_SIZE, CELL_SIZE, FilterType::Nearest);

        Ok(Texture {
            id: self.id,
            name,
            image,
            tile,
        })
    }
}

fn decode_bytes(path: &Path, bytes: &[u8]) -> Result<RgbaImage, TextureError> {
    // Sniff the content first; fall back to the extension for formats without magic
    let format = match image::guess_format(bytes) {
        Ok(format) => format,
        Err(_) => image::ImageFormat::from_path(path)
            .map_err(|_| TextureError::UnsupportedFormat(path.display().to_string()))?,
    };
    Ok(image::load_from_memory_with_format(bytes, format)?.to_rgba8())
}

/// Check whether a file name has an image extension we can decode
pub fn is_image_file(path: &Path) -> bool {
    image::ImageFormat::from_path(path).is_ok_and(|format| format.reading_enabled())
}

/// Texture registry mapping tile indices to decoded images
/// Ids are handed out sequentially from FIRST_TEXTURE_ID and never reused
#[derive(Debug, Clone)]
pub struct TextureRegistry {
    textures: BTreeMap<TileId, Texture>,
    /// None once TileId::MAX has been handed out
    next_id: Option<TileId>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self {
            textures: BTreeMap::new(),
            next_id: Some(FIRST_TEXTURE_ID),
        }
    }

    /// Reserve the next id for a source
    /// Must run synchronously before decoding starts so concurrent
    /// registrations never share an id
    pub fn begin(&mut self, source: TextureSource) -> Result<PendingTexture, TextureError> {
        let id = self.next_id.ok_or(TextureError::IdsExhausted)?;
        self.next_id = id.checked_add(1);
        Ok(PendingTexture { id, source })
    }

    /// Store a decoded texture under its reserved id
    pub fn complete(&mut self, texture: Texture) -> TileId {
        let id = texture.id;
        self.textures.insert(id, texture);
        id
    }

    pub fn get(&self, id: TileId) -> Option<&Texture> {
        self.textures.get(&id)
    }

    /// Check if a tile index has a bound texture
    pub fn contains(&self, id: TileId) -> bool {
        self.textures.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }
}

impl Default for TextureRegistry {
    fn default() -> Self {
        Self::new()
    }
}
