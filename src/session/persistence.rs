use super::store::{LocalStore, StoreError};
use crate::tiles::{GridShapeError, TileGrid, TileId, SAVE_KEY, EXPORT_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Saved grid as stored: a JSON array of rows of tile indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedGrid(pub Vec<Vec<TileId>>);

/// Error type for save/load
#[derive(Debug)]
pub enum PersistError {
    Store(StoreError),
    Malformed(String),
}

impl From<StoreError> for PersistError {
    fn from(err: StoreError) -> Self {
        PersistError::Store(err)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(err: serde_json::Error) -> Self {
        PersistError::Malformed(err.to_string())
    }
}

impl From<GridShapeError> for PersistError {
    fn from(err: GridShapeError) -> Self {
        PersistError::Malformed(err.to_string())
    }
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistError::Store(e) => write!(f, "Store error: {}", e),
            PersistError::Malformed(msg) => write!(f, "Malformed saved grid: {}", msg),
        }
    }
}

impl std::error::Error for PersistError {}

/// Error type for PNG export
#[derive(Debug)]
pub enum ExportError {
    Encode(image::ImageError),
    Io(io::Error),
}

impl From<image::ImageError> for ExportError {
    fn from(err: image::ImageError) -> Self {
        ExportError::Encode(err)
    }
}

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Encode(e) => write!(f, "PNG encode error: {}", e),
            ExportError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

/// Save the grid under SAVE_KEY, replacing any earlier save
pub fn save_grid(grid: &TileGrid, store: &LocalStore) -> Result<(), PersistError> {
    let json = serde_json::to_vec(&SavedGrid(grid.to_rows()))?;
    store.put(SAVE_KEY, &json)?;
    Ok(())
}

/// Load the grid saved under SAVE_KEY
/// Returns Ok(None) when nothing has been saved yet
pub fn load_grid(store: &LocalStore) -> Result<Option<TileGrid>, PersistError> {
    let Some(json) = store.get(SAVE_KEY)? else {
        return Ok(None);
    };
    let SavedGrid(rows) = serde_json::from_slice(&json)?;
    Ok(Some(TileGrid::from_rows(rows)?))
}

/// Write PNG bytes to EXPORT_FILE_NAME inside `directory`
pub fn write_export<P: AsRef<Path>>(png: &[u8], directory: P) -> Result<PathBuf, ExportError> {
    let directory = directory.as_ref();
    fs::create_dir_all(directory)?;

    let path = directory.join(EXPORT_FILE_NAME);
    fs::write(&path, png)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::CellPos;
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, LocalStore) {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_save_and_load_grid() {
        let (_dir, store) = setup_store();

        let mut original = TileGrid::new(3, 4);
        original.set(CellPos::new(0, 0), 1);
        original.set(CellPos::new(2, 3), 65535);

        save_grid(&original, &store).expect("Failed to save grid");
        let loaded = load_grid(&store).expect("Failed to load grid");

        assert_eq!(loaded, Some(original));
    }

    #[test]
    fn test_saved_format_is_nested_json_array() {
        let (_dir, store) = setup_store();
        let grid = TileGrid::from_rows(vec![vec![0, 1], vec![2, 0]]).unwrap();

        save_grid(&grid, &store).unwrap();

        let payload = store.get(SAVE_KEY).unwrap().unwrap();
        assert_eq!(payload, b"[[0,1],[2,0]]");
    }

    #[test]
    fn test_load_without_save() {
        let (_dir, store) = setup_store();
        assert_eq!(load_grid(&store).unwrap(), None);
    }

    #[test]
    fn test_load_rejects_malformed() {
        let (_dir, store) = setup_store();

        // Not JSON
        store.put(SAVE_KEY, b"{{{").unwrap();
        assert!(matches!(load_grid(&store), Err(PersistError::Malformed(_))));

        // Ragged rows
        store.put(SAVE_KEY, b"[[1,2],[3]]").unwrap();
        assert!(matches!(load_grid(&store), Err(PersistError::Malformed(_))));

        // Values outside the tile index range
        store.put(SAVE_KEY, b"[[70000]]").unwrap();
        assert!(matches!(load_grid(&store), Err(PersistError::Malformed(_))));
    }

    #[test]
    fn test_write_export() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("exports");

        let path = write_export(b"png bytes", &target).unwrap();

        assert_eq!(path, target.join(EXPORT_FILE_NAME));
        assert_eq!(fs::read(path).unwrap(), b"png bytes");
    }
}
