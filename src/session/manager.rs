use super::persistence::{self, ExportError, PersistError};
use super::store::LocalStore;
use crate::paint::{PaintController, PaintState, PointerEvent};
use crate::render::Surface;
use crate::tiles::{PendingTexture, Texture, TextureError, TextureRegistry, TextureSource, TileGrid, TileId};
use bevy::prelude::*;
use std::path::{Path, PathBuf};

/// Result of a load request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Saved grid matched the current dimensions and replaced the grid
    Loaded,
    /// Saved grid had other dimensions and was cropped/padded to fit
    Fitted { saved_rows: usize, saved_cols: usize },
    /// Nothing has been saved yet; the grid is untouched
    NothingToLoad,
}

/// Editor session resource owning all editing state
#[derive(Resource, Debug)]
pub struct EditorSession {
    pub grid: TileGrid,
    pub textures: TextureRegistry,
    pub controller: PaintController,
    pub surface: Surface,

    /// Bumped on every render so presenters can tell when to re-upload
    revision: u64,
}

impl EditorSession {
    /// Create a session for a viewport of the given pixel size
    pub fn new(width: u32, height: u32) -> Self {
        let mut session = Self {
            grid: TileGrid::from_viewport(width, height),
            textures: TextureRegistry::new(),
            controller: PaintController::new(),
            surface: Surface::new(width, height),
            revision: 0,
        };
        session.render();
        session
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Recreate grid and surface for a new viewport size; painted content is lost
    pub fn resize_viewport(&mut self, width: u32, height: u32) {
        let (rows, cols) = TileGrid::viewport_dimensions(width, height);
        self.grid.resize(rows, cols);
        self.surface.resize(width, height);
        self.render();
    }

    /// Redraw with gridlines
    pub fn render(&mut self) {
        self.render_with(true);
    }

    fn render_with(&mut self, show_gridlines: bool) {
        self.surface.render(&self.grid, &self.textures, show_gridlines);
        self.revision += 1;
    }

    /// Feed a pointer event to the paint controller, redrawing if cells changed
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        let changed = self.controller.handle(event, &mut self.grid);
        if changed {
            self.render();
        }
        changed
    }

    pub fn selection(&self) -> TileId {
        self.controller.selection()
    }

    /// Select a registered texture for painting
    /// Returns false (selection unchanged) if the id has no texture
    pub fn select_texture(&mut self, id: TileId) -> bool {
        if !self.textures.contains(id) {
            return false;
        }
        self.controller.select(id);
        true
    }

    pub fn select_eraser(&mut self) {
        self.controller.select_eraser();
    }

    /// Reserve an id for a texture that will be decoded elsewhere
    pub fn begin_texture(
        &mut self,
        source: TextureSource,
    ) -> Result<PendingTexture, TextureError> {
        self.textures.begin(source)
    }

    /// Store a decoded texture and redraw cells that were waiting for it
    pub fn complete_texture(&mut self, texture: Texture) -> TileId {
        let id = self.textures.complete(texture);
        self.render();
        id
    }

    pub fn save(&self, store: &LocalStore) -> Result<(), PersistError> {
        persistence::save_grid(&self.grid, store)?;
        info!(
            "Saved {}x{} grid to {}",
            self.grid.rows(),
            self.grid.cols(),
            store.entry_path(crate::tiles::SAVE_KEY).display()
        );
        Ok(())
    }

    /// Replace the grid with the saved one
    /// A saved grid with other dimensions is cropped/padded to the current viewport grid
    pub fn load(&mut self, store: &LocalStore) -> Result<LoadOutcome, PersistError> {
        let Some(saved) = persistence::load_grid(store)? else {
            return Ok(LoadOutcome::NothingToLoad);
        };

        let (rows, cols) = (self.grid.rows(), self.grid.cols());
        let outcome = if saved.rows() == rows && saved.cols() == cols {
            self.grid = saved;
            LoadOutcome::Loaded
        } else {
            warn!(
                "Saved grid is {}x{} but viewport grid is {}x{}, fitting",
                saved.rows(),
                saved.cols(),
                rows,
                cols
            );
            self.grid = saved.fit_to(rows, cols);
            LoadOutcome::Fitted {
                saved_rows: saved.rows(),
                saved_cols: saved.cols(),
            }
        };

        self.render();
        Ok(outcome)
    }

    /// Capture the grid without gridlines as PNG bytes
    /// The surface is always left showing gridlines afterwards
    pub fn snapshot_png(&mut self) -> Result<Vec<u8>, ExportError> {
        self.render_with(false);
        let png = self.surface.encode_png();
        self.render_with(true);
        debug_assert!(self.surface.gridlines_shown());
        Ok(png?)
    }

    /// Export the grid as a PNG file in `directory`
    pub fn export<P: AsRef<Path>>(&mut self, directory: P) -> Result<PathBuf, ExportError> {
        let png = self.snapshot_png()?;
        let path = persistence::write_export(&png, directory)?;
        info!("Exported {}x{} image to {}", self.surface.width(), self.surface.height(), path.display());
        Ok(path)
    }

    /// Get statistics about the session
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            painted_cells: self.grid.iter_painted().count(),
            textures: self.textures.len(),
            selection: self.selection(),
            drawing: matches!(self.controller.state(), PaintState::Drawing { .. }),
        }
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// Statistics about the current session
#[derive(Debug, Clone)]
pub struct SessionStats {
    pub rows: usize,
    pub cols: usize,
    pub painted_cells: usize,
    pub textures: usize,
    pub selection: TileId,
    /// A drag stroke is in progress
    pub drawing: bool,
}

impl std::fmt::Display for SessionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Grid: {}x{}, Painted: {}, Textures: {}, Selection: {}, Drawing: {}",
            self.rows, self.cols, self.painted_cells, self.textures, self.selection, self.drawing
        )
    }
}
