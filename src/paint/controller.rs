use super::line::line_cells;
use crate::tiles::{CellPos, TileGrid, TileId, CELL_SIZE, DEFAULT_SELECTION, TILE_EMPTY};
use bevy::prelude::*;

/// Pointer input, independent of any windowing system
/// Positions are in pixels relative to the surface's top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press(Vec2),
    Move(Vec2),
    Release,
    /// Pointer left the surface
    Leave,
    /// Discrete click (press and release without a drag)
    Click(Vec2),
}

/// Drag state of the paint controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintState {
    #[default]
    Idle,
    Drawing { last: CellPos },
}

/// Turns pointer events into grid writes using the current selection
#[derive(Debug, Clone)]
pub struct PaintController {
    state: PaintState,
    selection: TileId,
    cell_size: u32,
}

impl PaintController {
    pub fn new() -> Self {
        Self::with_cell_size(CELL_SIZE)
    }

    pub fn with_cell_size(cell_size: u32) -> Self {
        Self {
            state: PaintState::Idle,
            selection: DEFAULT_SELECTION,
            cell_size,
        }
    }

    pub fn state(&self) -> PaintState {
        self.state
    }

    /// Tile index the next paint writes (TILE_EMPTY erases)
    pub fn selection(&self) -> TileId {
        self.selection
    }

    pub fn is_eraser(&self) -> bool {
        self.selection == TILE_EMPTY
    }

    pub fn select(&mut self, tile_id: TileId) {
        self.selection = tile_id;
    }

    pub fn select_eraser(&mut self) {
        self.selection = TILE_EMPTY;
    }

    /// Apply one pointer event to the grid
    /// Returns true when any cell was written (the surface needs a redraw)
    pub fn handle(&mut self, event: PointerEvent, grid: &mut TileGrid) -> bool {
        match (self.state, event) {
            (_, PointerEvent::Click(pixel)) => {
                let cell = self.cell_at(pixel);
                grid.set(cell, self.selection)
            }
            (PaintState::Idle, PointerEvent::Press(pixel)) => {
                let cell = self.cell_at(pixel);
                if !grid.contains(cell) {
                    return false;
                }
                grid.set(cell, self.selection);
                self.state = PaintState::Drawing { last: cell };
                true
            }
            (PaintState::Drawing { last }, PointerEvent::Move(pixel)) => {
                let cell = self.cell_at(pixel);
                if cell == last || !grid.contains(cell) {
                    return false;
                }
                for step in line_cells(last, cell) {
                    grid.set(step, self.selection);
                }
                self.state = PaintState::Drawing { last: cell };
                true
            }
            (PaintState::Drawing { .. }, PointerEvent::Press(pixel)) => {
                // Missed release (e.g. button released outside the window); restart the stroke
                self.state = PaintState::Idle;
                self.handle(PointerEvent::Press(pixel), grid)
            }
            (_, PointerEvent::Release | PointerEvent::Leave) => {
                self.state = PaintState::Idle;
                false
            }
            (PaintState::Idle, PointerEvent::Move(_)) => false,
        }
    }

    fn cell_at(&self, pixel: Vec2) -> CellPos {
        CellPos::from_pixel(pixel, self.cell_size)
    }
}

impl Default for PaintController {
    fn default() -> Self {
        Self::new()
    }
}
