use super::{constants::*, types::*};

/// Error returned when a set of rows does not form a valid grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridShapeError {
    /// Row `row` has `found` cells while the first row has `expected`
    RaggedRow { row: usize, expected: usize, found: usize },
}

impl std::fmt::Display for GridShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridShapeError::RaggedRow { row, expected, found } => write!(
                f,
                "row {} has {} cells, expected {}",
                row, found, expected
            ),
        }
    }
}

impl std::error::Error for GridShapeError {}

/// Tile grid storage
/// Cells are stored row-major; every row has exactly `cols` cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    rows: usize,
    cols: usize,
    cells: Vec<TileId>,
}

impl TileGrid {
    /// Create an empty grid (all cells TILE_EMPTY)
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![TILE_EMPTY; rows * cols],
        }
    }

    /// Create an empty grid covering a viewport of the given pixel size
    /// Partial cells at the right and bottom edges are dropped
    pub fn from_viewport(width: u32, height: u32) -> Self {
        let (rows, cols) = Self::viewport_dimensions(width, height);
        Self::new(rows, cols)
    }

    /// Rows and columns of whole cells fitting in a viewport
    pub fn viewport_dimensions(width: u32, height: u32) -> (usize, usize) {
        ((height / CELL_SIZE) as usize, (width / CELL_SIZE) as usize)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Reallocate the grid; all previous content is discarded
    pub fn resize(&mut self, rows: usize, cols: usize) {
        *self = Self::new(rows, cols);
    }

    /// Check if a cell position lies inside the grid
    pub fn contains(&self, pos: CellPos) -> bool {
        self.index(pos).is_some()
    }

    /// Get tile at a cell; out-of-bounds cells read as TILE_EMPTY
    pub fn get(&self, pos: CellPos) -> TileId {
        self.index(pos).map_or(TILE_EMPTY, |i| self.cells[i])
    }

    /// Set tile at a cell; out-of-bounds writes are ignored
    /// Returns whether a cell was written
    pub fn set(&mut self, pos: CellPos, tile_id: TileId) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = tile_id;
                true
            }
            None => false,
        }
    }

    /// Iterate over all non-empty cells in row-major order
    pub fn iter_painted(&self) -> impl Iterator<Item = (CellPos, TileId)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &tile_id)| tile_id != TILE_EMPTY)
            .map(move |(i, &tile_id)| {
                (CellPos::new((i / cols) as i32, (i % cols) as i32), tile_id)
            })
    }

    /// Copy the grid out as nested rows
    pub fn to_rows(&self) -> Vec<Vec<TileId>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.cells.chunks(self.cols).map(|row| row.to_vec()).collect()
    }

    /// Build a grid from nested rows; all rows must have the same length
    pub fn from_rows(rows: Vec<Vec<TileId>>) -> Result<Self, GridShapeError> {
        let expected = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(rows.len() * expected);

        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(GridShapeError::RaggedRow {
                    row: row_index,
                    expected,
                    found: row.len(),
                });
            }
            cells.extend_from_slice(row);
        }

        Ok(Self {
            rows: rows.len(),
            cols: expected,
            cells,
        })
    }

    /// Crop or pad (with TILE_EMPTY) to the given dimensions, keeping the
    /// top-left overlap
    pub fn fit_to(&self, rows: usize, cols: usize) -> Self {
        let mut fitted = Self::new(rows, cols);
        for row in 0..rows.min(self.rows) {
            for col in 0..cols.min(self.cols) {
                let pos = CellPos::new(row as i32, col as i32);
                fitted.set(pos, self.get(pos));
            }
        }
        fitted
    }

    fn index(&self, pos: CellPos) -> Option<usize> {
        if pos.row < 0 || pos.col < 0 {
            return None;
        }
        let (row, col) = (pos.row as usize, pos.col as usize);
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(row * self.cols + col)
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
