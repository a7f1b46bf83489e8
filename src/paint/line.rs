use crate::tiles::CellPos;

/// Cells on a straight line from `start` to `end`, both ends included
///
/// Steps once per cell along the dominant axis and rounds the minor axis,
/// so consecutive cells always touch (no gaps in a drag stroke).
pub fn line_cells(start: CellPos, end: CellPos) -> Vec<CellPos> {
    let d_col = (end.col - start.col) as f64;
    let d_row = (end.row - start.row) as f64;
    let steps = start.chebyshev_distance(&end);

    let mut cells = Vec::with_capacity(steps as usize + 1);
    for i in 0..=steps {
        let t = if steps == 0 { 0.0 } else { i as f64 / steps as f64 };
        // f64::round rounds half away from zero on both axes
        let col = (start.col as f64 + t * d_col).round() as i32;
        let row = (start.row as f64 + t * d_row).round() as i32;
        cells.push(CellPos::new(row, col));
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(points: &[(i32, i32)]) -> Vec<CellPos> {
        points.iter().copied().map(CellPos::from).collect()
    }

    #[test]
    fn test_vertical_line() {
        let line = line_cells(CellPos::new(0, 0), CellPos::new(3, 0));
        assert_eq!(line, cells(&[(0, 0), (1, 0), (2, 0), (3, 0)]));
    }

    #[test]
    fn test_single_cell() {
        let line = line_cells(CellPos::new(0, 0), CellPos::new(0, 0));
        assert_eq!(line, cells(&[(0, 0)]));
    }

    #[test]
    fn test_shallow_diagonal() {
        let line = line_cells(CellPos::new(0, 0), CellPos::new(2, 4));

        assert_eq!(line.len(), 5);
        assert_eq!(line.first(), Some(&CellPos::new(0, 0)));
        assert_eq!(line.last(), Some(&CellPos::new(2, 4)));

        for pair in line.windows(2) {
            assert!(pair[1].row >= pair[0].row);
            assert!(pair[1].col >= pair[0].col);
        }
    }

    #[test]
    fn test_no_gaps_and_no_duplicates() {
        let start = CellPos::new(7, -3);
        let end = CellPos::new(-5, 12);
        let line = line_cells(start, end);

        assert_eq!(line.len(), 16); // max(12, 15) + 1
        assert_eq!(line.first(), Some(&start));
        assert_eq!(line.last(), Some(&end));

        for pair in line.windows(2) {
            // Each step moves to an adjacent (8-connected) cell
            assert_eq!(pair[0].chebyshev_distance(&pair[1]), 1);
        }
    }

    #[test]
    fn test_reverse_direction() {
        let line = line_cells(CellPos::new(0, 5), CellPos::new(0, 2));
        assert_eq!(line, cells(&[(0, 5), (0, 4), (0, 3), (0, 2)]));
    }

    #[test]
    fn test_perfect_diagonal() {
        let line = line_cells(CellPos::new(1, 1), CellPos::new(4, 4));
        assert_eq!(line, cells(&[(1, 1), (2, 2), (3, 3), (4, 4)]));
    }
}
