//! Grid line of sight.

use officelife_types::Cell;

use crate::nav_grid::NavGrid;

/// Cells on the Bresenham line between two cells, both ends included.
#[derive(Debug, Clone)]
pub struct BresenhamLine {
    current: Cell,
    end: Cell,
    dx: i32,
    dy: i32,
    step_x: i32,
    step_y: i32,
    error: i32,
    done: bool,
}

impl BresenhamLine {
    /// Start a line from `start` to `end`.
    pub fn new(start: Cell, end: Cell) -> Self {
        let dx = end.col.saturating_sub(start.col).saturating_abs();
        let dy = end.row.saturating_sub(start.row).saturating_abs();
        Self {
            current: start,
            end,
            dx,
            dy,
            step_x: if start.col < end.col { 1 } else { -1 },
            step_y: if start.row < end.row { 1 } else { -1 },
            error: dx.saturating_sub(dy),
            done: false,
        }
    }
}

impl Iterator for BresenhamLine {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        if self.done {
            return None;
        }
        let cell = self.current;
        if cell == self.end {
            self.done = true;
            return Some(cell);
        }
        let doubled = self.error.saturating_mul(2);
        if doubled > self.dy.saturating_neg() {
            self.error = self.error.saturating_sub(self.dy);
            self.current.col = self.current.col.saturating_add(self.step_x);
        }
        if doubled < self.dx {
            self.error = self.error.saturating_add(self.dx);
            self.current.row = self.current.row.saturating_add(self.step_y);
        }
        Some(cell)
    }
}

/// Whether `start` can see `end` across the grid.
///
/// Every cell on the line except `end` must be walkable, so a character
/// standing next to a wall can still see the wall itself but nothing
/// behind it. Off-grid cells count as blocked.
pub fn has_line_of_sight(grid: &NavGrid, start: Cell, end: Cell) -> bool {
    BresenhamLine::new(start, end)
        .take_while(|&cell| cell != end)
        .all(|cell| grid.is_walkable(cell))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_includes_both_ends() {
        let cells: Vec<Cell> = BresenhamLine::new(Cell::new(0, 0), Cell::new(3, 0)).collect();
        assert_eq!(
            cells,
            vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(2, 0), Cell::new(3, 0)]
        );
    }

    #[test]
    fn diagonal_line() {
        let cells: Vec<Cell> = BresenhamLine::new(Cell::new(2, 2), Cell::new(0, 0)).collect();
        assert_eq!(cells, vec![Cell::new(2, 2), Cell::new(1, 1), Cell::new(0, 0)]);
    }

    #[test]
    fn single_cell_line() {
        let cells: Vec<Cell> = BresenhamLine::new(Cell::new(4, 1), Cell::new(4, 1)).collect();
        assert_eq!(cells, vec![Cell::new(4, 1)]);
    }

    #[test]
    fn steep_line_visits_every_row() {
        let cells: Vec<Cell> = BresenhamLine::new(Cell::new(0, 0), Cell::new(1, 4)).collect();
        assert_eq!(cells.len(), 5);
        for (row, cell) in (0..).zip(&cells) {
            assert_eq!(cell.row, row);
        }
    }

    #[test]
    fn wall_between_blocks_sight() {
        let mut grid = NavGrid::new(6, 3, 48);
        grid.set_blocked(Cell::new(3, 1), true);
        assert!(!has_line_of_sight(&grid, Cell::new(0, 1), Cell::new(5, 1)));
        assert!(has_line_of_sight(&grid, Cell::new(0, 0), Cell::new(5, 0)));
    }

    #[test]
    fn blocked_target_is_still_visible() {
        let mut grid = NavGrid::new(4, 1, 48);
        grid.set_blocked(Cell::new(3, 0), true);
        assert!(has_line_of_sight(&grid, Cell::new(0, 0), Cell::new(3, 0)));
    }

    #[test]
    fn off_grid_observer_sees_nothing() {
        let grid = NavGrid::new(4, 4, 48);
        assert!(!has_line_of_sight(&grid, Cell::new(-1, 0), Cell::new(2, 0)));
    }
}
