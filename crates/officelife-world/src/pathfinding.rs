//! A* search over the navigation grid.
//!
//! Four-directional movement with unit step cost and a Manhattan heuristic.
//! Search nodes live in a flat arena indexed by position in a `Vec`; the
//! open set is a binary heap of arena indices and the closed set is a
//! per-cell bitmap. Among entries with equal f-score the one pushed first
//! is expanded first, so results are reproducible for a given grid.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use officelife_types::{Cell, Vec2};
use tracing::{debug, warn};

use crate::nav_grid::NavGrid;

/// One explored cell.
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    cell: Cell,
    /// Steps from the start.
    g: u32,
    /// Arena index of the node we came from.
    parent: Option<usize>,
}

/// A heap entry. Ordered so that `BinaryHeap` pops the lowest f-score,
/// breaking ties by insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f: u32,
    seq: u64,
    node: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a shortest 4-directional path from `start` to `goal`.
///
/// The returned cells exclude `start`, include `goal`, and are in walking
/// order; an empty path means `start == goal`. Returns `None` when either
/// end is off-grid, when the goal is blocked (without searching), or when
/// the open set runs dry. The start cell itself is not required to be
/// walkable; callers that care reject it first.
pub fn find_path(grid: &NavGrid, start: Cell, goal: Cell) -> Option<Vec<Cell>> {
    let (Some(start_index), Some(_)) = (grid.index(start), grid.index(goal)) else {
        debug!(%start, %goal, "path endpoint outside the grid");
        return None;
    };
    if grid.is_blocked(goal) {
        warn!(%start, %goal, "path goal is blocked; not searching");
        return None;
    }
    if start == goal {
        return Some(Vec::new());
    }

    let cells = grid.cell_count();
    let mut arena: Vec<SearchNode> = Vec::new();
    // Grid index -> arena index of the node for that cell.
    let mut node_at: Vec<Option<usize>> = vec![None; cells];
    let mut closed = vec![false; cells];
    let mut open = BinaryHeap::new();
    let mut seq: u64 = 0;

    arena.push(SearchNode {
        cell: start,
        g: 0,
        parent: None,
    });
    if let Some(slot) = node_at.get_mut(start_index) {
        *slot = Some(0);
    }
    open.push(OpenEntry {
        f: start.manhattan(goal),
        seq,
        node: 0,
    });

    while let Some(entry) = open.pop() {
        let Some(&current) = arena.get(entry.node) else {
            continue;
        };
        let Some(current_index) = grid.index(current.cell) else {
            continue;
        };
        if closed.get(current_index).copied().unwrap_or(true) {
            // Stale entry superseded by a cheaper one.
            continue;
        }
        if current.cell == goal {
            let path = reconstruct(&arena, entry.node);
            debug!(%start, %goal, steps = path.len(), explored = arena.len(), "path found");
            return Some(path);
        }
        if let Some(flag) = closed.get_mut(current_index) {
            *flag = true;
        }

        let tentative_g = current.g.saturating_add(1);
        for neighbor in current.cell.neighbors() {
            let Some(neighbor_index) = grid.index(neighbor) else {
                continue;
            };
            if grid.is_blocked(neighbor) || closed.get(neighbor_index).copied().unwrap_or(true) {
                continue;
            }

            let known = node_at.get(neighbor_index).copied().flatten();
            let node = match known {
                Some(existing) => {
                    let Some(n) = arena.get_mut(existing) else {
                        continue;
                    };
                    if tentative_g >= n.g {
                        continue;
                    }
                    n.g = tentative_g;
                    n.parent = Some(entry.node);
                    existing
                }
                None => {
                    let index = arena.len();
                    arena.push(SearchNode {
                        cell: neighbor,
                        g: tentative_g,
                        parent: Some(entry.node),
                    });
                    if let Some(slot) = node_at.get_mut(neighbor_index) {
                        *slot = Some(index);
                    }
                    index
                }
            };

            seq = seq.saturating_add(1);
            open.push(OpenEntry {
                f: tentative_g.saturating_add(neighbor.manhattan(goal)),
                seq,
                node,
            });
        }
    }

    debug!(%start, %goal, explored = arena.len(), "no path");
    None
}

/// Walk parent links back from `end`, dropping the start node.
fn reconstruct(arena: &[SearchNode], end: usize) -> Vec<Cell> {
    let mut path = Vec::new();
    let mut cursor = Some(end);
    while let Some(index) = cursor {
        let Some(node) = arena.get(index) else {
            break;
        };
        if node.parent.is_none() {
            break;
        }
        path.push(node.cell);
        cursor = node.parent;
    }
    path.reverse();
    path
}

/// Plan a world-space route between two positions.
///
/// Both positions are snapped to their cells. The route is rejected
/// (`None`) when either cell is off-grid, when the start cell is blocked,
/// or when no path exists. Waypoints are cell centres; a route within a
/// single cell is just that cell's centre.
pub fn plan_route(grid: &NavGrid, from: Vec2, to: Vec2) -> Option<Vec<Vec2>> {
    let start = grid.world_to_cell(from);
    let goal = grid.world_to_cell(to);
    if !grid.in_bounds(start) || !grid.in_bounds(goal) {
        debug!(%start, %goal, "route endpoint outside the grid");
        return None;
    }
    if grid.is_blocked(start) {
        debug!(%start, "route starts on a blocked cell");
        return None;
    }
    let cells = find_path(grid, start, goal)?;
    if cells.is_empty() {
        return Some(vec![grid.cell_center(goal)]);
    }
    Some(cells.into_iter().map(|c| grid.cell_center(c)).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Build a grid from ASCII art: `#` blocked, anything else walkable.
    fn grid_from(rows: &[&str]) -> NavGrid {
        let height = u32::try_from(rows.len()).unwrap();
        let width = u32::try_from(rows[0].len()).unwrap();
        let mut grid = NavGrid::new(width, height, 48);
        for (r, line) in rows.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                if ch == '#' {
                    grid.set_blocked(
                        Cell::new(i32::try_from(c).unwrap(), i32::try_from(r).unwrap()),
                        true,
                    );
                }
            }
        }
        grid
    }

    fn assert_valid(grid: &NavGrid, start: Cell, path: &[Cell]) {
        let mut previous = start;
        for &cell in path {
            assert!(previous.is_adjacent(cell), "{previous} -> {cell} is not one step");
            assert!(grid.is_walkable(cell), "{cell} is blocked");
            previous = cell;
        }
    }

    #[test]
    fn straight_line() {
        let grid = grid_from(&[".....", ".....", "....."]);
        let path = find_path(&grid, Cell::new(0, 1), Cell::new(4, 1)).unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path.last(), Some(&Cell::new(4, 1)));
        assert!(!path.contains(&Cell::new(0, 1)));
    }

    #[test]
    fn routes_around_a_wall() {
        let grid = grid_from(&[
            ".....",
            ".###.",
            ".#...",
            ".#.#.",
            "...#.",
        ]);
        let start = Cell::new(2, 2);
        let goal = Cell::new(0, 0);
        let path = find_path(&grid, start, goal).unwrap();
        assert_valid(&grid, start, &path);
        assert_eq!(path.len(), 8);
    }

    #[test]
    fn same_cell_is_an_empty_path() {
        let grid = grid_from(&["..."]);
        assert_eq!(find_path(&grid, Cell::new(1, 0), Cell::new(1, 0)), Some(Vec::new()));
    }

    #[test]
    fn blocked_goal_short_circuits() {
        let grid = grid_from(&["..#"]);
        assert_eq!(find_path(&grid, Cell::new(0, 0), Cell::new(2, 0)), None);
    }

    #[test]
    fn enclosed_goal_is_unreachable() {
        let grid = grid_from(&[
            ".....",
            "..#..",
            ".#.#.",
            "..#..",
        ]);
        assert_eq!(find_path(&grid, Cell::new(0, 0), Cell::new(2, 2)), None);
    }

    #[test]
    fn off_grid_endpoints_are_rejected() {
        let grid = grid_from(&["..."]);
        assert_eq!(find_path(&grid, Cell::new(-1, 0), Cell::new(2, 0)), None);
        assert_eq!(find_path(&grid, Cell::new(0, 0), Cell::new(3, 0)), None);
    }

    #[test]
    fn repeated_searches_agree() {
        let grid = grid_from(&[
            "........",
            "..##....",
            "...#.##.",
            ".#......",
        ]);
        let start = Cell::new(0, 0);
        let goal = Cell::new(7, 3);
        let first = find_path(&grid, start, goal).unwrap();
        for _ in 0..5 {
            let again = find_path(&grid, start, goal).unwrap();
            assert_eq!(again.len(), first.len());
            assert_eq!(again, first);
        }
        assert_eq!(u32::try_from(first.len()).unwrap(), start.manhattan(goal));
    }

    #[test]
    fn route_waypoints_are_cell_centres() {
        let grid = grid_from(&["....", "...."]);
        let route = plan_route(&grid, Vec2::new(5.0, 5.0), Vec2::new(150.0, 60.0)).unwrap();
        assert_eq!(route.len(), 4);
        assert_eq!(route.last(), Some(&Vec2::new(168.0, 72.0)));
    }

    #[test]
    fn route_within_one_cell_walks_to_its_centre() {
        let grid = grid_from(&["..."]);
        let route = plan_route(&grid, Vec2::new(50.0, 5.0), Vec2::new(60.0, 40.0)).unwrap();
        assert_eq!(route, vec![Vec2::new(72.0, 24.0)]);
    }

    #[test]
    fn route_from_blocked_start_is_rejected() {
        let grid = grid_from(&["#.."]);
        assert_eq!(plan_route(&grid, Vec2::new(10.0, 10.0), Vec2::new(120.0, 10.0)), None);
    }
}
