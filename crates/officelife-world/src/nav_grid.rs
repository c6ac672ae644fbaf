//! Walkability grid derived from a tile map.
//!
//! One cell per tile. A cell is blocked when a collision tile layer has a
//! non-empty tile there, or when an obstacle object's bounding box overlaps
//! it. After the geometry pass every spawn position is forced walkable so
//! no character starts inside a wall.
//!
//! Queries outside the grid are answered as blocked, which keeps
//! pathfinding and line of sight total over all integer coordinates.

use officelife_types::{Cell, Vec2};
use tracing::{debug, info, warn};

use crate::tilemap::{Chunk, MapObject, TileLayer, TileMap, decode_tile_id};

/// Tile size used when a map does not declare a usable one.
pub const DEFAULT_TILE_SIZE: f32 = 48.0;

/// Object types that always block movement.
pub const OBSTACLE_TYPES: [&str; 7] = [
    "desk",
    "chair",
    "storage",
    "office_equipment",
    "food_and_drink",
    "room",
    "misc",
];

/// Whether an object should be rasterized into the grid as an obstacle.
pub fn is_obstacle(object: &MapObject) -> bool {
    object.collides()
        || OBSTACLE_TYPES
            .iter()
            .any(|t| object.kind.eq_ignore_ascii_case(t))
}

/// Boolean walkability matrix over map tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavGrid {
    width: u32,
    height: u32,
    tile_size: u32,
    /// Row-major; `true` means blocked.
    blocked: Vec<bool>,
}

impl NavGrid {
    /// Create a fully walkable grid.
    ///
    /// A `tile_size` of zero falls back to [`DEFAULT_TILE_SIZE`].
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        let tile_size = if tile_size == 0 {
            warn!("tile size of 0 requested, using default");
            default_tile_size()
        } else {
            tile_size
        };
        let len = usize::try_from(u64::from(width).saturating_mul(u64::from(height))).unwrap_or(0);
        Self {
            width,
            height,
            tile_size,
            blocked: vec![false; len],
        }
    }

    /// Derive the grid from a map, then clear every spawn cell.
    ///
    /// Malformed layers and objects are skipped with a warning; the result
    /// is always a usable best-effort grid.
    pub fn build(map: &TileMap, spawns: &[Vec2]) -> Self {
        let mut grid = Self::new(map.width, map.height, map.tile_width);
        if map.tile_width != map.tile_height {
            warn!(
                tile_width = map.tile_width,
                tile_height = map.tile_height,
                "non-square tiles; using tile width for both axes"
            );
        }

        for layer in map.tile_layers().filter(|l| l.collides()) {
            grid.mark_tile_layer(layer, map.width);
        }

        let mut obstacles = 0_usize;
        for object in map.objects().filter(|o| is_obstacle(o)) {
            if !(object.x.is_finite()
                && object.y.is_finite()
                && object.width.is_finite()
                && object.height.is_finite())
            {
                warn!(object_id = object.id, name = object.name, "skipping object with non-finite bounds");
                continue;
            }
            grid.block_rect(object.x, object.y, object.width, object.height);
            obstacles = obstacles.saturating_add(1);
        }

        for &spawn in spawns {
            grid.ensure_walkable(spawn);
        }

        info!(
            width = grid.width,
            height = grid.height,
            tile_size = grid.tile_size,
            obstacles,
            blocked_cells = grid.blocked_count(),
            "navigation grid built"
        );
        grid
    }

    /// Width in cells.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Side length of a cell in world units.
    #[allow(clippy::cast_precision_loss)]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size as f32
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.blocked.len()
    }

    /// Row-major storage index for an in-bounds cell.
    pub fn index(&self, cell: Cell) -> Option<usize> {
        let col = u32::try_from(cell.col).ok().filter(|&c| c < self.width)?;
        let row = u32::try_from(cell.row).ok().filter(|&r| r < self.height)?;
        let flat = u64::from(row)
            .saturating_mul(u64::from(self.width))
            .saturating_add(u64::from(col));
        usize::try_from(flat).ok()
    }

    /// Whether the cell lies inside the grid.
    pub fn in_bounds(&self, cell: Cell) -> bool {
        self.index(cell).is_some()
    }

    /// Whether the cell is blocked. Off-grid cells are blocked.
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.index(cell)
            .and_then(|i| self.blocked.get(i).copied())
            .unwrap_or(true)
    }

    /// Whether the cell is inside the grid and not blocked.
    pub fn is_walkable(&self, cell: Cell) -> bool {
        !self.is_blocked(cell)
    }

    /// Whether the cell under a world position is walkable.
    pub fn is_walkable_at(&self, position: Vec2) -> bool {
        self.is_walkable(self.world_to_cell(position))
    }

    /// Set a cell's blocked flag. Returns `false` for off-grid cells.
    pub fn set_blocked(&mut self, cell: Cell, blocked: bool) -> bool {
        match self.index(cell).and_then(|i| self.blocked.get_mut(i)) {
            Some(slot) => {
                *slot = blocked;
                true
            }
            None => false,
        }
    }

    /// Number of blocked cells.
    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|&&b| b).count()
    }

    /// The cell containing a world position.
    #[allow(clippy::cast_possible_truncation)]
    pub fn world_to_cell(&self, position: Vec2) -> Cell {
        let size = self.tile_size();
        Cell::new(
            (position.x / size).floor() as i32,
            (position.y / size).floor() as i32,
        )
    }

    /// World position of a cell's centre.
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_center(&self, cell: Cell) -> Vec2 {
        let size = self.tile_size();
        Vec2::new(
            (cell.col as f32 + 0.5) * size,
            (cell.row as f32 + 0.5) * size,
        )
    }

    /// Force the cell under `position` walkable.
    ///
    /// Returns `true` if the cell had been blocked and was cleared.
    pub fn ensure_walkable(&mut self, position: Vec2) -> bool {
        let cell = self.world_to_cell(position);
        if !self.in_bounds(cell) {
            warn!(%cell, x = position.x, y = position.y, "spawn position lies outside the map");
            return false;
        }
        if self.is_walkable(cell) {
            return false;
        }
        self.set_blocked(cell, false);
        warn!(%cell, x = position.x, y = position.y, "spawn cell was blocked; cleared it");
        true
    }

    /// Block every cell overlapped by a world-space rectangle.
    ///
    /// Zero-sized rectangles (points) block the single cell they sit in.
    #[allow(clippy::cast_possible_truncation)]
    pub fn block_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let size = self.tile_size();
        let first_col = (x / size).floor() as i32;
        let first_row = (y / size).floor() as i32;
        let last_col = (((x + width.max(0.0)) / size).ceil() as i32)
            .saturating_sub(1)
            .max(first_col);
        let last_row = (((y + height.max(0.0)) / size).ceil() as i32)
            .saturating_sub(1)
            .max(first_row);

        for row in first_row..=last_row {
            for col in first_col..=last_col {
                // Off-grid parts of oversized objects are simply dropped.
                self.set_blocked(Cell::new(col, row), true);
            }
        }
    }

    /// Block every non-empty tile of a collision layer.
    fn mark_tile_layer(&mut self, layer: &TileLayer, map_width: u32) {
        match (&layer.data, &layer.chunks) {
            (Some(data), _) => {
                let width = layer.width.unwrap_or(map_width);
                if width == 0 {
                    warn!(layer = layer.name, "collision layer has zero width; skipped");
                    return;
                }
                self.mark_tiles(0, 0, width, data);
            }
            (None, Some(chunks)) => {
                for chunk in chunks {
                    self.mark_chunk(layer, chunk);
                }
            }
            (None, None) => {
                warn!(layer = layer.name, "collision layer has neither data nor chunks; skipped");
            }
        }
    }

    fn mark_chunk(&mut self, layer: &TileLayer, chunk: &Chunk) {
        if chunk.width == 0 {
            warn!(layer = layer.name, x = chunk.x, y = chunk.y, "chunk has zero width; skipped");
            return;
        }
        let expected = u64::from(chunk.width).saturating_mul(u64::from(chunk.height));
        if u64::try_from(chunk.data.len()).unwrap_or(u64::MAX) != expected {
            warn!(
                layer = layer.name,
                x = chunk.x,
                y = chunk.y,
                tiles = chunk.data.len(),
                expected,
                "chunk size does not match its dimensions; using what is there"
            );
        }
        self.mark_tiles(chunk.x, chunk.y, chunk.width, &chunk.data);
    }

    /// Block non-empty tiles of a row-major block whose top-left tile is at
    /// (`origin_col`, `origin_row`).
    fn mark_tiles(&mut self, origin_col: i32, origin_row: i32, width: u32, data: &[u32]) {
        let mut off_grid = 0_usize;
        let columns = usize::try_from(width).unwrap_or(usize::MAX).max(1);
        for (i, &raw) in data.iter().enumerate() {
            if decode_tile_id(raw) == 0 {
                continue;
            }
            let (Some(col), Some(row)) = (
                i.checked_rem(columns).and_then(|c| i32::try_from(c).ok()),
                i.checked_div(columns).and_then(|r| i32::try_from(r).ok()),
            ) else {
                continue;
            };
            let cell = Cell::new(origin_col.saturating_add(col), origin_row.saturating_add(row));
            if !self.set_blocked(cell, true) {
                off_grid = off_grid.saturating_add(1);
            }
        }
        if off_grid > 0 {
            debug!(off_grid, "collision tiles outside the map were ignored");
        }
    }
}

/// [`DEFAULT_TILE_SIZE`] as an integer.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE as u32
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tilemap::{Layer, ObjectLayer, Property};

    fn object(kind: &str, x: f32, y: f32, w: f32, h: f32) -> MapObject {
        MapObject {
            kind: kind.to_owned(),
            x,
            y,
            width: w,
            height: h,
            ..MapObject::default()
        }
    }

    fn map_with(layers: Vec<Layer>) -> TileMap {
        TileMap {
            width: 6,
            height: 4,
            tile_width: 48,
            tile_height: 48,
            layers,
        }
    }

    fn collision_layer(data: Vec<u32>) -> Layer {
        Layer::Tiles(TileLayer {
            name: "walls".to_owned(),
            data: Some(data),
            properties: vec![Property {
                name: "collides".to_owned(),
                value: serde_json::Value::Bool(true),
            }],
            ..TileLayer::default()
        })
    }

    #[test]
    fn collision_tiles_block_cells() {
        let mut data = vec![0; 24];
        data[7] = 3; // col 1, row 1
        data[8] = 0x4000_0002; // flipped tile, col 2, row 1
        let grid = NavGrid::build(&map_with(vec![collision_layer(data)]), &[]);
        assert!(grid.is_blocked(Cell::new(1, 1)));
        assert!(grid.is_blocked(Cell::new(2, 1)));
        assert!(grid.is_walkable(Cell::new(0, 0)));
        assert_eq!(grid.blocked_count(), 2);
    }

    #[test]
    fn non_collision_layers_are_ignored() {
        let layer = Layer::Tiles(TileLayer {
            name: "floor".to_owned(),
            data: Some(vec![1; 24]),
            ..TileLayer::default()
        });
        let grid = NavGrid::build(&map_with(vec![layer]), &[]);
        assert_eq!(grid.blocked_count(), 0);
    }

    #[test]
    fn obstacle_objects_cover_their_bounding_box() {
        let group = Layer::Objects(ObjectLayer {
            name: "furniture".to_owned(),
            objects: vec![
                object("desk", 48.0, 48.0, 96.0, 48.0),
                object("plant", 0.0, 0.0, 48.0, 48.0),
            ],
        });
        let grid = NavGrid::build(&map_with(vec![group]), &[]);
        assert!(grid.is_blocked(Cell::new(1, 1)));
        assert!(grid.is_blocked(Cell::new(2, 1)));
        assert!(grid.is_walkable(Cell::new(3, 1)));
        assert!(grid.is_walkable(Cell::new(1, 2)));
        // "plant" is not an obstacle type and has no collides flag.
        assert!(grid.is_walkable(Cell::new(0, 0)));
    }

    #[test]
    fn collides_flag_makes_any_object_an_obstacle() {
        let mut pillar = object("decor", 240.0, 0.0, 10.0, 10.0);
        pillar.properties.push(Property {
            name: "collides".to_owned(),
            value: serde_json::Value::Bool(true),
        });
        let group = Layer::Objects(ObjectLayer {
            name: "decor".to_owned(),
            objects: vec![pillar],
        });
        let grid = NavGrid::build(&map_with(vec![group]), &[]);
        assert!(grid.is_blocked(Cell::new(5, 0)));
    }

    #[test]
    fn spawn_cells_are_forced_walkable() {
        let grid = NavGrid::build(
            &map_with(vec![collision_layer(vec![1; 24])]),
            &[Vec2::new(72.0, 72.0)],
        );
        assert!(grid.is_walkable(Cell::new(1, 1)));
        assert_eq!(grid.blocked_count(), 23);
    }

    #[test]
    fn malformed_layers_are_skipped() {
        let empty = Layer::Tiles(TileLayer {
            name: "collision".to_owned(),
            ..TileLayer::default()
        });
        let grid = NavGrid::build(&map_with(vec![empty]), &[]);
        assert_eq!(grid.blocked_count(), 0);
        assert_eq!(grid.cell_count(), 24);
    }

    #[test]
    fn chunks_are_placed_at_their_origin() {
        let layer = Layer::Tiles(TileLayer {
            name: "collision".to_owned(),
            chunks: Some(vec![Chunk {
                x: 2,
                y: 1,
                width: 2,
                height: 2,
                data: vec![1, 0, 0, 1],
            }]),
            ..TileLayer::default()
        });
        let grid = NavGrid::build(&map_with(vec![layer]), &[]);
        assert!(grid.is_blocked(Cell::new(2, 1)));
        assert!(grid.is_blocked(Cell::new(3, 2)));
        assert!(grid.is_walkable(Cell::new(3, 1)));
    }

    #[test]
    fn off_grid_reads_as_blocked() {
        let grid = NavGrid::new(3, 3, 48);
        assert!(grid.is_blocked(Cell::new(-1, 0)));
        assert!(grid.is_blocked(Cell::new(0, 3)));
        assert!(grid.is_blocked(Cell::new(i32::MAX, i32::MIN)));
        assert!(grid.is_walkable(Cell::new(2, 2)));
    }

    #[test]
    fn world_and_cell_coordinates_agree() {
        let grid = NavGrid::new(10, 10, 48);
        let cell = grid.world_to_cell(Vec2::new(100.0, 47.9));
        assert_eq!(cell, Cell::new(2, 0));
        assert_eq!(grid.world_to_cell(grid.cell_center(cell)), cell);
        assert_eq!(grid.world_to_cell(Vec2::new(-0.5, 0.0)), Cell::new(-1, 0));
    }

    #[test]
    fn zero_tile_size_falls_back_to_default() {
        let grid = NavGrid::new(2, 2, 0);
        assert!((grid.tile_size() - DEFAULT_TILE_SIZE).abs() < f32::EPSILON);
    }
}
