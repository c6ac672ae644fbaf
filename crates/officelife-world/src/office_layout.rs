//! A small built-in office used when no map file is configured.
//!
//! 20 x 14 tiles of 48 units. An outer wall rings the floor; a meeting room
//! in the top-right corner is closed off by walls with a single door on
//! its west side. Two banks of desks and a storage cabinet sit in the open
//! plan, and four spawn points are placed on free floor.

use officelife_types::Cell;

use crate::tilemap::{Layer, MapObject, ObjectLayer, Property, TileLayer, TileMap};

/// Width of the sample office in tiles.
pub const SAMPLE_WIDTH: u32 = 20;
/// Height of the sample office in tiles.
pub const SAMPLE_HEIGHT: u32 = 14;
/// Tile size of the sample office.
pub const SAMPLE_TILE: u32 = 48;
/// The gap in the meeting-room wall.
pub const MEETING_ROOM_DOOR: Cell = Cell::new(13, 4);

const WALL_TILE: u32 = 1;
const FLOOR_TILE: u32 = 2;

/// Build the sample office map.
pub fn sample_office() -> TileMap {
    TileMap {
        width: SAMPLE_WIDTH,
        height: SAMPLE_HEIGHT,
        tile_width: SAMPLE_TILE,
        tile_height: SAMPLE_TILE,
        layers: vec![
            Layer::Tiles(TileLayer {
                name: "floor".to_owned(),
                data: Some(fill(|_| FLOOR_TILE)),
                ..TileLayer::default()
            }),
            Layer::Tiles(TileLayer {
                name: "walls".to_owned(),
                data: Some(fill(|cell| if is_wall(cell) { WALL_TILE } else { 0 })),
                properties: vec![Property {
                    name: "collides".to_owned(),
                    value: serde_json::Value::Bool(true),
                }],
                ..TileLayer::default()
            }),
            Layer::Objects(ObjectLayer {
                name: "furniture".to_owned(),
                objects: vec![
                    tile_object(1, "desks-north-west", "desk", Cell::new(3, 3), 2, 1),
                    tile_object(2, "desks-north-east", "desk", Cell::new(7, 3), 2, 1),
                    tile_object(3, "desks-south-west", "desk", Cell::new(3, 8), 2, 1),
                    tile_object(4, "desks-south-east", "desk", Cell::new(7, 8), 2, 1),
                    tile_object(5, "meeting-table", "misc", Cell::new(15, 3), 2, 1),
                    tile_object(6, "cabinet", "storage", Cell::new(17, 10), 1, 2),
                ],
            }),
            Layer::Objects(ObjectLayer {
                name: "spawns".to_owned(),
                objects: vec![
                    spawn(10, "Alice", Cell::new(3, 5)),
                    spawn(11, "Bob", Cell::new(8, 5)),
                    spawn(12, "Carol", Cell::new(4, 10)),
                    spawn(13, "Dave", Cell::new(10, 10)),
                ],
            }),
        ],
    }
}

/// Outer ring plus the meeting-room walls, minus the door.
const fn is_wall(cell: Cell) -> bool {
    let last_col = 19;
    let last_row = 13;
    if cell.col == 0 || cell.row == 0 || cell.col == last_col || cell.row == last_row {
        return true;
    }
    if cell.col == MEETING_ROOM_DOOR.col && cell.row == MEETING_ROOM_DOOR.row {
        return false;
    }
    let west_wall = cell.col == 13 && cell.row <= 6;
    let south_wall = cell.row == 6 && cell.col >= 13;
    west_wall || south_wall
}

/// Row-major tile data for the whole map.
fn fill(tile: impl Fn(Cell) -> u32) -> Vec<u32> {
    (0..SAMPLE_HEIGHT)
        .flat_map(|row| (0..SAMPLE_WIDTH).map(move |col| (col, row)))
        .map(|(col, row)| {
            let cell = Cell::new(
                i32::try_from(col).unwrap_or(i32::MAX),
                i32::try_from(row).unwrap_or(i32::MAX),
            );
            tile(cell)
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn tile_object(id: u32, name: &str, kind: &str, origin: Cell, cols: u32, rows: u32) -> MapObject {
    let size = SAMPLE_TILE as f32;
    MapObject {
        id,
        name: name.to_owned(),
        kind: kind.to_owned(),
        x: origin.col as f32 * size,
        y: origin.row as f32 * size,
        width: cols as f32 * size,
        height: rows as f32 * size,
        properties: Vec::new(),
    }
}

#[allow(clippy::cast_precision_loss)]
fn spawn(id: u32, name: &str, cell: Cell) -> MapObject {
    let size = SAMPLE_TILE as f32;
    MapObject {
        id,
        name: name.to_owned(),
        kind: crate::tilemap::SPAWN_OBJECT_TYPE.to_owned(),
        x: (cell.col as f32 + 0.5) * size,
        y: (cell.row as f32 + 0.5) * size,
        width: 0.0,
        height: 0.0,
        properties: Vec::new(),
    }
}
