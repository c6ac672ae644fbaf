//! Tile-map input model.
//!
//! The office map is authored in Tiled and exported as orthogonal JSON.
//! Only the parts that matter for navigation are modelled: tile layers
//! (finite `data` arrays or infinite-map `chunks`), object groups, and the
//! custom `collides` property on either. Layer kinds the simulation does not
//! use (image layers, groups) deserialize as [`Layer::Other`] and are
//! ignored.

use std::path::Path;

use officelife_types::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// Bits Tiled stores in the top of a tile id for flips and rotation.
pub const TILE_FLAG_MASK: u32 = 0xF000_0000;

/// Object type marking a character spawn position.
pub const SPAWN_OBJECT_TYPE: &str = "spawn";

/// Strip the flip and rotation flags from a packed tile id.
///
/// A result of 0 means the cell is empty.
pub const fn decode_tile_id(raw: u32) -> u32 {
    raw & !TILE_FLAG_MASK
}

/// A custom property attached to a layer or object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property name.
    pub name: String,
    /// Property value as authored (bool, number, or string).
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Whether a property list contains `collides = true`.
fn flagged_collides(properties: &[Property]) -> bool {
    properties
        .iter()
        .any(|p| p.name == "collides" && p.value.as_bool() == Some(true))
}

/// A root tile map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileMap {
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Tile width in world units; zero when the map does not say.
    #[serde(rename = "tilewidth", default)]
    pub tile_width: u32,
    /// Tile height in world units; zero when the map does not say.
    #[serde(rename = "tileheight", default)]
    pub tile_height: u32,
    /// Layers in draw order.
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl TileMap {
    /// Parse a map from Tiled JSON.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Parse`] if the JSON does not describe a map.
    pub fn from_json(json: &str) -> Result<Self, WorldError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a map file.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Io`] if the file cannot be read and
    /// [`WorldError::Parse`] if its content is not a map.
    pub fn from_file(path: &Path) -> Result<Self, WorldError> {
        let json = std::fs::read_to_string(path).map_err(|source| WorldError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Fill in a missing or zero tile size with `size`.
    #[must_use]
    pub const fn with_default_tile_size(mut self, size: u32) -> Self {
        if self.tile_width == 0 {
            self.tile_width = size;
        }
        if self.tile_height == 0 {
            self.tile_height = self.tile_width;
        }
        self
    }

    /// All tile layers, in draw order.
    pub fn tile_layers(&self) -> impl Iterator<Item = &TileLayer> {
        self.layers.iter().filter_map(|layer| match layer {
            Layer::Tiles(tiles) => Some(tiles),
            Layer::Objects(_) | Layer::Other => None,
        })
    }

    /// All objects across every object group.
    pub fn objects(&self) -> impl Iterator<Item = &MapObject> {
        self.layers
            .iter()
            .filter_map(|layer| match layer {
                Layer::Objects(group) => Some(group.objects.iter()),
                Layer::Tiles(_) | Layer::Other => None,
            })
            .flatten()
    }

    /// Named spawn positions (objects of type [`SPAWN_OBJECT_TYPE`]).
    pub fn spawn_points(&self) -> Vec<SpawnPoint> {
        self.objects()
            .filter(|o| o.kind.eq_ignore_ascii_case(SPAWN_OBJECT_TYPE))
            .map(|o| SpawnPoint {
                name: o.name.clone(),
                position: o.center(),
            })
            .collect()
    }
}

/// One layer of a tile map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Layer {
    /// A grid of tile ids.
    #[serde(rename = "tilelayer")]
    Tiles(TileLayer),
    /// Free-form rectangles and points.
    #[serde(rename = "objectgroup")]
    Objects(ObjectLayer),
    /// Any layer kind navigation ignores.
    #[serde(other)]
    Other,
}

/// A tile layer.
///
/// Finite maps carry `data`; infinite maps carry `chunks`. A layer with
/// neither is malformed and contributes nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    /// Layer name.
    #[serde(default)]
    pub name: String,
    /// Width in tiles (defaults to the map width).
    #[serde(default)]
    pub width: Option<u32>,
    /// Height in tiles (defaults to the map height).
    #[serde(default)]
    pub height: Option<u32>,
    /// Row-major packed tile ids for finite maps.
    #[serde(default)]
    pub data: Option<Vec<u32>>,
    /// Tile chunks for infinite maps.
    #[serde(default)]
    pub chunks: Option<Vec<Chunk>>,
    /// Custom properties.
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl TileLayer {
    /// Whether non-empty tiles on this layer block movement.
    ///
    /// True when the layer carries `collides = true` or is named
    /// `collision`/`collisions`.
    pub fn collides(&self) -> bool {
        flagged_collides(&self.properties)
            || self.name.eq_ignore_ascii_case("collision")
            || self.name.eq_ignore_ascii_case("collisions")
    }
}

/// A rectangular block of tiles in an infinite map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Column of the chunk's top-left tile.
    pub x: i32,
    /// Row of the chunk's top-left tile.
    pub y: i32,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Row-major packed tile ids.
    #[serde(default)]
    pub data: Vec<u32>,
}

/// An object group layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectLayer {
    /// Layer name.
    #[serde(default)]
    pub name: String,
    /// Objects on the layer.
    #[serde(default)]
    pub objects: Vec<MapObject>,
}

/// A placed object: furniture, a room outline, a spawn point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    /// Tiled object id.
    #[serde(default)]
    pub id: u32,
    /// Object name.
    #[serde(default)]
    pub name: String,
    /// Object type (Tiled 1.9+ exports this as `class`).
    #[serde(rename = "type", alias = "class", default)]
    pub kind: String,
    /// Left edge in world units.
    pub x: f32,
    /// Top edge in world units.
    pub y: f32,
    /// Width in world units (0 for points).
    #[serde(default)]
    pub width: f32,
    /// Height in world units (0 for points).
    #[serde(default)]
    pub height: f32,
    /// Custom properties.
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl MapObject {
    /// Whether the object carries `collides = true`.
    pub fn collides(&self) -> bool {
        flagged_collides(&self.properties)
    }

    /// Centre of the bounding box.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A named position where a character may start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Spawn object name (often the character's name).
    pub name: String,
    /// World position.
    pub position: Vec2,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MAP_JSON: &str = r#"{
        "width": 4, "height": 3, "tilewidth": 48, "tileheight": 48,
        "orientation": "orthogonal",
        "layers": [
            {"type": "tilelayer", "name": "floor", "data": [1,1,1,1, 1,1,1,1, 1,1,1,1]},
            {"type": "tilelayer", "name": "walls", "data": [0,0,0,0, 0,2147483653,0,0, 0,0,0,0],
             "properties": [{"name": "collides", "type": "bool", "value": true}]},
            {"type": "objectgroup", "name": "furniture", "objects": [
                {"id": 1, "name": "desk", "type": "desk", "x": 96, "y": 0, "width": 48, "height": 48},
                {"id": 2, "name": "Pam", "class": "spawn", "x": 10, "y": 100, "width": 0, "height": 0, "point": true}
            ]},
            {"type": "imagelayer", "name": "backdrop", "image": "bg.png"}
        ]
    }"#;

    #[test]
    fn parses_layers_and_objects() {
        let map = TileMap::from_json(MAP_JSON).unwrap();
        assert_eq!(map.width, 4);
        assert_eq!(map.tile_width, 48);
        assert_eq!(map.layers.len(), 4);
        assert!(matches!(map.layers[3], Layer::Other));
        assert_eq!(map.tile_layers().count(), 2);
        assert_eq!(map.objects().count(), 2);
    }

    #[test]
    fn collision_flag_comes_from_properties() {
        let map = TileMap::from_json(MAP_JSON).unwrap();
        let flags: Vec<bool> = map.tile_layers().map(TileLayer::collides).collect();
        assert_eq!(flags, vec![false, true]);
    }

    #[test]
    fn missing_tile_size_takes_the_default() {
        let map = TileMap::from_json(r#"{"width": 2, "height": 2}"#).unwrap();
        assert_eq!(map.tile_width, 0);
        let map = map.with_default_tile_size(32);
        assert_eq!((map.tile_width, map.tile_height), (32, 32));

        let declared = TileMap::from_json(MAP_JSON).unwrap().with_default_tile_size(32);
        assert_eq!(declared.tile_width, 48);
    }

    #[test]
    fn class_is_accepted_as_object_type() {
        let map = TileMap::from_json(MAP_JSON).unwrap();
        let spawns = map.spawn_points();
        assert_eq!(spawns.len(), 1);
        assert_eq!(spawns[0].name, "Pam");
    }

    #[test]
    fn flip_flags_are_stripped() {
        assert_eq!(decode_tile_id(0x8000_0005), 5);
        assert_eq!(decode_tile_id(0xE000_0001), 1);
        assert_eq!(decode_tile_id(0), 0);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            TileMap::from_json("{\"layers\": 3}"),
            Err(WorldError::Parse { .. })
        ));
    }
}
