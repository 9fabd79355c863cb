//! Loader for the subset of the Tiled JSON map format the engine uses:
//! tile layers become collision tiles, polyline objects become patrol routes.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::MapError;
use crate::world::{Point, TileKind, TileMap};

#[derive(Debug, Clone, Deserialize)]
pub struct MapFile {
    pub width: i32,
    pub height: i32,
    #[serde(rename = "tilewidth")]
    pub tile_width: i32,
    #[serde(rename = "tileheight")]
    pub tile_height: i32,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Layer {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Tile gids in row-major order; only present on tile layers
    #[serde(default)]
    pub data: Option<Vec<u32>>,
    /// Only present on object groups
    #[serde(default)]
    pub objects: Option<Vec<MapObject>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapObject {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub polyline: Option<Vec<PolyPoint>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PolyPoint {
    pub x: f64,
    pub y: f64,
}

/// Which tile layers carry collision, by layer name
#[derive(Debug, Clone, Default)]
pub struct LayerRules {
    pub solid_layers: Vec<String>,
    pub one_way_layers: Vec<String>,
}

/// Named polyline route in absolute world coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub name: String,
    pub points: Vec<Point>,
}

impl MapFile {
    pub fn from_json(json: &str) -> Result<Self, MapError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MapError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let map = Self::from_json(&contents)?;
        debug!(
            path = %path.as_ref().display(),
            width = map.width,
            height = map.height,
            layers = map.layers.len(),
            "map file parsed"
        );
        Ok(map)
    }

    /// Build the collision map. Solid wins over one-way when layers overlap.
    pub fn to_tile_map(&self, rules: &LayerRules) -> Result<TileMap, MapError> {
        let mut map = TileMap::new(self.width, self.height, self.tile_width, self.tile_height)?;
        let expected = map.len();
        let mut tiles = vec![TileKind::Free; expected];

        let solid: HashSet<&str> = rules.solid_layers.iter().map(String::as_str).collect();
        let one_way: HashSet<&str> = rules.one_way_layers.iter().map(String::as_str).collect();

        for layer in &self.layers {
            let Some(data) = &layer.data else {
                continue;
            };

            let kind = if solid.contains(layer.name.as_str()) {
                TileKind::Solid
            } else if one_way.contains(layer.name.as_str()) {
                TileKind::OneWay
            } else {
                continue;
            };

            if data.len() != expected {
                return Err(MapError::LayerSize {
                    layer: layer.name.clone(),
                    expected,
                    found: data.len(),
                });
            }

            for (tile, &gid) in tiles.iter_mut().zip(data) {
                if gid != 0 && *tile != TileKind::Solid {
                    *tile = kind;
                }
            }
        }

        map.set_tiles(tiles);
        Ok(map)
    }

    pub fn routes(&self) -> Vec<Route> {
        self.layers
            .iter()
            .filter_map(|layer| layer.objects.as_ref())
            .flatten()
            .filter_map(|object| {
                let polyline = object.polyline.as_ref()?;
                let points = polyline
                    .iter()
                    .map(|p| Point::new((object.x + p.x).round() as i32, (object.y + p.y).round() as i32))
                    .collect();
                Some(Route {
                    name: object.name.clone(),
                    points,
                })
            })
            .collect()
    }
}
