use std::cell::RefCell;

use crate::entity::Mask;
use crate::error::MapError;

/// A point in world space (pixels) or grid space (tiles), depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Traversability classification of a single tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TileKind {
    #[default]
    Free,
    Solid,
    /// Platform tile; only the physics collaborator treats it specially
    OneWay,
}

impl TileKind {
    pub fn is_solid(self) -> bool {
        self == TileKind::Solid
    }

    fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '#' | '■' => Some(TileKind::Solid),
            '.' | '□' | ' ' => Some(TileKind::Free),
            '=' => Some(TileKind::OneWay),
            _ => None,
        }
    }

    fn glyph(self) -> char {
        match self {
            TileKind::Free => '.',
            TileKind::Solid => '#',
            TileKind::OneWay => '=',
        }
    }
}

/// Read-only tile query surface consumed by pathfinding and collision checks.
///
/// Implementations must stay unchanged for the duration of a single search or tick.
pub trait TileWorld {
    /// Width in tiles
    fn width(&self) -> i32;

    /// Height in tiles
    fn height(&self) -> i32;

    /// Tile width in pixels
    fn tile_width(&self) -> i32;

    /// Tile height in pixels
    fn tile_height(&self) -> i32;

    /// Classification of the tile at (tx, ty). Off-map tiles are `Free`.
    fn tile_at(&self, tx: i32, ty: i32) -> TileKind;

    /// Check if the mask rectangle of an entity placed at (x, y) touches no solid tile
    fn is_free(&self, x: i32, y: i32, mask: &Mask) -> bool {
        if mask.width <= 0 || mask.height <= 0 {
            return true;
        }

        let left = x + mask.x;
        let top = y + mask.y;
        let tile_x1 = left.div_euclid(self.tile_width());
        let tile_y1 = top.div_euclid(self.tile_height());
        let tile_x2 = (left + mask.width - 1).div_euclid(self.tile_width());
        let tile_y2 = (top + mask.height - 1).div_euclid(self.tile_height());

        for ty in tile_y1..=tile_y2 {
            for tx in tile_x1..=tile_x2 {
                if self.tile_at(tx, ty).is_solid() {
                    return false;
                }
            }
        }
        true
    }
}

/// In-memory tile world stored in row-major order
#[derive(Clone, Debug)]
pub struct TileMap {
    cols: i32,
    rows: i32,
    tile_width: i32,
    tile_height: i32,
    tiles: Vec<TileKind>,
    /// Revision number - incremented whenever a tile changes
    revision: u64,
}

impl TileMap {
    /// Create a new map with every tile free
    pub fn new(cols: i32, rows: i32, tile_width: i32, tile_height: i32) -> Result<Self, MapError> {
        if tile_width <= 0 || tile_height <= 0 {
            return Err(MapError::ZeroTileSize {
                width: tile_width,
                height: tile_height,
            });
        }

        let cols = cols.max(0);
        let rows = rows.max(0);
        let count = cols
            .checked_mul(rows)
            .ok_or(MapError::TooLarge { cols, rows })?;
        Ok(TileMap {
            cols,
            rows,
            tile_width,
            tile_height,
            tiles: vec![TileKind::Free; count as usize],
            revision: 0,
        })
    }

    /// Create a map with the listed tiles marked solid
    pub fn with_solid(
        cols: i32,
        rows: i32,
        tile_width: i32,
        tile_height: i32,
        solid: &[(i32, i32)],
    ) -> Result<Self, MapError> {
        let mut map = Self::new(cols, rows, tile_width, tile_height)?;
        for &(x, y) in solid {
            map.set_tile(x, y, TileKind::Solid);
        }
        map.revision = 0;
        Ok(map)
    }

    /// Parse a text layout, one glyph per tile.
    ///
    /// `#` or `■` is solid, `.`, `□` or a space is free, `=` is a one-way platform.
    /// Blank lines are skipped.
    pub fn from_layout(layout: &str, tile_width: i32, tile_height: i32) -> Result<Self, MapError> {
        let lines: Vec<&str> = layout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect();

        if lines.is_empty() {
            return Err(MapError::EmptyLayout);
        }

        let cols = lines[0].chars().count();
        let mut map = Self::new(cols as i32, lines.len() as i32, tile_width, tile_height)?;

        for (y, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(MapError::RaggedRow {
                    row: y,
                    expected: cols,
                    found,
                });
            }

            for (x, glyph) in line.chars().enumerate() {
                let kind = TileKind::from_glyph(glyph)
                    .ok_or(MapError::UnknownGlyph { glyph, x, y })?;
                map.tiles[y * cols + x] = kind;
            }
        }

        Ok(map)
    }

    /// Render the map back to its text layout
    pub fn to_layout_string(&self) -> String {
        let mut result = String::with_capacity((self.cols as usize + 1) * self.rows as usize);
        for y in 0..self.rows {
            for x in 0..self.cols {
                result.push(self.tile_at(x, y).glyph());
            }
            result.push('\n');
        }
        result
    }

    /// Set the tile at (x, y). Out-of-bounds writes are ignored.
    pub fn set_tile(&mut self, x: i32, y: i32, kind: TileKind) {
        if let Some(index) = self.index(x, y) {
            if self.tiles[index] != kind {
                self.tiles[index] = kind;
                self.revision += 1;
            }
        }
    }

    /// Flip a tile between free and solid
    pub fn toggle_solid(&mut self, x: i32, y: i32) {
        let next = if self.tile_at(x, y).is_solid() {
            TileKind::Free
        } else {
            TileKind::Solid
        };
        self.set_tile(x, y, next);
    }

    /// Number of tiles in the map
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Get current map revision number
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn set_tiles(&mut self, tiles: Vec<TileKind>) {
        debug_assert_eq!(tiles.len(), self.tiles.len());
        self.tiles = tiles;
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= self.cols || y < 0 || y >= self.rows {
            return None;
        }
        Some(x as usize + y as usize * self.cols as usize)
    }
}

impl TileWorld for TileMap {
    fn width(&self) -> i32 {
        self.cols
    }

    fn height(&self) -> i32 {
        self.rows
    }

    fn tile_width(&self) -> i32 {
        self.tile_width
    }

    fn tile_height(&self) -> i32 {
        self.tile_height
    }

    fn tile_at(&self, tx: i32, ty: i32) -> TileKind {
        self.index(tx, ty)
            .map(|index| self.tiles[index])
            .unwrap_or(TileKind::Free)
    }
}

/// Editable world shared with movement components; edits happen between ticks
impl<T: TileWorld> TileWorld for RefCell<T> {
    fn width(&self) -> i32 {
        self.borrow().width()
    }

    fn height(&self) -> i32 {
        self.borrow().height()
    }

    fn tile_width(&self) -> i32 {
        self.borrow().tile_width()
    }

    fn tile_height(&self) -> i32 {
        self.borrow().tile_height()
    }

    fn tile_at(&self, tx: i32, ty: i32) -> TileKind {
        self.borrow().tile_at(tx, ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_round_trip_keeps_glyphs() {
        let layout = "..#\n.=.\n#..\n";
        let map = TileMap::from_layout(layout, 16, 16).unwrap();

        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 3);
        assert_eq!(map.tile_at(2, 0), TileKind::Solid);
        assert_eq!(map.tile_at(1, 1), TileKind::OneWay);
        assert_eq!(map.to_layout_string(), layout);
    }

    #[test]
    fn test_layout_rejects_ragged_rows() {
        let err = TileMap::from_layout("...\n..\n", 16, 16).unwrap_err();
        assert!(matches!(err, MapError::RaggedRow { row: 1, expected: 3, found: 2 }));
    }

    #[test]
    fn test_layout_rejects_unknown_glyph() {
        let err = TileMap::from_layout("..x\n", 16, 16).unwrap_err();
        assert!(matches!(err, MapError::UnknownGlyph { glyph: 'x', x: 2, y: 0 }));
    }

    #[test]
    fn test_off_map_tiles_are_free() {
        let map = TileMap::with_solid(2, 2, 16, 16, &[(0, 0), (1, 1)]).unwrap();
        assert_eq!(map.tile_at(-1, 0), TileKind::Free);
        assert_eq!(map.tile_at(5, 5), TileKind::Free);
    }

    #[test]
    fn test_is_free_covers_every_touched_tile() {
        let map = TileMap::with_solid(4, 4, 16, 16, &[(1, 0)]).unwrap();
        let mask = Mask::new(0, 0, 8, 8);

        assert!(map.is_free(8, 0, &mask));
        // Right edge reaches pixel 16, the first column of tile (1, 0)
        assert!(!map.is_free(9, 0, &mask));
        assert!(map.is_free(9, 16, &mask));
    }

    #[test]
    fn test_is_free_ignores_one_way_tiles() {
        let map = TileMap::from_layout("=.\n..\n", 16, 16).unwrap();
        assert!(map.is_free(0, 0, &Mask::new(0, 0, 16, 16)));
    }

    #[test]
    fn test_set_tile_bumps_revision_only_on_change() {
        let mut map = TileMap::new(3, 3, 16, 16).unwrap();
        map.set_tile(1, 1, TileKind::Solid);
        map.set_tile(1, 1, TileKind::Solid);
        map.set_tile(7, 7, TileKind::Solid);
        assert_eq!(map.revision(), 1);

        map.toggle_solid(1, 1);
        assert_eq!(map.tile_at(1, 1), TileKind::Free);
        assert_eq!(map.revision(), 2);
    }

    #[test]
    fn test_zero_tile_size_is_rejected() {
        assert!(matches!(
            TileMap::new(3, 3, 0, 16),
            Err(MapError::ZeroTileSize { width: 0, height: 16 })
        ));
    }
}
