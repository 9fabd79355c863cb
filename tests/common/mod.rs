#![allow(dead_code)]

use std::collections::BinaryHeap;
use std::cmp::Ordering;

use tilemotion::pathfinding::{format_path, step_cost};
use tilemotion::{Entity, Point, TileMap, TileWorld};

pub const TILE: i32 = 16;

/// Build a 16x16-tile map from a text layout
pub fn map(layout: &str) -> TileMap {
    TileMap::from_layout(layout, TILE, TILE).expect("test layout must parse")
}

/// World-space center of a tile
pub fn center(tx: i32, ty: i32) -> Point {
    Point::new(tx * TILE + TILE / 2, ty * TILE + TILE / 2)
}

/// Whether the entity's mask currently overlaps any solid tile
pub fn overlaps_wall(world: &dyn TileWorld, entity: &Entity) -> bool {
    !world.is_free(entity.x, entity.y, &entity.mask)
}

/// Visualize a path on a map
pub fn visualize_path(world: &dyn TileWorld, path: &[Point]) -> String {
    let mut result = format!("\nPath: {}\n", format_path(path));

    for y in 0..world.height() {
        for x in 0..world.width() {
            let here = center(x, y);
            let symbol = if path.first() == Some(&here) {
                'S'
            } else if path.last() == Some(&here) {
                'D'
            } else if path.contains(&here) {
                '*'
            } else if world.tile_at(x, y).is_solid() {
                '█'
            } else {
                '.'
            };
            result.push(symbol);
        }
        result.push('\n');
    }

    result
}

#[derive(PartialEq)]
struct Frontier {
    cost: f64,
    cell: (i32, i32),
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost)
    }
}

/// Exhaustive Dijkstra over the 8-connected grid with corner cutting allowed.
///
/// Reference cost for checking that A* returns optimal routes.
pub fn dijkstra_cost(world: &dyn TileWorld, start: (i32, i32), goal: (i32, i32)) -> Option<f64> {
    let (cols, rows) = (world.width(), world.height());
    let index = |(x, y): (i32, i32)| (x + y * cols) as usize;
    if world.tile_at(goal.0, goal.1).is_solid() {
        return None;
    }

    let mut best = vec![f64::INFINITY; (cols * rows) as usize];
    let mut heap = BinaryHeap::new();
    best[index(start)] = 0.0;
    heap.push(Frontier { cost: 0.0, cell: start });

    while let Some(Frontier { cost, cell }) = heap.pop() {
        if cell == goal {
            return Some(cost);
        }
        if cost > best[index(cell)] {
            continue;
        }

        for dx in -1..=1 {
            for dy in -1..=1 {
                let next = (cell.0 + dx, cell.1 + dy);
                if (dx, dy) == (0, 0)
                    || next.0 < 0
                    || next.1 < 0
                    || next.0 >= cols
                    || next.1 >= rows
                    || world.tile_at(next.0, next.1).is_solid()
                {
                    continue;
                }

                let next_cost = cost + step_cost(dx, dy);
                if next_cost < best[index(next)] {
                    best[index(next)] = next_cost;
                    heap.push(Frontier { cost: next_cost, cell: next });
                }
            }
        }
    }

    None
}
