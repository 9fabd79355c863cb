use crate::grid::{Grid, PenaltyMode};
use crate::world::{Point, TileWorld};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::{debug, trace};

/// Cost of a horizontal or vertical step
pub const MOVE_STRAIGHT_COST: f64 = 10.0;

/// Cost of a diagonal step, 10 * sqrt(2) truncated
pub const MOVE_DIAGONAL_COST: f64 = 14.14;

/// Tunables for a single search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathOptions {
    pub penalty: PenaltyMode,
    /// Allow a diagonal step past a solid orthogonal neighbour
    pub allow_corner_cutting: bool,
}

impl Default for PathOptions {
    fn default() -> Self {
        PathOptions {
            penalty: PenaltyMode::Flat,
            allow_corner_cutting: true,
        }
    }
}

/// An entry of the open set
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f_cost: f64,
    h_cost: f64,
    order: u64,
    index: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.h_cost.total_cmp(&self.h_cost))
            // Tie-breaker: earlier insertion first, for deterministic expansion
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// Octile distance between two grid cells
pub fn heuristic(a: Point, b: Point) -> f64 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let straight = dx.max(dy) - dx.min(dy);
    MOVE_STRAIGHT_COST * f64::from(straight) + MOVE_DIAGONAL_COST * f64::from(dx.min(dy))
}

/// Cost of one step between adjacent cells
pub fn step_cost(dx: i32, dy: i32) -> f64 {
    if dx != 0 && dy != 0 {
        MOVE_DIAGONAL_COST
    } else {
        MOVE_STRAIGHT_COST
    }
}

/// Total step cost of a waypoint list produced by [`Pathfinder`].
///
/// Consecutive waypoints are expected to be adjacent tile centers.
pub fn path_cost(path: &[Point], tile_width: i32, tile_height: i32) -> f64 {
    path.windows(2)
        .map(|pair| {
            let dx = (pair[1].x - pair[0].x) / tile_width;
            let dy = (pair[1].y - pair[0].y) / tile_height;
            step_cost(dx, dy)
        })
        .sum()
}

/// Stateless A* search over a tile world
pub struct Pathfinder;

impl Pathfinder {
    /// Find a path between two world points with default options.
    ///
    /// Returns tile-center waypoints from start to goal, or an empty list when
    /// the goal cannot be reached.
    pub fn find_path(world: &dyn TileWorld, start: Point, goal: Point) -> Vec<Point> {
        Self::find_path_with(world, start, goal, &PathOptions::default())
    }

    /// Find a path on a freshly built grid
    pub fn find_path_with(
        world: &dyn TileWorld,
        start: Point,
        goal: Point,
        options: &PathOptions,
    ) -> Vec<Point> {
        let mut grid = Grid::new(world).with_penalty(options.penalty);
        Self::search(&mut grid, start, goal, options)
    }

    /// Find a path reusing an existing grid; its costs are reset first
    pub fn find_path_in(
        grid: &mut Grid<'_>,
        start: Point,
        goal: Point,
        options: &PathOptions,
    ) -> Vec<Point> {
        grid.reset();
        Self::search(grid, start, goal, options)
    }

    fn search(grid: &mut Grid<'_>, start: Point, goal: Point, options: &PathOptions) -> Vec<Point> {
        let start_cell = grid.world_to_grid(start);
        let goal_cell = grid.world_to_grid(goal);

        let Some(start_index) = grid.index_of(start_cell.x, start_cell.y) else {
            trace!(?start, "start lies outside the grid");
            return Vec::new();
        };
        let Some(goal_index) = grid.index_of(goal_cell.x, goal_cell.y) else {
            trace!(?goal, "goal lies outside the grid");
            return Vec::new();
        };
        if !grid.is_walkable(goal_index) {
            trace!(?goal, "goal tile is solid");
            return Vec::new();
        }

        let mut closed = vec![false; grid.len()];
        let mut open = BinaryHeap::new();
        let mut order = 0u64;

        let start_node = grid.node_at_mut(start_index);
        start_node.g_cost = 0.0;
        start_node.h_cost = heuristic(start_cell, goal_cell);
        open.push(OpenEntry {
            f_cost: start_node.f_cost(),
            h_cost: start_node.h_cost,
            order,
            index: start_index,
        });

        let mut expansions = 0usize;
        let mut neighbours = Vec::with_capacity(8);

        while let Some(entry) = open.pop() {
            let current = entry.index;

            // Stale duplicate of a node that was already expanded
            if closed[current] {
                continue;
            }

            if current == goal_index {
                let path = reconstruct_path(grid, goal_index);
                debug!(
                    ?start,
                    ?goal,
                    expansions,
                    waypoints = path.len(),
                    "path found"
                );
                return path;
            }

            closed[current] = true;
            expansions += 1;

            let (current_x, current_y, current_g) = {
                let node = grid.node_at(current);
                (node.x, node.y, node.g_cost)
            };

            neighbours.clear();
            neighbours.extend(grid.neighbours(current));

            for &neighbour in &neighbours {
                if closed[neighbour] || !grid.is_walkable(neighbour) {
                    continue;
                }

                let (nx, ny) = {
                    let node = grid.node_at(neighbour);
                    (node.x, node.y)
                };
                let dx = nx - current_x;
                let dy = ny - current_y;

                if dx != 0 && dy != 0 && !options.allow_corner_cutting {
                    let world = grid.world();
                    if world.tile_at(current_x + dx, current_y).is_solid()
                        || world.tile_at(current_x, current_y + dy).is_solid()
                    {
                        continue;
                    }
                }

                let tentative_g = current_g + step_cost(dx, dy) + grid.movement_penalty(neighbour);

                // An unreached node has an infinite cost, so this also covers "not seen yet"
                if tentative_g < grid.node_at(neighbour).g_cost {
                    let h_cost = heuristic(Point::new(nx, ny), goal_cell);
                    let node = grid.node_at_mut(neighbour);
                    node.parent = Some(current);
                    node.g_cost = tentative_g;
                    node.h_cost = h_cost;

                    order += 1;
                    open.push(OpenEntry {
                        f_cost: node.f_cost(),
                        h_cost,
                        order,
                        index: neighbour,
                    });
                }
            }
        }

        debug!(?start, ?goal, expansions, "no path found");
        Vec::new()
    }
}

/// Walk back-pointers from the goal and return tile centers in start-to-goal order
fn reconstruct_path(grid: &Grid<'_>, goal_index: usize) -> Vec<Point> {
    let mut path = Vec::new();
    let mut current = Some(goal_index);

    while let Some(index) = current {
        let node = grid.node_at(index);
        path.push(grid.grid_to_world(Point::new(node.x, node.y)));
        current = node.parent;
    }

    path.reverse();
    path
}

/// Format path for display
pub fn format_path(path: &[Point]) -> String {
    if path.is_empty() {
        return "No path".to_string();
    }

    path.iter()
        .map(|p| format!("({},{})", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::TileMap;

    #[test]
    fn test_heuristic_is_octile() {
        assert_eq!(heuristic(Point::new(0, 0), Point::new(0, 0)), 0.0);
        assert_eq!(heuristic(Point::new(0, 0), Point::new(3, 0)), 30.0);
        assert!((heuristic(Point::new(0, 0), Point::new(3, 3)) - 42.42).abs() < 1e-9);
        assert!((heuristic(Point::new(5, 1), Point::new(0, 3)) - 58.28).abs() < 1e-9);
    }

    #[test]
    fn test_open_entry_orders_by_f_then_h_then_insertion() {
        let mut heap = BinaryHeap::new();
        heap.push(OpenEntry { f_cost: 20.0, h_cost: 5.0, order: 0, index: 0 });
        heap.push(OpenEntry { f_cost: 10.0, h_cost: 8.0, order: 1, index: 1 });
        heap.push(OpenEntry { f_cost: 10.0, h_cost: 2.0, order: 2, index: 2 });
        heap.push(OpenEntry { f_cost: 10.0, h_cost: 2.0, order: 3, index: 3 });

        let popped: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|e| e.index)).collect();
        assert_eq!(popped, vec![2, 3, 1, 0]);
    }

    #[test]
    fn test_start_equals_goal() {
        let map = TileMap::new(4, 4, 16, 16).unwrap();
        let path = Pathfinder::find_path(&map, Point::new(20, 20), Point::new(30, 30));
        assert_eq!(path, vec![Point::new(24, 24)]);
    }

    #[test]
    fn test_corner_cutting_can_be_disabled() {
        let layout = "\
            .#\n\
            #.\n";
        let map = TileMap::from_layout(layout, 16, 16).unwrap();
        let start = Point::new(8, 8);
        let goal = Point::new(24, 24);

        let cutting = Pathfinder::find_path(&map, start, goal);
        assert_eq!(cutting, vec![Point::new(8, 8), Point::new(24, 24)]);

        let strict = PathOptions {
            allow_corner_cutting: false,
            ..PathOptions::default()
        };
        assert!(Pathfinder::find_path_with(&map, start, goal, &strict).is_empty());
    }

    #[test]
    fn test_path_cost_sums_steps() {
        let path = [Point::new(8, 8), Point::new(24, 8), Point::new(40, 24)];
        assert!((path_cost(&path, 16, 16) - 24.14).abs() < 1e-9);
        assert_eq!(path_cost(&path[..1], 16, 16), 0.0);
    }

    #[test]
    fn test_format_path() {
        assert_eq!(format_path(&[]), "No path");
        assert_eq!(
            format_path(&[Point::new(1, 2), Point::new(3, 4)]),
            "(1,2) -> (3,4)"
        );
    }
}
