//! Search-graph view of a tile world.
//!
//! A [`Grid`] is built for a single pathfinding request and thrown away
//! afterwards, so its per-node costs never leak between searches. Building
//! one allocates a node per tile; callers that search large worlds often can
//! keep a grid around and call [`Grid::reset`] instead.

use crate::world::{Point, TileWorld};

/// Search bookkeeping for one tile
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub x: i32,
    pub y: i32,
    /// Best known cost from the start; infinite until the node is reached
    pub g_cost: f64,
    /// Heuristic estimate to the goal
    pub h_cost: f64,
    /// Predecessor on the best known path (index into the grid)
    pub parent: Option<usize>,
}

impl Node {
    pub fn new(x: i32, y: i32) -> Self {
        Node {
            x,
            y,
            g_cost: f64::INFINITY,
            h_cost: 0.0,
            parent: None,
        }
    }

    pub fn f_cost(&self) -> f64 {
        self.g_cost + self.h_cost
    }

    /// Whether the current search has assigned this node a cost
    pub fn is_reached(&self) -> bool {
        self.g_cost.is_finite()
    }

    fn reset(&mut self) {
        self.g_cost = f64::INFINITY;
        self.h_cost = 0.0;
        self.parent = None;
    }
}

/// Extra traversal cost applied when entering a tile
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PenaltyMode {
    /// Every walkable tile costs the same
    #[default]
    Flat,
    /// Tiles touching a solid tile (8-neighbourhood) cost this much more
    WallProximity(f64),
}

/// Tile world exposed as an 8-connected search graph
pub struct Grid<'w> {
    world: &'w dyn TileWorld,
    cols: i32,
    rows: i32,
    nodes: Vec<Node>,
    penalty: PenaltyMode,
}

impl<'w> Grid<'w> {
    /// Build a fresh grid with one node per world tile
    pub fn new(world: &'w dyn TileWorld) -> Self {
        let cols = world.width().max(0);
        let rows = world.height().max(0);
        let mut nodes = Vec::with_capacity(cols as usize * rows as usize);
        for y in 0..rows {
            for x in 0..cols {
                nodes.push(Node::new(x, y));
            }
        }

        Grid {
            world,
            cols,
            rows,
            nodes,
            penalty: PenaltyMode::Flat,
        }
    }

    pub fn with_penalty(mut self, penalty: PenaltyMode) -> Self {
        self.penalty = penalty;
        self
    }

    pub fn world(&self) -> &'w dyn TileWorld {
        self.world
    }

    /// Number of nodes, one per tile
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// Clear all search costs so the grid can serve another request
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
    }

    /// Convert (x, y) grid coordinates to a node index, `None` when out of bounds
    pub fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= self.cols || y < 0 || y >= self.rows {
            return None;
        }
        Some(x as usize + y as usize * self.cols as usize)
    }

    /// Node at grid coordinates, `None` when out of bounds
    pub fn node(&self, x: i32, y: i32) -> Option<&Node> {
        self.index_of(x, y).map(|index| &self.nodes[index])
    }

    pub(crate) fn node_at(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub(crate) fn node_at_mut(&mut self, index: usize) -> &mut Node {
        &mut self.nodes[index]
    }

    /// World pixel position to the grid cell containing it
    pub fn world_to_grid(&self, point: Point) -> Point {
        Point::new(
            point.x.div_euclid(self.world.tile_width()),
            point.y.div_euclid(self.world.tile_height()),
        )
    }

    /// Grid cell to the world pixel position of its center
    pub fn grid_to_world(&self, cell: Point) -> Point {
        let tile_width = self.world.tile_width();
        let tile_height = self.world.tile_height();
        Point::new(
            cell.x * tile_width + tile_width / 2,
            cell.y * tile_height + tile_height / 2,
        )
    }

    /// In-bounds neighbours of a node in all eight directions
    pub fn neighbours(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let Node { x, y, .. } = self.nodes[index];
        (-1..=1)
            .flat_map(|dx| (-1..=1).map(move |dy| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .filter_map(move |(dx, dy)| self.index_of(x + dx, y + dy))
    }

    /// Whether a node may be entered at all
    pub fn is_walkable(&self, index: usize) -> bool {
        let node = &self.nodes[index];
        !self.world.tile_at(node.x, node.y).is_solid()
    }

    /// Terrain cost added on top of the step cost when entering a node
    pub fn movement_penalty(&self, index: usize) -> f64 {
        match self.penalty {
            PenaltyMode::Flat => 0.0,
            PenaltyMode::WallProximity(cost) => {
                let node = &self.nodes[index];
                let near_wall = (-1..=1)
                    .flat_map(|dx| (-1..=1).map(move |dy| (dx, dy)))
                    .filter(|&(dx, dy)| dx != 0 || dy != 0)
                    .any(|(dx, dy)| self.world.tile_at(node.x + dx, node.y + dy).is_solid());
                if near_wall {
                    cost
                } else {
                    0.0
                }
            }
        }
    }
}
