use crate::world::Point;

/// Stable identifier of an entity inside a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EntityId(pub u32);

/// Collision mask: offset from the entity's top-left corner plus size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mask {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Mask {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Mask { x, y, width, height }
    }
}

/// Axis-aligned rectangle in world pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect { x, y, width, height }
    }

    /// Overlap test; rectangles that only share an edge do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.width <= 0 || self.height <= 0 || other.width <= 0 || other.height <= 0 {
            return false;
        }
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// How an entity blocks the base movement predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionKind {
    /// Blocks everything (walls, crates)
    Solid,
    /// Blocks movement, but is a living actor
    CharacterSolid,
    #[default]
    NonSolid,
}

/// What an entity is, independent of how it collides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActorKind {
    Character,
    #[default]
    Scenery,
}

/// Which point of a target entity is pursued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetAnchor {
    TopLeft,
    #[default]
    Center,
    BottomCenter,
}

/// A mobile entity as seen by the movement core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entity {
    pub id: EntityId,
    /// Top-left position in pixels
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub mask: Mask,
    pub collision: CollisionKind,
    pub actor: ActorKind,
}

impl Entity {
    /// Create a non-solid scenery entity whose mask covers its whole sprite
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Entity {
            id: EntityId::default(),
            x,
            y,
            width,
            height,
            mask: Mask::new(0, 0, width, height),
            collision: CollisionKind::NonSolid,
            actor: ActorKind::Scenery,
        }
    }

    pub fn with_mask(mut self, mask: Mask) -> Self {
        self.mask = mask;
        self
    }

    pub fn with_collision(mut self, collision: CollisionKind) -> Self {
        self.collision = collision;
        self
    }

    pub fn with_actor(mut self, actor: ActorKind) -> Self {
        self.actor = actor;
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Mask rectangle if the entity were placed at (x, y)
    pub fn mask_rect_at(&self, x: i32, y: i32) -> Rect {
        Rect::new(x + self.mask.x, y + self.mask.y, self.mask.width, self.mask.height)
    }

    /// Mask rectangle at the current position
    pub fn mask_rect(&self) -> Rect {
        self.mask_rect_at(self.x, self.y)
    }

    /// Center of the collision mask in sub-pixel precision
    pub fn mask_center(&self) -> (f64, f64) {
        (
            f64::from(self.x + self.mask.x) + f64::from(self.mask.width) / 2.0,
            f64::from(self.y + self.mask.y) + f64::from(self.mask.height) / 2.0,
        )
    }

    /// Whether this entity stops others in the base collision predicate
    pub fn blocks_movement(&self) -> bool {
        matches!(
            self.collision,
            CollisionKind::Solid | CollisionKind::CharacterSolid
        )
    }

    /// Whether actor avoidance treats this entity as an obstacle
    pub fn is_avoidable_actor(&self) -> bool {
        self.actor == ActorKind::Character && self.collision != CollisionKind::Solid
    }

    /// Resolve the pursued point of this entity
    pub fn anchor(&self, anchor: TargetAnchor) -> Point {
        match anchor {
            TargetAnchor::TopLeft => Point::new(self.x, self.y),
            TargetAnchor::Center => Point::new(self.x + self.width / 2, self.y + self.height / 2),
            TargetAnchor::BottomCenter => {
                Point::new(self.x + self.width / 2, self.y + self.height - 1)
            }
        }
    }
}
