pub mod config;
pub mod direct;
pub mod entity;
pub mod error;
pub mod grid;
pub mod logging;
pub mod map_file;
pub mod motion;
pub mod pathfinding;
pub mod patrol;
pub mod scene;
pub mod seeking;
pub mod world;

pub use direct::DirectMotion;
pub use entity::{ActorKind, CollisionKind, Entity, EntityId, Mask, Rect, TargetAnchor};
pub use error::{ConfigError, MapError, MotionError};
pub use grid::{Grid, Node, PenaltyMode};
pub use map_file::{LayerRules, MapFile, Route};
pub use motion::MotionBase;
pub use pathfinding::{PathOptions, Pathfinder};
pub use patrol::{Patrol, PatrolMode};
pub use scene::{Controller, Scene};
pub use seeking::{SeekingMotion, Target};
pub use world::{Point, TileKind, TileMap, TileWorld};
