//! Goal-seeking movement: chase an entity or walk to a point, optionally
//! routed through A*.

use std::rc::Rc;

use tracing::trace;

use crate::entity::{Entity, EntityId, TargetAnchor};
use crate::error::MotionError;
use crate::motion::{Axis, MotionBase};
use crate::pathfinding::{PathOptions, Pathfinder};
use crate::world::{Point, TileWorld};

/// Ticks between path recalculations
pub const DEFAULT_RECALCULATE_INTERVAL: u32 = 30;

/// Distance in pixels at which a waypoint or goal counts as reached
pub const DEFAULT_ARRIVAL_THRESHOLD: f64 = 2.0;

/// What a [`SeekingMotion`] is pursuing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    None,
    Entity {
        id: EntityId,
        anchor: TargetAnchor,
    },
    Point(Point),
}

pub struct SeekingMotion {
    base: MotionBase,
    target: Target,
    /// Anchor used by `set_target_entity`
    anchor: TargetAnchor,
    use_pathfinding: bool,
    avoid_other_actors: bool,
    path_options: PathOptions,
    /// Empty means "no route currently known"
    path: Vec<Point>,
    /// Always a valid index into `path` unless `path` is empty
    path_index: usize,
    cooldown: i32,
    recalculate_interval: u32,
    arrival_threshold: f64,
    idle: bool,
}

impl SeekingMotion {
    pub fn new(speed: f64) -> Self {
        SeekingMotion {
            base: MotionBase::new(speed),
            target: Target::None,
            anchor: TargetAnchor::default(),
            use_pathfinding: false,
            avoid_other_actors: false,
            path_options: PathOptions::default(),
            path: Vec::new(),
            path_index: 0,
            cooldown: 0,
            recalculate_interval: DEFAULT_RECALCULATE_INTERVAL,
            arrival_threshold: DEFAULT_ARRIVAL_THRESHOLD,
            idle: true,
        }
    }

    pub fn with_pathfinding(mut self, enabled: bool) -> Self {
        self.use_pathfinding = enabled;
        self
    }

    pub fn with_avoidance(mut self, enabled: bool) -> Self {
        self.avoid_other_actors = enabled;
        self
    }

    pub fn with_anchor(mut self, anchor: TargetAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_path_options(mut self, options: PathOptions) -> Self {
        self.path_options = options;
        self
    }

    pub fn with_recalculate_interval(mut self, ticks: u32) -> Self {
        self.recalculate_interval = ticks.max(1);
        self
    }

    pub fn with_arrival_threshold(mut self, threshold: f64) -> Self {
        self.arrival_threshold = threshold.max(0.0);
        self
    }

    pub fn base(&self) -> &MotionBase {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut MotionBase {
        &mut self.base
    }

    pub fn attach_world(&mut self, world: Rc<dyn TileWorld>) -> Result<(), MotionError> {
        self.base.attach_world(world)
    }

    pub fn set_pathfinding(&mut self, enabled: bool) {
        if self.use_pathfinding != enabled {
            self.use_pathfinding = enabled;
            self.invalidate_path();
        }
    }

    pub fn uses_pathfinding(&self) -> bool {
        self.use_pathfinding
    }

    pub fn set_avoidance(&mut self, enabled: bool) {
        self.avoid_other_actors = enabled;
    }

    pub fn set_anchor(&mut self, anchor: TargetAnchor) {
        self.anchor = anchor;
        if let Target::Entity { id, .. } = self.target {
            self.target = Target::Entity { id, anchor };
        }
    }

    /// Chase another entity. Re-targeting the same entity keeps the current path.
    pub fn set_target_entity(&mut self, id: EntityId) {
        let target = Target::Entity {
            id,
            anchor: self.anchor,
        };
        if self.target != target {
            self.target = target;
            self.invalidate_path();
        }
    }

    /// Walk to a fixed world point
    pub fn set_target_point(&mut self, point: Point) {
        self.target = Target::Point(point);
        self.invalidate_path();
    }

    pub fn clear_target(&mut self) {
        self.target = Target::None;
        self.invalidate_path();
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Drop the cached path and force a recalculation on the next tick
    pub fn invalidate_path(&mut self) {
        self.path.clear();
        self.path_index = 0;
        self.cooldown = 0;
    }

    pub fn path(&self) -> &[Point] {
        &self.path
    }

    pub fn path_index(&self) -> usize {
        self.path_index
    }

    /// Waypoint currently being walked to, if a path is known
    pub fn current_waypoint(&self) -> Option<Point> {
        self.path.get(self.path_index).copied()
    }

    /// Whether the last tick had nothing to move toward
    pub fn is_idle(&self) -> bool {
        self.idle
    }

    pub fn velocity(&self) -> (f64, f64) {
        self.base.velocity()
    }

    /// Advance the owner by one tick
    pub fn update(&mut self, owner: &mut Entity, others: &[Entity]) {
        self.base.note_unattached(owner);

        let final_target = match self.resolve_destination(others) {
            Some(destination) => self.final_target(owner, destination),
            None => None,
        };

        match final_target {
            Some(point) => {
                self.idle = false;
                self.move_towards(owner, others, point);
            }
            None => {
                self.idle = true;
                self.base.set_velocity(0.0, 0.0);
            }
        }
    }

    /// Where the target currently is, `None` without a target or when the
    /// target entity is gone
    fn resolve_destination(&self, others: &[Entity]) -> Option<Point> {
        match self.target {
            Target::None => None,
            Target::Point(point) => Some(point),
            Target::Entity { id, anchor } => others
                .iter()
                .find(|entity| entity.id == id)
                .map(|entity| entity.anchor(anchor)),
        }
    }

    /// Point to steer toward this tick: the next waypoint when pathfinding,
    /// the destination itself otherwise
    fn final_target(&mut self, owner: &Entity, destination: Point) -> Option<Point> {
        if !self.use_pathfinding {
            return Some(destination);
        }
        // Without a world there is nothing to search; steer directly
        let Some(world) = self.base.world().cloned() else {
            return Some(destination);
        };

        self.cooldown -= 1;
        if self.cooldown <= 0 || self.path.is_empty() {
            self.cooldown = self.recalculate_interval as i32;
            let start = center_point(owner);
            self.path = Pathfinder::find_path_with(&*world, start, destination, &self.path_options);
            self.path_index = 0;
            trace!(
                entity = owner.id.0,
                ?start,
                ?destination,
                waypoints = self.path.len(),
                "path recalculated"
            );
        }

        let waypoint = *self.path.get(self.path_index)?;

        let (center_x, center_y) = owner.mask_center();
        let distance = (f64::from(waypoint.x) - center_x).hypot(f64::from(waypoint.y) - center_y);
        if distance < self.arrival_threshold {
            self.path_index += 1;
            if self.path_index >= self.path.len() {
                self.path.clear();
                self.path_index = 0;
                return None;
            }
        }

        Some(self.path[self.path_index])
    }

    fn move_towards(&mut self, owner: &mut Entity, others: &[Entity], target: Point) {
        let (start_x, start_y) = owner.mask_center();
        let dx = f64::from(target.x) - start_x;
        let dy = f64::from(target.y) - start_y;
        let length = dx.hypot(dy);

        if length < self.arrival_threshold {
            self.base.set_velocity(0.0, 0.0);
            return;
        }

        let speed = self.base.speed();
        let move_x = dx / length * speed;
        let move_y = dy / length * speed;
        self.base.set_velocity(move_x, move_y);

        self.apply_intelligent_movement(owner, others, move_x, move_y);
    }

    /// Step toward the goal, sliding along obstacles instead of stalling on a
    /// blocked diagonal
    fn apply_intelligent_movement(&mut self, owner: &mut Entity, others: &[Entity], move_x: f64, move_y: f64) {
        let (mut x_steps, mut y_steps) = self.base.accumulate(move_x, move_y);

        let avoid = self.avoid_other_actors;
        let target_id = match self.target {
            Target::Entity { id, .. } => Some(id),
            _ => None,
        };
        let is_clear = |base: &MotionBase, owner: &Entity, x: i32, y: i32| {
            base.is_path_clear(owner, others, x, y)
                && (!avoid || actors_clear(owner, others, target_id, x, y))
        };

        if x_steps != 0 && y_steps != 0 {
            let sign_x = x_steps.signum();
            let sign_y = y_steps.signum();
            let blocked = !is_clear(&self.base, &*owner, owner.x + sign_x, owner.y)
                || !is_clear(&self.base, &*owner, owner.x, owner.y + sign_y);

            if blocked {
                // Keep the dominant axis
                if move_x.abs() > move_y.abs() {
                    y_steps = 0;
                } else {
                    x_steps = 0;
                }
            }
        }

        if x_steps != 0 {
            self.base.step_axis(owner, Axis::X, x_steps, &is_clear);
        }
        if y_steps != 0 {
            self.base.step_axis(owner, Axis::Y, y_steps, &is_clear);
        }
    }
}

/// Reject positions overlapping another character actor that does not already
/// block movement. The owner and the pursued entity are ignored.
fn actors_clear(owner: &Entity, others: &[Entity], target: Option<EntityId>, x: i32, y: i32) -> bool {
    let future = owner.mask_rect_at(x, y);
    !others
        .iter()
        .filter(|other| other.id != owner.id && Some(other.id) != target)
        .filter(|other| other.is_avoidable_actor())
        .any(|other| future.intersects(&other.mask_rect()))
}

fn center_point(owner: &Entity) -> Point {
    let (x, y) = owner.mask_center();
    Point::new(x.floor() as i32, y.floor() as i32)
}
