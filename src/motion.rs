//! Collision-aware sub-pixel stepping shared by every movement controller.

use std::rc::Rc;

use tracing::{debug, warn};

use crate::entity::Entity;
use crate::error::MotionError;
use crate::world::{Point, TileWorld};

/// Axis selector for single-axis stepping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Shared movement state: speed, carried sub-pixel remainders and the world
/// used for collision checks.
///
/// Until a world is attached every collision check passes, so the owner moves
/// unconstrained.
pub struct MotionBase {
    /// Pixels per tick
    speed: f64,
    x_remainder: f64,
    y_remainder: f64,
    /// Per-axis velocity computed on the last tick
    velocity: (f64, f64),
    world: Option<Rc<dyn TileWorld>>,
    warned_unattached: bool,
}

impl MotionBase {
    pub fn new(speed: f64) -> Self {
        MotionBase {
            speed,
            x_remainder: 0.0,
            y_remainder: 0.0,
            velocity: (0.0, 0.0),
            world: None,
            warned_unattached: false,
        }
    }

    /// Adopt the world used for collision checks. Only the first call succeeds.
    pub fn attach_world(&mut self, world: Rc<dyn TileWorld>) -> Result<(), MotionError> {
        if self.world.is_some() {
            return Err(MotionError::WorldAlreadyAttached);
        }
        debug!(
            width = world.width(),
            height = world.height(),
            "movement component attached to world"
        );
        self.world = Some(world);
        Ok(())
    }

    pub fn is_attached(&self) -> bool {
        self.world.is_some()
    }

    pub fn world(&self) -> Option<&Rc<dyn TileWorld>> {
        self.world.as_ref()
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub fn velocity(&self) -> (f64, f64) {
        self.velocity
    }

    pub(crate) fn set_velocity(&mut self, vx: f64, vy: f64) {
        self.velocity = (vx, vy);
    }

    /// Fractional displacement carried into the next tick
    pub fn remainder(&self) -> (f64, f64) {
        (self.x_remainder, self.y_remainder)
    }

    pub fn reset_remainders(&mut self) {
        self.x_remainder = 0.0;
        self.y_remainder = 0.0;
    }

    /// Check whether the owner may occupy (next_x, next_y).
    ///
    /// The owner's mask must touch no solid tile and must not overlap the mask
    /// of any other entity that blocks movement.
    pub fn is_path_clear(&self, owner: &Entity, others: &[Entity], next_x: i32, next_y: i32) -> bool {
        let Some(world) = &self.world else {
            return true;
        };

        if !world.is_free(next_x, next_y, &owner.mask) {
            return false;
        }

        let future = owner.mask_rect_at(next_x, next_y);
        !others
            .iter()
            .filter(|other| other.id != owner.id && other.blocks_movement())
            .any(|other| future.intersects(&other.mask_rect()))
    }

    /// Blend the carried remainder toward a straight pull at `target`.
    ///
    /// `strength` is clamped to `[0, 1]`; 0 keeps the current motion, 1 replaces it.
    pub fn apply_guidance(&mut self, owner: &Entity, target: Point, strength: f64) {
        let strength = strength.clamp(0.0, 1.0);
        let (center_x, center_y) = owner.mask_center();
        let ideal_x = f64::from(target.x) - center_x;
        let ideal_y = f64::from(target.y) - center_y;

        self.x_remainder = self.x_remainder * (1.0 - strength) + ideal_x * strength;
        self.y_remainder = self.y_remainder * (1.0 - strength) + ideal_y * strength;
    }

    /// Warn once when a controller ticks without a world
    pub(crate) fn note_unattached(&mut self, owner: &Entity) {
        if self.world.is_none() && !self.warned_unattached {
            self.warned_unattached = true;
            warn!(
                entity = owner.id.0,
                "movement component ticking without a world, collisions are disabled"
            );
        }
    }

    /// Add a displacement to the remainders and take out the whole pixels.
    ///
    /// Truncation is toward zero, so the leftover fraction keeps the sign of
    /// the motion and the average speed is preserved across ticks.
    pub(crate) fn accumulate(&mut self, move_x: f64, move_y: f64) -> (i32, i32) {
        self.x_remainder += move_x;
        self.y_remainder += move_y;

        let x_steps = self.x_remainder.trunc() as i32;
        let y_steps = self.y_remainder.trunc() as i32;

        self.x_remainder -= f64::from(x_steps);
        self.y_remainder -= f64::from(y_steps);

        (x_steps, y_steps)
    }

    /// Move the owner one pixel at a time along an axis.
    ///
    /// Stops at the first blocked pixel and discards that axis' remainder.
    /// Returns the number of pixels actually moved.
    pub(crate) fn step_axis<F>(&mut self, owner: &mut Entity, axis: Axis, steps: i32, is_clear: &F) -> i32
    where
        F: Fn(&MotionBase, &Entity, i32, i32) -> bool,
    {
        let sign = steps.signum();
        let mut moved = 0;

        for _ in 0..steps.abs() {
            let (next_x, next_y) = match axis {
                Axis::X => (owner.x + sign, owner.y),
                Axis::Y => (owner.x, owner.y + sign),
            };

            if !is_clear(&*self, &*owner, next_x, next_y) {
                match axis {
                    Axis::X => self.x_remainder = 0.0,
                    Axis::Y => self.y_remainder = 0.0,
                }
                break;
            }

            owner.set_position(next_x, next_y);
            moved += sign;
        }

        moved
    }
}
