use std::rc::Rc;

use crate::entity::Entity;
use crate::error::MotionError;
use crate::motion::{Axis, MotionBase};
use crate::world::TileWorld;

/// Movement driven by an externally supplied direction, typically player input
pub struct DirectMotion {
    base: MotionBase,
    /// Raw direction as last set; zero means "no intent"
    direction: (f64, f64),
}

impl DirectMotion {
    pub fn new(speed: f64) -> Self {
        DirectMotion {
            base: MotionBase::new(speed),
            direction: (0.0, 0.0),
        }
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

    /// Store a raw, possibly non-unit direction vector
    pub fn set_direction(&mut self, dx: f64, dy: f64) {
        self.direction = (dx, dy);
    }

    pub fn direction(&self) -> (f64, f64) {
        self.direction
    }

    pub fn velocity(&self) -> (f64, f64) {
        self.base.velocity()
    }

    /// Advance the owner by one tick.
    ///
    /// X is stepped before Y, so a diagonal move blocked on one axis still
    /// completes on the other.
    pub fn update(&mut self, owner: &mut Entity, others: &[Entity]) {
        self.base.note_unattached(owner);

        let (dx, dy) = self.direction;
        if dx == 0.0 && dy == 0.0 {
            self.base.reset_remainders();
            self.base.set_velocity(0.0, 0.0);
            return;
        }

        let length = (dx * dx + dy * dy).sqrt();
        let (mut move_x, mut move_y) = (dx, dy);
        if length > 0.0 {
            move_x /= length;
            move_y /= length;
        }
        move_x *= self.base.speed();
        move_y *= self.base.speed();
        self.base.set_velocity(move_x, move_y);

        let (x_steps, y_steps) = self.base.accumulate(move_x, move_y);
        let is_clear =
            |base: &MotionBase, owner: &Entity, x: i32, y: i32| base.is_path_clear(owner, others, x, y);

        if x_steps != 0 {
            self.base.step_axis(owner, Axis::X, x_steps, &is_clear);
        }
        if y_steps != 0 {
            self.base.step_axis(owner, Axis::Y, y_steps, &is_clear);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::TileMap;

    fn attached(speed: f64, map: TileMap) -> DirectMotion {
        let mut motion = DirectMotion::new(speed);
        motion.attach_world(Rc::new(map)).unwrap();
        motion
    }

    #[test]
    fn test_zero_direction_resets_remainders() {
        let mut motion = DirectMotion::new(0.5);
        let mut owner = Entity::new(0, 0, 8, 8);

        motion.set_direction(1.0, 0.0);
        motion.update(&mut owner, &[]);
        assert_eq!(motion.base().remainder(), (0.5, 0.0));

        motion.set_direction(0.0, 0.0);
        motion.update(&mut owner, &[]);
        assert_eq!(motion.base().remainder(), (0.0, 0.0));
        assert_eq!(motion.velocity(), (0.0, 0.0));
        assert_eq!(owner.x, 0);
    }

    #[test]
    fn test_direction_is_normalized() {
        let mut motion = DirectMotion::new(2.0);
        let mut owner = Entity::new(0, 0, 8, 8);

        motion.set_direction(10.0, 0.0);
        motion.update(&mut owner, &[]);
        assert_eq!(owner.x, 2);
        assert_eq!(motion.velocity(), (2.0, 0.0));
    }

    #[test]
    fn test_blocked_y_still_moves_x() {
        // Wall directly below the owner
        let map = TileMap::with_solid(4, 4, 16, 16, &[(0, 1), (1, 1)]).unwrap();
        let mut motion = attached(3.0, map);
        let mut owner = Entity::new(0, 8, 8, 8);

        motion.set_direction(1.0, 1.0);
        for _ in 0..4 {
            motion.update(&mut owner, &[]);
        }

        assert_eq!(owner.y, 8);
        assert!(owner.x > 0);
        assert_eq!(motion.base().remainder().1, 0.0);
    }
}
