use crate::entity::Entity;
use crate::world::Point;

/// What happens at the end of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatrolMode {
    /// Jump back to the first point
    #[default]
    Loop,
    /// Walk the route backwards, then forwards again
    PingPong,
}

/// Follows a fixed route of world points, one at a time
#[derive(Debug, Clone)]
pub struct Patrol {
    points: Vec<Point>,
    mode: PatrolMode,
    arrival_threshold: f64,
    index: usize,
    /// +1 walking forward, -1 walking back
    direction: isize,
}

impl Patrol {
    pub fn new(points: Vec<Point>, mode: PatrolMode, arrival_threshold: f64) -> Self {
        Patrol {
            points,
            mode,
            arrival_threshold,
            index: 0,
            direction: 1,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn mode(&self) -> PatrolMode {
        self.mode
    }

    /// Point the owner should currently walk to
    pub fn current_target(&self) -> Option<Point> {
        self.points.get(self.index).copied()
    }

    /// Advance to the next point once the owner's mask center is close enough
    pub fn update(&mut self, owner: &Entity) {
        let Some(target) = self.current_target() else {
            return;
        };

        let (center_x, center_y) = owner.mask_center();
        let distance = (center_x - f64::from(target.x)).hypot(center_y - f64::from(target.y));
        if distance < self.arrival_threshold {
            self.advance();
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.direction = 1;
    }

    fn advance(&mut self) {
        let len = self.points.len();
        match self.mode {
            PatrolMode::Loop => {
                self.index = (self.index + 1) % len;
            }
            PatrolMode::PingPong => {
                if len == 1 {
                    return;
                }
                let next = self.index as isize + self.direction;
                if next < 0 || next >= len as isize {
                    self.direction = -self.direction;
                }
                self.index = (self.index as isize + self.direction) as usize;
            }
        }
    }
}
