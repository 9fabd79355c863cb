//! Simulation root: owns entities and their movement controllers and hands
//! the world to every controller once it is loaded.

use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::direct::DirectMotion;
use crate::entity::{Entity, EntityId};
use crate::error::MotionError;
use crate::motion::MotionBase;
use crate::patrol::Patrol;
use crate::seeking::{SeekingMotion, Target};
use crate::world::TileWorld;

/// Movement controller driving one entity
pub enum Controller {
    Direct(DirectMotion),
    Seeking {
        motion: SeekingMotion,
        patrol: Option<Patrol>,
    },
}

impl Controller {
    pub fn seeking(motion: SeekingMotion) -> Self {
        Controller::Seeking {
            motion,
            patrol: None,
        }
    }

    pub fn patrolling(motion: SeekingMotion, patrol: Patrol) -> Self {
        Controller::Seeking {
            motion,
            patrol: Some(patrol),
        }
    }

    pub fn base(&self) -> &MotionBase {
        match self {
            Controller::Direct(motion) => motion.base(),
            Controller::Seeking { motion, .. } => motion.base(),
        }
    }

    fn attach_world(&mut self, world: Rc<dyn TileWorld>) -> Result<(), MotionError> {
        match self {
            Controller::Direct(motion) => motion.attach_world(world),
            Controller::Seeking { motion, .. } => motion.attach_world(world),
        }
    }

    fn update(&mut self, owner: &mut Entity, others: &[Entity]) {
        match self {
            Controller::Direct(motion) => motion.update(owner, others),
            Controller::Seeking { motion, patrol } => {
                if let Some(patrol) = patrol {
                    patrol.update(owner);
                    if let Some(point) = patrol.current_target() {
                        if motion.target() != Target::Point(point) {
                            motion.set_target_point(point);
                        }
                    }
                }
                motion.update(owner, others);
            }
        }
    }
}

struct Slot {
    owner: EntityId,
    controller: Controller,
}

/// Explicitly constructed simulation context
#[derive(Default)]
pub struct Scene {
    world: Option<Rc<dyn TileWorld>>,
    entities: Vec<Entity>,
    controllers: Vec<Slot>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn world(&self) -> Option<&Rc<dyn TileWorld>> {
        self.world.as_ref()
    }

    /// Add an entity and return its freshly assigned id
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.id = id;
        self.entities.push(entity);
        id
    }

    /// Remove an entity together with its controller
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.entities.iter().position(|entity| entity.id == id)?;
        self.controllers.retain(|slot| slot.owner != id);
        Some(self.entities.remove(index))
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Give an entity a movement controller, replacing any previous one.
    ///
    /// The controller adopts the world right away if one is already loaded.
    pub fn add_controller(&mut self, owner: EntityId, mut controller: Controller) {
        if let Some(world) = &self.world {
            if let Err(err) = controller.attach_world(world.clone()) {
                debug!(entity = owner.0, %err, "controller keeps its own world");
            }
        }

        self.controllers.retain(|slot| slot.owner != owner);
        self.controllers.push(Slot { owner, controller });
    }

    pub fn controller(&self, owner: EntityId) -> Option<&Controller> {
        self.controllers
            .iter()
            .find(|slot| slot.owner == owner)
            .map(|slot| &slot.controller)
    }

    pub fn controller_mut(&mut self, owner: EntityId) -> Option<&mut Controller> {
        self.controllers
            .iter_mut()
            .find(|slot| slot.owner == owner)
            .map(|slot| &mut slot.controller)
    }

    /// Deliver a freshly loaded world to every controller that has none yet.
    ///
    /// A scene holds one world for its lifetime; later loads are ignored.
    pub fn load_world(&mut self, world: Rc<dyn TileWorld>) {
        if self.world.is_some() {
            warn!(
                width = world.width(),
                height = world.height(),
                "scene already has a world; ignoring the new one"
            );
            return;
        }

        info!(
            width = world.width(),
            height = world.height(),
            entities = self.entities.len(),
            "world loaded"
        );

        for slot in &mut self.controllers {
            if !slot.controller.base().is_attached() {
                // Cannot fail: the controller has no world yet
                let _ = slot.controller.attach_world(world.clone());
            }
        }
        self.world = Some(world);
    }

    /// Run one simulation step for every controller, in spawn order.
    ///
    /// Each owner is copied out, moved against the current entity list and
    /// written back, so later entities see earlier moves of the same tick.
    pub fn tick(&mut self) {
        let entities = &mut self.entities;
        self.controllers
            .retain(|slot| entities.iter().any(|entity| entity.id == slot.owner));

        for slot in &mut self.controllers {
            let Some(index) = entities.iter().position(|entity| entity.id == slot.owner) else {
                continue;
            };

            let mut owner = entities[index];
            slot.controller.update(&mut owner, entities.as_slice());
            entities[index] = owner;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Point, TileKind, TileMap};

    #[test]
    fn test_spawn_assigns_monotonic_ids() {
        let mut scene = Scene::new();
        let a = scene.spawn(Entity::new(0, 0, 8, 8));
        let b = scene.spawn(Entity::new(0, 0, 8, 8));
        scene.despawn(a);
        let c = scene.spawn(Entity::new(0, 0, 8, 8));

        assert_eq!((a, b, c), (EntityId(0), EntityId(1), EntityId(2)));
        assert!(scene.entity(a).is_none());
        assert_eq!(scene.entities().len(), 2);
    }

    #[test]
    fn test_load_world_attaches_existing_and_later_controllers() {
        let mut scene = Scene::new();
        let early = scene.spawn(Entity::new(0, 0, 8, 8));
        scene.add_controller(early, Controller::Direct(DirectMotion::new(1.0)));
        assert!(!scene.controller(early).unwrap().base().is_attached());

        scene.load_world(Rc::new(TileMap::new(4, 4, 16, 16).unwrap()));
        assert!(scene.controller(early).unwrap().base().is_attached());

        let late = scene.spawn(Entity::new(16, 16, 8, 8));
        scene.add_controller(late, Controller::seeking(SeekingMotion::new(1.0)));
        assert!(scene.controller(late).unwrap().base().is_attached());
    }

    #[test]
    fn test_second_world_load_is_ignored() {
        let mut scene = Scene::new();
        let early = scene.spawn(Entity::new(0, 0, 8, 8));
        scene.add_controller(early, Controller::Direct(DirectMotion::new(1.0)));

        scene.load_world(Rc::new(TileMap::new(4, 4, 16, 16).unwrap()));
        scene.load_world(Rc::new(TileMap::from_layout("#...\n....\n", 16, 16).unwrap()));

        let late = scene.spawn(Entity::new(16, 16, 8, 8));
        scene.add_controller(late, Controller::seeking(SeekingMotion::new(1.0)));

        assert_eq!(scene.world().unwrap().tile_at(0, 0), TileKind::Free);
        for id in [early, late] {
            let world = scene.controller(id).unwrap().base().world().unwrap();
            assert_eq!(world.height(), 4);
            assert_eq!(world.tile_at(0, 0), TileKind::Free);
        }
    }

    #[test]
    fn test_despawned_owner_drops_its_controller() {
        let mut scene = Scene::new();
        let id = scene.spawn(Entity::new(0, 0, 8, 8));
        let mut motion = SeekingMotion::new(1.0);
        motion.set_target_point(Point::new(100, 100));
        scene.add_controller(id, Controller::seeking(motion));

        scene.despawn(id);
        scene.tick();
        assert!(scene.controller(id).is_none());
    }
}
