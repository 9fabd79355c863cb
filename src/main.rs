use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result};
use arboard::Clipboard;
use macroquad::prelude::*;
use tracing::{error, info, warn};

use tilemotion::config::Config;
use tilemotion::logging;
use tilemotion::{
    ActorKind, CollisionKind, Controller, DirectMotion, Entity, EntityId, MapFile, Patrol,
    PatrolMode, Point, Scene, SeekingMotion, TileMap, TileWorld,
};

/// Level used when no map file is configured
const DEFAULT_LAYOUT: &str = "\
####################
#..................#
#..######....#.....#
#.......#....#.....#
#.......#....###...#
#..=====#..........#
#...........####...#
#...####...........#
#......#....#......#
#......#....#..##..#
#...........#......#
####################
";

const SCALE: f32 = 2.0;

/// Visualization state
struct DemoState {
    scene: Scene,
    world: Rc<RefCell<TileMap>>,
    player: EntityId,
    chaser: EntityId,
    guard: EntityId,
}

impl DemoState {
    fn new(config: &Config) -> Result<Self> {
        let (map, routes) = match &config.world.map_path {
            Some(path) => {
                let file = MapFile::load(path).with_context(|| format!("loading map {path}"))?;
                let map = file
                    .to_tile_map(&config.layer_rules())
                    .with_context(|| format!("building collision map from {path}"))?;
                (map, file.routes())
            }
            None => (
                TileMap::from_layout(DEFAULT_LAYOUT, config.world.tile_width, config.world.tile_height)
                    .context("parsing built-in layout")?,
                Vec::new(),
            ),
        };

        let tw = map.tile_width();
        let th = map.tile_height();
        let mut scene = Scene::new();

        let player = scene.spawn(
            Entity::new(2 * tw, 2 * th, 12, 12)
                .with_collision(CollisionKind::CharacterSolid)
                .with_actor(ActorKind::Character),
        );
        let chaser = scene.spawn(
            Entity::new(17 * tw, 9 * th, 12, 12).with_actor(ActorKind::Character),
        );
        let guard = scene.spawn(
            Entity::new(15 * tw, 2 * th, 12, 12).with_actor(ActorKind::Character),
        );

        let movement = &config.movement;
        scene.add_controller(player, Controller::Direct(DirectMotion::new(movement.player_speed)));

        let mut chase = SeekingMotion::new(movement.ai_speed)
            .with_pathfinding(movement.use_pathfinding)
            .with_avoidance(movement.avoid_other_actors)
            .with_path_options(config.path_options())
            .with_recalculate_interval(movement.recalculate_interval)
            .with_arrival_threshold(movement.arrival_threshold);
        chase.set_target_entity(player);
        scene.add_controller(chaser, Controller::seeking(chase));

        let route = routes
            .into_iter()
            .find(|route| route.name == "guard")
            .map(|route| route.points)
            .unwrap_or_else(|| {
                vec![
                    Point::new(15 * tw + tw / 2, 2 * th + th / 2),
                    Point::new(15 * tw + tw / 2, 5 * th + th / 2),
                    Point::new(11 * tw + tw / 2, 5 * th + th / 2),
                ]
            });
        let patrol = Patrol::new(route, PatrolMode::PingPong, f64::from(tw) / 2.0);
        let walk = SeekingMotion::new(movement.ai_speed)
            .with_pathfinding(movement.use_pathfinding)
            .with_path_options(config.path_options())
            .with_arrival_threshold(movement.arrival_threshold);
        scene.add_controller(guard, Controller::patrolling(walk, patrol));

        let world = Rc::new(RefCell::new(map));
        scene.load_world(world.clone());

        Ok(DemoState {
            scene,
            world,
            player,
            chaser,
            guard,
        })
    }

    fn handle_input(&mut self) {
        let mut dx = 0.0;
        let mut dy = 0.0;
        if is_key_down(KeyCode::A) || is_key_down(KeyCode::Left) {
            dx -= 1.0;
        }
        if is_key_down(KeyCode::D) || is_key_down(KeyCode::Right) {
            dx += 1.0;
        }
        if is_key_down(KeyCode::W) || is_key_down(KeyCode::Up) {
            dy -= 1.0;
        }
        if is_key_down(KeyCode::S) || is_key_down(KeyCode::Down) {
            dy += 1.0;
        }

        if let Some(Controller::Direct(motion)) = self.scene.controller_mut(self.player) {
            motion.set_direction(dx, dy);
        }

        if is_mouse_button_pressed(MouseButton::Left) {
            let (mouse_x, mouse_y) = mouse_position();
            self.toggle_tile(mouse_x, mouse_y);
        }
    }

    fn toggle_tile(&mut self, mouse_x: f32, mouse_y: f32) {
        let (tw, th) = {
            let map = self.world.borrow();
            (map.tile_width() as f32, map.tile_height() as f32)
        };
        let tile_x = (mouse_x / SCALE / tw).floor() as i32;
        let tile_y = (mouse_y / SCALE / th).floor() as i32;

        self.world.borrow_mut().toggle_solid(tile_x, tile_y);
        info!(tile_x, tile_y, revision = self.world.borrow().revision(), "tile toggled");

        // Routes computed before the edit may now cross a wall
        for id in [self.chaser, self.guard] {
            if let Some(Controller::Seeking { motion, .. }) = self.scene.controller_mut(id) {
                motion.invalidate_path();
            }
        }
    }

    fn copy_to_clipboard(&self) {
        let layout = self.world.borrow().to_layout_string();
        match Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(layout) {
                    warn!(error = %e, "failed to copy to clipboard");
                } else {
                    info!("layout copied to clipboard");
                    // Keep clipboard alive for a moment so clipboard managers can capture it
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to access clipboard");
            }
        }
    }

    fn draw(&self) {
        clear_background(Color::from_rgba(30, 30, 30, 255));

        let map = self.world.borrow();
        let tw = map.tile_width() as f32 * SCALE;
        let th = map.tile_height() as f32 * SCALE;

        for y in 0..map.height() {
            for x in 0..map.width() {
                let kind = map.tile_at(x, y);
                let color = if kind.is_solid() {
                    Color::from_rgba(150, 60, 60, 255)
                } else if kind == tilemotion::TileKind::OneWay {
                    Color::from_rgba(150, 120, 60, 255)
                } else {
                    Color::from_rgba(60, 60, 60, 255)
                };
                draw_rectangle(x as f32 * tw, y as f32 * th, tw - 1.0, th - 1.0, color);
            }
        }

        if let Some(Controller::Seeking { motion, .. }) = self.scene.controller(self.chaser) {
            for pair in motion.path().windows(2) {
                draw_line(
                    pair[0].x as f32 * SCALE,
                    pair[0].y as f32 * SCALE,
                    pair[1].x as f32 * SCALE,
                    pair[1].y as f32 * SCALE,
                    2.0,
                    YELLOW,
                );
            }
        }

        for entity in self.scene.entities() {
            let color = if entity.id == self.player {
                BLUE
            } else if entity.id == self.chaser {
                ORANGE
            } else {
                GREEN
            };
            draw_rectangle(
                entity.x as f32 * SCALE,
                entity.y as f32 * SCALE,
                entity.width as f32 * SCALE,
                entity.height as f32 * SCALE,
                color,
            );
        }

        draw_text(
            "WASD/arrows: move   Left click: toggle wall   C: copy layout   Esc: close",
            10.0,
            screen_height() - 10.0,
            20.0,
            WHITE,
        );
    }
}

async fn run() -> Result<()> {
    let (config, origin) = Config::load();
    logging::init(&config.logging.filter);
    origin.log();
    info!(
        map = config.world.map_path.as_deref().unwrap_or("<built-in>"),
        pathfinding = config.movement.use_pathfinding,
        "starting demo"
    );

    let mut state = DemoState::new(&config)?;

    loop {
        state.handle_input();

        // Copy layout to clipboard on C key
        if is_key_pressed(KeyCode::C) {
            state.copy_to_clipboard();
        }

        // Close window on Escape
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        state.scene.tick();
        state.draw();

        next_frame().await
    }

    Ok(())
}

#[macroquad::main("tilemotion")]
async fn main() {
    if let Err(err) = run().await {
        error!("{err:#}");
        eprintln!("error: {err:#}");
    }
}
