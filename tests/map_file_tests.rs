use std::fs;

use tempfile::tempdir;
use tilemotion::config::{Config, ConfigOrigin};
use tilemotion::{ConfigError, LayerRules, MapError, MapFile, PenaltyMode, Point, TileKind, TileWorld};

const LEVEL: &str = r#"{
    "width": 4,
    "height": 3,
    "tilewidth": 16,
    "tileheight": 16,
    "layers": [
        { "name": "floor", "type": "tilelayer", "data": [1,1,1,1, 1,1,1,1, 1,1,1,1] },
        { "name": "walls", "type": "tilelayer", "data": [7,7,7,7, 0,0,0,0, 7,0,0,7] },
        { "name": "ledges", "type": "tilelayer", "data": [0,0,0,0, 0,3,3,0, 0,0,0,0] },
        { "name": "routes", "type": "objectgroup", "objects": [
            { "name": "guard", "x": 8, "y": 24,
              "polyline": [ { "x": 0, "y": 0 }, { "x": 48, "y": 0 } ] }
        ] }
    ]
}"#;

const CONFIG: &str = r#"
[world]
map_path = "level.json"
solid_layers = ["walls"]
one_way_layers = ["ledges"]

[pathfinding]
wall_proximity_penalty = 4.0
"#;

#[test]
fn test_config_and_map_load_from_disk() {
    let dir = tempdir().unwrap();
    let map_path = dir.path().join("level.json");
    let config_path = dir.path().join("config.toml");
    fs::write(&map_path, LEVEL).unwrap();
    fs::write(&config_path, CONFIG).unwrap();

    let config = Config::from_path(&config_path).unwrap();
    assert_eq!(config.world.map_path.as_deref(), Some("level.json"));
    assert_eq!(config.path_options().penalty, PenaltyMode::WallProximity(4.0));

    let rules = config.layer_rules();
    let file = MapFile::load(dir.path().join("level.json")).unwrap();
    let map = file.to_tile_map(&rules).unwrap();

    println!("{}", map.to_layout_string());
    assert_eq!(map.to_layout_string(), "####\n.==.\n#..#\n");
    assert_eq!(map.tile_at(1, 1), TileKind::OneWay);

    let routes = file.routes();
    assert_eq!(routes[0].points, vec![Point::new(8, 24), Point::new(56, 24)]);
}

#[test]
fn test_missing_files_are_io_errors() {
    let dir = tempdir().unwrap();

    assert!(matches!(
        MapFile::load(dir.path().join("absent.json")),
        Err(MapError::Io(_))
    ));
    assert!(matches!(
        Config::from_path(dir.path().join("absent.toml")),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn test_malformed_map_is_a_json_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ \"width\": 4 ").unwrap();

    assert!(matches!(MapFile::load(&path), Err(MapError::Json(_))));
}

#[test]
fn test_oversized_map_is_rejected() {
    let json = r#"{ "width": 70000, "height": 70000, "tilewidth": 16, "tileheight": 16 }"#;
    let err = MapFile::from_json(json)
        .unwrap()
        .to_tile_map(&LayerRules::default())
        .unwrap_err();

    assert!(matches!(err, MapError::TooLarge { cols: 70000, rows: 70000 }));
}

#[test]
fn test_config_load_reports_fallback_reason() {
    let dir = tempdir().unwrap();
    let broken = dir.path().join("config.toml");
    fs::write(&broken, "[movement]\nai_speed = \"fast\"\n").unwrap();

    let (config, origin) = Config::load_from(&broken);
    assert_eq!(config.movement.ai_speed, 1.0, "defaults are used");
    assert!(matches!(origin, ConfigOrigin::Fallback(ConfigError::Toml(_))));

    let (_, origin) = Config::load_from(dir.path().join("absent.toml"));
    assert!(matches!(origin, ConfigOrigin::Defaults));

    fs::write(&broken, CONFIG).unwrap();
    let (config, origin) = Config::load_from(&broken);
    assert!(matches!(origin, ConfigOrigin::File));
    assert_eq!(config.world.map_path.as_deref(), Some("level.json"));
}
