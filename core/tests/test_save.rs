use gm_core::grid::Cell;
use gm_core::save::{GaeaMapData, ObjectData, SaveData, SaveStore, SavedVector3};
use gm_core::session::{Command, Event, Session};
use gm_core::terrain::TerrainType;
use gm_core::GmConfig;
use glam::Vec3;

fn sample_save() -> SaveData {
    let mut data = SaveData::new("river_crossing");
    data.objects.push(ObjectData::terrain_tile(
        "Tile(Clone)",
        Vec3::new(0.0, 0.0, 0.0),
        TerrainType::Grass,
    ));
    data.objects.push(ObjectData::terrain_tile(
        "Tile(Clone)",
        Vec3::new(2.0, 0.0, 0.0),
        TerrainType::Water,
    ));
    data.gaea_map_data = Some(GaeaMapData {
        image_path: "maps/river.png".to_string(),
        obj_path: "maps/river.obj".to_string(),
        map_position: SavedVector3::default(),
        map_scale: Vec3::ONE.into(),
    });
    data
}

#[test]
fn test_store_round_trip_and_listing() {
    let dir = tempfile::tempdir().unwrap();
    let store = SaveStore::new(dir.path().join("saves"));
    assert!(store.list().unwrap().is_empty());

    let data = sample_save();
    let path = store.save(&data).unwrap();
    assert!(path.ends_with("river_crossing.json"));

    let mut other = SaveData::new("ambush");
    other.objects.push(ObjectData::terrain_tile("t", Vec3::ZERO, TerrainType::Mud));
    store.save(&other).unwrap();
    std::fs::write(store.dir().join("notes.txt"), "ignored").unwrap();

    assert_eq!(store.list().unwrap(), vec!["ambush", "river_crossing"]);
    assert_eq!(store.load("river_crossing").unwrap(), data);
}

#[test]
fn test_missing_save_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = SaveStore::new(dir.path());
    let err = store.load("nope").unwrap_err();
    assert!(err.to_string().contains("nope.json"));
}

#[test]
fn test_session_rebuilds_from_save() {
    let config = GmConfig::from_toml_str(
        "[grid]\nwidth = 4\nheight = 4\ntile_footprint = 1.0\nspacing_multiplier = 1.0\n",
    )
    .unwrap();
    let mut session = Session::with_seed(config, 3).unwrap();

    let event = session.apply(Command::RebuildFromSave(sample_save())).unwrap();
    let Event::GridRebuilt(report) = event else {
        panic!("unexpected event: {event:?}");
    };
    assert_eq!(report.placed, 2);
    assert_eq!(session.grid().width(), 3);
    assert_eq!(session.grid().height(), 1);
    assert_eq!(session.grid().tile_at(Vec3::new(2.0, 0.0, 0.0)), Some(TerrainType::Water));
    assert_eq!(session.grid().tile_at(Vec3::new(1.0, 0.0, 0.0)), Some(TerrainType::None));
}

#[test]
fn test_save_without_tiles_keeps_grid() {
    let config = GmConfig::from_toml_str("[grid]\nwidth = 4\nheight = 4\n").unwrap();
    let mut session = Session::with_seed(config, 3).unwrap();
    let before = session.grid().clone();

    session.apply(Command::RebuildFromSave(SaveData::new("empty"))).unwrap();
    assert_eq!(session.grid(), &before);
}

#[test]
fn test_save_with_huge_spread_is_rejected() {
    let config = GmConfig::from_toml_str("[grid]\nwidth = 4\nheight = 4\n").unwrap();
    let mut session = Session::with_seed(config, 3).unwrap();
    let before = session.grid().clone();

    let mut data = SaveData::new("corrupt");
    data.objects.push(ObjectData::terrain_tile("Tile(Clone)", Vec3::ZERO, TerrainType::Grass));
    data.objects.push(ObjectData::terrain_tile(
        "Tile(Clone)",
        Vec3::new(1e38, 0.0, 0.0),
        TerrainType::Rock,
    ));
    let err = session.apply(Command::RebuildFromSave(data)).unwrap_err();
    assert!(err.to_string().contains("corrupt"));
    assert_eq!(session.grid(), &before);
}

#[test]
fn test_paint_after_rebuild_hits_same_cell() {
    let config = GmConfig::from_toml_str(
        "[grid]\nwidth = 4\nheight = 4\ntile_footprint = 1.0\nspacing_multiplier = 1.0\n",
    )
    .unwrap();
    let mut session = Session::with_seed(config, 3).unwrap();
    session.apply(Command::SelectTerrain(TerrainType::Mud)).unwrap();

    // 舊網格原點 (-1.5, -1.5)，格子 (2, 0)
    let event = session
        .apply(Command::Paint {
            at: Vec3::new(0.5, 0.0, -1.5),
        })
        .unwrap();
    assert_eq!(event, Event::Painted(Some(Cell { x: 2, y: 0 })));

    // 重建後原點 (0, 0)，同樣是格子 (2, 0)
    session.apply(Command::RebuildFromSave(sample_save())).unwrap();
    let event = session
        .apply(Command::Paint {
            at: Vec3::new(2.0, 0.0, 0.0),
        })
        .unwrap();
    assert_eq!(event, Event::Painted(Some(Cell { x: 2, y: 0 })));
    assert_eq!(session.grid().tile_at(Vec3::new(2.0, 0.0, 0.0)), Some(TerrainType::Mud));
}
