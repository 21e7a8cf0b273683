use highlands_core::{Command, Event, Tile, TileId, WorldConfig};
use highlands_world::{apply, map_file, query, World};

fn world_with_size(width: u32, height: u32) -> World {
    let config = WorldConfig {
        width,
        height,
        ..WorldConfig::default()
    };
    World::new(&config).expect("valid world")
}

fn paint_pattern(world: &mut World) {
    let grid = query::grid(world);
    let (width, height) = (grid.width() as i32, grid.height() as i32);
    let mut events = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let tile = Tile::new(x, y);
            apply(
                world,
                Command::SetTile {
                    tile,
                    id: TileId::new((y * 100 + x + 1) as u32),
                },
                &mut events,
            );
            apply(
                world,
                Command::SetWall {
                    tile,
                    wall: (x + y) % 3 == 0,
                },
                &mut events,
            );
        }
    }
}

#[test]
fn shrinking_resize_keeps_overlapping_region() {
    let mut world = world_with_size(10, 9);
    paint_pattern(&mut world);
    let mut events = Vec::new();

    apply(
        &mut world,
        Command::ResizeGrid {
            width: 5,
            height: 5,
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::GridResized {
            width: 5,
            height: 5
        }]
    );

    let grid = query::grid(&world);
    assert_eq!((grid.width(), grid.height()), (5, 5));
    for y in 0..5 {
        for x in 0..5 {
            let tile = Tile::new(x, y);
            assert_eq!(grid.tile_id(tile), Some(TileId::new((y * 100 + x + 1) as u32)));
            assert_eq!(grid.is_wall(tile), Some((x + y) % 3 == 0));
        }
    }
    assert_eq!(grid.tile_id(Tile::new(5, 0)), None);
}

#[test]
fn growing_resize_zero_fills_new_cells() {
    let mut world = world_with_size(2, 2);
    paint_pattern(&mut world);
    let mut events = Vec::new();

    apply(
        &mut world,
        Command::ResizeGrid {
            width: 3,
            height: 4,
        },
        &mut events,
    );

    let grid = query::grid(&world);
    assert_eq!(grid.tile_id(Tile::new(1, 1)), Some(TileId::new(102)));
    assert_eq!(grid.tile_id(Tile::new(2, 0)), Some(TileId::new(0)));
    assert_eq!(grid.tile_id(Tile::new(0, 3)), Some(TileId::new(0)));
    assert_eq!(grid.is_wall(Tile::new(2, 3)), Some(false));
}

#[test]
fn save_then_load_reproduces_grid() {
    let directory = tempfile::tempdir().expect("temporary directory");
    let path = directory.path().join("world.map");

    let mut original = world_with_size(7, 4);
    paint_pattern(&mut original);
    let mut events = Vec::new();
    apply(
        &mut original,
        Command::SaveGrid { path: path.clone() },
        &mut events,
    );
    assert_eq!(events, vec![Event::GridSaved { path: path.clone() }]);

    let mut restored = world_with_size(20, 18);
    events.clear();
    apply(&mut restored, Command::LoadGrid { path }, &mut events);
    assert_eq!(
        events,
        vec![Event::GridLoaded {
            width: 7,
            height: 4
        }]
    );
    assert_eq!(query::grid(&restored), query::grid(&original));
}

#[test]
fn failed_load_leaves_grid_untouched() {
    let directory = tempfile::tempdir().expect("temporary directory");
    let mut world = world_with_size(3, 3);
    paint_pattern(&mut world);
    let before = query::grid(&world).clone();
    let mut events = Vec::new();

    apply(
        &mut world,
        Command::LoadGrid {
            path: directory.path().join("missing.map"),
        },
        &mut events,
    );

    let malformed = directory.path().join("malformed.map");
    std::fs::write(&malformed, "3,3\n1,2,3\n").expect("write map");
    apply(&mut world, Command::LoadGrid { path: malformed }, &mut events);

    assert!(events.is_empty());
    assert_eq!(query::grid(&world), &before);
}

#[test]
fn map_files_written_by_hand_are_readable() {
    let directory = tempfile::tempdir().expect("temporary directory");
    let path = directory.path().join("hand.map");
    std::fs::write(&path, "3,2\n1,1,1,\n0,4,0,\n1,0,0,\n1,0,0,\n").expect("write map");

    let grid = map_file::read(&path).expect("map reads");
    assert_eq!(grid.tile_id(Tile::new(1, 1)), Some(TileId::new(4)));
    assert_eq!(grid.is_wall(Tile::new(0, 1)), Some(true));
    assert_eq!(grid.is_wall(Tile::new(1, 0)), Some(false));
}
