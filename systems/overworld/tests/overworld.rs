use highlands_core::{
    Command, Direction, GameConfig, PlayerIntent, Sprite, Tile, TileId, WorldConfig,
};
use highlands_system_overworld::Overworld;
use highlands_system_patrol::PathNode;
use highlands_world::query;

fn walk(direction: Direction) -> PlayerIntent {
    PlayerIntent {
        direction: Some(direction),
        interact: false,
    }
}

const INTERACT: PlayerIntent = PlayerIntent {
    direction: None,
    interact: true,
};

#[test]
fn wall_column_blocks_player_and_turns_them() {
    let config = GameConfig {
        world: WorldConfig {
            width: 4,
            height: 4,
            ..WorldConfig::default()
        },
        ..GameConfig::default()
    };
    let mut overworld = Overworld::new(&config, Tile::new(1, 1)).expect("spawns");
    for y in 0..4 {
        overworld.apply(Command::SetWall {
            tile: Tile::new(2, y),
            wall: true,
        });
    }

    overworld.update(walk(Direction::Right));

    let player = query::actor(overworld.world(), overworld.player()).expect("player");
    assert_eq!(player.target(), None);
    assert_eq!(player.facing(), Direction::Right);
    assert_eq!(player.tile(), Tile::new(1, 1));
}

#[test]
fn talking_to_an_npc_opens_and_closes_dialog() {
    let mut overworld = Overworld::new(&GameConfig::default(), Tile::new(5, 2)).expect("spawns");
    let npc = overworld
        .add_npc(Sprite::Player, Tile::new(5, 4), "Hello there!", Vec::new())
        .expect("npc spawns");

    overworld.update(walk(Direction::Down));
    overworld.update(PlayerIntent::default());
    let player = query::actor(overworld.world(), overworld.player()).expect("player");
    assert_eq!(player.tile(), Tile::new(5, 3));

    overworld.update(INTERACT);
    assert!(overworld.dialog().is_open());
    assert_eq!(overworld.talking_to(), Some(npc));
    let npc_actor = overworld.patrol().npc(npc).expect("npc").actor();
    let facing = query::actor(overworld.world(), npc_actor)
        .expect("npc actor")
        .facing();
    assert_eq!(facing, Direction::Up);

    overworld.update(INTERACT);
    assert!(overworld.dialog().is_fully_revealed());
    overworld.update(INTERACT);
    assert!(!overworld.dialog().is_open());
    assert_eq!(overworld.talking_to(), None);
}

#[test]
fn talked_to_npc_pauses_its_patrol() {
    let mut overworld = Overworld::new(&GameConfig::default(), Tile::new(5, 3)).expect("spawns");
    let route = vec![
        PathNode::new(Tile::new(5, 4), 200, Direction::Down),
        PathNode::new(Tile::new(9, 4), 0, Direction::Down),
    ];
    let npc = overworld
        .add_npc(Sprite::Player, Tile::new(5, 4), "Wait a moment.", route)
        .expect("npc spawns");
    let npc_actor = overworld.patrol().npc(npc).expect("npc").actor();

    overworld.update(INTERACT);
    assert_eq!(overworld.talking_to(), Some(npc));
    let timer = overworld.patrol().npc(npc).expect("npc").path_timer();

    for _ in 0..50 {
        overworld.update(PlayerIntent::default());
    }
    assert_eq!(overworld.patrol().npc(npc).expect("npc").path_timer(), timer);
    let actor = query::actor(overworld.world(), npc_actor).expect("npc actor");
    assert_eq!(actor.facing(), Direction::Up);
    assert_eq!(actor.tile(), Tile::new(5, 4));
}

#[test]
fn camera_follows_player_toward_far_corner() {
    let mut overworld = Overworld::new(&GameConfig::default(), Tile::new(0, 0)).expect("spawns");
    for _ in 0..40 {
        overworld.update(walk(Direction::Right));
    }
    for _ in 0..40 {
        overworld.update(walk(Direction::Down));
    }

    let player = query::actor(overworld.world(), overworld.player()).expect("player");
    assert_eq!(player.tile(), Tile::new(19, 17));
    assert_eq!(overworld.camera().position(), overworld.camera().max_position());
}

#[test]
fn load_grid_reports_success_and_failure() {
    let directory = tempfile::tempdir().expect("temporary directory");
    let path = directory.path().join("world.map");

    let mut source = Overworld::new(&GameConfig::default(), Tile::new(0, 0)).expect("spawns");
    source.apply(Command::ResizeGrid {
        width: 12,
        height: 10,
    });
    source.apply(Command::SetTile {
        tile: Tile::new(11, 9),
        id: TileId::new(3),
    });
    source.apply(Command::SaveGrid { path: path.clone() });

    let mut target = Overworld::new(&GameConfig::default(), Tile::new(0, 0)).expect("spawns");
    assert!(!target.load_grid(&directory.path().join("missing.map")));
    assert_eq!(query::grid(target.world()).width(), 20);

    assert!(target.load_grid(&path));
    let grid = query::grid(target.world());
    assert_eq!((grid.width(), grid.height()), (12, 10));
    assert_eq!(grid.tile_id(Tile::new(11, 9)), Some(TileId::new(3)));
    assert_eq!(
        target.camera().max_position(),
        highlands_core::Pixel::new(12 * 16 - 160, 10 * 16 - 144)
    );
}
