//! Play mode: the starting scenario and per-frame drawing.

use std::path::Path;

use anyhow::{Context, Result};
use glam::IVec2;
use highlands_core::{
    Command, Direction, Event, GameConfig, Pixel, PlayerIntent, Sprite, Tile, TileId, TILE_SIZE,
};
use highlands_rendering::{visible_tiles, FrameInput, SpriteRenderer};
use highlands_system_overworld::Overworld;
use highlands_system_patrol::PathNode;
use highlands_world::{apply, query, World};
use tracing::{info, warn};

const PLAYER_START: Tile = Tile::new(5, 2);
const NPC_START: Tile = Tile::new(6, 6);
const NPC_MESSAGE: &str = "I'm looking for wild mushrooms!";
const NPC_WAIT: u32 = 120;
const STREAM_COLUMN: i32 = 2;
const STREAM_TILE: TileId = TileId::new(1);

/// Builds the starting overworld, loading `map` over the default terrain
/// when it exists.
///
/// Actors are placed once the terrain is final. The player start is pulled
/// inside smaller maps; a villager that does not fit is left out.
pub(crate) fn build_overworld(config: &GameConfig, map: &Path) -> Result<Overworld> {
    let mut world = World::new(&config.world).context("failed to create the world")?;
    let mut events = Vec::new();

    let height = query::grid(&world).height() as i32;
    for y in 0..height {
        let tile = Tile::new(STREAM_COLUMN, y);
        apply(
            &mut world,
            Command::SetTile {
                tile,
                id: STREAM_TILE,
            },
            &mut events,
        );
        apply(&mut world, Command::SetWall { tile, wall: true }, &mut events);
    }

    apply(
        &mut world,
        Command::LoadGrid {
            path: map.to_path_buf(),
        },
        &mut events,
    );
    if events
        .iter()
        .any(|event| matches!(event, Event::GridLoaded { .. }))
    {
        info!(path = %map.display(), "map_loaded");
    }

    let player_tile = inside_grid(&world, PLAYER_START);
    let mut overworld = Overworld::from_world(config, world, player_tile)
        .context("failed to place the player")?;

    if let Err(error) = overworld.add_npc(
        Sprite::Player,
        NPC_START,
        NPC_MESSAGE,
        vec![
            PathNode::new(Tile::new(3, 6), NPC_WAIT, Direction::Down),
            PathNode::new(NPC_START, NPC_WAIT, Direction::Down),
        ],
    ) {
        warn!(error = %error, "villager_not_placed");
    }

    Ok(overworld)
}

fn inside_grid(world: &World, tile: Tile) -> Tile {
    let grid = query::grid(world);
    let last_x = grid.width().saturating_sub(1) as i32;
    let last_y = grid.height().saturating_sub(1) as i32;
    Tile::new(tile.x().clamp(0, last_x), tile.y().clamp(0, last_y))
}

/// Player intent for one step.
pub(crate) fn intent(input: &FrameInput) -> PlayerIntent {
    PlayerIntent {
        direction: input.direction,
        interact: input.interact,
    }
}

/// Draws terrain, actors and the dialog box.
pub(crate) fn draw_overworld(overworld: &Overworld, renderer: &mut impl SpriteRenderer) {
    let camera = overworld.camera();
    draw_terrain(overworld.world(), camera.position(), renderer);

    for actor in query::actors(overworld.world()) {
        let position = camera.to_screen(actor.position());
        renderer.render_animation_frame(
            actor.animation(),
            actor.facing(),
            IVec2::new(position.x(), position.y()),
        );
    }

    let dialog = overworld.dialog();
    if dialog.is_open() {
        renderer.render_dialog(dialog.rows(), dialog.row_length(), dialog.display_length());
    }
}

/// Draws the grid tiles intersecting the viewport.
pub(crate) fn draw_terrain(
    world: &World,
    camera: Pixel,
    renderer: &mut impl SpriteRenderer,
) {
    let grid = query::grid(world);
    let (columns, rows) = visible_tiles(
        (grid.width(), grid.height()),
        IVec2::new(camera.x(), camera.y()),
        renderer.viewport(),
        TILE_SIZE,
    );
    for y in rows {
        for x in columns.clone() {
            let tile = Tile::new(x, y);
            let Some(id) = grid.tile_id(tile) else {
                continue;
            };
            let position = tile.position();
            renderer.render_sprite_frame(
                Sprite::Tiles,
                id.get(),
                IVec2::new(position.x() - camera.x(), position.y() - camera.y()),
                false,
            );
        }
    }
}
