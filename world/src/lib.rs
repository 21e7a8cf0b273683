#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Highlands: the terrain grid and the actors
//! walking on it.
//!
//! All mutation flows through [`apply`]; read access goes through [`query`].

mod actors;
pub mod grid;
pub mod map_file;

use highlands_core::{ActorId, Animation, Command, Event, SpawnError, Sprite, Tile, WorldConfig};
use tracing::{info, warn};

pub use actors::{is_tile_free, Actor};
pub use grid::{resize_cells, Grid, GridError};
pub use map_file::MapFileError;

/// Represents the authoritative Highlands world state.
#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    actors: Vec<Actor>,
    step_length: i32,
    max_actors: usize,
    frame_count: u32,
    frame_duration: u32,
}

impl World {
    /// Creates an empty world sized and tuned by the provided configuration.
    pub fn new(config: &WorldConfig) -> Result<Self, GridError> {
        Ok(Self {
            grid: Grid::new(config.width, config.height)?,
            actors: Vec::new(),
            step_length: i32::try_from(config.step_length)
                .unwrap_or(highlands_core::TILE_SIZE)
                .max(1),
            max_actors: config.max_actors,
            frame_count: config.frame_count,
            frame_duration: config.frame_duration,
        })
    }

    fn actor_mut(&mut self, actor: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(actor.get() as usize)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ResizeGrid { width, height } => match world.grid.resize(width, height) {
            Ok(()) => {
                info!(width, height, "grid_resized");
                out_events.push(Event::GridResized { width, height });
            }
            Err(error) => warn!(width, height, %error, "grid_resize_rejected"),
        },
        Command::SetTile { tile, id } => world.grid.set_tile(tile, id),
        Command::SetWall { tile, wall } => world.grid.set_wall(tile, wall),
        Command::LoadGrid { path } => match map_file::read(&path) {
            Ok(grid) => {
                let (width, height) = (grid.width(), grid.height());
                world.grid = grid;
                info!(path = %path.display(), width, height, "map_loaded");
                out_events.push(Event::GridLoaded { width, height });
            }
            Err(error) => {
                warn!(path = %path.display(), error = %error, "map_load_failed");
            }
        },
        Command::SaveGrid { path } => match map_file::write(&world.grid, &path) {
            Ok(()) => {
                info!(path = %path.display(), "map_saved");
                out_events.push(Event::GridSaved { path });
            }
            Err(error) => {
                warn!(path = %path.display(), error = %error, "map_save_failed");
            }
        },
        Command::SpawnActor { sprite, tile } => {
            let _ = spawn_actor(world, sprite, tile, out_events);
        }
        Command::RequestStep { actor, direction } => {
            let Some(current) = world.actors.get(actor.get() as usize) else {
                return;
            };
            if current.is_moving() {
                return;
            }

            let from = current.tile();
            let to = from.neighbor(direction);
            if !is_tile_free(&world.grid, &world.actors, to) {
                out_events.push(Event::StepBlocked { actor, direction });
                return;
            }

            if let Some(current) = world.actor_mut(actor) {
                current.set_target(to.position());
                out_events.push(Event::StepStarted { actor, from, to });
            }
        }
        Command::AdvanceActor { actor } => {
            let step_length = world.step_length;
            if let Some(arrived) = world
                .actor_mut(actor)
                .and_then(|current| current.advance(step_length))
            {
                out_events.push(Event::ActorArrived {
                    actor,
                    tile: arrived,
                });
            }
        }
        Command::FaceActor { actor, direction } => {
            if let Some(current) = world.actor_mut(actor) {
                current.face(direction);
            }
        }
        Command::ResetAnimation { actor } => {
            if let Some(current) = world.actor_mut(actor) {
                current.reset_animation();
            }
        }
    }
}

/// Spawns an actor on `tile`, the same way [`Command::SpawnActor`] does, and
/// returns its identifier.
///
/// The outcome is also reported through `out_events`.
pub fn spawn_actor(
    world: &mut World,
    sprite: Sprite,
    tile: Tile,
    out_events: &mut Vec<Event>,
) -> Result<ActorId, SpawnError> {
    let rejection = if world.actors.len() >= world.max_actors {
        Some(SpawnError::ActorCapacity {
            capacity: world.max_actors,
        })
    } else if !world.grid.in_bounds(tile) {
        Some(SpawnError::OutOfBounds { tile })
    } else {
        None
    };

    if let Some(reason) = rejection {
        warn!(%reason, "cannot create new actor");
        out_events.push(Event::ActorSpawnRejected { reason });
        return Err(reason);
    }

    let actor = ActorId::new(world.actors.len() as u32);
    let animation = Animation::new(sprite, world.frame_count, world.frame_duration);
    world.actors.push(Actor::new(actor, tile, animation));
    out_events.push(Event::ActorSpawned { actor, tile });
    Ok(actor)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use highlands_core::{ActorId, Tile};

    use super::{Actor, Grid, World};

    /// Provides read-only access to the terrain grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Looks up a single actor.
    #[must_use]
    pub fn actor(world: &World, actor: ActorId) -> Option<&Actor> {
        world.actors.get(actor.get() as usize)
    }

    /// Every actor in spawn order.
    #[must_use]
    pub fn actors(world: &World) -> &[Actor] {
        &world.actors
    }

    /// Reports whether an actor could step onto `tile` right now.
    #[must_use]
    pub fn is_tile_free(world: &World, tile: Tile) -> bool {
        super::is_tile_free(&world.grid, &world.actors, tile)
    }

    /// Pixels a moving actor covers per tick.
    #[must_use]
    pub fn step_length(world: &World) -> i32 {
        world.step_length
    }
}
