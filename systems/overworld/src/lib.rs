#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Overworld controller that owns every piece of game state and sequences a
//! single tick: player movement, camera follow, NPC patrols and the dialog
//! box.

use std::path::Path;

use highlands_core::{
    ActorId, Command, Event, GameConfig, NpcId, PlayerIntent, SpawnError, Sprite, Tile,
};
use highlands_system_camera::Camera;
use highlands_system_dialog::DialogBox;
use highlands_system_patrol::{PathNode, Patrol};
use highlands_world::{apply, query, spawn_actor, GridError, World};
use tracing::debug;

/// Errors raised while setting up an overworld.
#[derive(Debug, thiserror::Error)]
pub enum OverworldError {
    /// The configured grid could not be created.
    #[error("failed to create the grid")]
    Grid(#[from] GridError),
    /// The player actor could not be spawned.
    #[error("failed to spawn the player")]
    Spawn(#[from] SpawnError),
}

/// Owning context for a running game.
#[derive(Debug)]
pub struct Overworld {
    world: World,
    patrol: Patrol,
    camera: Camera,
    dialog: DialogBox,
    player: ActorId,
    talking_to: Option<NpcId>,
    events: Vec<Event>,
}

impl Overworld {
    /// Creates a world from `config` and places the player on `player_tile`.
    pub fn new(config: &GameConfig, player_tile: Tile) -> Result<Self, OverworldError> {
        Self::from_world(config, World::new(&config.world)?, player_tile)
    }

    /// Takes over a prepared `world` and places the player on `player_tile`.
    pub fn from_world(
        config: &GameConfig,
        mut world: World,
        player_tile: Tile,
    ) -> Result<Self, OverworldError> {
        let mut events = Vec::new();
        let player = spawn_actor(&mut world, Sprite::Player, player_tile, &mut events)?;

        let camera = Camera::new(&config.camera, query::grid(&world).pixel_size());
        Ok(Self {
            world,
            patrol: Patrol::new(&config.patrol),
            camera,
            dialog: DialogBox::new(&config.dialog),
            player,
            talking_to: None,
            events,
        })
    }

    /// Read-only world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// NPC registry.
    #[must_use]
    pub fn patrol(&self) -> &Patrol {
        &self.patrol
    }

    /// Camera following the player.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Dialog box state.
    #[must_use]
    pub fn dialog(&self) -> &DialogBox {
        &self.dialog
    }

    /// Actor controlled by the player.
    #[must_use]
    pub const fn player(&self) -> ActorId {
        self.player
    }

    /// NPC currently in conversation with the player.
    #[must_use]
    pub const fn talking_to(&self) -> Option<NpcId> {
        self.talking_to
    }

    /// World events produced by the most recent call that changed state.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Applies a world command outside the tick, e.g. while building a map.
    pub fn apply(&mut self, command: Command) {
        self.events.clear();
        apply(&mut self.world, command, &mut self.events);
        self.refresh_extent();
    }

    /// Registers a patrolling NPC.
    pub fn add_npc(
        &mut self,
        sprite: Sprite,
        tile: Tile,
        message: impl Into<String>,
        path: Vec<PathNode>,
    ) -> Result<NpcId, SpawnError> {
        self.patrol
            .add_npc(&mut self.world, sprite, tile, message, path)
    }

    /// Replaces the grid from a map file; returns whether it loaded.
    pub fn load_grid(&mut self, path: &Path) -> bool {
        self.apply(Command::LoadGrid {
            path: path.to_path_buf(),
        });
        self.events
            .iter()
            .any(|event| matches!(event, Event::GridLoaded { .. }))
    }

    /// Handles the interact button.
    ///
    /// An open dialog advances. Otherwise a resting player talks to the
    /// resting NPC directly ahead, which turns to face the player.
    pub fn interact(&mut self) {
        if self.dialog.is_open() {
            self.dialog.progress();
            if !self.dialog.is_open() {
                debug!(npc = ?self.talking_to, "dialog_closed");
                self.talking_to = None;
            }
            return;
        }

        let Some(player) = query::actor(&self.world, self.player) else {
            return;
        };
        if player.is_moving() {
            return;
        }

        let facing = player.facing();
        let ahead = player.tile().neighbor(facing);
        if !query::grid(&self.world).in_bounds(ahead) {
            return;
        }

        let Some(id) = self.patrol.resting_npc_at(&self.world, ahead) else {
            return;
        };
        let Some(npc) = self.patrol.npc(id) else {
            return;
        };

        apply(
            &mut self.world,
            Command::FaceActor {
                actor: npc.actor(),
                direction: facing.opposite(),
            },
            &mut self.events,
        );
        self.dialog.open(npc.message());
        self.talking_to = Some(id);
        debug!(npc = id.get(), "dialog_opened");
    }

    /// Runs one game tick.
    pub fn update(&mut self, intent: PlayerIntent) {
        self.events.clear();
        if intent.interact {
            self.interact();
        }

        self.move_player(intent);
        if let Some(player) = query::actor(&self.world, self.player) {
            self.camera.follow(player.position());
        }

        self.patrol
            .tick(&mut self.world, self.talking_to, &mut self.events);
        self.dialog.update();
    }

    fn move_player(&mut self, intent: PlayerIntent) {
        let player = self.player;
        apply(
            &mut self.world,
            Command::AdvanceActor { actor: player },
            &mut self.events,
        );

        let Some(direction) = intent.direction else {
            return;
        };
        if query::actor(&self.world, player).map_or(true, |actor| actor.is_moving()) {
            return;
        }

        let mut outcome = Vec::new();
        apply(
            &mut self.world,
            Command::RequestStep {
                actor: player,
                direction,
            },
            &mut outcome,
        );
        if outcome
            .iter()
            .any(|event| matches!(event, Event::StepBlocked { .. }))
        {
            apply(
                &mut self.world,
                Command::FaceActor {
                    actor: player,
                    direction,
                },
                &mut outcome,
            );
        }
        self.events.append(&mut outcome);
    }

    fn refresh_extent(&mut self) {
        let changed = self.events.iter().any(|event| {
            matches!(
                event,
                Event::GridLoaded { .. } | Event::GridResized { .. }
            )
        });
        if changed {
            self.camera
                .set_extent(query::grid(&self.world).pixel_size());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use highlands_core::{Direction, WorldConfig};

    fn small_config() -> GameConfig {
        GameConfig {
            world: WorldConfig {
                width: 6,
                height: 6,
                ..WorldConfig::default()
            },
            ..GameConfig::default()
        }
    }

    #[test]
    fn player_is_the_first_actor() {
        let overworld = Overworld::new(&GameConfig::default(), Tile::new(5, 2)).expect("spawns");
        assert_eq!(overworld.player(), ActorId::new(0));
        let player = query::actor(overworld.world(), overworld.player()).expect("player");
        assert_eq!(player.facing(), Direction::Down);
        assert_eq!(player.tile(), Tile::new(5, 2));
    }

    #[test]
    fn player_outside_grid_is_an_error() {
        let result = Overworld::new(&small_config(), Tile::new(6, 0));
        assert!(matches!(
            result,
            Err(OverworldError::Spawn(SpawnError::OutOfBounds { .. }))
        ));
    }

    #[test]
    fn prepared_world_keeps_its_terrain_and_sizes_the_camera() {
        let mut world = World::new(&small_config().world).expect("valid world");
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ResizeGrid {
                width: 20,
                height: 12,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetWall {
                tile: Tile::new(4, 4),
                wall: true,
            },
            &mut events,
        );

        let overworld =
            Overworld::from_world(&small_config(), world, Tile::new(15, 10)).expect("spawns");
        assert_eq!(query::grid(overworld.world()).is_wall(Tile::new(4, 4)), Some(true));
        assert_eq!(
            overworld.camera().max_position(),
            highlands_core::Pixel::new(20 * 16 - 160, 12 * 16 - 144)
        );
        let player = query::actor(overworld.world(), overworld.player()).expect("player");
        assert_eq!(player.tile(), Tile::new(15, 10));
    }

    #[test]
    fn resize_refreshes_camera_extent() {
        let mut overworld = Overworld::new(&small_config(), Tile::new(0, 0)).expect("spawns");
        overworld.apply(Command::ResizeGrid {
            width: 30,
            height: 20,
        });
        assert_eq!(
            overworld.camera().max_position(),
            highlands_core::Pixel::new(30 * 16 - 160, 20 * 16 - 144)
        );
    }

    #[test]
    fn interacting_with_nothing_keeps_dialog_closed() {
        let mut overworld = Overworld::new(&small_config(), Tile::new(0, 5)).expect("spawns");
        overworld.interact();
        assert!(!overworld.dialog().is_open());
        assert_eq!(overworld.talking_to(), None);
    }
}
