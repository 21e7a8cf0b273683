#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! NPC patrol controller that walks actors back and forth along fixed
//! waypoint lists, pausing at each node.

use highlands_core::{
    ActorId, Command, Direction, Event, NpcId, PatrolConfig, Pixel, SpawnError, Sprite, Tile,
};
use highlands_world::{apply, query, spawn_actor, World};
use tracing::warn;

/// Waypoint on an NPC's patrol route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PathNode {
    position: Pixel,
    wait_time: u32,
    wait_direction: Direction,
}

impl PathNode {
    /// Creates a waypoint on `tile` where the NPC waits `wait_time` ticks
    /// facing `wait_direction`.
    #[must_use]
    pub const fn new(tile: Tile, wait_time: u32, wait_direction: Direction) -> Self {
        Self {
            position: tile.position(),
            wait_time,
            wait_direction,
        }
    }

    /// Tile-aligned pixel position of the waypoint.
    #[must_use]
    pub const fn position(&self) -> Pixel {
        self.position
    }

    /// Ticks spent waiting after arrival.
    #[must_use]
    pub const fn wait_time(&self) -> u32 {
        self.wait_time
    }

    /// Direction faced while waiting.
    #[must_use]
    pub const fn wait_direction(&self) -> Direction {
        self.wait_direction
    }
}

/// Non-player character that follows a patrol route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Npc {
    actor: ActorId,
    message: String,
    path: Vec<PathNode>,
    path_index: usize,
    path_timer: u32,
    wait_direction: Direction,
}

impl Npc {
    /// Actor that represents the NPC in the world.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// Dialog spoken when the player talks to the NPC.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Patrol route.
    #[must_use]
    pub fn path(&self) -> &[PathNode] {
        &self.path
    }

    /// Index of the waypoint currently being approached or waited at.
    #[must_use]
    pub const fn path_index(&self) -> usize {
        self.path_index
    }

    /// Remaining wait ticks at the last reached waypoint.
    ///
    /// While the countdown runs the NPC faces the wait direction of the
    /// waypoint it just reached, not that of the next waypoint on its route.
    #[must_use]
    pub const fn path_timer(&self) -> u32 {
        self.path_timer
    }

    fn tick(&mut self, world: &mut World, events: &mut Vec<Event>) {
        if self.path.len() < 2 {
            return;
        }

        if self.path_timer > 0 {
            apply(
                world,
                Command::FaceActor {
                    actor: self.actor,
                    direction: self.wait_direction,
                },
                events,
            );
            self.path_timer -= 1;
            return;
        }

        let node = self.path[self.path_index];
        let Some(current) = query::actor(world, self.actor) else {
            return;
        };
        if !current.is_moving() {
            if let Some(direction) = current.position().direction_to(node.position) {
                apply(
                    world,
                    Command::RequestStep {
                        actor: self.actor,
                        direction,
                    },
                    events,
                );
            }
        }

        apply(world, Command::AdvanceActor { actor: self.actor }, events);

        let arrived = query::actor(world, self.actor)
            .is_some_and(|current| !current.is_moving() && current.position() == node.position);
        if arrived {
            apply(world, Command::ResetAnimation { actor: self.actor }, events);
            self.path_timer = node.wait_time;
            self.wait_direction = node.wait_direction;
            self.path_index += 1;
            if self.path_index == self.path.len() {
                self.path_index = self.path.len() - 2;
            }
        }
    }
}

/// Owns every NPC and advances their patrols once per tick.
#[derive(Clone, Debug)]
pub struct Patrol {
    npcs: Vec<Npc>,
    max_npcs: usize,
}

impl Patrol {
    /// Creates an empty controller with the configured NPC limit.
    #[must_use]
    pub fn new(config: &PatrolConfig) -> Self {
        Self {
            npcs: Vec::new(),
            max_npcs: config.max_npcs,
        }
    }

    /// Spawns an actor on `tile` and registers it as an NPC.
    ///
    /// Both the NPC limit and the world's actor limit apply; when either is
    /// reached the failure is logged and returned instead of an identifier.
    pub fn add_npc(
        &mut self,
        world: &mut World,
        sprite: Sprite,
        tile: Tile,
        message: impl Into<String>,
        path: Vec<PathNode>,
    ) -> Result<NpcId, SpawnError> {
        if self.npcs.len() >= self.max_npcs {
            let reason = SpawnError::NpcCapacity {
                capacity: self.max_npcs,
            };
            warn!(%reason, "cannot create new npc");
            return Err(reason);
        }

        let actor = spawn_actor(world, sprite, tile, &mut Vec::new())?;

        let id = NpcId::new(self.npcs.len() as u32);
        self.npcs.push(Npc {
            actor,
            message: message.into(),
            path,
            path_index: 0,
            path_timer: 0,
            wait_direction: Direction::Down,
        });
        Ok(id)
    }

    /// Looks up a registered NPC.
    #[must_use]
    pub fn npc(&self, id: NpcId) -> Option<&Npc> {
        self.npcs.get(id.get() as usize)
    }

    /// Iterates over every NPC in registration order.
    pub fn npcs(&self) -> impl Iterator<Item = (NpcId, &Npc)> {
        self.npcs
            .iter()
            .enumerate()
            .map(|(index, npc)| (NpcId::new(index as u32), npc))
    }

    /// Finds an NPC standing still on `tile`.
    #[must_use]
    pub fn resting_npc_at(&self, world: &World, tile: Tile) -> Option<NpcId> {
        self.npcs().find_map(|(id, npc)| {
            let actor = query::actor(world, npc.actor)?;
            (!actor.is_moving() && actor.tile() == tile).then_some(id)
        })
    }

    /// Advances every NPC except `skip` by one tick.
    ///
    /// World events produced along the way are appended to `out_events`.
    pub fn tick(&mut self, world: &mut World, skip: Option<NpcId>, out_events: &mut Vec<Event>) {
        for (index, npc) in self.npcs.iter_mut().enumerate() {
            if skip == Some(NpcId::new(index as u32)) {
                continue;
            }
            npc.tick(world, out_events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use highlands_core::WorldConfig;

    fn world() -> World {
        World::new(&WorldConfig::default()).expect("default world")
    }

    #[test]
    fn path_nodes_convert_tiles_to_pixels() {
        let node = PathNode::new(Tile::new(3, 6), 120, Direction::Down);
        assert_eq!(node.position(), Pixel::new(48, 96));
    }

    #[test]
    fn npc_limit_is_enforced_before_spawning() {
        let mut world = world();
        let mut patrol = Patrol::new(&PatrolConfig { max_npcs: 1 });
        let first = patrol.add_npc(&mut world, Sprite::Player, Tile::new(1, 1), "hi", Vec::new());
        assert_eq!(first, Ok(NpcId::new(0)));

        let second = patrol.add_npc(&mut world, Sprite::Player, Tile::new(2, 1), "hi", Vec::new());
        assert_eq!(second, Err(SpawnError::NpcCapacity { capacity: 1 }));
        assert_eq!(query::actors(&world).len(), 1);
    }

    #[test]
    fn actor_limit_is_reported() {
        let config = WorldConfig {
            max_actors: 1,
            ..WorldConfig::default()
        };
        let mut world = World::new(&config).expect("valid world");
        let mut patrol = Patrol::new(&PatrolConfig::default());
        let first = patrol.add_npc(&mut world, Sprite::Player, Tile::new(1, 1), "", Vec::new());
        assert_eq!(first, Ok(NpcId::new(0)));

        let result = patrol.add_npc(&mut world, Sprite::Player, Tile::new(2, 1), "", Vec::new());
        assert_eq!(result, Err(SpawnError::ActorCapacity { capacity: 1 }));
        assert_eq!(patrol.npcs().count(), 1);

        let outside = Patrol::new(&PatrolConfig::default()).add_npc(
            &mut World::new(&WorldConfig::default()).expect("default world"),
            Sprite::Player,
            Tile::new(-1, 0),
            "",
            Vec::new(),
        );
        assert_eq!(
            outside,
            Err(SpawnError::OutOfBounds {
                tile: Tile::new(-1, 0)
            })
        );
    }

    #[test]
    fn short_paths_never_move() {
        let mut world = world();
        let mut patrol = Patrol::new(&PatrolConfig::default());
        let path = vec![PathNode::new(Tile::new(5, 5), 10, Direction::Up)];
        let id = patrol
            .add_npc(&mut world, Sprite::Player, Tile::new(1, 1), "", path)
            .expect("npc spawns");
        let mut events = Vec::new();
        for _ in 0..50 {
            patrol.tick(&mut world, None, &mut events);
        }
        assert!(events.is_empty());
        let actor = patrol.npc(id).map(Npc::actor).expect("npc exists");
        assert_eq!(
            query::actor(&world, actor).map(|actor| actor.tile()),
            Some(Tile::new(1, 1))
        );
    }

    #[test]
    fn skipped_npc_stays_put() {
        let mut world = world();
        let mut patrol = Patrol::new(&PatrolConfig::default());
        let path = vec![
            PathNode::new(Tile::new(1, 4), 0, Direction::Down),
            PathNode::new(Tile::new(1, 1), 0, Direction::Down),
        ];
        let id = patrol
            .add_npc(&mut world, Sprite::Player, Tile::new(1, 1), "", path)
            .expect("npc spawns");
        let mut events = Vec::new();
        for _ in 0..10 {
            patrol.tick(&mut world, Some(id), &mut events);
        }
        assert!(events.is_empty());
        assert_eq!(patrol.resting_npc_at(&world, Tile::new(1, 1)), Some(id));
    }
}
