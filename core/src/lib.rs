#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Highlands game and map editor.
//!
//! This crate defines the value types and the message surface that connect
//! adapters, the authoritative world, and the per-tick systems. Systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and reports the outcome as [`Event`]
//! values. Everything here is plain data: no rendering, no input devices, no
//! file access.

use std::{fmt, ops::Sub, path::PathBuf};

use serde::{Deserialize, Serialize};

pub mod config;

pub use config::{CameraConfig, ConfigError, DialogConfig, GameConfig, PatrolConfig, WorldConfig};

/// Edge length of a square tile measured in pixels.
pub const TILE_SIZE: i32 = 16;

/// Cardinal directions in their canonical encoding order (0 through 3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing `y`.
    Up,
    /// Toward increasing `x`.
    Right,
    /// Toward increasing `y`.
    Down,
    /// Toward decreasing `x`.
    Left,
}

impl Direction {
    /// Every direction ordered by its numeric encoding.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Numeric encoding of the direction.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Up => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
        }
    }

    /// Decodes a direction from its numeric encoding.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Up),
            1 => Some(Self::Right),
            2 => Some(Self::Down),
            3 => Some(Self::Left),
            _ => None,
        }
    }

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    /// Unit offset `(dx, dy)` of a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }
}

/// Location of a grid cell expressed in whole tiles.
///
/// Coordinates are signed so that the neighbour of an edge tile can be
/// represented and then rejected by bounds checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    x: i32,
    y: i32,
}

impl Tile {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Tile adjacent to this one in the provided direction.
    #[must_use]
    pub const fn neighbor(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Pixel position of the tile's top-left corner.
    #[must_use]
    pub const fn position(self) -> Pixel {
        Pixel::new(self.x * TILE_SIZE, self.y * TILE_SIZE)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Integer point in world pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pixel {
    x: i32,
    y: i32,
}

impl Pixel {
    /// Creates a new pixel position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Tile containing this position, truncating toward zero.
    #[must_use]
    pub const fn tile(self) -> Tile {
        Tile::new(self.x / TILE_SIZE, self.y / TILE_SIZE)
    }

    /// Reports whether both components are multiples of [`TILE_SIZE`].
    #[must_use]
    pub const fn is_tile_aligned(self) -> bool {
        self.x % TILE_SIZE == 0 && self.y % TILE_SIZE == 0
    }

    /// Position moved `distance` pixels in the provided direction.
    #[must_use]
    pub const fn stepped(self, direction: Direction, distance: i32) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx * distance, self.y + dy * distance)
    }

    /// Direction of travel from this position toward `target`.
    ///
    /// The vertical axis is inspected first: a target strictly above yields
    /// [`Direction::Up`], then strictly right yields [`Direction::Right`],
    /// strictly below [`Direction::Down`] and strictly left
    /// [`Direction::Left`]. Equal positions have no direction.
    #[must_use]
    pub const fn direction_to(self, target: Pixel) -> Option<Direction> {
        if self.y > target.y {
            Some(Direction::Up)
        } else if self.x < target.x {
            Some(Direction::Right)
        } else if self.y < target.y {
            Some(Direction::Down)
        } else if self.x > target.x {
            Some(Direction::Left)
        } else {
            None
        }
    }
}

impl Sub for Pixel {
    type Output = Pixel;

    fn sub(self, rhs: Pixel) -> Pixel {
        Pixel::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Stable identifier of an actor owned by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Stable identifier of an NPC registered with the patrol controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NpcId(u32);

impl NpcId {
    /// Creates a new NPC identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Terrain identifier stored in a grid cell; doubles as the tile sheet frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    /// Creates a new terrain identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Sprite sheets known to the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sprite {
    /// Bitmap font; frame `n` holds the glyph for character `' ' + n`.
    Font,
    /// Nine-slice frame used around the dialog box.
    UiFrame,
    /// Terrain tiles painted onto the grid.
    Tiles,
    /// Player and NPC walk cycles.
    Player,
}

impl Sprite {
    /// Every sprite sheet in load order.
    pub const ALL: [Sprite; 4] = [Sprite::Font, Sprite::UiFrame, Sprite::Tiles, Sprite::Player];

    /// Size `(width, height)` of a single frame in pixels.
    #[must_use]
    pub const fn frame_size(self) -> (u32, u32) {
        match self {
            Self::Font | Self::UiFrame => (8, 8),
            Self::Tiles | Self::Player => (TILE_SIZE as u32, TILE_SIZE as u32),
        }
    }
}

/// Frame cycling state for a sprite sheet row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Animation {
    sprite: Sprite,
    frame: u32,
    timer: u32,
    frame_duration: u32,
    frame_count: u32,
}

impl Animation {
    /// Creates an animation resting on its first frame.
    ///
    /// Zero durations and counts are raised to one so the cycle is always
    /// well defined.
    #[must_use]
    pub fn new(sprite: Sprite, frame_count: u32, frame_duration: u32) -> Self {
        Self {
            sprite,
            frame: 0,
            timer: 0,
            frame_duration: frame_duration.max(1),
            frame_count: frame_count.max(1),
        }
    }

    /// Sprite sheet the animation draws from.
    #[must_use]
    pub const fn sprite(&self) -> Sprite {
        self.sprite
    }

    /// Frame currently displayed.
    #[must_use]
    pub const fn frame(&self) -> u32 {
        self.frame
    }

    /// Number of frames in one cycle.
    #[must_use]
    pub const fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Advances the animation by a single tick.
    pub fn update(&mut self) {
        self.timer += 1;
        if self.timer >= self.frame_duration {
            self.timer -= self.frame_duration;
            self.frame += 1;
            if self.frame >= self.frame_count {
                self.frame = 0;
            }
        }
    }

    /// Returns to the idle frame.
    pub fn reset(&mut self) {
        self.frame = 0;
        self.timer = 0;
    }
}

/// Player intent distilled from raw input for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerIntent {
    /// Direction the player wants to walk, if any.
    pub direction: Option<Direction>,
    /// Whether the interact button was pressed on this tick.
    pub interact: bool,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Resizes the grid, preserving the overlapping top-left region.
    ResizeGrid {
        /// New number of tile columns.
        width: u32,
        /// New number of tile rows.
        height: u32,
    },
    /// Paints a terrain identifier onto a cell.
    SetTile {
        /// Cell to paint.
        tile: Tile,
        /// Terrain identifier to store.
        id: TileId,
    },
    /// Updates the passability flag of a cell.
    SetWall {
        /// Cell to update.
        tile: Tile,
        /// Whether the cell blocks movement.
        wall: bool,
    },
    /// Replaces the grid with the contents of a map file.
    LoadGrid {
        /// Location of the map file.
        path: PathBuf,
    },
    /// Writes the grid to a map file.
    SaveGrid {
        /// Location of the map file.
        path: PathBuf,
    },
    /// Creates a new stationary actor.
    SpawnActor {
        /// Sprite sheet used to draw the actor.
        sprite: Sprite,
        /// Tile the actor starts on.
        tile: Tile,
    },
    /// Asks a stationary actor to start moving one tile in a direction.
    RequestStep {
        /// Actor attempting the step.
        actor: ActorId,
        /// Direction of travel.
        direction: Direction,
    },
    /// Advances an actor's motion and animation by one tick.
    AdvanceActor {
        /// Actor to advance.
        actor: ActorId,
    },
    /// Turns an actor without moving it.
    FaceActor {
        /// Actor to turn.
        actor: ActorId,
        /// New facing direction.
        direction: Direction,
    },
    /// Returns an actor's animation to its idle frame.
    ResetAnimation {
        /// Actor whose animation is reset.
        actor: ActorId,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Confirms that the grid dimensions changed.
    GridResized {
        /// Number of tile columns after the resize.
        width: u32,
        /// Number of tile rows after the resize.
        height: u32,
    },
    /// Confirms that the grid was replaced from a map file.
    GridLoaded {
        /// Number of tile columns in the loaded grid.
        width: u32,
        /// Number of tile rows in the loaded grid.
        height: u32,
    },
    /// Confirms that the grid was written to a map file.
    GridSaved {
        /// Location the grid was written to.
        path: PathBuf,
    },
    /// Confirms that an actor was created.
    ActorSpawned {
        /// Identifier assigned to the actor.
        actor: ActorId,
        /// Tile the actor occupies.
        tile: Tile,
    },
    /// Reports that an actor could not be created.
    ActorSpawnRejected {
        /// Reason the spawn failed.
        reason: SpawnError,
    },
    /// Confirms that an actor reserved its next tile and began moving.
    StepStarted {
        /// Actor that started moving.
        actor: ActorId,
        /// Tile the actor is leaving.
        from: Tile,
        /// Tile the actor is moving toward.
        to: Tile,
    },
    /// Reports that a step request could not be honoured.
    StepBlocked {
        /// Actor whose step was refused.
        actor: ActorId,
        /// Direction that was requested.
        direction: Direction,
    },
    /// Confirms that an actor reached its target and came to rest.
    ActorArrived {
        /// Actor that arrived.
        actor: ActorId,
        /// Tile the actor now rests on.
        tile: Tile,
    },
}

/// Reasons an actor or NPC could not be created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum SpawnError {
    /// The world already holds its maximum number of actors.
    #[error("actor capacity of {capacity} has been reached")]
    ActorCapacity {
        /// Configured actor limit.
        capacity: usize,
    },
    /// The patrol controller already holds its maximum number of NPCs.
    #[error("npc capacity of {capacity} has been reached")]
    NpcCapacity {
        /// Configured NPC limit.
        capacity: usize,
    },
    /// The requested tile lies outside the grid.
    #[error("spawn tile {tile} lies outside the grid")]
    OutOfBounds {
        /// Tile that was requested.
        tile: Tile,
    },
}
