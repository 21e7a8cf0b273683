//! Actors moving between tiles and the rules that decide which tiles they hold.

use highlands_core::{ActorId, Animation, Direction, Pixel, Sprite, Tile};

use crate::grid::Grid;

/// Character on the grid, either the player or an NPC.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Actor {
    id: ActorId,
    facing: Direction,
    position: Pixel,
    target: Option<Pixel>,
    animation: Animation,
}

impl Actor {
    pub(crate) fn new(id: ActorId, tile: Tile, animation: Animation) -> Self {
        Self {
            id,
            facing: Direction::Down,
            position: tile.position(),
            target: None,
            animation,
        }
    }

    /// Identifier assigned by the world.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Sprite sheet the actor is drawn from.
    #[must_use]
    pub const fn sprite(&self) -> Sprite {
        self.animation.sprite()
    }

    /// Direction the actor looks toward.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Current pixel position.
    #[must_use]
    pub const fn position(&self) -> Pixel {
        self.position
    }

    /// Tile containing the current position.
    #[must_use]
    pub const fn tile(&self) -> Tile {
        self.position.tile()
    }

    /// Tile-aligned destination while moving.
    #[must_use]
    pub const fn target(&self) -> Option<Pixel> {
        self.target
    }

    /// Walk cycle state.
    #[must_use]
    pub const fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Reports whether the actor is travelling toward a target.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.target.is_some()
    }

    /// Tiles the actor currently prevents others from entering.
    ///
    /// A resting actor holds its own tile. A moving actor holds its
    /// destination and the tile one step behind the destination.
    #[must_use]
    pub fn reserved_tiles(&self) -> [Tile; 2] {
        match self.target {
            None => [self.tile(); 2],
            Some(target) => {
                let destination = target.tile();
                let behind = self
                    .position
                    .direction_to(target)
                    .map_or(destination, |direction| {
                        destination.neighbor(direction.opposite())
                    });
                [destination, behind]
            }
        }
    }

    pub(crate) fn set_target(&mut self, target: Pixel) {
        self.target = Some(target);
    }

    pub(crate) fn face(&mut self, direction: Direction) {
        self.facing = direction;
    }

    pub(crate) fn reset_animation(&mut self) {
        self.animation.reset();
    }

    /// Moves one step toward the target; returns the tile reached on arrival.
    ///
    /// A step never carries the actor past its target, whatever the step
    /// length.
    pub(crate) fn advance(&mut self, step_length: i32) -> Option<Tile> {
        let Some(target) = self.target else {
            self.animation.reset();
            return None;
        };

        if let Some(direction) = self.position.direction_to(target) {
            let remaining = match direction {
                Direction::Up | Direction::Down => (target.y() - self.position.y()).abs(),
                Direction::Left | Direction::Right => (target.x() - self.position.x()).abs(),
            };
            self.position = self.position.stepped(direction, step_length.min(remaining));
            self.animation.update();
            self.facing = direction;
        }

        if self.position == target {
            self.target = None;
            return Some(self.tile());
        }
        None
    }
}

/// Reports whether `tile` may be entered.
///
/// Tiles outside the grid, walls and tiles reserved by any actor are not free.
#[must_use]
pub fn is_tile_free(grid: &Grid, actors: &[Actor], tile: Tile) -> bool {
    if !grid.in_bounds(tile) {
        return false;
    }
    if actors
        .iter()
        .any(|actor| actor.reserved_tiles().contains(&tile))
    {
        return false;
    }
    grid.is_wall(tile) == Some(false)
}
