//! Tunable parameters for the overworld, camera, dialog and patrol systems.
//!
//! Every section and key is optional when deserialized; missing values fall
//! back to a 160x144 handheld-sized game.

use serde::Deserialize;

use crate::TILE_SIZE;

/// Complete game configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Grid and actor parameters.
    pub world: WorldConfig,
    /// Viewport and dead-zone parameters.
    pub camera: CameraConfig,
    /// Dialog box layout and reveal speed.
    pub dialog: DialogConfig,
    /// NPC limits.
    pub patrol: PatrolConfig,
}

/// Grid and actor parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Tile columns of a freshly created grid.
    pub width: u32,
    /// Tile rows of a freshly created grid.
    pub height: u32,
    /// Pixels travelled per tick by a moving actor.
    pub step_length: u32,
    /// Maximum number of actors, player included.
    pub max_actors: usize,
    /// Ticks each animation frame stays on screen.
    pub frame_duration: u32,
    /// Frames in one walk cycle.
    pub frame_count: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 18,
            step_length: TILE_SIZE as u32,
            max_actors: 32,
            frame_duration: 10,
            frame_count: 4,
        }
    }
}

/// Viewport and dead-zone parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Visible width in pixels.
    pub viewport_width: u32,
    /// Visible height in pixels.
    pub viewport_height: u32,
    /// Dead-zone margin in tiles from each viewport edge.
    pub margin_tiles: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            viewport_width: 160,
            viewport_height: 144,
            margin_tiles: 3,
        }
    }
}

/// Dialog box layout and reveal speed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DialogConfig {
    /// Characters per display row.
    pub row_length: usize,
    /// Ticks between revealed characters.
    pub reveal_delay: u32,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            row_length: 18,
            reveal_delay: 3,
        }
    }
}

/// NPC limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatrolConfig {
    /// Maximum number of patrolling NPCs.
    pub max_npcs: usize,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self { max_npcs: 31 }
    }
}

/// Reasons a configuration is rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A size or count that must be positive was zero.
    #[error("`{field}` must be greater than zero")]
    Zero {
        /// Dotted name of the offending key.
        field: &'static str,
    },
    /// The step length does not divide the tile edge length.
    #[error("`world.step_length` = {step_length} must divide the tile size of 16")]
    StepLength {
        /// Configured step length.
        step_length: u32,
    },
}

impl GameConfig {
    /// Checks that every value describes a playable game.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("world.width", self.world.width as usize),
            ("world.height", self.world.height as usize),
            ("world.step_length", self.world.step_length as usize),
            ("world.max_actors", self.world.max_actors),
            ("world.frame_duration", self.world.frame_duration as usize),
            ("world.frame_count", self.world.frame_count as usize),
            ("camera.viewport_width", self.camera.viewport_width as usize),
            ("camera.viewport_height", self.camera.viewport_height as usize),
            ("dialog.row_length", self.dialog.row_length),
            ("dialog.reveal_delay", self.dialog.reveal_delay as usize),
        ];
        if let Some((field, _)) = positive.into_iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Zero { field });
        }

        if TILE_SIZE as u32 % self.world.step_length != 0 {
            return Err(ConfigError::StepLength {
                step_length: self.world.step_length,
            });
        }

        Ok(())
    }
}
