#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Map editor controller.
//!
//! The editor paints terrain, toggles walls and runs a small command line for
//! resizing, saving and loading the grid. Input arrives as [`EditorInput`]
//! values expressed in viewport pixels; everything else stays inside the
//! world and camera crates.

mod command;

use highlands_core::{CameraConfig, Command, Event, Pixel, Tile, TileId, WorldConfig, TILE_SIZE};
use highlands_system_camera::Camera;
use highlands_world::{apply, query, GridError, World};
use tracing::{debug, info, warn};

pub use command::{atoi, split_command_parts, EditorCommand};

/// Active editing tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Paints the selected tile while the primary button is held.
    #[default]
    Draw,
    /// Shows the tile sheet so a tile can be picked.
    SelectTile,
    /// Toggles wall flags on click.
    Wall,
}

/// Mouse buttons the editor reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Usually the left button.
    Primary,
    /// Usually the right button; held to pan.
    Secondary,
}

/// Keys the editor reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditorKey {
    /// A printable character.
    Char(char),
    /// Deletes the last typed character.
    Backspace,
    /// Submits the command line.
    Return,
    /// Toggles the command line.
    Backquote,
}

/// Input event delivered to the editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditorInput {
    /// The cursor moved to `position`, `delta` pixels from where it was.
    MouseMoved {
        /// New cursor position in viewport pixels.
        position: Pixel,
        /// Motion since the previous event.
        delta: Pixel,
    },
    /// A mouse button went down.
    ButtonPressed(MouseButton),
    /// A mouse button went up.
    ButtonReleased(MouseButton),
    /// A key went down.
    Key(EditorKey),
}

/// Editor state owning the grid being edited.
#[derive(Debug)]
pub struct Editor {
    world: World,
    camera: Camera,
    tool: Tool,
    mouse: Pixel,
    panning: bool,
    drawing: bool,
    selected_tile: TileId,
    tileset_camera: Pixel,
    tileset_size: (u32, u32),
    command: String,
    typing: bool,
}

impl Editor {
    /// Creates an editor for a fresh grid.
    ///
    /// `tileset_size` is the pixel size of the terrain tile sheet and bounds
    /// tile selection.
    pub fn new(
        world: &WorldConfig,
        camera: &CameraConfig,
        tileset_size: (u32, u32),
    ) -> Result<Self, GridError> {
        let world = World::new(world)?;
        let camera = Camera::new(camera, query::grid(&world).pixel_size());
        Ok(Self {
            world,
            camera,
            tool: Tool::default(),
            mouse: Pixel::default(),
            panning: false,
            drawing: false,
            selected_tile: TileId::default(),
            tileset_camera: Pixel::default(),
            tileset_size,
            command: String::new(),
            typing: false,
        })
    }

    /// Grid being edited.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Map view camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Active tool.
    #[must_use]
    pub const fn tool(&self) -> Tool {
        self.tool
    }

    /// Tile painted by the draw tool.
    #[must_use]
    pub const fn selected_tile(&self) -> TileId {
        self.selected_tile
    }

    /// Scroll offset of the tile sheet view.
    #[must_use]
    pub const fn tileset_camera(&self) -> Pixel {
        self.tileset_camera
    }

    /// Pixel size of the tile sheet.
    #[must_use]
    pub const fn tileset_size(&self) -> (u32, u32) {
        self.tileset_size
    }

    /// Updates the tile sheet bounds once the sheet has been loaded.
    pub fn set_tileset_size(&mut self, size: (u32, u32)) {
        self.tileset_size = size;
    }

    /// Text typed so far when the command line is open.
    #[must_use]
    pub fn command_line(&self) -> Option<&str> {
        self.typing.then_some(self.command.as_str())
    }

    /// Grid tile under the cursor, if any.
    #[must_use]
    pub fn hovered_tile(&self) -> Option<Tile> {
        let tile = self.map_tile_under_cursor();
        query::grid(&self.world).in_bounds(tile).then_some(tile)
    }

    /// Loads a grid from disk and refits the camera; returns whether it loaded.
    pub fn load(&mut self, path: &std::path::Path) -> bool {
        self.run(Command::LoadGrid {
            path: path.to_path_buf(),
        })
        .iter()
        .any(|event| matches!(event, Event::GridLoaded { .. }))
    }

    /// Reacts to a single input event.
    pub fn handle(&mut self, input: EditorInput) {
        match input {
            EditorInput::MouseMoved { position, delta } => {
                self.mouse = position;
                if self.panning {
                    let back = Pixel::new(-delta.x(), -delta.y());
                    if self.tool == Tool::SelectTile {
                        self.tileset_camera = Pixel::new(
                            self.tileset_camera.x() + back.x(),
                            self.tileset_camera.y() + back.y(),
                        );
                    } else {
                        self.camera.pan(back);
                    }
                }
            }
            EditorInput::ButtonPressed(MouseButton::Secondary) => self.panning = true,
            EditorInput::ButtonPressed(MouseButton::Primary) => {
                if self.panning {
                    return;
                }
                match self.tool {
                    Tool::SelectTile => self.select_tile(),
                    Tool::Draw => self.drawing = true,
                    Tool::Wall => self.toggle_wall(),
                }
            }
            EditorInput::ButtonReleased(MouseButton::Secondary) => self.panning = false,
            EditorInput::ButtonReleased(MouseButton::Primary) => self.drawing = false,
            EditorInput::Key(key) => self.handle_key(key),
        }
    }

    /// Paints under the cursor while drawing; call once per tick.
    pub fn update(&mut self) {
        if self.panning || !self.drawing {
            return;
        }
        let tile = self.map_tile_under_cursor();
        if query::grid(&self.world).in_bounds(tile) {
            let _ = self.run(Command::SetTile {
                tile,
                id: self.selected_tile,
            });
        }
    }

    /// Executes a parsed command line.
    pub fn execute(&mut self, command: EditorCommand) {
        match command {
            EditorCommand::Resize { width, height } => {
                match (u32::try_from(width), u32::try_from(height)) {
                    (Ok(width), Ok(height)) if width > 0 && height > 0 => {
                        let _ = self.run(Command::ResizeGrid { width, height });
                    }
                    _ => warn!(width, height, "invalid map size"),
                }
            }
            EditorCommand::Save(path) => {
                let _ = self.run(Command::SaveGrid { path });
            }
            EditorCommand::Load(path) => {
                let _ = self.run(Command::LoadGrid { path });
            }
        }
    }

    fn handle_key(&mut self, key: EditorKey) {
        if self.typing {
            match key {
                EditorKey::Char(character) if is_command_character(character) => {
                    self.command.push(character);
                    return;
                }
                EditorKey::Backspace if !self.command.is_empty() => {
                    let _ = self.command.pop();
                    return;
                }
                EditorKey::Return if !self.command.is_empty() => self.submit(),
                _ => {}
            }
        }

        self.drawing = false;
        match key {
            EditorKey::Char('b') => self.tool = Tool::Draw,
            EditorKey::Char('t') => self.tool = Tool::SelectTile,
            EditorKey::Char('w') => self.tool = Tool::Wall,
            EditorKey::Backquote => {
                self.typing = !self.typing;
                self.command.clear();
            }
            _ => {}
        }
    }

    fn submit(&mut self) {
        let line = std::mem::take(&mut self.command);
        self.typing = false;
        match EditorCommand::parse(&line) {
            Some(command) => {
                info!(command = %line, "editor_command");
                self.execute(command);
            }
            None => debug!(command = %line, "editor_command_ignored"),
        }
    }

    fn select_tile(&mut self) {
        let x = self.mouse.x() + self.tileset_camera.x();
        let y = self.mouse.y() + self.tileset_camera.y();
        let (width, height) = (self.tileset_size.0 as i32, self.tileset_size.1 as i32);
        if x < 0 || x >= width || y < 0 || y >= height {
            return;
        }

        let tile = Pixel::new(x, y).tile();
        let per_row = (width / TILE_SIZE).max(1);
        self.selected_tile = TileId::new((tile.x() + tile.y() * per_row) as u32);
    }

    fn toggle_wall(&mut self) {
        let tile = self.map_tile_under_cursor();
        if let Some(wall) = query::grid(&self.world).is_wall(tile) {
            let _ = self.run(Command::SetWall { tile, wall: !wall });
        }
    }

    fn map_tile_under_cursor(&self) -> Tile {
        let camera = self.camera.position();
        Pixel::new(self.mouse.x() + camera.x(), self.mouse.y() + camera.y()).tile()
    }

    fn run(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(&mut self.world, command, &mut events);
        if events
            .iter()
            .any(|event| matches!(event, Event::GridLoaded { .. } | Event::GridResized { .. }))
        {
            self.camera
                .set_extent(query::grid(&self.world).pixel_size());
        }
        events
    }
}

fn is_command_character(character: char) -> bool {
    character.is_ascii_lowercase() || character.is_ascii_digit() || matches!(character, ' ' | '.')
}
