#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Highlands adapters.
//!
//! Game code draws through [`SpriteRenderer`]. Only
//! [`SpriteRenderer::render_sprite_frame`] needs a backend; text, dialog
//! boxes, whole sheets and actor animations are composed from it here so that
//! every backend lays them out identically.

use anyhow::Result as AnyResult;
use glam::IVec2;
use highlands_core::{Animation, Direction, Sprite};
use std::{collections::HashMap, ops::Range, time::Duration};

/// Side length of a font or frame cell in pixels.
pub const CELL_SIZE: i32 = 8;

/// Height of the dialog box in cells, border included.
pub const DIALOG_HEIGHT_CELLS: i32 = 4;

/// Frame of the UI frame sheet used for the dialog interior.
const DIALOG_INTERIOR_FRAME: u32 = 4;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Pointer button reported by adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Usually the left mouse button.
    Primary,
    /// Usually the right mouse button.
    Secondary,
}

/// Text-entry key reported by adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyPress {
    /// A printable character.
    Char(char),
    /// Backspace.
    Backspace,
    /// Return or enter.
    Return,
    /// The backquote key.
    Backquote,
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Direction the player currently wants to walk in.
    pub direction: Option<Direction>,
    /// Whether the interact key went down this frame.
    pub interact: bool,
    /// Cursor position in viewport pixels, when the cursor is over the window.
    pub cursor: Option<IVec2>,
    /// Cursor movement since the previous frame in viewport pixels.
    pub cursor_delta: IVec2,
    /// Buttons that went down this frame.
    pub pressed_buttons: Vec<PointerButton>,
    /// Buttons that went up this frame.
    pub released_buttons: Vec<PointerButton>,
    /// Text-entry keys in the order they were pressed.
    pub keys: Vec<KeyPress>,
}

/// Tracks held direction keys and resolves the current walking direction.
///
/// Pressing a key makes it current. Releasing any direction key falls back
/// to the first still-held direction in Up, Right, Down, Left order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldDirections {
    held: [bool; 4],
    current: Option<Direction>,
}

impl HeldDirections {
    /// Records a key press.
    pub fn press(&mut self, direction: Direction) {
        self.held[usize::from(direction.index())] = true;
        self.current = Some(direction);
    }

    /// Records a key release.
    pub fn release(&mut self, direction: Direction) {
        self.held[usize::from(direction.index())] = false;
        self.current = Direction::ALL
            .into_iter()
            .find(|candidate| self.held[usize::from(candidate.index())]);
    }

    /// Direction the player should walk in.
    #[must_use]
    pub const fn current(&self) -> Option<Direction> {
        self.current
    }
}

/// Source rectangle of a frame within a sprite sheet, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

/// Locates `frame` in a sheet `sheet_width` pixels wide.
///
/// Frames are laid out left to right, wrapping to the next row.
#[must_use]
pub fn frame_source_rect(sprite: Sprite, frame: u32, sheet_width: u32) -> SourceRect {
    let (width, height) = sprite.frame_size();
    let offset = width.saturating_mul(frame);
    let sheet_width = sheet_width.max(width);
    SourceRect {
        x: offset % sheet_width,
        y: (offset / sheet_width) * height,
        width,
        height,
    }
}

/// Number of frames a sheet of the given pixel size holds.
#[must_use]
pub fn frame_count(sprite: Sprite, sheet_size: (u32, u32)) -> u32 {
    let (width, height) = sprite.frame_size();
    (sheet_size.0 / width) * (sheet_size.1 / height)
}

/// Selects the sheet frame for an actor facing `facing`, and whether it is
/// mirrored horizontally.
///
/// Rows hold down, up and side animations; left reuses the side row flipped.
#[must_use]
pub fn actor_frame(animation: &Animation, facing: Direction) -> (u32, bool) {
    let row = match facing {
        Direction::Down => 0,
        Direction::Up => 1,
        Direction::Right | Direction::Left => 2,
    };
    (
        animation.frame() + row * animation.frame_count(),
        facing == Direction::Left,
    )
}

/// Font frame showing `character`.
#[must_use]
pub fn glyph_frame(character: char) -> u32 {
    u32::from(character).saturating_sub(u32::from(' '))
}

/// Tiles of a `grid_size` grid that intersect a viewport at `camera`.
#[must_use]
pub fn visible_tiles(
    grid_size: (u32, u32),
    camera: IVec2,
    viewport: IVec2,
    tile_size: i32,
) -> (Range<i32>, Range<i32>) {
    let axis = |camera: i32, viewport: i32, count: u32| {
        let count = i32::try_from(count).unwrap_or(i32::MAX);
        let start = camera.div_euclid(tile_size).clamp(0, count);
        let end = (camera + viewport + tile_size - 1)
            .div_euclid(tile_size)
            .clamp(start, count);
        start..end
    };
    (
        axis(camera.x, viewport.x, grid_size.0),
        axis(camera.y, viewport.y, grid_size.1),
    )
}

/// Single cell of a laid out dialog box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DialogCell {
    /// Sheet the cell is drawn from.
    pub sprite: Sprite,
    /// Frame within the sheet.
    pub frame: u32,
    /// Top-left corner in viewport pixels.
    pub position: IVec2,
}

/// Lays out a dialog box along the bottom of `viewport`.
///
/// The border is a nine-slice of the UI frame sheet. Interior cells show the
/// revealed characters of `rows` and blanks elsewhere.
#[must_use]
pub fn dialog_cells(
    viewport: IVec2,
    rows: &[Vec<char>],
    row_length: usize,
    display_length: usize,
) -> Vec<DialogCell> {
    let width = viewport.x / CELL_SIZE;
    let base_y = viewport.y - DIALOG_HEIGHT_CELLS * CELL_SIZE;
    let mut cells = Vec::new();

    for y in 0..DIALOG_HEIGHT_CELLS {
        for x in 0..width {
            let position = IVec2::new(x * CELL_SIZE, base_y + y * CELL_SIZE);
            let mut frame = DIALOG_INTERIOR_FRAME;
            if x == 0 {
                frame -= 1;
            } else if x == width - 1 {
                frame += 1;
            }
            if y == 0 {
                frame -= 3;
            } else if y == DIALOG_HEIGHT_CELLS - 1 {
                frame += 3;
            }

            if frame != DIALOG_INTERIOR_FRAME {
                cells.push(DialogCell {
                    sprite: Sprite::UiFrame,
                    frame,
                    position,
                });
                continue;
            }

            let (row, col) = ((y - 1) as usize, (x - 1) as usize);
            let glyph = rows
                .get(row)
                .and_then(|characters| characters.get(col))
                .filter(|_| row * row_length + col < display_length)
                .map_or(0, |character| glyph_frame(*character));
            cells.push(DialogCell {
                sprite: Sprite::Font,
                frame: glyph,
                position,
            });
        }
    }

    cells
}

/// Overlay drawn by the editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Cross over a wall tile.
    WallCross,
    /// Outline around the selected tile of the tile sheet.
    TileSelection,
    /// Outline around the hovered tile.
    Hover,
}

/// Drawing capability consumed by game code.
pub trait SpriteRenderer {
    /// Size of the viewport in pixels.
    fn viewport(&self) -> IVec2;

    /// Pixel size of a loaded sheet, if known.
    fn sheet_size(&self, sprite: Sprite) -> Option<(u32, u32)>;

    /// Draws one frame of a sheet with its top-left corner at `position`.
    fn render_sprite_frame(&mut self, sprite: Sprite, frame: u32, position: IVec2, flipped: bool);

    /// Draws the whole sheet as laid out on disk.
    fn render_sprite(&mut self, sprite: Sprite, position: IVec2) {
        let Some(size) = self.sheet_size(sprite) else {
            self.render_sprite_frame(sprite, 0, position, false);
            return;
        };
        for frame in 0..frame_count(sprite, size) {
            let rect = frame_source_rect(sprite, frame, size.0);
            let offset = IVec2::new(rect.x as i32, rect.y as i32);
            self.render_sprite_frame(sprite, frame, position + offset, false);
        }
    }

    /// Draws the current frame of an actor's walk animation.
    fn render_animation_frame(&mut self, animation: &Animation, facing: Direction, position: IVec2) {
        let (frame, flipped) = actor_frame(animation, facing);
        self.render_sprite_frame(animation.sprite(), frame, position, flipped);
    }

    /// Draws a single line of text.
    fn render_text(&mut self, text: &str, position: IVec2) {
        for (index, character) in text.chars().enumerate() {
            let offset = IVec2::new(index as i32 * CELL_SIZE, 0);
            self.render_sprite_frame(Sprite::Font, glyph_frame(character), position + offset, false);
        }
    }

    /// Draws the dialog box with the first `display_length` characters shown.
    fn render_dialog(&mut self, rows: &[Vec<char>], row_length: usize, display_length: usize) {
        for cell in dialog_cells(self.viewport(), rows, row_length, display_length) {
            self.render_sprite_frame(cell.sprite, cell.frame, cell.position, false);
        }
    }

    /// Draws an editor overlay over the tile at `position`.
    fn render_marker(&mut self, _marker: Marker, _position: IVec2) {}
}

/// Draw operation recorded by a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawCall {
    /// One sheet frame.
    Sprite {
        /// Sheet to draw from.
        sprite: Sprite,
        /// Frame within the sheet.
        frame: u32,
        /// Top-left corner in viewport pixels.
        position: IVec2,
        /// Whether the frame is mirrored horizontally.
        flipped: bool,
    },
    /// An editor overlay.
    Marker {
        /// Overlay kind.
        marker: Marker,
        /// Top-left corner of the marked tile in viewport pixels.
        position: IVec2,
    },
}

/// Draw calls for a single frame, replayed by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scene {
    viewport: IVec2,
    sheets: HashMap<Sprite, (u32, u32)>,
    calls: Vec<DrawCall>,
}

impl Scene {
    /// Creates an empty scene for a viewport of the given pixel size.
    #[must_use]
    pub fn new(viewport: IVec2) -> Self {
        Self {
            viewport,
            sheets: HashMap::new(),
            calls: Vec::new(),
        }
    }

    /// Records the pixel size of a loaded sheet.
    pub fn set_sheet_size(&mut self, sprite: Sprite, size: (u32, u32)) {
        let _ = self.sheets.insert(sprite, size);
    }

    /// Recorded calls in drawing order.
    #[must_use]
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Drops every recorded call, keeping sheet sizes.
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl SpriteRenderer for Scene {
    fn viewport(&self) -> IVec2 {
        self.viewport
    }

    fn sheet_size(&self, sprite: Sprite) -> Option<(u32, u32)> {
        self.sheets.get(&sprite).copied()
    }

    fn render_sprite_frame(&mut self, sprite: Sprite, frame: u32, position: IVec2, flipped: bool) {
        self.calls.push(DrawCall::Sprite {
            sprite,
            frame,
            position,
            flipped,
        });
    }

    fn render_marker(&mut self, marker: Marker, position: IVec2) {
        self.calls.push(DrawCall::Marker { marker, position });
    }
}

/// Window settings requested by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSettings {
    /// Window size in physical pixels.
    pub resolution: (u32, u32),
    /// Whether to start fullscreen.
    pub fullscreen: bool,
}

impl WindowSettings {
    /// Integer scale applied to the viewport when no resolution is given.
    pub const DEFAULT_SCALE: u32 = 4;

    /// Window sized to `viewport` at the default scale.
    #[must_use]
    pub const fn scaled(viewport: (u32, u32)) -> Self {
        Self {
            resolution: (
                viewport.0 * Self::DEFAULT_SCALE,
                viewport.1 * Self::DEFAULT_SCALE,
            ),
            fullscreen: false,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Window settings.
    pub window: WindowSettings,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, window: WindowSettings, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            window,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Highlands scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// `update_scene` is called once per fixed simulation step with the step
    /// length and the input gathered since the previous step. It should clear
    /// the scene and draw the new frame into it.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: IVec2 = IVec2::new(160, 144);

    fn sprite_calls(scene: &Scene) -> Vec<(Sprite, u32, IVec2, bool)> {
        scene
            .calls()
            .iter()
            .filter_map(|call| match *call {
                DrawCall::Sprite {
                    sprite,
                    frame,
                    position,
                    flipped,
                } => Some((sprite, frame, position, flipped)),
                DrawCall::Marker { .. } => None,
            })
            .collect()
    }

    #[test]
    fn frames_wrap_to_the_next_sheet_row() {
        assert_eq!(
            frame_source_rect(Sprite::Tiles, 3, 64),
            SourceRect {
                x: 48,
                y: 0,
                width: 16,
                height: 16
            }
        );
        assert_eq!(
            frame_source_rect(Sprite::Tiles, 5, 64),
            SourceRect {
                x: 16,
                y: 16,
                width: 16,
                height: 16
            }
        );
        assert_eq!(frame_source_rect(Sprite::Font, 33, 128).y, 16);
    }

    #[test]
    fn actor_rows_follow_facing() {
        let mut animation = Animation::new(Sprite::Player, 4, 1);
        animation.update();
        assert_eq!(actor_frame(&animation, Direction::Down), (1, false));
        assert_eq!(actor_frame(&animation, Direction::Up), (5, false));
        assert_eq!(actor_frame(&animation, Direction::Right), (9, false));
        assert_eq!(actor_frame(&animation, Direction::Left), (9, true));
    }

    #[test]
    fn releasing_falls_back_to_first_held_direction() {
        let mut held = HeldDirections::default();
        held.press(Direction::Down);
        held.press(Direction::Left);
        held.press(Direction::Right);
        assert_eq!(held.current(), Some(Direction::Right));

        held.release(Direction::Right);
        assert_eq!(held.current(), Some(Direction::Down));

        held.release(Direction::Up);
        assert_eq!(held.current(), Some(Direction::Down));

        held.release(Direction::Down);
        held.release(Direction::Left);
        assert_eq!(held.current(), None);
    }

    #[test]
    fn text_advances_one_cell_per_character() {
        let mut scene = Scene::new(VIEWPORT);
        scene.render_text("A b", IVec2::new(0, 136));
        assert_eq!(
            sprite_calls(&scene),
            vec![
                (Sprite::Font, 33, IVec2::new(0, 136), false),
                (Sprite::Font, 0, IVec2::new(8, 136), false),
                (Sprite::Font, 66, IVec2::new(16, 136), false),
            ]
        );
    }

    #[test]
    fn dialog_box_spans_the_bottom_of_the_viewport() {
        let rows = [vec!['h', 'i'], vec![' '; 2]];
        let cells = dialog_cells(VIEWPORT, &rows, 18, 1);

        assert_eq!(cells.len(), 80);
        assert_eq!(
            cells[0],
            DialogCell {
                sprite: Sprite::UiFrame,
                frame: 0,
                position: IVec2::new(0, 112),
            }
        );
        assert_eq!(cells[19].frame, 2);
        assert_eq!(cells[20].frame, 3);
        assert_eq!(cells[79].frame, 8);
        assert_eq!(cells[79].position, IVec2::new(152, 136));

        let first = cells[21];
        assert_eq!(first.sprite, Sprite::Font);
        assert_eq!(first.frame, glyph_frame('h'));
        assert_eq!(first.position, IVec2::new(8, 120));
        assert_eq!(cells[22].frame, 0, "unrevealed characters stay blank");
    }

    #[test]
    fn visible_tiles_are_culled_to_the_viewport() {
        let (columns, rows) = visible_tiles((20, 18), IVec2::new(24, 0), VIEWPORT, 16);
        assert_eq!(columns, 1..12);
        assert_eq!(rows, 0..9);

        let (columns, rows) = visible_tiles((5, 5), IVec2::ZERO, VIEWPORT, 16);
        assert_eq!(columns, 0..5);
        assert_eq!(rows, 0..5);
    }

    #[test]
    fn whole_sheet_uses_known_size() {
        let mut scene = Scene::new(VIEWPORT);
        scene.set_sheet_size(Sprite::Tiles, (32, 32));
        scene.render_sprite(Sprite::Tiles, IVec2::new(-8, 0));

        let positions: Vec<IVec2> = sprite_calls(&scene)
            .into_iter()
            .map(|(_, _, position, _)| position)
            .collect();
        assert_eq!(
            positions,
            vec![
                IVec2::new(-8, 0),
                IVec2::new(8, 0),
                IVec2::new(-8, 16),
                IVec2::new(8, 16)
            ]
        );

        scene.clear();
        scene.render_sprite(Sprite::Player, IVec2::ZERO);
        assert_eq!(scene.calls().len(), 1);
    }
}
