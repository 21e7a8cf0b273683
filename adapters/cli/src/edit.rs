//! Edit mode: input translation and editor drawing.

use glam::IVec2;
use highlands_core::{Pixel, Sprite, Tile, TILE_SIZE};
use highlands_rendering::{visible_tiles, FrameInput, KeyPress, Marker, PointerButton, SpriteRenderer};
use highlands_system_editor::{Editor, EditorInput, EditorKey, MouseButton, Tool};
use highlands_world::query;

use crate::game::draw_terrain;

/// Editor events for one frame, in the order the editor expects them.
pub(crate) fn editor_inputs(input: &FrameInput) -> Vec<EditorInput> {
    let mut events = Vec::new();
    if let Some(cursor) = input.cursor {
        events.push(EditorInput::MouseMoved {
            position: Pixel::new(cursor.x, cursor.y),
            delta: Pixel::new(input.cursor_delta.x, input.cursor_delta.y),
        });
    }
    events.extend(
        input
            .pressed_buttons
            .iter()
            .map(|button| EditorInput::ButtonPressed(mouse_button(*button))),
    );
    events.extend(
        input
            .released_buttons
            .iter()
            .map(|button| EditorInput::ButtonReleased(mouse_button(*button))),
    );
    events.extend(input.keys.iter().map(|key| {
        EditorInput::Key(match *key {
            KeyPress::Char(character) => EditorKey::Char(character),
            KeyPress::Backspace => EditorKey::Backspace,
            KeyPress::Return => EditorKey::Return,
            KeyPress::Backquote => EditorKey::Backquote,
        })
    }));
    events
}

fn mouse_button(button: PointerButton) -> MouseButton {
    match button {
        PointerButton::Primary => MouseButton::Primary,
        PointerButton::Secondary => MouseButton::Secondary,
    }
}

/// Draws the active editor view and the command line.
pub(crate) fn draw_editor(editor: &Editor, renderer: &mut impl SpriteRenderer) {
    if editor.tool() == Tool::SelectTile {
        draw_tile_sheet(editor, renderer);
    } else {
        draw_map(editor, renderer);
    }

    if let Some(line) = editor.command_line() {
        let viewport = renderer.viewport();
        renderer.render_text(line, IVec2::new(0, viewport.y - 8));
    }
}

fn draw_tile_sheet(editor: &Editor, renderer: &mut impl SpriteRenderer) {
    let scroll = editor.tileset_camera();
    let origin = IVec2::new(-scroll.x(), -scroll.y());
    renderer.render_sprite(Sprite::Tiles, origin);

    let per_row = (editor.tileset_size().0 as i32 / TILE_SIZE).max(1);
    let index = editor.selected_tile().get() as i32;
    let selected = IVec2::new(index % per_row, index / per_row) * TILE_SIZE;
    renderer.render_marker(Marker::TileSelection, origin + selected);
}

fn draw_map(editor: &Editor, renderer: &mut impl SpriteRenderer) {
    let camera = editor.camera().position();
    draw_terrain(editor.world(), camera, renderer);

    let grid = query::grid(editor.world());
    let (columns, rows) = visible_tiles(
        (grid.width(), grid.height()),
        IVec2::new(camera.x(), camera.y()),
        renderer.viewport(),
        TILE_SIZE,
    );
    for y in rows {
        for x in columns.clone() {
            let tile = Tile::new(x, y);
            if grid.is_wall(tile) == Some(true) {
                renderer.render_marker(Marker::WallCross, screen_position(editor, tile));
            }
        }
    }

    let Some(hovered) = editor.hovered_tile() else {
        return;
    };
    let position = screen_position(editor, hovered);
    if editor.tool() == Tool::Draw {
        renderer.render_sprite_frame(Sprite::Tiles, editor.selected_tile().get(), position, false);
    }
    renderer.render_marker(Marker::Hover, position);
}

fn screen_position(editor: &Editor, tile: Tile) -> IVec2 {
    let position = editor.camera().to_screen(tile.position());
    IVec2::new(position.x(), position.y())
}
