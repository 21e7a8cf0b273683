#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Highlands.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, so the crate depends on macroquad without its default `audio`
//! feature.
//!
//! The simulation runs at a fixed 60 Hz regardless of the display refresh
//! rate. Each step receives the input gathered since the previous frame and
//! records draw calls into the shared [`Scene`], which is then replayed at an
//! integer scale, letterboxed inside the window.

mod sprites;

use anyhow::{Context, Result};
use glam::IVec2;
use highlands_core::Direction;
use highlands_rendering::{
    DrawCall, FrameInput, HeldDirections, KeyPress, Marker, PointerButton, Presentation,
    RenderingBackend, Scene, SpriteRenderer,
};
use macroquad::{
    color::{Color as MacroquadColor, RED, WHITE, YELLOW},
    input::{
        get_char_pressed, is_key_pressed, is_key_released, is_mouse_button_pressed,
        is_mouse_button_released, mouse_position, KeyCode, MouseButton,
    },
    math::Vec2 as MacroquadVec2,
    shapes::{draw_line, draw_rectangle_lines},
};
use std::{
    path::PathBuf,
    sync::mpsc,
    time::Duration,
};
use tracing::{info, warn};

use self::sprites::SpriteAtlas;

/// Length of one simulation step.
pub const SIMULATION_STEP: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// Upper bound on simulation steps run for a single rendered frame.
const MAX_STEPS_PER_FRAME: u32 = 4;

const DIRECTION_KEYS: [(KeyCode, Direction); 4] = [
    (KeyCode::Up, Direction::Up),
    (KeyCode::Right, Direction::Right),
    (KeyCode::Down, Direction::Down),
    (KeyCode::Left, Direction::Left),
];

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    manifest_path: PathBuf,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            manifest_path: SpriteAtlas::default_manifest_path(),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(mut self, enabled: bool) -> Self {
        self.swap_interval = Some(i32::from(enabled));
        self
    }

    /// Configures whether the backend logs the frame rate once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Loads sprite sheets from the manifest at `path`.
    #[must_use]
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }
}

/// Converts variable frame times into a whole number of fixed steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct FixedStep {
    accumulator: Duration,
}

impl FixedStep {
    /// Adds a frame's duration and returns how many steps to simulate.
    ///
    /// Time beyond [`MAX_STEPS_PER_FRAME`] steps is dropped so a long stall
    /// does not trigger a burst of catch-up steps.
    fn advance(&mut self, frame: Duration) -> u32 {
        self.accumulator += frame;
        let mut steps = 0;
        while self.accumulator >= SIMULATION_STEP {
            self.accumulator -= SIMULATION_STEP;
            steps += 1;
        }
        if steps > MAX_STEPS_PER_FRAME {
            self.accumulator = Duration::ZERO;
            steps = MAX_STEPS_PER_FRAME;
        }
        steps
    }
}

/// Counts rendered frames and reports the rate once per second.
#[derive(Clone, Copy, Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

/// Maps the viewport onto the window at the largest integer scale that fits.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ViewportMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl ViewportMetrics {
    fn fit(viewport: IVec2, screen_width: f32, screen_height: f32) -> Self {
        let fit = (screen_width / viewport.x.max(1) as f32)
            .min(screen_height / viewport.y.max(1) as f32);
        let scale = if fit >= 1.0 { fit.floor() } else { fit.max(f32::EPSILON) };
        Self {
            scale,
            offset_x: ((screen_width - viewport.x as f32 * scale) / 2.0).max(0.0),
            offset_y: ((screen_height - viewport.y as f32 * scale) / 2.0).max(0.0),
        }
    }

    fn to_screen(&self, position: IVec2) -> MacroquadVec2 {
        MacroquadVec2::new(
            self.offset_x + position.x as f32 * self.scale,
            self.offset_y + position.y as f32 * self.scale,
        )
    }

    fn to_viewport(&self, screen: MacroquadVec2) -> IVec2 {
        IVec2::new(
            ((screen.x - self.offset_x) / self.scale).floor() as i32,
            ((screen.y - self.offset_y) / self.scale).floor() as i32,
        )
    }
}

/// Raw events observed during one rendered frame.
#[derive(Clone, Debug, Default, PartialEq)]
struct InputObservations {
    pressed_directions: Vec<Direction>,
    released_directions: Vec<Direction>,
    interact: bool,
    cursor: MacroquadVec2,
    pressed_buttons: Vec<PointerButton>,
    released_buttons: Vec<PointerButton>,
    characters: Vec<char>,
    backspace: bool,
    submit: bool,
}

impl InputObservations {
    fn poll() -> Self {
        let (cursor_x, cursor_y) = mouse_position();
        let mut observations = Self {
            interact: is_key_pressed(KeyCode::X),
            cursor: MacroquadVec2::new(cursor_x, cursor_y),
            backspace: is_key_pressed(KeyCode::Backspace),
            submit: is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::KpEnter),
            ..Self::default()
        };

        for (key, direction) in DIRECTION_KEYS {
            if is_key_pressed(key) {
                observations.pressed_directions.push(direction);
            }
            if is_key_released(key) {
                observations.released_directions.push(direction);
            }
        }

        for (button, pointer) in [
            (MouseButton::Left, PointerButton::Primary),
            (MouseButton::Right, PointerButton::Secondary),
        ] {
            if is_mouse_button_pressed(button) {
                observations.pressed_buttons.push(pointer);
            }
            if is_mouse_button_released(button) {
                observations.released_buttons.push(pointer);
            }
        }

        while let Some(character) = get_char_pressed() {
            observations.characters.push(character);
        }

        observations
    }
}

/// Folds one frame of observations into the input delivered to the game.
fn gather_frame_input_from_observations(
    observations: InputObservations,
    held: &mut HeldDirections,
    metrics: &ViewportMetrics,
    viewport: IVec2,
    previous_cursor: &mut Option<IVec2>,
) -> FrameInput {
    for direction in observations.pressed_directions {
        held.press(direction);
    }
    for direction in observations.released_directions {
        held.release(direction);
    }

    let position = metrics.to_viewport(observations.cursor);
    let cursor_delta = previous_cursor.map_or(IVec2::ZERO, |previous| position - previous);
    *previous_cursor = Some(position);
    let inside = position.x >= 0 && position.y >= 0 && position.x < viewport.x && position.y < viewport.y;

    let mut keys: Vec<KeyPress> = observations
        .characters
        .into_iter()
        .filter_map(|character| match character {
            '`' => Some(KeyPress::Backquote),
            character if character.is_ascii_graphic() || character == ' ' => {
                Some(KeyPress::Char(character))
            }
            _ => None,
        })
        .collect();
    if observations.backspace {
        keys.push(KeyPress::Backspace);
    }
    if observations.submit {
        keys.push(KeyPress::Return);
    }

    FrameInput {
        direction: held.current(),
        interact: observations.interact,
        cursor: inside.then_some(position),
        cursor_delta,
        pressed_buttons: observations.pressed_buttons,
        released_buttons: observations.released_buttons,
        keys,
    }
}

/// Input for the steps after the first in a frame: held state only, no edges.
fn continuation_input(input: &FrameInput) -> FrameInput {
    FrameInput {
        direction: input.direction,
        cursor: input.cursor,
        ..FrameInput::default()
    }
}

/// Folds a later frame's input into input that no step has consumed yet.
///
/// Held state comes from the later frame; edges from both frames are kept in
/// order. A button released earlier and pressed again later is still held, so
/// its stale release is dropped.
fn merge_frame_input(earlier: FrameInput, later: FrameInput) -> FrameInput {
    let FrameInput {
        interact,
        cursor_delta,
        mut pressed_buttons,
        mut released_buttons,
        mut keys,
        ..
    } = earlier;
    released_buttons.retain(|button| !later.pressed_buttons.contains(button));
    pressed_buttons.extend(later.pressed_buttons);
    released_buttons.extend(later.released_buttons);
    keys.extend(later.keys);

    FrameInput {
        direction: later.direction,
        interact: interact || later.interact,
        cursor: later.cursor,
        cursor_delta: cursor_delta + later.cursor_delta,
        pressed_buttons,
        released_buttons,
        keys,
    }
}

/// Holds frame input until a simulation step consumes it.
#[derive(Clone, Debug, Default, PartialEq)]
struct InputQueue {
    pending: Option<FrameInput>,
}

impl InputQueue {
    /// Returns the input for each of this frame's `steps`.
    ///
    /// The first step receives every edge gathered since the last step ran;
    /// later steps see held state only. A frame without steps keeps its input
    /// pending for the next one.
    fn step_inputs(&mut self, steps: u32, input: FrameInput) -> Vec<FrameInput> {
        let input = match self.pending.take() {
            Some(earlier) => merge_frame_input(earlier, input),
            None => input,
        };
        if steps == 0 {
            self.pending = Some(input);
            return Vec::new();
        }

        let rest = continuation_input(&input);
        let mut inputs = Vec::with_capacity(steps as usize);
        inputs.push(input);
        inputs.extend((1..steps).map(|_| rest.clone()));
        inputs
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            manifest_path,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            window,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(window.resolution.0).unwrap_or(i32::MAX),
            window_height: i32::try_from(window.resolution.1).unwrap_or(i32::MAX),
            fullscreen: window.fullscreen,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (atlas_init_sender, atlas_init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let atlas = match SpriteAtlas::from_manifest_path(&manifest_path)
                .context("failed to initialise sprite atlas")
            {
                Ok(atlas) => atlas,
                Err(error) => {
                    let _ = atlas_init_sender.send(Err(error));
                    return;
                }
            };
            for sprite in highlands_core::Sprite::ALL {
                if let Some(size) = atlas.sheet_size(sprite) {
                    scene.set_sheet_size(sprite, size);
                }
            }
            let _ = atlas_init_sender.send(Ok(()));
            info!(manifest = %manifest_path.display(), "sprites_loaded");

            let background = to_macroquad_color(clear_color);
            let viewport = scene.viewport();
            let mut held = HeldDirections::default();
            let mut previous_cursor = None;
            let mut fixed_step = FixedStep::default();
            let mut input_queue = InputQueue::default();
            let mut fps_counter = FpsCounter::default();

            loop {
                if is_key_pressed(KeyCode::Escape) {
                    break;
                }

                let metrics = ViewportMetrics::fit(
                    viewport,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let input = gather_frame_input_from_observations(
                    InputObservations::poll(),
                    &mut held,
                    &metrics,
                    viewport,
                    &mut previous_cursor,
                );

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let steps = fixed_step.advance(frame_dt);
                for step_input in input_queue.step_inputs(steps, input) {
                    update_scene(SIMULATION_STEP, step_input, &mut scene);
                }

                macroquad::window::clear_background(background);
                draw_scene(&scene, &atlas, &metrics);

                if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                    if show_fps {
                        info!(fps = per_second, "frame_rate");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        atlas_init_receiver.recv().unwrap_or_else(|_| Ok(()))?;

        Ok(())
    }
}

fn draw_scene(scene: &Scene, atlas: &SpriteAtlas, metrics: &ViewportMetrics) {
    for call in scene.calls() {
        match *call {
            DrawCall::Sprite {
                sprite,
                frame,
                position,
                flipped,
            } => {
                if let Err(error) =
                    atlas.draw_frame(sprite, frame, metrics.to_screen(position), metrics.scale, flipped)
                {
                    warn!(error = %error, "sprite_draw_failed");
                }
            }
            DrawCall::Marker { marker, position } => draw_marker(marker, position, metrics),
        }
    }
}

fn draw_marker(marker: Marker, position: IVec2, metrics: &ViewportMetrics) {
    let origin = metrics.to_screen(position);
    let size = highlands_core::TILE_SIZE as f32 * metrics.scale;
    let thickness = metrics.scale.max(1.0);
    match marker {
        Marker::WallCross => {
            draw_line(origin.x, origin.y, origin.x + size, origin.y + size, thickness, RED);
            draw_line(origin.x + size, origin.y, origin.x, origin.y + size, thickness, RED);
        }
        Marker::TileSelection => {
            draw_rectangle_lines(origin.x, origin.y, size, size, thickness * 2.0, YELLOW);
        }
        Marker::Hover => {
            draw_rectangle_lines(origin.x, origin.y, size, size, thickness * 2.0, WHITE);
        }
    }
}

fn to_macroquad_color(color: highlands_rendering::Color) -> MacroquadColor {
    MacroquadColor::new(color.red, color.green, color.blue, color.alpha)
}
