#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots Highlands in play or edit mode.

mod args;
mod edit;
mod game;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use glam::IVec2;
use highlands_core::Sprite;
use highlands_rendering::{Color, Presentation, RenderingBackend, Scene, SpriteRenderer};
use highlands_rendering_macroquad::MacroquadBackend;
use highlands_system_editor::Editor;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use self::args::{Cli, Mode};

const WINDOW_TITLE: &str = "Highlands";

/// Entry point for the Highlands command-line interface.
fn main() {
    init_tracing();
    if let Err(err) = run(Cli::parse()) {
        error!(error = %format!("{err:#}"), "startup_failed");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = settings::load_game_config(cli.config.as_deref())?;
    let viewport = (config.camera.viewport_width, config.camera.viewport_height);
    let scene = Scene::new(IVec2::new(viewport.0 as i32, viewport.1 as i32));
    let presentation = Presentation::new(
        WINDOW_TITLE,
        Color::from_rgb_u8(0, 0, 0),
        cli.window_settings(viewport),
        scene,
    );
    let backend = MacroquadBackend::new()
        .with_manifest_path(cli.sprites.clone())
        .with_show_fps(cli.show_fps);

    let mode = cli.mode.unwrap_or_default();
    info!(?mode, map = %cli.map.display(), "starting");
    match mode {
        Mode::Play => {
            let mut overworld = game::build_overworld(&config, &cli.map)?;
            backend.run(presentation, move |_, input, scene| {
                overworld.update(game::intent(&input));
                scene.clear();
                game::draw_overworld(&overworld, scene);
            })
        }
        Mode::Edit => {
            let mut editor =
                Editor::new(&config.world, &config.camera, (0, 0)).context("failed to create the editor")?;
            let _ = editor.load(&cli.map);
            backend.run(presentation, move |_, input, scene| {
                if let Some(size) = scene.sheet_size(Sprite::Tiles) {
                    editor.set_tileset_size(size);
                }
                for event in edit::editor_inputs(&input) {
                    editor.handle(event);
                }
                editor.update();
                scene.clear();
                edit::draw_editor(&editor, scene);
            })
        }
    }
}
