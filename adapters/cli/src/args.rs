//! Command-line arguments.

use std::{fmt, path::PathBuf, str::FromStr};

use clap::{Parser, Subcommand};
use highlands_rendering::WindowSettings;

/// Top-down tile adventure with a built-in map editor.
#[derive(Debug, Parser)]
#[command(name = "highlands", version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) mode: Option<Mode>,
    /// Map file loaded at startup and used by editor commands.
    #[arg(long, global = true, default_value = "./world.map")]
    pub(crate) map: PathBuf,
    /// TOML file overriding the built-in game settings.
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,
    /// Sprite manifest listing the sheets to load.
    #[arg(long, global = true, default_value = "assets/manifest.toml")]
    pub(crate) sprites: PathBuf,
    /// Start in fullscreen.
    #[arg(long, global = true)]
    pub(crate) fullscreen: bool,
    /// Window size as WIDTHxHEIGHT; defaults to four times the viewport.
    #[arg(long, global = true)]
    pub(crate) resolution: Option<Resolution>,
    /// Log the frame rate once per second.
    #[arg(long, global = true)]
    pub(crate) show_fps: bool,
}

impl Cli {
    /// Window settings for a viewport of the given pixel size.
    pub(crate) fn window_settings(&self, viewport: (u32, u32)) -> WindowSettings {
        let mut window = WindowSettings::scaled(viewport);
        if let Some(resolution) = self.resolution {
            window.resolution = (resolution.width, resolution.height);
        }
        window.fullscreen = self.fullscreen;
        window
    }
}

/// What to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Subcommand)]
pub(crate) enum Mode {
    /// Walk around the overworld.
    #[default]
    Play,
    /// Edit the map file.
    Edit,
}

/// Window size in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Resolution {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

/// Rejected `--resolution` value.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ResolutionError(String);

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid resolution `{}`; expected WIDTHxHEIGHT with positive sizes",
            self.0
        )
    }
}

impl std::error::Error for ResolutionError {}

impl FromStr for Resolution {
    type Err = ResolutionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ResolutionError(value.to_owned());
        let (width, height) = value.split_once(['x', 'X']).ok_or_else(invalid)?;
        let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
        let height = height.trim().parse::<u32>().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("highlands").chain(args.iter().copied()))
            .expect("arguments parse")
    }

    #[test]
    fn defaults_to_play_with_local_map() {
        let cli = parse(&[]);
        assert_eq!(cli.mode.unwrap_or_default(), Mode::Play);
        assert_eq!(cli.map, PathBuf::from("./world.map"));
        assert_eq!(cli.sprites, PathBuf::from("assets/manifest.toml"));
        assert!(cli.config.is_none());
        assert_eq!(
            cli.window_settings((160, 144)),
            WindowSettings {
                resolution: (640, 576),
                fullscreen: false,
            }
        );
    }

    #[test]
    fn edit_mode_accepts_global_flags() {
        let cli = parse(&[
            "edit",
            "--map",
            "maps/town.map",
            "--resolution",
            "800x720",
            "--fullscreen",
        ]);
        assert_eq!(cli.mode, Some(Mode::Edit));
        assert_eq!(cli.map, PathBuf::from("maps/town.map"));
        assert_eq!(
            cli.window_settings((160, 144)),
            WindowSettings {
                resolution: (800, 720),
                fullscreen: true,
            }
        );
    }

    #[test]
    fn resolution_rejects_malformed_and_zero_sizes() {
        assert_eq!(
            "1280X1152".parse::<Resolution>(),
            Ok(Resolution {
                width: 1280,
                height: 1152
            })
        );
        assert!("1280".parse::<Resolution>().is_err());
        assert!("0x720".parse::<Resolution>().is_err());
        assert!("widexhigh".parse::<Resolution>().is_err());
        assert!(Cli::try_parse_from(["highlands", "--resolution", "10x"]).is_err());
    }
}
