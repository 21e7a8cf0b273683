//! Game settings loaded from an optional TOML file.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use highlands_core::GameConfig;
use tracing::info;

/// Reads and validates the settings at `path`, or returns the defaults.
pub(crate) fn load_game_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    let config: GameConfig = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config at {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config at {}", path.display()))?;

    info!(
        path = %path.display(),
        width = config.world.width,
        height = config.world.height,
        step_length = config.world.step_length,
        "config_loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn missing_path_uses_defaults() {
        let config = load_game_config(None).expect("defaults");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn partial_file_overrides_named_keys() {
        let file = write_config("[world]\nwidth = 32\n\n[dialog]\nreveal_delay = 1\n");
        let config = load_game_config(Some(file.path())).expect("config loads");
        assert_eq!(config.world.width, 32);
        assert_eq!(config.world.height, GameConfig::default().world.height);
        assert_eq!(config.dialog.reveal_delay, 1);
    }

    #[test]
    fn invalid_values_are_reported() {
        let file = write_config("[world]\nstep_length = 5\n");
        let error = load_game_config(Some(file.path())).expect_err("step length rejected");
        assert!(format!("{error:#}").contains("invalid config"));

        let file = write_config("[world]\nspeed = 3\n");
        assert!(load_game_config(Some(file.path())).is_err());

        assert!(load_game_config(Some(Path::new("/nonexistent/highlands.toml"))).is_err());
    }
}
