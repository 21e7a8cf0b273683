use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use highlands_core::Sprite;
use highlands_rendering::frame_source_rect;
use macroquad::{
    color::WHITE,
    math::{Rect, Vec2 as MacroquadVec2},
    texture::{self, DrawTextureParams, FilterMode, Texture2D},
};

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Cache of sprite sheets loaded from the sprite manifest.
#[derive(Debug)]
pub(crate) struct SpriteAtlas {
    textures: HashMap<Sprite, Texture2D>,
}

impl SpriteAtlas {
    /// Loads sheets from the manifest located at the provided path.
    pub(crate) fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Returns the default manifest path relative to the working directory.
    #[must_use]
    pub(crate) fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/manifest.toml")
    }

    /// Pixel size of a loaded sheet.
    #[must_use]
    pub(crate) fn sheet_size(&self, sprite: Sprite) -> Option<(u32, u32)> {
        self.textures
            .get(&sprite)
            .map(|texture| (texture.width() as u32, texture.height() as u32))
    }

    /// Draws one frame of a sheet at a screen position with an integer scale.
    pub(crate) fn draw_frame(
        &self,
        sprite: Sprite,
        frame: u32,
        position: MacroquadVec2,
        scale: f32,
        flipped: bool,
    ) -> Result<()> {
        let texture = *self
            .textures
            .get(&sprite)
            .with_context(|| format!("sprite {sprite:?} missing from atlas"))?;

        let source = frame_source_rect(sprite, frame, texture.width() as u32);
        let draw_params = DrawTextureParams {
            dest_size: Some(MacroquadVec2::new(
                source.width as f32 * scale,
                source.height as f32 * scale,
            )),
            source: Some(Rect::new(
                source.x as f32,
                source.y as f32,
                source.width as f32,
                source.height as f32,
            )),
            flip_x: flipped,
            ..DrawTextureParams::default()
        };

        texture::draw_texture_ex(texture, position.x, position.y, WHITE, draw_params);
        Ok(())
    }

    fn from_manifest_with_loader(
        path: impl AsRef<Path>,
        mut loader: impl FnMut(Sprite, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read sprite manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let entries = parse_manifest(&contents, &base)?;
        Self::from_entries(entries, &mut loader)
    }

    fn from_entries(
        entries: Vec<(Sprite, PathBuf)>,
        loader: &mut impl FnMut(Sprite, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let mut textures = HashMap::with_capacity(entries.len());
        for (sprite, path) in entries {
            let texture = loader(sprite, &path).with_context(|| {
                format!("failed to load sprite {sprite:?} from {}", path.display())
            })?;
            if textures.insert(sprite, texture).is_some() {
                bail!("duplicate sprite entry for {sprite:?}");
            }
        }
        Ok(Self { textures })
    }
}

fn default_loader(_sprite: Sprite, path: &Path) -> Result<Texture2D> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read sprite asset at {}", path.display()))?;
    let texture = Texture2D::from_file_with_format(&bytes, None);
    texture.set_filter(FilterMode::Nearest);
    Ok(texture)
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    sprites: HashMap<String, String>,
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<(Sprite, PathBuf)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse sprite manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sprite manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut resolved = HashMap::new();
    for (name, relative_path) in manifest.sprites {
        let sprite = parse_sprite_name(&name)?;
        if resolved.insert(sprite, base_path.join(relative_path)).is_some() {
            bail!("sprite manifest contains duplicate entry for {sprite:?}");
        }
    }

    let mut ordered = Vec::with_capacity(Sprite::ALL.len());
    for sprite in Sprite::ALL {
        let Some(path) = resolved.remove(&sprite) else {
            bail!("sprite manifest missing entry for {sprite:?}");
        };
        ordered.push((sprite, path));
    }

    Ok(ordered)
}

fn parse_sprite_name(name: &str) -> Result<Sprite> {
    match name {
        "Font" => Ok(Sprite::Font),
        "UiFrame" => Ok(Sprite::UiFrame),
        "Tiles" => Ok(Sprite::Tiles),
        "Player" => Ok(Sprite::Player),
        _ => bail!("unknown sprite key `{name}` in manifest"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, path::Path};

    const FULL_MANIFEST: &str = r#"
        version = 1

        [sprites]
        Player = "sprites/player.png"
        Tiles = "sprites/tiles.png"
        UiFrame = "sprites/frame.png"
        Font = "sprites/font.png"
    "#;

    #[test]
    fn parse_manifest_requires_every_sheet() {
        let manifest = r#"
            version = 1

            [sprites]
            Font = "font.png"
            Tiles = "tiles.png"
        "#;

        let result = parse_manifest(manifest, Path::new("assets"));
        assert!(result.is_err(), "manifest missing sheets should fail");
    }

    #[test]
    fn manifest_rejects_unknown_keys_and_versions() {
        let unknown = format!("{FULL_MANIFEST}\nExtra = \"extra.png\"\n");
        assert!(parse_manifest(&unknown, Path::new("assets")).is_err());

        let future = FULL_MANIFEST.replace("version = 1", "version = 2");
        assert!(parse_manifest(&future, Path::new("assets")).is_err());
    }

    #[test]
    fn manifest_resolves_paths_relative_to_base_directory() {
        let parsed = parse_manifest(FULL_MANIFEST, Path::new("root")).expect("manifest parses");
        assert_eq!(
            parsed,
            vec![
                (Sprite::Font, PathBuf::from("root/sprites/font.png")),
                (Sprite::UiFrame, PathBuf::from("root/sprites/frame.png")),
                (Sprite::Tiles, PathBuf::from("root/sprites/tiles.png")),
                (Sprite::Player, PathBuf::from("root/sprites/player.png")),
            ]
        );
    }

    #[test]
    fn atlas_loads_sheets_in_canonical_order() {
        let entries = parse_manifest(FULL_MANIFEST, Path::new("assets")).expect("manifest parses");
        let load_order = RefCell::new(Vec::new());
        let atlas = SpriteAtlas::from_entries(entries, &mut |sprite, _| {
            load_order.borrow_mut().push(sprite);
            Ok(Texture2D::empty())
        })
        .expect("atlas should load using provided loader");

        assert_eq!(load_order.borrow().as_slice(), &Sprite::ALL);
        for sprite in Sprite::ALL {
            assert!(atlas.sheet_size(sprite).is_some());
        }
    }

    #[test]
    fn loader_failures_name_the_sheet() {
        let entries = vec![(Sprite::Font, PathBuf::from("font.png"))];
        let error = SpriteAtlas::from_entries(entries, &mut |_, _| bail!("missing file"))
            .expect_err("loader error propagates");
        assert!(format!("{error:#}").contains("Font"));
    }
}
