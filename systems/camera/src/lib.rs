#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Camera that keeps the player inside a dead zone and never shows space
//! beyond the grid.

use highlands_core::{CameraConfig, Pixel, TILE_SIZE};

/// Top-left corner of the viewport in world pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Camera {
    position: Pixel,
    max_position: Pixel,
    viewport: (i32, i32),
    margin: i32,
}

impl Camera {
    /// Creates a camera at the origin for a grid measuring `grid_size` pixels.
    #[must_use]
    pub fn new(config: &CameraConfig, grid_size: (i32, i32)) -> Self {
        let mut camera = Self {
            position: Pixel::default(),
            max_position: Pixel::default(),
            viewport: (
                config.viewport_width as i32,
                config.viewport_height as i32,
            ),
            margin: config.margin_tiles as i32 * TILE_SIZE,
        };
        camera.set_extent(grid_size);
        camera
    }

    /// Current top-left corner.
    #[must_use]
    pub const fn position(&self) -> Pixel {
        self.position
    }

    /// Largest position the follow rule allows.
    ///
    /// Components are negative when the grid is smaller than the viewport.
    #[must_use]
    pub const fn max_position(&self) -> Pixel {
        self.max_position
    }

    /// Visible area in pixels.
    #[must_use]
    pub const fn viewport(&self) -> (i32, i32) {
        self.viewport
    }

    /// Recomputes the clamp limit after the grid changed size.
    pub fn set_extent(&mut self, grid_size: (i32, i32)) {
        self.max_position = Pixel::new(
            grid_size.0 - self.viewport.0,
            grid_size.1 - self.viewport.1,
        );
    }

    /// Snaps the camera so `target` sits inside the dead zone, then clamps
    /// it to the grid.
    pub fn follow(&mut self, target: Pixel) {
        let x = follow_axis(
            self.position.x(),
            target.x(),
            self.margin,
            self.viewport.0 - self.margin,
            self.max_position.x(),
        );
        let y = follow_axis(
            self.position.y(),
            target.y(),
            self.margin,
            self.viewport.1 - self.margin,
            self.max_position.y(),
        );
        self.position = Pixel::new(x, y);
    }

    /// Moves the camera by `delta` without any clamping.
    pub fn pan(&mut self, delta: Pixel) {
        self.position = Pixel::new(
            self.position.x() + delta.x(),
            self.position.y() + delta.y(),
        );
    }

    /// Converts a world position into viewport coordinates.
    #[must_use]
    pub fn to_screen(&self, world: Pixel) -> Pixel {
        world - self.position
    }
}

fn follow_axis(camera: i32, target: i32, low: i32, high: i32, max: i32) -> i32 {
    let on_screen = target - camera;
    let camera = if on_screen < low {
        target - low
    } else if on_screen > high {
        target - high
    } else {
        camera
    };

    // Lower bound wins when the grid is narrower than the viewport.
    camera.min(max).max(0)
}
