//! Rectangular terrain grid with per-cell wall flags.

use highlands_core::{Tile, TileId, TILE_SIZE};

/// Errors raised when a grid cannot take on the requested shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// Width or height was zero.
    #[error("grid dimensions {width}x{height} must both be positive")]
    InvalidDimensions {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// Cell storage did not match the declared dimensions.
    #[error("expected {expected} cells but found {found}")]
    CellCount {
        /// Cells implied by the dimensions.
        expected: usize,
        /// Cells actually supplied.
        found: usize,
    },
}

/// Terrain identifiers and wall flags stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<TileId>,
    walls: Vec<bool>,
}

impl Grid {
    /// Creates a grid of the provided size with every cell zeroed.
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        let cells = cell_count(width, height)?;
        Ok(Self {
            width,
            height,
            tiles: vec![TileId::default(); cells],
            walls: vec![false; cells],
        })
    }

    /// Creates a grid from existing row-major cell data.
    pub fn from_cells(
        width: u32,
        height: u32,
        tiles: Vec<TileId>,
        walls: Vec<bool>,
    ) -> Result<Self, GridError> {
        let expected = cell_count(width, height)?;
        for found in [tiles.len(), walls.len()] {
            if found != expected {
                return Err(GridError::CellCount { expected, found });
            }
        }
        Ok(Self {
            width,
            height,
            tiles,
            walls,
        })
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Size of the grid measured in pixels.
    #[must_use]
    pub const fn pixel_size(&self) -> (i32, i32) {
        (
            self.width as i32 * TILE_SIZE,
            self.height as i32 * TILE_SIZE,
        )
    }

    /// Reports whether the tile lies inside the grid.
    #[must_use]
    pub fn in_bounds(&self, tile: Tile) -> bool {
        self.index(tile).is_some()
    }

    /// Terrain identifier stored at the tile, if it lies inside the grid.
    #[must_use]
    pub fn tile_id(&self, tile: Tile) -> Option<TileId> {
        self.index(tile).map(|index| self.tiles[index])
    }

    /// Wall flag stored at the tile, if it lies inside the grid.
    #[must_use]
    pub fn is_wall(&self, tile: Tile) -> Option<bool> {
        self.index(tile).map(|index| self.walls[index])
    }

    /// Stores a terrain identifier; out-of-range tiles are ignored.
    pub fn set_tile(&mut self, tile: Tile, id: TileId) {
        if let Some(index) = self.index(tile) {
            self.tiles[index] = id;
        }
    }

    /// Stores a wall flag; out-of-range tiles are ignored.
    pub fn set_wall(&mut self, tile: Tile, wall: bool) {
        if let Some(index) = self.index(tile) {
            self.walls[index] = wall;
        }
    }

    /// Terrain identifiers in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    /// Wall flags in row-major order.
    #[must_use]
    pub fn walls(&self) -> &[bool] {
        &self.walls
    }

    /// Changes the grid size, keeping the overlapping top-left region.
    ///
    /// Zero dimensions are rejected and leave the grid untouched.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), GridError> {
        let _ = cell_count(width, height)?;
        let old = (self.width, self.height);
        self.tiles = resize_cells(&self.tiles, old, (width, height));
        self.walls = resize_cells(&self.walls, old, (width, height));
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn index(&self, tile: Tile) -> Option<usize> {
        let x = u32::try_from(tile.x()).ok()?;
        let y = u32::try_from(tile.y()).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

/// Copies row-major cells into storage for new dimensions.
///
/// Cells inside both the old and the new rectangle keep their value, new
/// cells receive `T::default()` and the rest are dropped.
#[must_use]
pub fn resize_cells<T: Copy + Default>(cells: &[T], old: (u32, u32), new: (u32, u32)) -> Vec<T> {
    let (old_width, old_height) = (old.0 as usize, old.1 as usize);
    let (new_width, new_height) = (new.0 as usize, new.1 as usize);
    let mut resized = vec![T::default(); new_width * new_height];

    for y in 0..old_height.min(new_height) {
        let keep = old_width.min(new_width);
        let source = y * old_width;
        let target = y * new_width;
        resized[target..target + keep].copy_from_slice(&cells[source..source + keep]);
    }

    resized
}

fn cell_count(width: u32, height: u32) -> Result<usize, GridError> {
    if width == 0 || height == 0 {
        return Err(GridError::InvalidDimensions { width, height });
    }
    Ok(width as usize * height as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_reject_out_of_range_tiles() {
        let mut grid = Grid::new(3, 2).expect("valid grid");
        for tile in [
            Tile::new(-1, 0),
            Tile::new(0, -1),
            Tile::new(3, 0),
            Tile::new(0, 2),
        ] {
            assert!(!grid.in_bounds(tile));
            assert_eq!(grid.tile_id(tile), None);
            assert_eq!(grid.is_wall(tile), None);
            grid.set_tile(tile, TileId::new(9));
            grid.set_wall(tile, true);
        }
        assert!(grid.tiles().iter().all(|id| id.get() == 0));
        assert!(grid.walls().iter().all(|wall| !wall));
    }

    #[test]
    fn setters_address_row_major_cells() {
        let mut grid = Grid::new(3, 2).expect("valid grid");
        grid.set_tile(Tile::new(2, 1), TileId::new(7));
        grid.set_wall(Tile::new(1, 0), true);

        assert_eq!(grid.tiles()[5], TileId::new(7));
        assert!(grid.walls()[1]);
        assert_eq!(grid.tile_id(Tile::new(2, 1)), Some(TileId::new(7)));
        assert_eq!(grid.is_wall(Tile::new(1, 0)), Some(true));
    }

    #[test]
    fn resize_cells_keeps_overlap() {
        let cells = [1, 2, 3, 4, 5, 6];
        assert_eq!(resize_cells(&cells, (3, 2), (2, 3)), vec![1, 2, 4, 5, 0, 0]);
        assert_eq!(
            resize_cells(&cells, (3, 2), (4, 2)),
            vec![1, 2, 3, 0, 4, 5, 6, 0]
        );
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert_eq!(
            Grid::new(0, 4),
            Err(GridError::InvalidDimensions {
                width: 0,
                height: 4
            })
        );

        let mut grid = Grid::new(2, 2).expect("valid grid");
        grid.set_tile(Tile::new(1, 1), TileId::new(3));
        let before = grid.clone();
        assert!(grid.resize(5, 0).is_err());
        assert_eq!(grid, before);
    }

    #[test]
    fn from_cells_checks_lengths() {
        let error = Grid::from_cells(2, 2, vec![TileId::new(0); 4], vec![false; 3])
            .expect_err("wall count mismatch");
        assert_eq!(
            error,
            GridError::CellCount {
                expected: 4,
                found: 3
            }
        );
    }
}
