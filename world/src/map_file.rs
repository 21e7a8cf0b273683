//! Plain-text map file format.
//!
//! ```text
//! width,height
//! <height lines of comma-separated tile ids>
//! <height lines of comma-separated 0/1 wall flags>
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use highlands_core::TileId;

use crate::grid::{Grid, GridError};

/// Errors produced while reading or writing map files.
#[derive(Debug, thiserror::Error)]
pub enum MapFileError {
    /// The file could not be opened, read or written.
    #[error("failed to access map file {path}")]
    Io {
        /// Location of the map file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file ended before every expected line was read.
    #[error("map file ended early: expected line {line}")]
    Truncated {
        /// One-based number of the missing line.
        line: usize,
    },
    /// A line did not contain what its position requires.
    #[error("line {line}: {reason}")]
    Malformed {
        /// One-based line number.
        line: usize,
        /// Description of the problem.
        reason: String,
    },
    /// The decoded cells do not form a valid grid.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Serializes a grid into the map file text format.
#[must_use]
pub fn encode(grid: &Grid) -> String {
    let width = grid.width() as usize;
    let mut text = format!("{},{}\n", grid.width(), grid.height());

    for row in grid.tiles().chunks(width) {
        let line: Vec<String> = row.iter().map(|id| id.get().to_string()).collect();
        text.push_str(&line.join(","));
        text.push('\n');
    }
    for row in grid.walls().chunks(width) {
        let line: Vec<&str> = row
            .iter()
            .map(|wall| if *wall { "1" } else { "0" })
            .collect();
        text.push_str(&line.join(","));
        text.push('\n');
    }

    text
}

/// Parses map file text into a grid.
///
/// Whitespace around values and trailing commas are accepted.
pub fn decode(text: &str) -> Result<Grid, MapFileError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (header_line, header) = lines.next().ok_or(MapFileError::Truncated { line: 1 })?;
    let header = parse_values(header, header_line)?;
    let [width, height] = header[..] else {
        return Err(MapFileError::Malformed {
            line: header_line,
            reason: format!("expected `width,height`, found {} values", header.len()),
        });
    };
    if width == 0 || height == 0 {
        return Err(GridError::InvalidDimensions { width, height }.into());
    }

    let mut next_row = |expected_line: usize| -> Result<(usize, Vec<u32>), MapFileError> {
        let (line, content) = lines
            .next()
            .ok_or(MapFileError::Truncated { line: expected_line })?;
        let values = parse_values(content, line)?;
        if values.len() != width as usize {
            return Err(MapFileError::Malformed {
                line,
                reason: format!("expected {width} values, found {}", values.len()),
            });
        }
        Ok((line, values))
    };

    let rows = height as usize;
    let mut tiles = Vec::with_capacity(width as usize * rows);
    for row in 0..rows {
        let (_, values) = next_row(header_line + 1 + row)?;
        tiles.extend(values.into_iter().map(TileId::new));
    }

    let mut walls = Vec::with_capacity(width as usize * rows);
    for row in 0..rows {
        let (line, values) = next_row(header_line + 1 + rows + row)?;
        for value in values {
            match value {
                0 => walls.push(false),
                1 => walls.push(true),
                other => {
                    return Err(MapFileError::Malformed {
                        line,
                        reason: format!("wall flag must be 0 or 1, found {other}"),
                    })
                }
            }
        }
    }

    Ok(Grid::from_cells(width, height, tiles, walls)?)
}

/// Reads and parses the map file at `path`.
pub fn read(path: &Path) -> Result<Grid, MapFileError> {
    let text = fs::read_to_string(path).map_err(|source| MapFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&text)
}

/// Writes the grid to `path`, replacing any existing file.
pub fn write(grid: &Grid, path: &Path) -> Result<(), MapFileError> {
    fs::write(path, encode(grid)).map_err(|source| MapFileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_values(line: &str, number: usize) -> Result<Vec<u32>, MapFileError> {
    line.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            value.parse::<u32>().map_err(|_| MapFileError::Malformed {
                line: number,
                reason: format!("`{value}` is not a non-negative integer"),
            })
        })
        .collect()
}
