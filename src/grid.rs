use std::fmt::{self, Display};

use anyhow::{bail, Result};

use crate::geometry::{v, Vector};

/// Contents of one cell: 0 is open floor, anything else is a wall whose
/// value selects its color.
pub type TileCode = u8;

pub const FLOOR: TileCode = 0;

/// Tiles are probed one world unit past a grid line, so they must be
/// larger than that.
pub const MIN_TILE_SIZE: f64 = 2.0;

const DEMO_LEVEL: [[TileCode; 15]; 11] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 1, 0, 0, 0, 0, 2, 2, 2, 0, 0, 0, 1],
    [1, 0, 0, 1, 1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 1],
    [1, 0, 2, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 3, 1, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, 0, 3, 3, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

/// Immutable tile map. Row-major, origin at the top-left corner; each
/// cell covers a `tile_size` square of world space.
#[derive(Clone,Debug,PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    tile_size: f64,
    cells: Vec<TileCode>,
}

impl Grid {

    pub fn new(rows: Vec<Vec<TileCode>>, tile_size: f64) -> Result<Self> {

        if !tile_size.is_finite() || tile_size < MIN_TILE_SIZE {
            bail!("tile size must be a finite value >= {}, got {}", MIN_TILE_SIZE, tile_size);
        }

        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);

        if height == 0 || width == 0 {
            bail!("empty grid");
        }

        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                bail!("row {} has {} cells, expected {}", y, row.len(), width);
            }
            cells.extend(row);
        }

        Ok(Grid { width, height, tile_size, cells })
    }

    /// The built-in 15x11 level.
    pub fn demo(tile_size: f64) -> Result<Self> {
        Grid::new(DEMO_LEVEL.iter().map(|r| r.to_vec()).collect(), tile_size)
    }

    /// Number of columns.
    pub fn width(&self) -> usize { self.width }

    /// Number of rows.
    pub fn height(&self) -> usize { self.height }

    pub fn tile_size(&self) -> f64 { self.tile_size }

    /// Far corner of the grid in world space.
    pub fn world_extent(&self) -> Vector {
        v(self.width as f64 * self.tile_size, self.height as f64 * self.tile_size)
    }

    /// Cell containing a world position, as (col, row). Floors toward
    /// negative infinity, so small negative coordinates land in column -1.
    pub fn to_grid_coordinates(&self, p: Vector) -> (i64, i64) {
        (
            (p.x / self.tile_size).floor() as i64,
            (p.y / self.tile_size).floor() as i64,
        )
    }

    /// World position of the center of a cell.
    pub fn cell_center(&self, col: usize, row: usize) -> Vector {
        v((col as f64 + 0.5) * self.tile_size, (row as f64 + 0.5) * self.tile_size)
    }

    pub fn is_in_bounds(&self, col: i64, row: i64) -> bool {
        col >= 0 && row >= 0 && (col as u64) < self.width as u64 && (row as u64) < self.height as u64
    }

    pub fn cell(&self, col: i64, row: i64) -> Option<TileCode> {
        if self.is_in_bounds(col, row) {
            Some(self.cells[row as usize * self.width + col as usize])
        } else {
            None
        }
    }

    /// Tile under a world position, or `None` outside the grid.
    pub fn tile_at(&self, p: Vector) -> Option<TileCode> {
        let (col, row) = self.to_grid_coordinates(p);
        self.cell(col, row)
    }

    /// True iff the position is inside the grid and on a wall tile.
    pub fn is_wall(&self, p: Vector) -> bool {
        matches!(self.tile_at(p), Some(t) if t != FLOOR)
    }

    /// Every cell as (col, row, code), row by row.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, TileCode)> + '_ {
        let w = self.width;
        self.cells.iter().enumerate().map(move |(i, &t)| (i % w, i / w, t))
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            for &t in row {
                match t {
                    FLOOR => write!(f, ".")?,
                    t if t < 10 => write!(f, "{}", t)?,
                    _ => write!(f, "#")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
