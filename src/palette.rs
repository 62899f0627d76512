use std::collections::BTreeMap;

use anyhow::{bail, Result};
use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::grid::{Grid, TileCode, FLOOR};

pub type RGB = (u8,u8,u8);

pub type Color = Rgba<u8>;

pub fn rgb((r,g,b): RGB) -> Color {
    Rgba([r, g, b, 255])
}

/// Colors of one wall material: `fill` for faces found by the
/// horizontal-edge scan, the darker `shade` for vertical-edge faces.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub struct WallColors {
    pub fill: RGB,
    pub shade: RGB,
}

#[derive(Debug,Clone,PartialEq,Eq,Serialize,Deserialize)]
#[serde(transparent)]
pub struct Palette(BTreeMap<TileCode, WallColors>);

impl Default for Palette {
    fn default() -> Self {
        let mut m = BTreeMap::new();
        m.insert(1, WallColors { fill: (255, 0, 0), shade: (200, 0, 0) });
        m.insert(2, WallColors { fill: (0, 255, 0), shade: (0, 200, 0) });
        m.insert(3, WallColors { fill: (0, 0, 255), shade: (0, 0, 200) });
        Palette(m)
    }
}

impl Palette {

    pub fn get(&self, tile: TileCode) -> Option<&WallColors> {
        self.0.get(&tile)
    }

    /// Strip color for a wall tile, shaded for vertical-edge hits.
    pub fn wall_color(&self, tile: TileCode, vertical: bool) -> Option<Color> {
        self.get(tile).map(|c| rgb(if vertical { c.shade } else { c.fill }))
    }

    /// Every wall code in `grid` must have an entry.
    pub fn validate(&self, grid: &Grid) -> Result<()> {
        if self.0.contains_key(&FLOOR) {
            bail!("palette has an entry for the floor code {}", FLOOR);
        }
        for (col, row, tile) in grid.cells() {
            if tile != FLOOR && self.get(tile).is_none() {
                bail!("tile code {} at ({},{}) has no palette entry", tile, col, row);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette() {
        let p = Palette::default();
        assert_eq!(p.wall_color(1, false), Some(Rgba([255, 0, 0, 255])));
        assert_eq!(p.wall_color(1, true), Some(Rgba([200, 0, 0, 255])));
        assert_eq!(p.wall_color(3, false), Some(Rgba([0, 0, 255, 255])));
        assert_eq!(p.wall_color(4, false), None);
        assert!(p.validate(&Grid::demo(64.0).unwrap()).is_ok());
    }

    #[test]
    fn test_validate_unknown_code() {
        let g = Grid::new(vec![vec![1, 7], vec![0, 0]], 64.0).unwrap();
        let err = Palette::default().validate(&g).unwrap_err();
        assert!(err.to_string().contains("tile code 7"));
    }

    #[test]
    fn test_json_keys() {
        let p: Palette = serde_json::from_str(
            r#"{"5": {"fill": [1, 2, 3], "shade": [0, 1, 2]}}"#).unwrap();
        assert_eq!(p.get(5), Some(&WallColors { fill: (1, 2, 3), shade: (0, 1, 2) }));
    }
}
