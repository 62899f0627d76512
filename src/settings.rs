//! Tunable parameters
//!
//! Everything the scene needs besides the grid itself. Missing JSON fields
//! fall back to the defaults in [`crate::consts`].

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::geometry::{degrees_to_radians, Direction};
use crate::palette::Palette;

/// Size of the virtual screen the 3D view is projected onto.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub struct Viewport {
    /// One ray is cast per column
    pub columns: usize,
    pub rows: usize,
}

/// Spawn tile and initial heading
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub struct Spawn {
    pub col: usize,
    pub row: usize,
    pub direction: Direction,
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct Settings {
    /// World units per tile edge
    pub tile_size: f64,
    /// Field of view, degrees
    pub fov: f64,
    /// Degrees per input unit
    pub rotation_speed: f64,
    /// World units per second
    pub move_speed: f64,
    pub viewport: Viewport,
    /// World-to-minimap scale factor
    pub minimap_scale: f64,
    /// Minimap marker size
    pub player_radius: f64,
    pub spawn: Spawn,
    pub palette: Palette,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            fov: FOV,
            rotation_speed: ROTATION_SPEED,
            move_speed: MOVE_SPEED,
            // 15x11 tiles of 64 units
            viewport: Viewport { columns: 960, rows: 704 },
            minimap_scale: MINIMAP_SCALE,
            player_radius: PLAYER_RADIUS,
            spawn: Spawn { col: 5, row: 6, direction: Direction::E },
            palette: Palette::default(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json).context("parsing settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.fov > 0.0 && self.fov < 180.0) {
            bail!("fov must be within (0, 180) degrees, got {}", self.fov);
        }
        if self.viewport.columns == 0 || self.viewport.rows == 0 {
            bail!("viewport must not be empty: {:?}", self.viewport);
        }
        let positive = [
            ("tile_size", self.tile_size),
            ("minimap_scale", self.minimap_scale),
        ];
        for (name, value) in positive.iter() {
            if !(value.is_finite() && *value > 0.0) {
                bail!("{} must be positive, got {}", name, value);
            }
        }
        let non_negative = [
            ("rotation_speed", self.rotation_speed),
            ("move_speed", self.move_speed),
            ("player_radius", self.player_radius),
        ];
        for (name, value) in non_negative.iter() {
            if !(value.is_finite() && *value >= 0.0) {
                bail!("{} must be finite and non-negative, got {}", name, value);
            }
        }
        Ok(())
    }

    /// Distance from the eye to the projection plane, in columns.
    pub fn projection_plane_distance(&self) -> f64 {
        (self.viewport.columns as f64 / 2.0) / degrees_to_radians(self.fov / 2.0).tan()
    }

    /// Angle between neighbouring rays, degrees.
    pub fn ray_step(&self) -> f64 {
        self.fov / self.viewport.columns as f64
    }
}
