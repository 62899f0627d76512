//! Grid ray-casting renderer.
//!
//! - `geometry`: vectors, angles and facing
//! - `grid`: the tile map and world/grid coordinate mapping
//! - `ray`: per-column wall intersection
//! - `player`: movement and collision
//! - `render`: the scene, wall projection and minimap
//! - `surface`/`canvas`: drawing backends

pub mod canvas;
pub mod geometry;
pub mod grid;
pub mod palette;
pub mod player;
pub mod ray;
pub mod render;
pub mod settings;
pub mod surface;

pub use grid::{Grid, TileCode};
pub use player::{Player, Steer};
pub use ray::{Ray, WallHit};
pub use render::Scene;
pub use settings::Settings;

/// Default tuning values
pub mod consts {
    /// World units per tile edge
    pub const TILE_SIZE: f64 = 64.0;
    /// Horizontal field of view, degrees
    pub const FOV: f64 = 60.0;
    /// Degrees turned per input unit
    pub const ROTATION_SPEED: f64 = 3.0;
    /// World units per second
    pub const MOVE_SPEED: f64 = 40.0;
    pub const PLAYER_RADIUS: f64 = 4.0;
    pub const MINIMAP_SCALE: f64 = 0.2;
    /// Length of the heading line on the minimap, world units
    pub const HEADING_LENGTH: f64 = 50.0;
}
