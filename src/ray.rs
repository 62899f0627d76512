use std::iter::{self, Empty};

use either::Either;

use crate::geometry::{degrees_to_radians, normalize_angle, v, Facing, Vector};
use crate::grid::{Grid, TileCode, FLOOR};

/// How far past a grid line the tile on its far side is sampled.
const PROBE: f64 = 1.0;

#[derive(Debug,Clone,Copy,PartialEq)]
pub struct WallHit {
    /// Intersection with the wall edge, world space.
    pub point: Vector,
    pub distance: f64,
    pub tile: TileCode,
    /// Found by the vertical-edge scan (the wall face runs along Y).
    pub vertical: bool,
}

/// One cast ray. `hit` is `None` when both scans left the grid without
/// meeting a wall.
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct Ray {
    angle: f64,
    hit: Option<WallHit>,
}

type Scan = Either<Empty<Vector>, EdgeScan>;

/// Successive crossings of a family of parallel grid lines, stopping once
/// the point leaves the grid's bounding box.
struct EdgeScan {
    p: Vector,
    step: Vector,
    extent: Vector,
}

impl Iterator for EdgeScan {
    type Item = Vector;

    fn next(&mut self) -> Option<Vector> {
        let p = self.p;
        let inside = p.x >= 0.0 && p.x <= self.extent.x
            && p.y >= 0.0 && p.y <= self.extent.y;
        if !inside {
            return None;
        }
        self.p = p + self.step;
        Some(p)
    }
}

/// Crossings of horizontal grid lines (y = k * tile). Empty for exactly
/// horizontal rays, which never cross one.
fn horizontal_edges(origin: Vector, angle: f64, facing: Facing, grid: &Grid) -> Scan {
    if angle == 0.0 || angle == 180.0 {
        return Either::Left(iter::empty());
    }

    let ts = grid.tile_size();
    let inv_tan = if angle == 90.0 || angle == 270.0 {
        0.0
    } else {
        1.0 / degrees_to_radians(angle).tan()
    };

    let (_, row) = grid.to_grid_coordinates(origin);
    let y = row as f64 * ts + if facing.down { ts } else { 0.0 };
    let x = origin.x + (y - origin.y) * inv_tan;

    let dy = if facing.up { -ts } else { ts };
    let mut dx = ts * inv_tan;
    if (facing.left && dx > 0.0) || (facing.right && dx < 0.0) {
        dx = -dx;
    }

    Either::Right(EdgeScan { p: v(x, y), step: v(dx, dy), extent: grid.world_extent() })
}

/// Crossings of vertical grid lines (x = k * tile). Empty for exactly
/// vertical rays.
fn vertical_edges(origin: Vector, angle: f64, facing: Facing, grid: &Grid) -> Scan {
    if angle == 90.0 || angle == 270.0 {
        return Either::Left(iter::empty());
    }

    let ts = grid.tile_size();
    let tan = if angle == 0.0 || angle == 180.0 {
        0.0
    } else {
        degrees_to_radians(angle).tan()
    };

    let (col, _) = grid.to_grid_coordinates(origin);
    let x = col as f64 * ts + if facing.right { ts } else { 0.0 };
    let y = origin.y + (x - origin.x) * tan;

    let dx = if facing.left { -ts } else { ts };
    let mut dy = ts * tan;
    if (facing.up && dy > 0.0) || (facing.down && dy < 0.0) {
        dy = -dy;
    }

    Either::Right(EdgeScan { p: v(x, y), step: v(dx, dy), extent: grid.world_extent() })
}

/// First crossing whose far-side tile is a wall.
fn first_wall<I, F>(mut edges: I, origin: Vector, grid: &Grid, probe: F, vertical: bool) -> Option<WallHit>
where
    I: Iterator<Item = Vector>,
    F: Fn(Vector) -> Vector,
{
    edges
        .find_map(|p| match grid.tile_at(probe(p)) {
            Some(tile) if tile != FLOOR => Some((p, tile)),
            _ => None,
        })
        .map(|(point, tile)| WallHit {
            point,
            distance: origin.distance(&point),
            tile,
            vertical,
        })
}

/// The closer of the two scan results. On a tie the horizontal hit wins.
fn nearer(horizontal: Option<WallHit>, vertical: Option<WallHit>) -> Option<WallHit> {
    match (horizontal, vertical) {
        (Some(h), Some(vh)) => Some(if vh.distance < h.distance { vh } else { h }),
        (h, vh) => h.or(vh),
    }
}

impl Ray {

    /// An uncast ray.
    pub fn new(angle: f64) -> Self {
        Ray { angle: normalize_angle(angle), hit: None }
    }

    pub fn cast(angle: f64, origin: Vector, grid: &Grid) -> Self {
        let mut ray = Ray::new(angle);
        ray.cast_from(origin, grid);
        ray
    }

    /// Find the nearest wall along the ray from `origin`.
    pub fn cast_from(&mut self, origin: Vector, grid: &Grid) {
        let angle = self.angle;
        let facing = Facing::of(angle);

        let horizontal = first_wall(
            horizontal_edges(origin, angle, facing, grid),
            origin,
            grid,
            |p| if facing.up { v(p.x, p.y - PROBE) } else { p },
            false,
        );

        let vertical = first_wall(
            vertical_edges(origin, angle, facing, grid),
            origin,
            grid,
            |p| if facing.left { v(p.x - PROBE, p.y) } else { p },
            true,
        );

        self.hit = nearer(horizontal, vertical);
    }

    /// Cast angle in degrees, within `[0, 360)`.
    pub fn angle(&self) -> f64 { self.angle }

    pub fn hit(&self) -> Option<&WallHit> { self.hit.as_ref() }

    /// Distance to the wall, or infinity for an unresolved ray.
    pub fn distance(&self) -> f64 {
        self.hit.map(|h| h.distance).unwrap_or(f64::INFINITY)
    }

    pub fn tile(&self) -> Option<TileCode> {
        self.hit.map(|h| h.tile)
    }

    pub fn was_vertical_hit(&self) -> bool {
        self.hit.map(|h| h.vertical).unwrap_or(false)
    }
}

/// Cast `columns` rays fanned evenly across `fov` degrees centered on
/// `heading`, leftmost first.
pub fn cast_fan(grid: &Grid, origin: Vector, heading: f64, fov: f64, columns: usize) -> Vec<Ray> {
    let start = heading - fov / 2.0;
    let step = fov / columns as f64;
    (0..columns)
        .map(|i| Ray::cast(start + i as f64 * step, origin, grid))
        .collect()
}
