use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

#[derive(Clone,Copy,PartialEq,Debug,Default)]
pub struct Vector { pub x: f64, pub y: f64 }

impl Vector {
    /// Unit vector pointing at `degrees`, with 0° along +X and angles
    /// growing toward +Y (screen space, Y down).
    pub fn angle(degrees: f64) -> Self {
        let r = degrees_to_radians(degrees);
        Vector { x: r.cos(), y: r.sin() }
    }

    pub fn squared_distance(&self, rhs: &Self) -> f64 {
        let dx = rhs.x - self.x;
        let dy = rhs.y - self.y;
        dx*dx + dy*dy
    }

    pub fn distance(&self, rhs: &Self) -> f64 {
        self.squared_distance(rhs).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector { v(self.x + rhs.x, self.y + rhs.y) }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector { v(self.x - rhs.x, self.y - rhs.y) }
}

impl Mul<f64> for Vector {
    type Output = Vector;
    fn mul(self, k: f64) -> Vector { v(self.x * k, self.y * k) }
}

#[inline(always)]
pub fn v(x: f64, y: f64) -> Vector { Vector {x,y} }

/// Reduce any angle in degrees to `[0, 360)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a < 0.0 {
        a += 360.0;
    }
    // -1e-20 + 360.0 rounds back up to 360.0
    if a >= 360.0 {
        a -= 360.0;
    }
    a
}

pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    v(x1, y1).distance(&v(x2, y2))
}

#[inline]
pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

/// Which half-planes a direction points into. `up` means toward
/// decreasing Y.
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub struct Facing {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Facing {
    pub fn of(angle: f64) -> Self {
        let a = normalize_angle(angle);
        let up = a > 180.0 && a < 360.0;
        let right = a > 270.0 || a < 90.0;
        Facing { up, down: !up, left: !right, right }
    }
}

pub fn facing_directions(angle: f64) -> Facing {
    Facing::of(angle)
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum Direction {
    N,S,E,W
}

impl Direction {
    /// Heading in degrees.
    pub fn angle(self) -> f64 {
        use Direction::*;
        match self {
            E => 0.0,
            S => 90.0,
            W => 180.0,
            N => 270.0,
        }
    }
}
