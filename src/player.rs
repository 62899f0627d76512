use crate::geometry::{normalize_angle, Vector};
use crate::grid::Grid;
use crate::settings::Settings;

/// Turning input for one tick.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Steer {
    Left,
    Right,
    None,
}

impl Steer {
    /// Rotation in input units; right turns clockwise on screen
    /// (increasing angle, Y down).
    pub fn units(self) -> f64 {
        match self {
            Steer::Left => -1.0,
            Steer::Right => 1.0,
            Steer::None => 0.0,
        }
    }
}

#[derive(Debug,Clone,Copy,PartialEq)]
pub struct Player {
    pub position: Vector,
    /// Heading in degrees, `[0, 360)`.
    pub angle: f64,
    pub move_speed: f64,
    pub rotation_speed: f64,
    /// Only used to draw the minimap marker.
    pub radius: f64,
    pub moving: bool,
}

impl Player {

    pub fn new(position: Vector, angle: f64, settings: &Settings) -> Self {
        Player {
            position,
            angle: normalize_angle(angle),
            move_speed: settings.move_speed,
            rotation_speed: settings.rotation_speed,
            radius: settings.player_radius,
            moving: false,
        }
    }

    pub fn rotate(&mut self, units: f64) {
        self.angle = normalize_angle(self.angle + units * self.rotation_speed);
    }

    /// Advance `dt` seconds along the heading if moving. The move is
    /// rejected outright when the destination point is inside a wall;
    /// only that point is tested, so large steps can pass through thin
    /// walls.
    pub fn update(&mut self, dt: f64, grid: &Grid) {
        if !self.moving || !dt.is_finite() || dt <= 0.0 {
            return;
        }

        let target = self.position + Vector::angle(self.angle) * (self.move_speed * dt);

        if grid.is_wall(target) {
            log::debug!("move to ({:.1}, {:.1}) blocked", target.x, target.y);
            return;
        }
        self.position = target;
    }
}
