//! Drawing capability the renderer targets.

use crate::geometry::{v, Vector};
use crate::palette::Color;

/// Uniform scale followed by a translation: `screen = p * scale + offset`.
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub offset: Vector,
}

impl Transform {
    pub const IDENTITY: Transform = Transform { scale: 1.0, offset: Vector { x: 0.0, y: 0.0 } };

    pub fn apply(&self, p: Vector) -> Vector {
        p * self.scale + self.offset
    }
}

impl Default for Transform {
    fn default() -> Self { Transform::IDENTITY }
}

/// Axis-aligned rectangle, top-left corner plus size.
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect { x, y, w, h }
    }

    pub fn transformed(&self, t: &Transform) -> Rect {
        let p = t.apply(v(self.x, self.y));
        Rect::new(p.x, p.y, self.w * t.scale, self.h * t.scale)
    }
}

pub trait Surface {
    /// Pixel size of the target.
    fn size(&self) -> (u32, u32);

    /// Fill the whole surface, ignoring the transform.
    fn clear(&mut self, color: Color);

    /// Replace the transform applied to later draw calls.
    fn set_transform(&mut self, transform: Transform);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_line(&mut self, from: Vector, to: Vector, width: f64, color: Color);
}

#[derive(Debug,Clone,PartialEq)]
pub enum Command {
    Clear(Color),
    Transform(Transform),
    FillRect(Rect, Color),
    StrokeLine { from: Vector, to: Vector, width: f64, color: Color },
}

/// Surface that keeps the draw calls instead of rasterizing them.
#[derive(Debug,Clone,Default)]
pub struct Recorder {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<Command>,
}

impl Recorder {
    pub fn new(width: u32, height: u32) -> Self {
        Recorder { width, height, commands: Vec::new() }
    }

    pub fn rects(&self) -> impl Iterator<Item = (&Rect, &Color)> {
        self.commands.iter().filter_map(|c| match c {
            Command::FillRect(r, color) => Some((r, color)),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter().filter(|c| matches!(c, Command::StrokeLine { .. }))
    }
}

impl Surface for Recorder {
    fn size(&self) -> (u32, u32) { (self.width, self.height) }

    fn clear(&mut self, color: Color) {
        self.commands.push(Command::Clear(color));
    }

    fn set_transform(&mut self, transform: Transform) {
        self.commands.push(Command::Transform(transform));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(Command::FillRect(rect, color));
    }

    fn stroke_line(&mut self, from: Vector, to: Vector, width: f64, color: Color) {
        self.commands.push(Command::StrokeLine { from, to, width, color });
    }
}
