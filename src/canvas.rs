use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageBuffer, Rgba, RgbaImage};

use crate::geometry::{v, Vector};
use crate::palette::Color;
use crate::surface::{Rect, Surface, Transform};

/// Software rasterizer over an RGBA image buffer.
pub struct Canvas {
    pub buffer: RgbaImage,
    transform: Transform,
}

fn clip(x: f64, bound: u32) -> u32 {
    if x < 0.0 {
        0
    } else if x >= (bound as f64) {
        bound
    } else {
        x.round() as u32
    }
}

/// Source-over compositing of `src` onto `dst`.
fn blend(dst: &mut Rgba<u8>, src: Color) {
    let a = src.0[3] as u32;
    if a == 255 {
        *dst = src;
        return;
    }
    for i in 0..3 {
        let d = dst.0[i] as u32;
        let s = src.0[i] as u32;
        dst.0[i] = ((s * a + d * (255 - a) + 127) / 255) as u8;
    }
    let da = dst.0[3] as u32;
    dst.0[3] = (a + (da * (255 - a) + 127) / 255) as u8;
}

/// Liang-Barsky clip of the segment `a`-`b` to `[lo, hi]` on both axes.
fn clip_segment(a: Vector, b: Vector, lo: Vector, hi: Vector) -> Option<(Vector, Vector)> {
    let d = b - a;
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    let edges = [
        (-d.x, a.x - lo.x),
        (d.x, hi.x - a.x),
        (-d.y, a.y - lo.y),
        (d.y, hi.y - a.y),
    ];
    for &(p, q) in edges.iter() {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let t = q / p;
            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
        }
    }
    if t0 > t1 {
        return None;
    }
    Some((a + d * t0, a + d * t1))
}

impl Canvas {

    pub fn new(width: u32, height: u32) -> Self {
        Canvas { buffer: ImageBuffer::new(width, height), transform: Transform::IDENTITY }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.buffer.save(path)
            .with_context(|| format!("writing image to {}", path.display()))
    }

    /// Fill a rectangle given in pixel coordinates.
    fn fill_pixels(&mut self, r: Rect, color: Color) {
        let (w, h) = self.buffer.dimensions();
        let x0 = clip(r.x, w);
        let x1 = clip(r.x + r.w, w);
        let y0 = clip(r.y, h);
        let y1 = clip(r.y + r.h, h);

        for y in y0..y1 {
            for x in x0..x1 {
                blend(self.buffer.get_pixel_mut(x, y), color);
            }
        }
    }
}

impl Surface for Canvas {
    fn size(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    fn clear(&mut self, color: Color) {
        for p in self.buffer.pixels_mut() {
            *p = color;
        }
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let r = rect.transformed(&self.transform);
        self.fill_pixels(r, color);
    }

    /// Stamps a square brush of the stroke width at unit intervals along
    /// the segment.
    fn stroke_line(&mut self, from: Vector, to: Vector, width: f64, color: Color) {
        let a = self.transform.apply(from);
        let b = self.transform.apply(to);
        if !a.is_finite() || !b.is_finite() {
            return;
        }

        let brush = (width * self.transform.scale).max(1.0);
        let half = brush / 2.0;

        // only the visible part is stamped, so the step count stays bounded
        // by the canvas size
        let (w, h) = self.buffer.dimensions();
        let lo = v(-brush, -brush);
        let hi = v(w as f64 + brush, h as f64 + brush);
        let (a, b) = match clip_segment(a, b, lo, hi) {
            Some(seg) => seg,
            None => return,
        };
        let d = b - a;
        let steps = d.x.abs().max(d.y.abs()).ceil().max(1.0) as u32;

        for i in 0..=steps {
            let p = a + d * (i as f64 / steps as f64);
            self.fill_pixels(Rect::new(p.x - half, p.y - half, brush, brush), color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Rgba([255, 0, 0, 255]);

    #[test]
    fn test_fill_rect_clipped() {
        let mut c = Canvas::new(10, 10);
        c.fill_rect(Rect::new(-5.0, 8.0, 7.0, 10.0), RED);
        assert_eq!(*c.buffer.get_pixel(0, 9), RED);
        assert_eq!(*c.buffer.get_pixel(1, 8), RED);
        assert_eq!(*c.buffer.get_pixel(2, 8), Rgba([0, 0, 0, 0]));
        assert_eq!(*c.buffer.get_pixel(0, 7), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_transform_applies() {
        let mut c = Canvas::new(10, 10);
        c.set_transform(Transform { scale: 2.0, offset: v(1.0, 0.0) });
        c.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), RED);
        assert_eq!(*c.buffer.get_pixel(1, 1), RED);
        assert_eq!(*c.buffer.get_pixel(2, 1), RED);
        assert_eq!(*c.buffer.get_pixel(3, 1), Rgba([0, 0, 0, 0]));
        assert_eq!(*c.buffer.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_blend() {
        let mut c = Canvas::new(2, 2);
        c.clear(Rgba([0, 0, 0, 255]));
        c.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Rgba([255, 255, 255, 51]));
        assert_eq!(*c.buffer.get_pixel(0, 0), Rgba([51, 51, 51, 255]));
        assert_eq!(*c.buffer.get_pixel(1, 1), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_stroke_line() {
        let mut c = Canvas::new(10, 10);
        c.stroke_line(v(1.5, 5.5), v(8.5, 5.5), 1.0, RED);
        for x in 1..9 {
            assert_eq!(*c.buffer.get_pixel(x, 5), RED, "pixel {}", x);
        }
        assert_eq!(*c.buffer.get_pixel(5, 3), Rgba([0, 0, 0, 0]));
        // non-finite endpoints are dropped
        c.stroke_line(v(0.0, 0.0), v(f64::INFINITY, 0.0), 1.0, RED);
        assert_eq!(*c.buffer.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_clip_segment() {
        let lo = v(0.0, 0.0);
        let hi = v(10.0, 10.0);
        assert_eq!(clip_segment(v(-10.0, 5.0), v(30.0, 5.0), lo, hi), Some((v(0.0, 5.0), v(10.0, 5.0))));
        assert_eq!(clip_segment(v(2.0, 2.0), v(3.0, 3.0), lo, hi), Some((v(2.0, 2.0), v(3.0, 3.0))));
        assert_eq!(clip_segment(v(-5.0, -5.0), v(-1.0, 20.0), lo, hi), None);
        assert_eq!(clip_segment(v(20.0, 0.0), v(20.0, 10.0), lo, hi), None);
    }

    #[test]
    fn test_huge_line_is_clipped() {
        let mut c = Canvas::new(10, 10);
        c.stroke_line(v(-1.0e15, 5.5), v(1.0e15, 5.5), 1.0, RED);
        for x in 0..10 {
            assert_eq!(*c.buffer.get_pixel(x, 5), RED, "pixel {}", x);
        }
        assert_eq!(*c.buffer.get_pixel(5, 2), Rgba([0, 0, 0, 0]));
        // entirely off-canvas draws nothing
        c.stroke_line(v(1.0e12, -1.0e12), v(2.0e12, -3.0e12), 1.0, RED);
        assert_eq!(*c.buffer.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }
}
