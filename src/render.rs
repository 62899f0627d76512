use anyhow::{bail, Result};
use image::Rgba;

use crate::consts::HEADING_LENGTH;
use crate::geometry::{degrees_to_radians, v, Vector};
use crate::grid::{Grid, FLOOR};
use crate::palette::Color;
use crate::player::{Player, Steer};
use crate::ray::{cast_fan, Ray};
use crate::settings::Settings;
use crate::surface::{Rect, Surface, Transform};

const BACKGROUND: Color = Rgba([0, 0, 0, 255]);
const MINIMAP_WALL: Color = Rgba([128, 128, 128, 255]);
const MINIMAP_FLOOR: Color = Rgba([255, 255, 255, 255]);
const MINIMAP_RAY: Color = Rgba([0xD6, 0x89, 0x3A, 0x22]);
const PLAYER_MARKER: Color = Rgba([255, 0, 0, 255]);
const PLAYER_HEADING: Color = Rgba([0, 0, 255, 255]);
const LINE_WIDTH: f64 = 2.0;

/// Control state sampled by the frame driver.
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct Input {
    pub steer: Steer,
    pub moving: bool,
}

impl Default for Input {
    fn default() -> Self {
        Input { steer: Steer::None, moving: false }
    }
}

/// Ray distance projected onto the viewing direction.
pub fn corrected_distance(ray: &Ray, heading: f64) -> f64 {
    ray.distance() * degrees_to_radians(ray.angle() - heading).cos()
}

/// On-screen height of a wall strip at the given perpendicular distance.
pub fn strip_height(tile_size: f64, corrected: f64, plane_distance: f64) -> f64 {
    if corrected <= 0.0 {
        return f64::INFINITY;
    }
    (tile_size / corrected) * plane_distance
}

/// Vertical extent `(top, bottom)` of a strip centered on the middle of
/// a viewport `rows` tall, clipped to it.
pub fn strip_span(height: f64, rows: usize) -> (f64, f64) {
    let mid = rows as f64 / 2.0;
    let half = height / 2.0;
    ((mid - half).max(0.0), (mid + half).min(rows as f64))
}

/// The player, the grid and the rays cast from the player's point of view
/// on the last update.
pub struct Scene {
    grid: Grid,
    settings: Settings,
    player: Player,
    rays: Vec<Ray>,
    input: Input,
}

impl Scene {

    pub fn new(grid: Grid, settings: Settings) -> Result<Self> {
        settings.validate()?;

        if grid.tile_size() != settings.tile_size {
            bail!("grid tile size {} does not match settings tile size {}",
                  grid.tile_size(), settings.tile_size);
        }

        settings.palette.validate(&grid)?;

        let spawn = settings.spawn;
        match grid.cell(spawn.col as i64, spawn.row as i64) {
            None => bail!("spawn ({},{}) is outside the {}x{} grid",
                          spawn.col, spawn.row, grid.width(), grid.height()),
            Some(t) if t != FLOOR => bail!("spawn ({},{}) is inside a wall", spawn.col, spawn.row),
            Some(_) => (),
        }

        let player = Player::new(
            grid.cell_center(spawn.col, spawn.row),
            spawn.direction.angle(),
            &settings,
        );

        log::debug!("scene {}x{} tiles, spawn {:?}, {} columns",
                    grid.width(), grid.height(), spawn, settings.viewport.columns);

        let mut scene = Scene {
            grid,
            settings,
            player,
            rays: Vec::new(),
            input: Input::default(),
        };
        scene.cast_rays();
        Ok(scene)
    }

    pub fn grid(&self) -> &Grid { &self.grid }

    pub fn settings(&self) -> &Settings { &self.settings }

    pub fn player(&self) -> &Player { &self.player }

    pub fn player_mut(&mut self) -> &mut Player { &mut self.player }

    /// One ray per viewport column, leftmost first.
    pub fn rays(&self) -> &[Ray] { &self.rays }

    pub fn set_input(&mut self, steer: Steer, moving: bool) {
        self.input = Input { steer, moving };
    }

    /// Advance the simulation by `dt` seconds and recast every ray.
    /// Input is only applied for positive finite `dt`, so `update(0.0)`
    /// only refreshes the rays.
    pub fn update(&mut self, dt: f64) {
        let usable = dt.is_finite() && dt > 0.0;
        if !usable && dt != 0.0 {
            log::warn!("ignoring time step {}", dt);
        }

        if usable {
            self.player.rotate(self.input.steer.units());
            self.player.moving = self.input.moving;
            self.player.update(dt, &self.grid);
        }

        self.cast_rays();
        log::trace!("tick dt={} pos=({:.2}, {:.2}) angle={:.2}",
                    dt, self.player.position.x, self.player.position.y, self.player.angle);
    }

    fn cast_rays(&mut self) {
        // every ray sees the same player snapshot
        let Player { position, angle, .. } = self.player;
        self.rays = cast_fan(&self.grid, position, angle,
                             self.settings.fov, self.settings.viewport.columns);
    }

    /// Fits the viewport to the surface height and centers it.
    pub fn fit_transform(&self, (width, height): (u32, u32)) -> Transform {
        let vp = self.settings.viewport;
        let scale = height as f64 / vp.rows as f64;
        let x = (width as f64 - vp.columns as f64 * scale) / 2.0;
        Transform { scale, offset: v(x, 0.0) }
    }

    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.clear(BACKGROUND);
        surface.set_transform(self.fit_transform(surface.size()));
        self.render_walls(surface);
        self.render_minimap(surface);
        surface.set_transform(Transform::IDENTITY);
    }

    /// One strip per column; unresolved rays leave their column empty.
    pub fn render_walls<S: Surface + ?Sized>(&self, surface: &mut S) {
        let plane = self.settings.projection_plane_distance();
        let rows = self.settings.viewport.rows;

        for (col, ray) in self.rays.iter().enumerate() {
            let hit = match ray.hit() {
                Some(h) => h,
                None => continue,
            };
            let color = match self.settings.palette.wall_color(hit.tile, hit.vertical) {
                Some(c) => c,
                None => continue,
            };

            let corrected = corrected_distance(ray, self.player.angle);
            let height = strip_height(self.grid.tile_size(), corrected, plane);
            let (top, bottom) = strip_span(height, rows);

            surface.fill_rect(Rect::new(col as f64, top, 1.0, bottom - top), color);
        }
    }

    /// Grid cells, then each resolved ray, then the player marker and
    /// heading.
    pub fn render_minimap<S: Surface + ?Sized>(&self, surface: &mut S) {
        let k = self.settings.minimap_scale;
        let ts = self.grid.tile_size();
        let scaled = |p: Vector| p * k;

        for (col, row, tile) in self.grid.cells() {
            let color = if tile == FLOOR { MINIMAP_FLOOR } else { MINIMAP_WALL };
            let rect = Rect::new(col as f64 * ts * k, row as f64 * ts * k, ts * k, ts * k);
            surface.fill_rect(rect, color);
        }

        let origin = self.player.position;
        for hit in self.rays.iter().filter_map(|r| r.hit()) {
            surface.stroke_line(scaled(origin), scaled(hit.point), LINE_WIDTH, MINIMAP_RAY);
        }

        let r = self.player.radius;
        surface.fill_rect(
            Rect::new((origin.x - r) * k, (origin.y - r) * k, 2.0 * r * k, 2.0 * r * k),
            PLAYER_MARKER,
        );
        let tip = origin + Vector::angle(self.player.angle) * HEADING_LENGTH;
        surface.stroke_line(scaled(origin), scaled(tip), LINE_WIDTH, PLAYER_HEADING);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Direction;
    use crate::settings::{Spawn, Viewport};
    use crate::surface::{Command, Recorder};
    use proptest::prelude::*;

    fn room_scene(columns: usize) -> Scene {
        let grid = Grid::new(vec![
            vec![1, 1, 1, 1, 1],
            vec![1, 0, 0, 0, 1],
            vec![1, 0, 0, 0, 1],
            vec![1, 0, 0, 0, 1],
            vec![1, 1, 1, 1, 1],
        ], 64.0).unwrap();
        let settings = Settings {
            viewport: Viewport { columns, rows: 320 },
            spawn: Spawn { col: 2, row: 2, direction: Direction::E },
            ..Settings::default()
        };
        Scene::new(grid, settings).unwrap()
    }

    #[test]
    fn test_strip_height_inverse() {
        let h1 = strip_height(64.0, 100.0, 831.0);
        let h2 = strip_height(64.0, 200.0, 831.0);
        assert!((h1 - 2.0 * h2).abs() < 1e-9);
        assert_eq!(strip_height(64.0, 0.0, 831.0), f64::INFINITY);
    }

    #[test]
    fn test_strip_span() {
        assert_eq!(strip_span(100.0, 300), (100.0, 200.0));
        assert_eq!(strip_span(1000.0, 300), (0.0, 300.0));
        assert_eq!(strip_span(f64::INFINITY, 300), (0.0, 300.0));
    }

    #[test]
    fn test_fisheye_correction() {
        let scene = room_scene(2);
        // a flat wall seen 30° off-axis is as far as one straight ahead
        let g = scene.grid();
        let c = g.cell_center(2, 2);
        let straight = Ray::cast(0.0, c, g);
        let off = Ray::cast(30.0, c, g);
        assert!(off.distance() > straight.distance());
        assert!((corrected_distance(&off, 0.0) - straight.distance()).abs() < 1e-9);
        let off = Ray::cast(330.0, c, g);
        assert!((corrected_distance(&off, 0.0) - straight.distance()).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_spawn() {
        let grid = Grid::demo(64.0).unwrap();
        let mut settings = Settings::default();
        settings.spawn.col = 0;
        assert!(Scene::new(grid.clone(), settings).is_err());

        let mut settings = Settings::default();
        settings.spawn.col = 40;
        assert!(Scene::new(grid.clone(), settings).is_err());

        let mut settings = Settings::default();
        settings.tile_size = 32.0;
        assert!(Scene::new(grid, settings).is_err());
    }

    #[test]
    fn test_update_turns_and_moves() {
        let mut scene = room_scene(4);
        scene.set_input(Steer::Right, false);
        scene.update(0.1);
        assert_eq!(scene.player().angle, 3.0);
        assert_eq!(scene.rays().len(), 4);

        scene.set_input(Steer::Left, false);
        scene.update(0.1);
        scene.update(0.1);
        assert_eq!(scene.player().angle, 357.0);

        // zero time step changes nothing
        let before = *scene.player();
        scene.set_input(Steer::Right, true);
        scene.update(0.0);
        assert_eq!(*scene.player(), before);
    }

    #[test]
    fn test_non_finite_step_ignored() {
        let mut scene = room_scene(4);
        let before = *scene.player();
        scene.set_input(Steer::Right, true);
        scene.update(f64::INFINITY);
        scene.update(f64::NEG_INFINITY);
        scene.update(f64::NAN);
        assert_eq!(*scene.player(), before);
        assert!(scene.player().position.is_finite());
        assert!(scene.rays().iter().all(|r| r.distance().is_finite()));
    }

    #[test]
    fn test_walls_centered() {
        let mut scene = room_scene(3);
        scene.update(0.0);
        let mut rec = Recorder::new(100, 100);
        scene.render_walls(&mut rec);
        let rects: Vec<_> = rec.rects().collect();
        assert_eq!(rects.len(), 3);
        for (r, _) in rects {
            assert!((r.y + r.h / 2.0 - 160.0).abs() < 1e-9);
            assert_eq!(r.w, 1.0);
        }
    }

    #[test]
    fn test_shading() {
        let mut scene = room_scene(1);
        scene.update(0.0);
        let mut rec = Recorder::new(10, 10);
        scene.render_walls(&mut rec);
        // the single ray at 330° meets the east wall: vertical-edge hit, shaded
        assert!(scene.rays()[0].was_vertical_hit());
        assert_eq!(rec.rects().count(), 1);
        assert_eq!(rec.rects().next().unwrap().1, &Rgba([200, 0, 0, 255]));

        // at 60° it meets the south wall first
        scene.player_mut().angle = 90.0;
        scene.update(0.0);
        let mut rec = Recorder::new(10, 10);
        scene.render_walls(&mut rec);
        assert_eq!(rec.rects().next().unwrap().1, &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_render_sequence() {
        let scene = room_scene(8);
        let mut rec = Recorder::new(640, 320);
        scene.render(&mut rec);
        assert_eq!(rec.commands.first(), Some(&Command::Clear(BACKGROUND)));
        assert_eq!(rec.commands[1], Command::Transform(Transform { scale: 1.0, offset: v(316.0, 0.0) }));
        assert_eq!(rec.commands.last(), Some(&Command::Transform(Transform::IDENTITY)));
    }

    proptest! {
        #[test]
        fn doubling_distance_halves_height(d in 0.01f64..1.0e5) {
            let s = Settings::default();
            let plane = s.projection_plane_distance();
            let h1 = strip_height(s.tile_size, d, plane);
            let h2 = strip_height(s.tile_size, 2.0 * d, plane);
            prop_assert!((h1 / h2 - 2.0).abs() < 1e-9);
        }
    }
}
