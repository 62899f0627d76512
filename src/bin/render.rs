use anyhow::{Context, Result};
use rustic_raycaster::{canvas::Canvas, grid::Grid, player::Steer, render::Scene, settings::Settings};
use std::time::Instant;

const TICK: f64 = 1.0 / 30.0;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<_> = std::env::args().collect();

    if args.len() < 2 || args.len() > 4 {
        eprintln!("Usage: render <OUTPUT FILE> [SETTINGS FILE] [TICKS]");
        std::process::exit(1);
    }

    let t0 = Instant::now();

    let settings = match args.get(2) {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let ticks: u32 = match args.get(3) {
        Some(n) => n.parse().context("TICKS must be a non-negative integer")?,
        None => 0,
    };

    let grid = Grid::demo(settings.tile_size)?;
    log::debug!("level:\n{}", grid);
    let (width, height) = (settings.viewport.columns as u32, settings.viewport.rows as u32);
    let mut scene = Scene::new(grid, settings).context("Failed to build scene")?;
    let t1 = Instant::now();

    // walk forward, veering right
    for i in 0..ticks {
        let steer = if i % 4 == 0 { Steer::Right } else { Steer::None };
        scene.set_input(steer, true);
        scene.update(TICK);
    }
    let t2 = Instant::now();

    let mut canvas = Canvas::new(width, height);
    scene.render(&mut canvas);
    let t3 = Instant::now();

    let p = scene.player();
    log::info!("Player at ({:.1}, {:.1}) facing {:.1}°", p.position.x, p.position.y, p.angle);
    log::info!("Loaded in {:?}, simulated {} ticks in {:?}, rendered in {:?}", t1-t0, ticks, t2-t1, t3-t2);

    canvas.save(&args[1])?;

    Ok(())

}
