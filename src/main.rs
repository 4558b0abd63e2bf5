mod window;

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use liquid_ether::config::{self, Config};
use liquid_ether::grid::Viewport;
use liquid_ether::host::HeadlessHost;
use liquid_ether::scheduler::{FrameOutcome, Scheduler};

use window::WindowHost;

/// Frames between info-level statistics in a headless run.
const HEADLESS_REPORT_INTERVAL: u64 = 60;

fn is_headless() -> bool {
    std::env::args().any(|a| a == "--headless")
}

fn main() -> ExitCode {
    env_logger::init();
    let cfg = config::load();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)) {
        log::warn!("failed to install Ctrl+C handler: {e}");
    }

    let result = if is_headless() {
        run_headless(&cfg, &running)
    } else {
        run_gui(&cfg, &running)
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run_gui(cfg: &Config, running: &AtomicBool) -> Result<(), Box<dyn Error>> {
    let host = WindowHost::open(
        "liquid-ether",
        cfg.display.width,
        cfg.display.height,
        cfg.display.target_fps,
    )?;
    let mut scheduler = Scheduler::new(cfg, host)?;
    scheduler.start()?;

    let epoch = Instant::now();
    while running.load(Ordering::SeqCst) && scheduler.host().is_open() {
        scheduler.host_mut().pump();
        if scheduler.tick(epoch.elapsed())? == FrameOutcome::Skipped {
            scheduler.host_mut().refresh();
        }
    }

    scheduler.dispose();
    Ok(())
}

/// Fixed-step run without a window. The clock advances one frame interval
/// per tick, so the output does not depend on machine speed.
fn run_headless(cfg: &Config, running: &AtomicBool) -> Result<(), Box<dyn Error>> {
    let viewport = Viewport::new(cfg.display.width, cfg.display.height);
    let mut scheduler = Scheduler::new(cfg, HeadlessHost::new(viewport))?;
    scheduler.set_auto_enabled(true);
    scheduler.start()?;

    let frame_interval = Duration::from_secs_f64(1.0 / cfg.display.target_fps as f64);
    let started = Instant::now();
    let mut now = Duration::ZERO;
    for frame in 1..=cfg.display.frames {
        if !running.load(Ordering::SeqCst) {
            log::info!("interrupted after {} frames", frame - 1);
            break;
        }
        scheduler.tick(now)?;
        now += frame_interval;
        if frame % HEADLESS_REPORT_INTERVAL == 0 {
            if let Some(sim) = scheduler.simulation() {
                log::info!("{}", sim.stats());
            }
        }
    }

    let presented = scheduler.host().presented();
    let wall = started.elapsed();
    log::info!(
        "headless run: {presented} frames in {:.2?} ({:.1} fps)",
        wall,
        presented as f64 / wall.as_secs_f64().max(1e-9)
    );
    scheduler.dispose();
    Ok(())
}
