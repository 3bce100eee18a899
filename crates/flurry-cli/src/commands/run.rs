//! Run command — drives the simulation headless at a fixed frame rate

use anyhow::{bail, Context, Result};
use flurry_particles::{ReplayFeed, Simulation, SimulationConfig};
use flurry_runtime::{FrameClock, RuntimeSystem, SimEvent};
use std::path::PathBuf;
use std::time::Duration;

pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub seconds: f64,
    pub fps: u32,
    pub burst: bool,
    pub feed: Option<PathBuf>,
    pub seed: Option<u64>,
    pub status_every: f64,
    pub realtime: bool,
}

pub fn run(args: RunArgs) -> Result<()> {
    if args.fps == 0 {
        bail!("--fps must be at least 1");
    }

    let mut config =
        SimulationConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut sim = Simulation::new(config).context("Invalid simulation configuration")?;
    sim.initialize()?;

    let feed = args
        .feed
        .as_deref()
        .and_then(|path| ReplayFeed::connect(path, sim.producer()));
    if args.burst {
        sim.start_burst();
    }

    let step = 1.0 / args.fps as f64;
    let mut wall = FrameClock::new();
    let mut next_status = args.status_every;

    println!("Running {} {}s at {} fps", sim.name(), args.seconds, args.fps);

    while sim.now() + 1e-9 < args.seconds {
        let dt = if args.realtime {
            std::thread::sleep(Duration::from_secs_f64(step));
            wall.tick()
        } else {
            step
        };
        sim.update(dt)?;

        for event in sim.drain_events() {
            if let SimEvent::BurstFinished { enqueued } = event {
                println!("[{:>7.2}s] burst finished: {} enqueued", sim.now(), enqueued);
            }
        }

        if args.status_every > 0.0 && sim.now() + 1e-9 >= next_status {
            println!("[{:>7.2}s] {}", sim.now(), sim.status_line());
            next_status += args.status_every;
        }
    }

    sim.shutdown()?;
    if let Some(feed) = feed {
        feed.stop();
        let sent = feed.join()?;
        log::info!("replay feed delivered {} request(s)", sent);
    }

    let stats = sim.stats();
    println!();
    println!("Final: {}", sim.status_line());
    println!(
        "  ticks {}  spawned {}  settled {}  evicted {}  rejected {}  pending {}",
        stats.ticks, stats.spawned, stats.settled, stats.evicted, stats.rejected, stats.pending
    );

    Ok(())
}
