//! Beat Crawler headless demo
//!
//! Runs the simulation without a frontend: builds the first zone, sprays
//! projectiles around it from a seeded RNG and prints the run summary.
//!
//! Usage: `beat-crawler [config.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), beat_crawler::ConfigError> {
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use beat_crawler::consts::SIM_DT;
    use beat_crawler::sim::{ActorKind, FixedStep, SimEvent, TickInput, Zone};
    use beat_crawler::{RunSummary, SimConfig};

    const SEED: u64 = 0x5eed;
    const DEMO_SECONDS: f32 = 8.0;
    const SHOT_EVERY_SECONDS: f32 = 0.25;
    const ENEMIES: usize = 4;
    const ENEMY_SPEED: f32 = 60.0;

    env_logger::init();
    log::info!("Beat Crawler (headless) starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    let mut rng = Pcg32::seed_from_u64(SEED);
    let mut zone = Zone::load(&config, "map1")?;

    let world = zone.grid().world_size();
    for _ in 0..ENEMIES {
        let pos = Vec2::new(rng.random_range(0.0..world.x), rng.random_range(0.0..world.y));
        let pos = zone.grid().find_nearest_open(pos.x, pos.y);
        let id = zone.spawn_actor(ActorKind::Enemy, pos, config.player_radius);
        let heading = Vec2::from_angle(rng.random_range(0.0..std::f32::consts::TAU));
        zone.set_desired(id, heading * ENEMY_SPEED);
    }

    // Render callback stand-in: slightly uneven frame times
    let mut step = FixedStep::default();
    let mut now_ms = 0.0f64;
    let mut until_shot = 0.0f32;
    let mut beats = 0u64;
    let mut bounces = 0u32;
    let mut hits = 0u32;

    zone.start(now_ms);
    while now_ms < (DEMO_SECONDS * 1000.0) as f64 {
        let frame_dt = rng.random_range(0.012..0.022);
        for _ in 0..step.advance(frame_dt) {
            now_ms += (SIM_DT * 1000.0) as f64;
            until_shot -= SIM_DT;

            let mut input = TickInput {
                move_dir: Vec2::from_angle(rng.random_range(0.0..std::f32::consts::TAU)),
                ..Default::default()
            };
            if until_shot <= 0.0 {
                until_shot = SHOT_EVERY_SECONDS;
                let angle = rng.random_range(0.0..std::f32::consts::TAU);
                let target = zone.player_pos().truncate() + Vec2::from_angle(angle) * 100.0;
                input.fire_at = Some(target);
            }

            let mut door = None;
            for event in zone.tick(&input, now_ms, SIM_DT) {
                match event {
                    SimEvent::Beat(edge) => {
                        beats += edge.beats_crossed();
                        log::debug!("Beat {}", edge.index);
                    }
                    SimEvent::Bounce { .. } => bounces += 1,
                    SimEvent::Hit {
                        target,
                        on_beat,
                        damage_mult,
                        ..
                    } => {
                        hits += 1;
                        log::info!("Hit actor {target} (on beat: {on_beat}, x{damage_mult})");
                    }
                    SimEvent::Expired { .. } => {}
                    SimEvent::DoorReached { to } => door = Some(to.clone()),
                }
            }

            if let Some(to) = door {
                if let Some(next) = zone.enter_door(&config)? {
                    log::info!("Entering {to}");
                    zone = next;
                    zone.start(now_ms);
                }
            }
        }
    }

    log::info!(
        "Finished after {} ticks: {beats} beats, {bounces} bounces, {hits} hits",
        zone.time_ticks()
    );

    let summary = RunSummary::from_clock(zone.clock());
    match summary.to_json() {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("Failed to serialize run summary: {err}"),
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page; there is no wasm entry point here
}
