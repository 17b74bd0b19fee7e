//! Arena Rush headless runner
//!
//! Drives the simulation with a simple autopilot and prints the final
//! snapshot as JSON. Usage: `arena-rush [TUNING.json] [TICKS] [SEED]`.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::process::ExitCode;

    use arena_rush::consts::SIM_DT;
    use arena_rush::sim::{EntityClass, GameEvent, GamePhase, GameState, Snapshot, TickInput, step};
    use arena_rush::{Tuning, normalize_angle};
    use glam::{Quat, Vec2, Vec3};

    const DEFAULT_TICKS: u64 = 3600;
    /// Ticks between autopilot shots
    const FIRE_INTERVAL: u64 = 15;
    /// Jump when an obstacle gets this close
    const DODGE_DISTANCE: f32 = 2.5;

    struct Args {
        tuning: Tuning,
        ticks: u64,
        seed: Option<u64>,
    }

    fn parse_args() -> Result<Args, String> {
        let mut args = std::env::args().skip(1);
        let tuning = match args.next().filter(|p| p != "-") {
            Some(path) => Tuning::load(&path).map_err(|e| format!("{path}: {e}"))?,
            None => Tuning::default(),
        };
        let ticks = match args.next() {
            Some(t) => t.parse().map_err(|e| format!("invalid tick count {t:?}: {e}"))?,
            None => DEFAULT_TICKS,
        };
        let seed = match args.next() {
            Some(s) => Some(s.parse().map_err(|e| format!("invalid seed {s:?}: {e}"))?),
            None => None,
        };
        Ok(Args { tuning, ticks, seed })
    }

    fn nearest(snapshot: &Snapshot, class: EntityClass, from: Vec3) -> Option<Vec3> {
        snapshot
            .entities
            .iter()
            .filter(|e| e.handle.class == class)
            .map(|e| e.position)
            .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
    }

    /// Chase the nearest coin, face the nearest obstacle, shoot and hop
    fn autopilot(snapshot: &Snapshot) -> TickInput {
        let player = snapshot.player.position;
        let mut input = TickInput::default();

        // The camera turns before the move is applied, so steer with the new yaw
        let mut yaw = snapshot.camera.yaw;
        if let Some(obstacle) = nearest(snapshot, EntityClass::Obstacle, player) {
            let to = obstacle - player;
            let desired = (-to.x).atan2(-to.z);
            input.yaw_delta = normalize_angle(desired - yaw);
            input.fire = snapshot.tick % FIRE_INTERVAL == 0;
            input.jump = to.length() < DODGE_DISTANCE;
            yaw = desired;
        }

        if let Some(coin) = nearest(snapshot, EntityClass::Coin, player) {
            let world = Vec3::new(coin.x - player.x, 0.0, coin.z - player.z);
            let local = Quat::from_rotation_y(-yaw) * world.normalize_or_zero();
            input.move_vector = Vec2::new(local.x, -local.z);
        }
        input
    }

    fn log_event(event: &GameEvent) {
        match event {
            GameEvent::PlayerHit { .. } | GameEvent::LevelAdvanced { .. } | GameEvent::GameOver { .. } => {
                log::info!("{event:?}")
            }
            _ => log::debug!("{event:?}"),
        }
    }

    pub fn run() -> ExitCode {
        let args = match parse_args() {
            Ok(args) => args,
            Err(e) => {
                log::error!("{e}");
                eprintln!("usage: arena-rush [TUNING.json|-] [TICKS] [SEED]");
                return ExitCode::from(2);
            }
        };

        let mut state = match args.seed {
            Some(seed) => GameState::with_seed(seed, args.tuning),
            None => GameState::new(args.tuning),
        };
        log::info!("Arena Rush starting (seed {}, {} ticks)", state.seed, args.ticks);

        let mut snapshot = state.snapshot();
        for _ in 0..args.ticks {
            let input = autopilot(&snapshot);
            let (next, events) = step(&mut state, &input, SIM_DT);
            events.iter().for_each(log_event);
            snapshot = next;
            if snapshot.phase == GamePhase::GameOver {
                break;
            }
        }

        log::info!(
            "Finished at tick {}: level {}, score {}, health {}/{}",
            snapshot.tick,
            snapshot.stats.level,
            snapshot.stats.score,
            snapshot.stats.health,
            snapshot.stats.max_health
        );
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Failed to serialize snapshot: {e}");
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::init();
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly on the web
}
