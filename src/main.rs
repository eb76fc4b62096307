//! Echo Loop entry point
//!
//! The browser build is driven from JS through `echo_loop::web`. Natively
//! this runs a headless demo: the autopilot plays a level at a display-like
//! frame rate until it wins or runs out of loops.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use echo_loop::sim::{LevelData, Session, SimEvent};
    use echo_loop::{AutoPilot, Settings};

    const DEMO_LEVEL: &str = include_str!("../levels/demo.json");

    /// Frame length of the simulated display (not a multiple of the tick)
    const FRAME_DT: f64 = 1.0 / 144.0;

    /// Give up after this many loops
    const MAX_LOOPS: u32 = 20;

    pub fn run() -> Result<(), String> {
        let mut args = std::env::args().skip(1);
        let level_json = match args.next() {
            Some(path) => std::fs::read_to_string(&path).map_err(|e| format!("{path}: {e}"))?,
            None => DEMO_LEVEL.to_string(),
        };
        let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(7);

        let level = LevelData::from_json(&level_json).map_err(|e| e.to_string())?;
        log::info!("Level '{}' loaded, autopilot seed {}", level.name, seed);

        let mut session = Session::new(level, Settings::load());
        let mut pilot = AutoPilot::new(seed);
        let mut frames: u64 = 0;

        while !session.is_complete() && session.loop_index() < MAX_LOOPS {
            for event in session.advance(FRAME_DT, &mut pilot) {
                match event {
                    SimEvent::AttemptEnded {
                        loop_index,
                        reached_goal,
                    } => log::info!(
                        "Loop {loop_index} ended at tick {} (goal: {reached_goal})",
                        session.global_tick()
                    ),
                    SimEvent::LevelComplete { loop_index } => {
                        log::info!("Level complete on loop {loop_index}")
                    }
                    other => log::debug!("{other:?}"),
                }
            }
            frames += 1;
        }

        let export = session.export_recordings();
        println!(
            "{} frames, {} ticks, {} recordings ({} bytes exported), complete: {}",
            frames,
            session.global_tick(),
            session.recordings().len(),
            export.len(),
            session.is_complete()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Echo Loop (native) starting...");

    if let Err(err) = headless::run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is echo_loop::web::start
}
