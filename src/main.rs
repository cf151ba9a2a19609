//! Rockfall headless runner
//!
//! Plays a level with a simple autopilot and prints ASCII frames. Useful for
//! watching the simulation without a renderer:
//!
//! ```text
//! rockfall [LEVEL] [--seed N] [--frames N] [--every N] [--config FILE]
//! ```
//!
//! `--seed` plays generated caves instead of the built-in table.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::collections::VecDeque;

    use rockfall::SoundLog;
    use rockfall::consts::FRAME_DT;
    use rockfall::settings::SimConfig;
    use rockfall::sim::{CaveParams, Dir, Level, Pos, Session, SessionPhase, Tile, TickInput};
    use rockfall::{SimError, SoundId};

    pub struct Args {
        pub level: u32,
        pub seed: Option<u64>,
        pub frames: u32,
        pub every: u32,
        pub config: Option<String>,
    }

    impl Args {
        pub fn parse() -> Result<Self, String> {
            let mut args = Args {
                level: 0,
                seed: None,
                frames: 3600,
                every: 30,
                config: None,
            };
            let mut it = std::env::args().skip(1);
            while let Some(arg) = it.next() {
                let mut value = |name: &str| it.next().ok_or(format!("{} needs a value", name));
                match arg.as_str() {
                    "--seed" => args.seed = Some(number(&value("--seed")?)?),
                    "--frames" => args.frames = number(&value("--frames")?)?,
                    "--every" => args.every = number::<u32>(&value("--every")?)?.max(1),
                    "--config" => args.config = Some(value("--config")?),
                    other => args.level = number(other)?,
                }
            }
            Ok(args)
        }
    }

    fn number<T: std::str::FromStr>(s: &str) -> Result<T, String> {
        s.parse().map_err(|_| format!("not a number: {}", s))
    }

    /// Walkable for planning purposes; avoids cells under a rock or diamond
    fn safe(level: &Level, pos: Pos) -> bool {
        let under_boulder = level
            .grid()
            .get(pos - Dir::Down.delta())
            .is_some_and(|t| t.is_boulder());
        matches!(
            level.tile_at(pos),
            Tile::Empty | Tile::Earth | Tile::Diamond | Tile::ExitOpen
        ) && !under_boulder
    }

    /// Breadth-first search toward the nearest diamond, or the exit once open
    fn autopilot(level: &Level) -> TickInput {
        let start = level.player().pos;
        let goal = |tile: Tile| {
            if level.exit_unlocked {
                tile == Tile::ExitOpen
            } else {
                tile == Tile::Diamond
            }
        };

        let mut first_step = vec![None; level.width() * level.height()];
        let index = |p: Pos| p.y as usize * level.width() + p.x as usize;
        let mut queue = VecDeque::new();
        for dir in Dir::ALL {
            let next = start + dir.delta();
            if level.in_bounds(next) && safe(level, next) {
                first_step[index(next)] = Some(dir);
                queue.push_back(next);
            }
        }
        while let Some(pos) = queue.pop_front() {
            let Some(dir) = first_step[index(pos)] else {
                continue;
            };
            if goal(level.tile_at(pos)) {
                return TickInput::held(dir);
            }
            for d in Dir::ALL {
                let next = pos + d.delta();
                if next != start
                    && level.in_bounds(next)
                    && first_step[index(next)].is_none()
                    && safe(level, next)
                {
                    first_step[index(next)] = Some(dir);
                    queue.push_back(next);
                }
            }
        }
        TickInput::default()
    }

    fn print_frame(session: &Session, frame: u32) {
        let view = session.level().view();
        let hud = view.hud();
        println!(
            "frame {:5} | {} | score {} (total {}) | diamonds {}/{} | time {:5.1}{}",
            frame,
            hud.level_name,
            hud.score,
            session.total_score(),
            hud.collected,
            hud.required,
            hud.time_remaining,
            if hud.exit_unlocked { " | EXIT OPEN" } else { "" }
        );
        print!("{}", view.to_ascii());
    }

    pub fn run(args: Args) -> Result<(), SimError> {
        let config = match &args.config {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|e| {
                    log::error!("Failed to read {}: {}", path, e);
                    SimError::InvalidConfig("config file unreadable")
                })?;
                SimConfig::from_json(&json)?
            }
            None => SimConfig::default(),
        };

        let mut session = match args.seed {
            Some(seed) => Session::cave(seed, CaveParams::default(), config)?,
            None => Session::new(args.level, config)?,
        };
        let mut audio = SoundLog::new();

        for frame in 0..args.frames {
            let input = autopilot(session.level());
            let phase = session.update(&input, FRAME_DT, &mut audio)?;
            if frame % args.every == 0 {
                print_frame(&session, frame);
            }
            match phase {
                SessionPhase::Playing => {}
                SessionPhase::Completed => {
                    print_frame(&session, frame);
                    session.advance(&mut audio)?;
                }
                SessionPhase::Dead | SessionPhase::TimedOut => {
                    print_frame(&session, frame);
                    log::info!("{:?}, restarting", phase);
                    session.restart(&mut audio)?;
                }
                SessionPhase::Quit => break,
            }
        }

        println!(
            "done: total score {}, {} explosions, {} diamonds collected",
            session.total_score(),
            audio.count(SoundId::Explosion),
            audio.count(SoundId::DiamondCollect)
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Rockfall (headless) starting...");

    let args = match headless::Args::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    if let Err(e) = headless::run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a host; there is no standalone wasm runner
}
