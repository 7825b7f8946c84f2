//! Infinite Rebirth Breaker entry point
//!
//! On the web the game is driven from JavaScript through the exported
//! `game_*` functions. Natively a seeded headless auto-play runs to game over.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use wasm_bindgen::prelude::*;

    use infinite_rebirth_breaker::Game;
    use infinite_rebirth_breaker::platform::LocalStorageBackend;
    use infinite_rebirth_breaker::settings::DebugOverrides;
    use infinite_rebirth_breaker::sim::{RunConfig, TapOutcome};

    thread_local! {
        static GAME: RefCell<Option<Game<LocalStorageBackend>>> = const { RefCell::new(None) };
    }

    fn with_game<R>(f: impl FnOnce(&mut Game<LocalStorageBackend>) -> R) -> Option<R> {
        GAME.with(|cell| cell.borrow_mut().as_mut().map(f))
    }

    pub fn init() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }
        log::info!("Infinite Rebirth Breaker starting...");

        let seed = js_sys::Date::now() as u64;
        let game = Game::new(
            LocalStorageBackend,
            RunConfig::with_seed(seed),
            DebugOverrides::load(),
        );
        GAME.with(|cell| *cell.borrow_mut() = Some(game));
        log::info!("Game ready with seed: {}", seed);
    }

    /// Start a new run (quick skip resumes near the best wave)
    #[wasm_bindgen]
    pub fn game_start(quick_skip: bool) {
        with_game(|game| game.start_run(quick_skip));
    }

    /// Advance one frame; returns the frame's events as JSON
    #[wasm_bindgen]
    pub fn game_update(delta_ms: f32) -> String {
        with_game(|game| {
            let events = game.update(delta_ms);
            serde_json::to_string(&events).unwrap_or_else(|e| {
                log::error!("Failed to encode events: {e}");
                "[]".to_string()
            })
        })
        .unwrap_or_else(|| "[]".to_string())
    }

    /// Tap at arena coordinates; returns the number of projectiles fired
    #[wasm_bindgen]
    pub fn game_tap(x: f32, y: f32) -> u32 {
        match with_game(|game| game.tap(x, y)) {
            Some(TapOutcome::Fired(n)) => n as u32,
            _ => 0,
        }
    }

    #[wasm_bindgen]
    pub fn game_set_character(x: f32, y: f32) {
        with_game(|game| game.set_character_position(x, y));
    }

    #[wasm_bindgen]
    pub fn game_hud_json() -> String {
        with_game(|game| serde_json::to_string(&game.hud()).ok())
            .flatten()
            .unwrap_or_else(|| "{}".to_string())
    }

    /// Buy an attack level; returns the new level or -1 if unaffordable
    #[wasm_bindgen]
    pub fn game_upgrade_attack() -> i32 {
        match with_game(|game| game.upgrade_attack()) {
            Some(Ok(level)) => level as i32,
            Some(Err(e)) => {
                log::info!("Upgrade refused: {e}");
                -1
            }
            None => -1,
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::init();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use infinite_rebirth_breaker::persistence::FileBackend;
    use infinite_rebirth_breaker::settings::DebugOverrides;
    use infinite_rebirth_breaker::sim::{GameEvent, RunConfig};
    use infinite_rebirth_breaker::{Game, format_short};

    /// Simulated frame length
    const FRAME_MS: f32 = 16.0;
    /// Auto-play taps the nearest task this often
    const TAP_EVERY_FRAMES: u32 = 15;
    /// Give up after ten simulated minutes
    const MAX_FRAMES: u32 = 37_500;

    env_logger::init();
    log::info!("Infinite Rebirth Breaker (native) starting headless auto-play...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(42);
    let mut game = Game::new(
        FileBackend::new("infinite_rebirth_breaker_save.json"),
        RunConfig::with_seed(seed),
        DebugOverrides::load(),
    );
    game.start_run(true);
    println!(
        "Seed {} | starting at wave {} | attack level {}",
        seed,
        game.run().wave.current(),
        game.run().attack_level
    );

    let mut summary = None;
    for frame in 0..MAX_FRAMES {
        if frame % TAP_EVERY_FRAMES == 0 {
            let character = game.run().character;
            if let Some(pos) = game.run().spawner.nearest_to(character).map(|t| t.pos) {
                game.tap(pos.x, pos.y);
            }
        }

        for event in game.update(FRAME_MS) {
            match event {
                GameEvent::WaveAdvanced { wave } => println!("  wave {wave}"),
                GameEvent::AwakeningStarted { kind } => println!("  awakening: {}", kind.as_str()),
                GameEvent::GameOver { summary: s } => summary = Some(s),
                _ => {}
            }
        }
        if summary.is_some() {
            break;
        }
    }

    match summary {
        Some(s) => {
            println!("\nGame over at wave {}", s.wave);
            println!("  tasks defeated: {}", s.tasks_defeated);
            println!("  total damage:   {}", format_short(&s.total_damage));
            println!("  debug points:   {}", s.debug_points);
            println!("  time:           {:.1}s", s.elapsed_ms / 1000.0);
            println!("  stones earned:  {}", format_short(&s.rebirth_stones));
        }
        None => println!("\nStill alive at wave {} after the time limit", game.run().wave.current()),
    }
    println!(
        "Rebirth Stones: {} | best wave: {}",
        format_short(&game.rebirth_stones()),
        game.max_stage()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
