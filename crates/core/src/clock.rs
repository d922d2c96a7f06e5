//! Fixed-timestep scheduling with frame-skip catch-up.
//!
//! Simulation runs at a fixed 60 ticks per second regardless of how fast
//! the client renders. Each real-time frame the clock runs every tick whose
//! deadline has passed, up to a cap; a machine too slow to catch up within
//! the cap slows the game down instead of spiraling into an ever-growing
//! backlog. Unpaid tick debt under the cap persists into the next frame.

/// Milliseconds of simulated time per tick.
pub const TICK_MS: f64 = 1000.0 / 60.0;

/// Most ticks one `advance` call will run before yielding a frame.
pub const MAX_FRAME_SKIP: u32 = 10;

#[derive(Debug, Clone)]
pub struct GameClock {
    next_game_tick: f64,
    paused: bool,
    /// Distinguishes an explicit pause from key-repeat noise.
    pause_key_was_down: bool,
    running: bool,
}

impl GameClock {
    pub fn new(now_ms: f64) -> Self {
        Self {
            next_game_tick: now_ms,
            paused: false,
            pause_key_was_down: false,
            running: true,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stops the clock for good (session over). Ticks no longer run.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Run every tick due by `now_ms`, up to the frame-skip cap, and return
    /// how many ran. The caller renders when the count is nonzero.
    pub fn advance(&mut self, now_ms: f64, mut tick: impl FnMut()) -> u32 {
        if self.paused || !self.running {
            return 0;
        }
        let mut loops = 0;
        while now_ms > self.next_game_tick && loops < MAX_FRAME_SKIP {
            tick();
            self.next_game_tick += TICK_MS;
            loops += 1;
        }
        loops
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume from `now_ms`. The deadline snaps to now so time spent paused
    /// is not owed as a burst of catch-up ticks.
    pub fn resume(&mut self, now_ms: f64) {
        self.paused = false;
        self.next_game_tick = now_ms;
    }

    /// Edge-triggered pause toggle from the held state of the pause key.
    pub fn handle_pause_key(&mut self, held: bool, now_ms: f64) {
        if held && !self.pause_key_was_down {
            if self.paused {
                self.resume(now_ms);
            } else {
                self.pause();
            }
        }
        self.pause_key_was_down = held;
    }

    /// Run exactly one tick; only honored while paused, in debug builds of
    /// the session config. Returns whether the tick ran.
    pub fn step_one(&mut self, debug: bool, mut tick: impl FnMut()) -> bool {
        if !self.paused || !debug || !self.running {
            return false;
        }
        tick();
        true
    }
}
