//! Countdown shown after a confirmed booking before returning to `/events`.

use std::time::Duration;

pub const COUNTDOWN_SEED: u32 = 5;
pub const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownStep {
    /// Seconds left after this tick.
    Tick(u32),
    /// Time to navigate. Produced exactly once.
    Navigate,
    /// Navigation already happened; nothing left to do.
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    navigated: bool,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(COUNTDOWN_SEED)
    }
}

impl Countdown {
    pub fn new(seed: u32) -> Self {
        Self {
            remaining: seed,
            navigated: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_finished(&self) -> bool {
        self.navigated
    }

    pub fn tick(&mut self) -> CountdownStep {
        if self.navigated {
            return CountdownStep::Finished;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.navigated = true;
            CountdownStep::Navigate
        } else {
            CountdownStep::Tick(self.remaining)
        }
    }

    /// Skips the rest of the countdown.
    pub fn go_now(&mut self) -> CountdownStep {
        if self.navigated {
            return CountdownStep::Finished;
        }
        self.remaining = 0;
        self.navigated = true;
        CountdownStep::Navigate
    }
}
