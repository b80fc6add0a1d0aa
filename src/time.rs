pub use std::time::Instant;

/// Seconds since the clock was started.
pub trait Clock {
    fn since_init(&self) -> f64;
}

#[derive(Clone, Copy, Debug)]
pub struct Chronometer {
    start: Instant,
}

impl Chronometer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn restart(&mut self) {
        self.start = Instant::now();
    }
}

impl Default for Chronometer {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for Chronometer {
    fn since_init(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Clock that only moves when told to; used for deterministic frames.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ManualClock {
    now: f64,
}

impl ManualClock {
    pub fn new(now: f64) -> Self {
        Self { now }
    }

    pub fn set(&mut self, now: f64) {
        self.now = now;
    }

    pub fn advance(&mut self, seconds: f64) {
        self.now += seconds;
    }
}

impl Clock for ManualClock {
    fn since_init(&self) -> f64 {
        self.now
    }
}
