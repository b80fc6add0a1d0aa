pub const FPS_WINDOW: usize = 16;

/// Ring of the last [`FPS_WINDOW`] frame timestamps.
#[derive(Clone, Debug, Default)]
pub struct FrameTimingState {
    timestamps: [f64; FPS_WINDOW],
    frames: u64,
    last_fps: Option<f64>,
}

impl FrameTimingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `now` and returns the rate over the window once the window is
    /// full. Frames 0..15 only fill the ring.
    pub fn record(&mut self, now: f64) -> Option<f64> {
        let slot = (self.frames % FPS_WINDOW as u64) as usize;
        let filled = self.frames >= FPS_WINDOW as u64;
        // the slot about to be overwritten holds the timestamp 16 frames back
        let oldest = self.timestamps[slot];
        self.timestamps[slot] = now;
        self.frames += 1;

        if !filled {
            return None;
        }

        let window = now - oldest;
        if window <= 0.0 {
            log::debug!("Non-positive frame window ({window}s), skipping fps");
            self.last_fps = None;
            return None;
        }

        let fps = FPS_WINDOW as f64 / window;
        self.last_fps = Some(fps);
        Some(fps)
    }

    pub fn frames_recorded(&self) -> u64 {
        self.frames
    }

    pub fn last_fps(&self) -> Option<f64> {
        self.last_fps
    }
}
