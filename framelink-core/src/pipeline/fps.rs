//! Frame rate accounting

/// Frames presented during one report window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FpsReport {
    pub frames: u32,
    pub elapsed_ticks: u64,
}

impl FpsReport {
    /// Frames per second, rounded down
    pub fn per_second(&self, ticks_per_second: u64) -> u32 {
        if self.elapsed_ticks == 0 {
            return self.frames;
        }
        let fps = u64::from(self.frames) * ticks_per_second / self.elapsed_ticks;
        u32::try_from(fps).unwrap_or(u32::MAX)
    }
}

/// Counts frames and reports once per window
#[derive(Debug, Clone)]
pub struct FpsMeter {
    window_ticks: u64,
    window_start: u64,
    frames: u32,
}

impl FpsMeter {
    pub fn new(window_ticks: u64, now: u64) -> Self {
        Self {
            window_ticks,
            window_start: now,
            frames: 0,
        }
    }

    pub fn record(&mut self) {
        self.frames = self.frames.saturating_add(1);
    }

    /// Frames counted in the current window
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Close the window if it has run its full length
    pub fn sample(&mut self, now: u64) -> Option<FpsReport> {
        let elapsed_ticks = now.wrapping_sub(self.window_start);
        if elapsed_ticks < self.window_ticks {
            return None;
        }
        let report = FpsReport {
            frames: self.frames,
            elapsed_ticks,
        };
        self.window_start = now;
        self.frames = 0;
        Some(report)
    }
}
