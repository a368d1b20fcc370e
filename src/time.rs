//! Frame timing.
//!
//! The morph engines never own a loop or a timer. A host calls
//! [`FrameClock::tick`] once per rendered frame and hands the resulting
//! [`FrameTime`] to [`Scene::update`](crate::Scene::update). Tests skip the
//! clock entirely and feed synthetic frames from [`fixed_frames`].
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//!
//! // In your frame callback:
//! let frame = clock.tick();
//! scene.update(frame);
//! ```

use std::time::{Duration, Instant};

/// Default upper bound for a single real frame delta, in seconds.
pub const DEFAULT_MAX_DELTA: f32 = 0.25;

/// Timing for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Monotonic seconds since the clock started (pauses excluded).
    pub elapsed: f32,
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Frame number, starting at 1 for the first tick.
    pub frame: u64,
}

impl FrameTime {
    /// A frame with explicit timing values.
    pub fn new(elapsed: f32, delta: f32) -> Self {
        Self {
            elapsed,
            delta,
            frame: 0,
        }
    }
}

/// Endless sequence of frames spaced `delta` seconds apart.
///
/// The first frame has `elapsed == delta`.
pub fn fixed_frames(delta: f32) -> impl Iterator<Item = FrameTime> {
    (1u64..).map(move |frame| FrameTime {
        elapsed: frame as f32 * delta,
        delta,
        frame,
    })
}

/// Wall-clock frame driver.
#[derive(Debug)]
pub struct FrameClock {
    /// When the clock was created.
    start: Instant,
    /// When the last frame occurred.
    last_frame: Instant,
    /// Total elapsed time in seconds.
    elapsed_secs: f32,
    /// Time since last frame in seconds.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    paused: bool,
    /// Time spent paused, excluded from `elapsed`.
    pause_elapsed: Duration,
    /// Fixed delta for deterministic stepping.
    fixed_delta: Option<f32>,
    /// Largest real delta reported for a single frame.
    max_delta: f32,
}

impl FrameClock {
    /// Create a new clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            paused: false,
            pause_elapsed: Duration::ZERO,
            fixed_delta: None,
            max_delta: DEFAULT_MAX_DELTA,
        }
    }

    /// Advance the clock. Call once per frame.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();

        if self.paused {
            self.delta_secs = 0.0;
            return self.current();
        }

        let raw_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.delta_secs = self
            .fixed_delta
            .unwrap_or_else(|| raw_delta.min(self.max_delta));
        self.last_frame = now;

        let raw_elapsed = now.duration_since(self.start).saturating_sub(self.pause_elapsed);
        self.elapsed_secs = raw_elapsed.as_secs_f32();

        self.frame_count += 1;

        self.current()
    }

    /// Timing of the most recent tick.
    pub fn current(&self) -> FrameTime {
        FrameTime {
            elapsed: self.elapsed_secs,
            delta: self.delta_secs,
            frame: self.frame_count,
        }
    }

    /// Whether the clock is paused.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop time. While paused, `delta` is 0 and `elapsed` holds still.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after [`pause`](Self::pause).
    pub fn resume(&mut self) {
        if self.paused {
            let now = Instant::now();
            self.pause_elapsed += now.duration_since(self.last_frame);
            self.last_frame = now;
            self.paused = false;
        }
    }

    /// Use a fixed delta instead of wall-clock deltas. `None` restores real timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    /// Clamp real frame deltas, e.g. after the window was hidden for a while.
    pub fn set_max_delta(&mut self, max_delta: f32) {
        self.max_delta = max_delta.max(0.0);
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.current().frame, 0);
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_clock_tick() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(10));
        let frame = clock.tick();

        assert!(frame.elapsed > 0.0);
        assert!(frame.delta > 0.0);
        assert_eq!(frame.frame, 1);
    }

    #[test]
    fn test_clock_pause() {
        let mut clock = FrameClock::new();
        clock.tick();

        clock.pause();
        let before = clock.current().elapsed;
        thread::sleep(Duration::from_millis(10));
        let frame = clock.tick();

        assert_eq!(frame.elapsed, before);
        assert_eq!(frame.delta, 0.0);
    }

    #[test]
    fn test_fixed_delta() {
        let mut clock = FrameClock::new();
        clock.set_fixed_delta(Some(1.0 / 60.0));

        thread::sleep(Duration::from_millis(50));
        let frame = clock.tick();

        assert!((frame.delta - 1.0 / 60.0).abs() < 0.0001);
    }

    #[test]
    fn test_max_delta_clamps_stalls() {
        let mut clock = FrameClock::new();
        clock.set_max_delta(0.005);
        thread::sleep(Duration::from_millis(30));
        assert!(clock.tick().delta <= 0.005);
    }

    #[test]
    fn test_fixed_frames() {
        let frames: Vec<FrameTime> = fixed_frames(0.5).take(3).collect();
        assert_eq!(frames[0].elapsed, 0.5);
        assert_eq!(frames[2].elapsed, 1.5);
        assert_eq!(frames[2].frame, 3);
        assert!(frames.iter().all(|f| f.delta == 0.5));
    }
}
