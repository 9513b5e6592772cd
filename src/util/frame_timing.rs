//! Per-frame timing for the editor host: optional frame cap, smoothed FPS
//! and the millisecond clock animations run on.

use web_time::{Duration, Instant};

/// Weight of the newest frame in the FPS moving average.
const FPS_SMOOTHING: f32 = 0.05;

/// Frame clock with an optional FPS cap.
pub struct FrameTiming {
    started: Instant,
    last_frame: Instant,
    /// `None` renders every redraw.
    min_interval: Option<Duration>,
    fps: f32,
}

impl FrameTiming {
    /// Clock capped at `target_fps` frames per second (0 = uncapped).
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last_frame: now,
            min_interval: (target_fps > 0)
                .then(|| Duration::from_secs_f64(1.0 / f64::from(target_fps))),
            fps: 60.0,
        }
    }

    /// Whether the cap allows another frame yet.
    #[must_use]
    pub fn should_render(&self) -> bool {
        self.min_interval
            .is_none_or(|interval| self.last_frame.elapsed() >= interval)
    }

    /// Milliseconds since the clock started.
    #[must_use]
    pub fn timestamp(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    /// Record a presented frame.
    pub fn end_frame(&mut self) {
        let now = Instant::now();
        let seconds = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        if seconds > 0.0 {
            self.fps += (seconds.recip() - self.fps) * FPS_SMOOTHING;
        }
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_always_renders() {
        assert!(FrameTiming::new(0).should_render());
    }

    #[test]
    fn capped_waits_for_interval() {
        assert!(!FrameTiming::new(1).should_render());
    }

    #[test]
    fn timestamp_advances() {
        let timing = FrameTiming::new(0);
        let a = timing.timestamp();
        std::thread::sleep(Duration::from_millis(2));
        assert!(timing.timestamp() > a);
    }

    #[test]
    fn fps_moves_towards_frame_rate() {
        let mut timing = FrameTiming::new(0);
        std::thread::sleep(Duration::from_millis(50));
        timing.end_frame();
        // ~20 fps pulls the average down from its 60 fps seed
        assert!(timing.fps() < 60.0);
    }
}
