use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Sliding-window frame timer.
///
/// Keeps the last `capacity` frame durations; the reported rate is the
/// inverse of their mean. Until the first duration arrives the clock reports
/// [`INITIAL_FPS`](Self::INITIAL_FPS).
#[derive(Debug, Clone)]
pub struct FrameClock {
    samples: VecDeque<Duration>,
    capacity: usize,
    total: Duration,
    last_tick: Option<Instant>,
}

impl FrameClock {
    pub const DEFAULT_WINDOW: usize = 60;
    pub const INITIAL_FPS: f32 = 60.0;

    pub fn new() -> Self {
        Self::with_window(Self::DEFAULT_WINDOW)
    }

    pub fn with_window(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            total: Duration::ZERO,
            last_tick: None,
        }
    }

    /// Record the time elapsed since the previous tick. The first tick only
    /// sets the reference point.
    pub fn tick(&mut self, now: Instant) {
        if let Some(last) = self.last_tick.replace(now) {
            self.record(now.saturating_duration_since(last));
        }
    }

    /// Record one frame duration. Zero durations are ignored.
    pub fn record(&mut self, frame: Duration) {
        if frame.is_zero() {
            return;
        }
        if self.samples.len() == self.capacity {
            if let Some(old) = self.samples.pop_front() {
                self.total -= old;
            }
        }
        self.samples.push_back(frame);
        self.total += frame;
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Mean frame time in milliseconds.
    pub fn frame_time_ms(&self) -> f64 {
        if self.samples.is_empty() {
            return 1000.0 / f64::from(Self::INITIAL_FPS);
        }
        self.total.as_secs_f64() * 1000.0 / self.samples.len() as f64
    }

    pub fn fps(&self) -> f32 {
        if self.samples.is_empty() {
            return Self::INITIAL_FPS;
        }
        (self.samples.len() as f64 / self.total.as_secs_f64()) as f32
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// `"<n> fps"` with the rate rounded to the nearest integer, halves away
/// from zero.
pub fn format_fps(fps: f32) -> String {
    let rounded = if fps.is_finite() { fps.round() as i64 } else { 0 };
    format!("{rounded} fps")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_at(rate: f64) -> Duration {
        Duration::from_secs_f64(1.0 / rate)
    }

    #[test]
    fn empty_clock_reports_initial_rate() {
        let clock = FrameClock::new();
        assert_eq!(clock.fps(), FrameClock::INITIAL_FPS);
        assert_eq!(format_fps(clock.fps()), "60 fps");
        assert!((clock.frame_time_ms() - 1000.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn steady_frames_report_their_rate() {
        let mut clock = FrameClock::new();
        for _ in 0..10 {
            clock.record(frame_at(59.6));
        }
        assert!((clock.fps() - 59.6).abs() < 1e-3);
        assert_eq!(format_fps(clock.fps()), "60 fps");
    }

    #[test]
    fn window_drops_old_samples() {
        let mut clock = FrameClock::with_window(4);
        for _ in 0..4 {
            clock.record(frame_at(30.0));
        }
        for _ in 0..4 {
            clock.record(frame_at(120.0));
        }
        assert_eq!(clock.sample_count(), 4);
        assert!((clock.fps() - 120.0).abs() < 1e-2);
    }

    #[test]
    fn tick_measures_between_instants() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick(start);
        assert_eq!(clock.sample_count(), 0);
        assert_eq!(clock.fps(), FrameClock::INITIAL_FPS);
        clock.tick(start + Duration::from_millis(20));
        clock.tick(start + Duration::from_millis(40));
        assert_eq!(clock.sample_count(), 2);
        assert!((clock.fps() - 50.0).abs() < 1e-3);
        assert!((clock.frame_time_ms() - 20.0).abs() < 1e-6);
    }

    #[test]
    fn zero_durations_are_ignored() {
        let mut clock = FrameClock::new();
        clock.record(Duration::ZERO);
        assert_eq!(clock.sample_count(), 0);
    }

    #[test]
    fn format_rounds_to_nearest() {
        assert_eq!(format_fps(59.6), "60 fps");
        assert_eq!(format_fps(59.4), "59 fps");
        assert_eq!(format_fps(59.5), "60 fps");
        assert_eq!(format_fps(0.0), "0 fps");
        assert_eq!(format_fps(f32::NAN), "0 fps");
    }
}
