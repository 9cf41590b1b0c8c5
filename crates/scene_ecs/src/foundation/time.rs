//! Time management utilities

use std::time::Instant;

/// High-precision timer for frame timing
pub struct FrameTimer {
    last_frame: Instant,
    delta_time: f32,
    max_delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(0.25)
    }
}

impl FrameTimer {
    /// Create a new timer that never reports a delta above `max_delta_time`
    #[must_use]
    pub fn new(max_delta_time: f32) -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            max_delta_time,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame) and return the delta
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame).as_secs_f32();
        self.delta_time = elapsed.min(self.max_delta_time);
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
        self.delta_time
    }

    /// Get the time since the last frame in seconds
    #[must_use]
    pub const fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    #[must_use]
    pub const fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_is_clamped() {
        let mut timer = FrameTimer::new(0.0);
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(timer.update().abs() < f32::EPSILON);
        assert_eq!(timer.frame_count(), 1);
    }

    #[test]
    fn test_accumulates_frames() {
        let mut timer = FrameTimer::default();
        timer.update();
        timer.update();
        assert_eq!(timer.frame_count(), 2);
        assert!(timer.total_time() >= 0.0);
    }
}
