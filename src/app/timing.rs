use std::time::{Duration, Instant};

pub struct FrameTiming {
    last_frame_time: Option<Instant>,
    last_fps_time: Instant,
    frame_count: u32,
    pub frame_dt: f32,
    work_ms: f32,
    fps: f32,
    label: String,
}

impl FrameTiming {
    pub fn new(label: String, now: Instant) -> Self {
        Self {
            last_frame_time: None,
            last_fps_time: now,
            frame_count: 0,
            frame_dt: 1.0 / 60.0,
            work_ms: 0.0,
            fps: 0.0,
            label,
        }
    }

    /// Time spent in the viewer's frame work, reported with the fps summary.
    pub fn set_work_ms(&mut self, work_ms: f32) {
        self.work_ms = work_ms;
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn update(&mut self, now: Instant) {
        let dt_duration = if let Some(last) = self.last_frame_time {
            now.saturating_duration_since(last)
        } else {
            Duration::from_millis(16)
        };
        self.last_frame_time = Some(now);
        self.frame_dt = dt_duration.as_secs_f32().max(0.0);

        self.frame_count = self.frame_count.saturating_add(1);
        let elapsed = now.saturating_duration_since(self.last_fps_time);
        if elapsed.as_secs_f32() >= 0.5 {
            self.fps = self.frame_count as f32 / elapsed.as_secs_f32();
            log::debug!(
                "{} - {:.1} fps (cadence {:.2} ms, work {:.2} ms)",
                self.label,
                self.fps,
                self.frame_dt * 1000.0,
                self.work_ms
            );
            self.frame_count = 0;
            self.last_fps_time = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FrameTiming;
    use std::time::{Duration, Instant};

    #[test]
    fn first_frame_assumes_sixty_hertz() {
        let start = Instant::now();
        let mut timing = FrameTiming::new("test".to_string(), start);
        timing.update(start);
        assert!((timing.frame_dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn delta_and_fps_follow_frame_cadence() {
        let start = Instant::now();
        let mut timing = FrameTiming::new("test".to_string(), start);
        for frame in 1..=40u64 {
            timing.update(start + Duration::from_millis(frame * 20));
        }
        assert!((timing.frame_dt - 0.02).abs() < 1e-4);
        assert!(timing.fps() > 40.0 && timing.fps() < 60.0);
    }
}
