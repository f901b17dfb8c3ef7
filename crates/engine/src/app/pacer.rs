use std::thread;
use std::time::{Duration, Instant};

pub const FRAME_WINDOW_LEN: usize = 10;
pub const MIN_FPS: f32 = 1.0;
const SLOW_DOWN_STEP: f32 = 1.0;
const RAMP_UP_STEP: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateState {
    current_fps: f32,
    max_fps: u32,
}

impl RateState {
    pub fn new(max_fps: u32) -> Self {
        let max_fps = max_fps.max(1);
        Self {
            current_fps: max_fps as f32,
            max_fps,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_current(max_fps: u32, current_fps: f32) -> Self {
        let mut rate = Self::new(max_fps);
        rate.current_fps = current_fps.clamp(MIN_FPS, rate.max_fps as f32);
        rate
    }

    pub fn current_fps(&self) -> f32 {
        self.current_fps
    }

    pub fn max_fps(&self) -> u32 {
        self.max_fps
    }

    /// Slow down by one on any under-performance, otherwise ramp up by five
    /// while there is headroom. Ramp-up is held off while paused.
    pub fn adjust(&mut self, measured_fps: f32, paused: bool) {
        let max_fps = self.max_fps as f32;
        if measured_fps < self.current_fps {
            self.current_fps = (self.current_fps - SLOW_DOWN_STEP).max(MIN_FPS);
        } else if self.current_fps < max_fps && !paused {
            self.current_fps = (self.current_fps + RAMP_UP_STEP).min(max_fps);
        }
    }
}

/// Measures achieved throughput over the trailing frames and blocks the
/// thread to hold the loop at the current target rate.
#[derive(Debug)]
pub struct FramePacer {
    rate: RateState,
    window: FrameWindow,
    last_pace: Instant,
}

impl FramePacer {
    pub fn new(max_fps: u32) -> Self {
        Self::with_rate(RateState::new(max_fps))
    }

    pub fn with_rate(rate: RateState) -> Self {
        Self {
            rate,
            window: FrameWindow::default(),
            last_pace: Instant::now(),
        }
    }

    pub fn rate(&self) -> RateState {
        self.rate
    }

    pub fn current_fps(&self) -> f32 {
        self.rate.current_fps()
    }

    /// Frames per second over the last `FRAME_WINDOW_LEN` frames, or zero
    /// until that many frames have completed.
    pub fn measured_fps(&self) -> f32 {
        self.window.measured_fps()
    }

    pub fn adjust_rate(&mut self, paused: bool) -> f32 {
        let measured_fps = self.measured_fps();
        self.rate.adjust(measured_fps, paused);
        self.rate.current_fps()
    }

    /// Sleeps out the rest of the current frame interval and returns the
    /// full duration of the frame that just ended.
    pub fn pace(&mut self) -> Duration {
        let target = target_frame_duration(self.rate.current_fps());
        let elapsed = Instant::now().saturating_duration_since(self.last_pace);
        let sleep = compute_pace_sleep(elapsed, target);
        if sleep > Duration::ZERO {
            thread::sleep(sleep);
        }

        let now = Instant::now();
        let frame = now.saturating_duration_since(self.last_pace);
        self.last_pace = now;
        self.window.push(frame);
        frame
    }

    #[cfg(test)]
    pub(crate) fn record_frame(&mut self, frame: Duration) {
        self.window.push(frame);
    }
}

#[derive(Debug)]
struct FrameWindow {
    samples: [Duration; FRAME_WINDOW_LEN],
    head: usize,
    count: usize,
    sum: Duration,
}

impl Default for FrameWindow {
    fn default() -> Self {
        Self {
            samples: [Duration::ZERO; FRAME_WINDOW_LEN],
            head: 0,
            count: 0,
            sum: Duration::ZERO,
        }
    }
}

impl FrameWindow {
    fn push(&mut self, frame: Duration) {
        if self.count < FRAME_WINDOW_LEN {
            self.samples[self.head] = frame;
            self.head = (self.head + 1) % FRAME_WINDOW_LEN;
            self.count += 1;
            self.sum = self.sum.saturating_add(frame);
            return;
        }

        let evicted = self.samples[self.head];
        self.samples[self.head] = frame;
        self.head = (self.head + 1) % FRAME_WINDOW_LEN;
        self.sum = self.sum.saturating_sub(evicted).saturating_add(frame);
    }

    fn measured_fps(&self) -> f32 {
        if self.count < FRAME_WINDOW_LEN {
            return 0.0;
        }

        let mean_seconds = self.sum.as_secs_f32() / self.count as f32;
        1.0 / mean_seconds.max(f32::EPSILON)
    }
}

fn target_frame_duration(fps: f32) -> Duration {
    Duration::from_secs_f32(1.0 / fps.max(MIN_FPS))
}

fn compute_pace_sleep(elapsed: Duration, target: Duration) -> Duration {
    target.saturating_sub(elapsed)
}
