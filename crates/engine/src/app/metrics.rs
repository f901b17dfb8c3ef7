use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

static POISON_REPORTED: AtomicBool = AtomicBool::new(false);

/// Loop throughput over one reporting interval.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    /// Ticks actually completed per second.
    pub fps: f32,
    /// Pacer target when the interval closed.
    pub target_fps: f32,
    pub frame_time_ms: f32,
    pub worst_frame_ms: f32,
    pub paused_ticks: u32,
}

/// Shared read access to the latest snapshot, for overlays or other threads.
#[derive(Clone, Debug, Default)]
pub struct MetricsHandle {
    latest: Arc<RwLock<LoopMetricsSnapshot>>,
}

impl MetricsHandle {
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        *self
            .latest
            .read()
            .unwrap_or_else(|poisoned| recover("read", poisoned))
    }

    pub(crate) fn publish(&self, snapshot: LoopMetricsSnapshot) {
        let mut latest = self
            .latest
            .write()
            .unwrap_or_else(|poisoned| recover("write", poisoned));
        *latest = snapshot;
    }
}

fn recover<G>(operation: &'static str, poisoned: PoisonError<G>) -> G {
    if !POISON_REPORTED.swap(true, Ordering::Relaxed) {
        warn!(operation, "metrics_lock_poisoned");
    }
    poisoned.into_inner()
}

/// Sums per-tick samples until the interval elapses.
#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    started: Instant,
    interval: Duration,
    ticks: u32,
    paused_ticks: u32,
    total_frame_time: Duration,
    worst_frame: Duration,
    target_fps: f32,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            DEFAULT_INTERVAL
        } else {
            interval
        };
        Self {
            started: Instant::now(),
            interval,
            ticks: 0,
            paused_ticks: 0,
            total_frame_time: Duration::ZERO,
            worst_frame: Duration::ZERO,
            target_fps: 0.0,
        }
    }

    pub(crate) fn record_tick(&mut self, frame: Duration, target_fps: f32, paused: bool) {
        self.ticks = self.ticks.saturating_add(1);
        self.paused_ticks = self.paused_ticks.saturating_add(u32::from(paused));
        self.total_frame_time = self.total_frame_time.saturating_add(frame);
        self.worst_frame = self.worst_frame.max(frame);
        self.target_fps = target_fps;
    }

    /// Closes the interval and starts a new one once `interval` has passed.
    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed < self.interval {
            return None;
        }

        let mean_frame = match self.ticks {
            0 => Duration::ZERO,
            ticks => self.total_frame_time / ticks,
        };
        let snapshot = LoopMetricsSnapshot {
            fps: self.ticks as f32 / elapsed.as_secs_f32().max(f32::EPSILON),
            target_fps: self.target_fps,
            frame_time_ms: millis(mean_frame),
            worst_frame_ms: millis(self.worst_frame),
            paused_ticks: self.paused_ticks,
        };

        *self = Self {
            started: now,
            target_fps: self.target_fps,
            ..Self::new(self.interval)
        };
        Some(snapshot)
    }
}

fn millis(duration: Duration) -> f32 {
    duration.as_secs_f32() * 1000.0
}
