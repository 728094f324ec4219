//! Blink detection
//!
//! Turns the per-frame eye aspect ratio into discrete blink events using a
//! two-threshold hysteresis, and keeps the blink timestamps of the trailing
//! window to estimate a per-minute blink rate.

use crate::config::BlinkConfig;
use crate::types::{BlinkEvent, EyelidPhase};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Hysteresis blink detector with a rolling rate estimate
#[derive(Debug, Clone)]
pub struct BlinkDetector {
    config: BlinkConfig,
    phase: EyelidPhase,
    last_transition_ts: Option<f64>,
    last_sample_ts: Option<f64>,
    started_at: Option<f64>,
    /// Blink timestamps inside the trailing window, oldest first
    blinks: VecDeque<f64>,
}

impl Default for BlinkDetector {
    fn default() -> Self {
        Self::new(BlinkConfig::default())
    }
}

impl BlinkDetector {
    pub fn new(config: BlinkConfig) -> Self {
        Self {
            config,
            phase: EyelidPhase::Open,
            last_transition_ts: None,
            last_sample_ts: None,
            started_at: None,
            blinks: VecDeque::new(),
        }
    }

    /// Mark the start of the pipeline for the startup rate correction.
    ///
    /// Without an explicit start the first ingested sample is used.
    pub fn start(&mut self, timestamp: f64) {
        self.started_at = Some(timestamp);
    }

    /// Feed one EAR sample; returns a blink when the eye re-opens
    pub fn ingest(&mut self, ear_value: f64, timestamp: f64) -> Option<BlinkEvent> {
        if !ear_value.is_finite() || !timestamp.is_finite() {
            warn!(ear_value, timestamp, "ignoring non-finite blink sample");
            return None;
        }
        if let Some(last) = self.last_sample_ts {
            if timestamp < last {
                warn!(timestamp, last, "ignoring out-of-order blink sample");
                return None;
            }
        }
        self.last_sample_ts = Some(timestamp);
        if self.started_at.is_none() {
            self.started_at = Some(timestamp);
        }

        self.evict_before(timestamp - self.config.window_seconds);

        match self.phase {
            EyelidPhase::Open if ear_value < self.config.closed_threshold => {
                self.phase = EyelidPhase::Closed;
                self.last_transition_ts = Some(timestamp);
                None
            }
            EyelidPhase::Closed if ear_value > self.config.open_threshold => {
                self.phase = EyelidPhase::Open;
                self.last_transition_ts = Some(timestamp);
                self.blinks.push_back(timestamp);
                debug!(timestamp, window_count = self.blinks.len(), "blink detected");
                Some(BlinkEvent { timestamp })
            }
            _ => None,
        }
    }

    /// Blinks per minute over the trailing window ending at `now`
    pub fn rolling_rate(&self, now: f64) -> f64 {
        let Some(started_at) = self.started_at else {
            return 0.0;
        };
        let window = self.config.window_seconds;
        let count = self
            .blinks
            .iter()
            .filter(|&&ts| ts >= now - window && ts <= now)
            .count();

        // Scale up a partially filled first window instead of undercounting.
        let elapsed = (now - started_at).max(self.config.warmup_floor_seconds);
        let effective_window = elapsed.min(window);
        (count as f64) * 60.0 / effective_window
    }

    /// Number of retained blink timestamps
    pub fn blinks_in_window(&self) -> usize {
        self.blinks.len()
    }

    pub fn phase(&self) -> EyelidPhase {
        self.phase
    }

    pub fn last_transition_ts(&self) -> Option<f64> {
        self.last_transition_ts
    }

    /// Forget all state, including the pipeline start
    pub fn reset(&mut self) {
        self.phase = EyelidPhase::Open;
        self.last_transition_ts = None;
        self.last_sample_ts = None;
        self.started_at = None;
        self.blinks.clear();
    }

    fn evict_before(&mut self, cutoff: f64) {
        while let Some(&front) = self.blinks.front() {
            if front < cutoff {
                self.blinks.pop_front();
            } else {
                break;
            }
        }
    }
}
