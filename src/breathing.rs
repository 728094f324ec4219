//! Breathing-rate sources
//!
//! The engine only consumes a breathing rate value; how it is produced is up to
//! the provider. `LatestBreathing` is a shared cell a provider thread writes
//! into, `SimulatedBreathing` is a smooth synthetic signal for demos and
//! replays.

use parking_lot::RwLock;
use std::f64::consts::PI;
use std::sync::Arc;
use std::time::Instant;

/// Lower bound of the simulated breathing rate (breaths per minute)
pub const SIMULATED_MIN_BPM: f64 = 10.0;
/// Upper bound of the simulated breathing rate (breaths per minute)
pub const SIMULATED_MAX_BPM: f64 = 25.0;
/// Period of the simulated oscillation (seconds)
pub const SIMULATED_PERIOD_SECONDS: f64 = 45.0;

/// Anything that can report the most recent breathing rate without blocking
pub trait BreathingSource: Send + Sync {
    /// Latest breathing rate in breaths per minute, `None` when no value is available
    fn latest(&self) -> Option<f64>;
}

/// Latest-value cell shared between a provider and the tick loop
#[derive(Debug, Clone, Default)]
pub struct LatestBreathing {
    value: Arc<RwLock<Option<f64>>>,
}

impl LatestBreathing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new reading
    pub fn publish(&self, breaths_per_minute: f64) {
        *self.value.write() = Some(breaths_per_minute);
    }

    /// Drop the current reading (provider lost its signal)
    pub fn clear(&self) {
        *self.value.write() = None;
    }
}

impl BreathingSource for LatestBreathing {
    fn latest(&self) -> Option<f64> {
        // A writer holding the lock means the previous value is still being
        // replaced; report nothing rather than wait for it.
        self.value.try_read().and_then(|guard| *guard)
    }
}

/// Smoothly varying breathing rate between 10 and 25 BPM
#[derive(Debug, Clone)]
pub struct SimulatedBreathing {
    started: Instant,
}

impl Default for SimulatedBreathing {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedBreathing {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Rate at `elapsed` seconds into the simulation
    pub fn rate_at(elapsed: f64) -> f64 {
        let baseline = (SIMULATED_MIN_BPM + SIMULATED_MAX_BPM) / 2.0;
        let amplitude = (SIMULATED_MAX_BPM - SIMULATED_MIN_BPM) / 2.0;
        let phase = 2.0 * PI * elapsed / SIMULATED_PERIOD_SECONDS;
        (baseline + amplitude * phase.sin()).clamp(SIMULATED_MIN_BPM, SIMULATED_MAX_BPM)
    }
}

impl BreathingSource for SimulatedBreathing {
    fn latest(&self) -> Option<f64> {
        Some(Self::rate_at(self.started.elapsed().as_secs_f64()))
    }
}
