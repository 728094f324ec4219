//! Session statistics
//!
//! Running counters and peaks accumulated by the tick loop. Zone time is
//! attributed from the monotonic delta between consecutive fused updates to
//! the zone of the later update.

use crate::types::{FusedUpdate, Zone};
use serde::{Deserialize, Serialize};

/// Why a frame produced no fused update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoFace,
    /// No breathing value has been seen yet
    NoBreathing,
    /// Timestamp did not advance past the previous frame
    NonMonotonic,
}

/// Seconds spent in each zone
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoneTime {
    pub deep_flow: f64,
    pub normal: f64,
    pub brain_fried: f64,
}

impl ZoneTime {
    pub fn total(&self) -> f64 {
        self.deep_flow + self.normal + self.brain_fried
    }

    fn add(&mut self, zone: Zone, seconds: f64) {
        match zone {
            Zone::DeepFlow => self.deep_flow += seconds,
            Zone::Normal => self.normal += seconds,
            Zone::BrainFried => self.brain_fried += seconds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub frames_processed: u64,
    pub skipped_no_face: u64,
    pub skipped_no_breathing: u64,
    pub skipped_non_monotonic: u64,
    pub blinks: u64,
    pub peak_load: f64,
    pub peak_blink_rate: f64,
    pub zone_time: ZoneTime,
    pub alerts: u64,
    pub toasts: u64,
    pub interventions_started: u64,
    pub interventions_succeeded: u64,
    pub interventions_failed: u64,
    /// Interventions lost to worker backpressure or shutdown
    pub interventions_dropped: u64,
    pub posture_fixes: u64,
    #[serde(skip)]
    last_fused_ts: Option<f64>,
}

impl SessionStats {
    pub fn record_update(&mut self, update: &FusedUpdate) {
        self.frames_processed += 1;
        if update.blink_detected {
            self.blinks += 1;
        }
        if update.total() > self.peak_load {
            self.peak_load = update.total();
        }
        if update.blink_rate.is_finite() && update.blink_rate > self.peak_blink_rate {
            self.peak_blink_rate = update.blink_rate;
        }
        if let Some(last) = self.last_fused_ts {
            let delta = update.timestamp - last;
            if delta > 0.0 {
                self.zone_time.add(update.zone, delta);
            }
        }
        self.last_fused_ts = Some(update.timestamp);
    }

    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::NoFace => self.skipped_no_face += 1,
            SkipReason::NoBreathing => self.skipped_no_breathing += 1,
            SkipReason::NonMonotonic => self.skipped_non_monotonic += 1,
        }
    }

    pub fn frames_skipped(&self) -> u64 {
        self.skipped_no_face + self.skipped_no_breathing + self.skipped_non_monotonic
    }

    /// Zone time as fractions of the tracked time, `None` before any time accrued
    pub fn zone_shares(&self) -> Option<ZoneTime> {
        let total = self.zone_time.total();
        if total <= 0.0 {
            return None;
        }
        Some(ZoneTime {
            deep_flow: self.zone_time.deep_flow / total,
            normal: self.zone_time.normal / total,
            brain_fried: self.zone_time.brain_fried / total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LoadComponents;
    use chrono::Utc;

    fn update(timestamp: f64, total: f64, zone: Zone, blink_rate: f64) -> FusedUpdate {
        FusedUpdate {
            timestamp,
            recorded_at: Utc::now(),
            blink_rate,
            breathing_rate: 16.0,
            head_forward: false,
            components: LoadComponents {
                total,
                ..LoadComponents::default()
            },
            zone,
            blink_detected: timestamp as u64 % 2 == 0,
        }
    }

    #[test]
    fn test_peaks_and_counts() {
        let mut stats = SessionStats::default();
        stats.record_update(&update(0.0, 20.0, Zone::DeepFlow, 12.0));
        stats.record_update(&update(1.0, 80.0, Zone::BrainFried, 36.0));
        stats.record_update(&update(2.0, 50.0, Zone::Normal, 20.0));

        assert_eq!(stats.frames_processed, 3);
        assert_eq!(stats.blinks, 2);
        assert_eq!(stats.peak_load, 80.0);
        assert_eq!(stats.peak_blink_rate, 36.0);
    }

    #[test]
    fn test_zone_time_uses_later_zone() {
        let mut stats = SessionStats::default();
        stats.record_update(&update(0.0, 20.0, Zone::DeepFlow, 12.0));
        stats.record_update(&update(2.0, 50.0, Zone::Normal, 12.0));
        stats.record_update(&update(3.0, 80.0, Zone::BrainFried, 12.0));

        assert_eq!(stats.zone_time.deep_flow, 0.0);
        assert_eq!(stats.zone_time.normal, 2.0);
        assert_eq!(stats.zone_time.brain_fried, 1.0);

        let shares = stats.zone_shares().unwrap();
        assert!((shares.normal - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_shares_before_time_accrues() {
        let mut stats = SessionStats::default();
        assert!(stats.zone_shares().is_none());
        stats.record_update(&update(0.0, 20.0, Zone::DeepFlow, 12.0));
        assert!(stats.zone_shares().is_none());
    }

    #[test]
    fn test_skip_counters() {
        let mut stats = SessionStats::default();
        stats.record_skip(SkipReason::NoFace);
        stats.record_skip(SkipReason::NoFace);
        stats.record_skip(SkipReason::NonMonotonic);
        assert_eq!(stats.skipped_no_face, 2);
        assert_eq!(stats.frames_skipped(), 3);
    }
}
