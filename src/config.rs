//! Engine configuration
//!
//! Every tunable threshold, weight, cooldown and capacity lives here. The
//! configuration round-trips through JSON, and any option left out of a JSON
//! document falls back to its default.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Nominal frame cadence of the tick loop (Hz)
pub const DEFAULT_TICK_HZ: f64 = 12.5;

/// History retention window the default capacity is sized for (seconds)
pub const DEFAULT_HISTORY_RETENTION_SECONDS: f64 = 600.0;

/// Blink detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// EAR below which an open eye is considered closed
    pub closed_threshold: f64,
    /// EAR above which a closed eye is considered open again
    pub open_threshold: f64,
    /// Trailing window for the blink rate (seconds)
    pub window_seconds: f64,
    /// Smallest elapsed time used for the startup rate correction (seconds).
    ///
    /// The rate divides by `min(window, max(elapsed, floor))` rather than
    /// `min(window, elapsed)`, so during the first `floor` seconds it reads
    /// lower than the plain formula. Must be positive so the divisor is never 0.
    pub warmup_floor_seconds: f64,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            closed_threshold: 0.22,
            open_threshold: 0.25,
            window_seconds: 60.0,
            warmup_floor_seconds: 5.0,
        }
    }
}

/// Head posture parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostureConfig {
    /// Nose depth below which the head counts as leaning forward
    pub forward_threshold: f64,
    /// Consecutive forward samples required before reporting a lean (1 = none)
    pub debounce_frames: u32,
}

impl Default for PostureConfig {
    fn default() -> Self {
        Self {
            forward_threshold: -0.08,
            debounce_frames: 1,
        }
    }
}

/// Maximum contribution of each component to the total score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub blink: f64,
    pub posture: f64,
    pub breathing: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            blink: 50.0,
            posture: 20.0,
            breathing: 30.0,
        }
    }
}

/// Load scoring parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub score_weights: ScoreWeights,
    /// Blink rate at or below which the blink component is zero (per minute)
    pub blink_rate_floor: f64,
    /// Blink rate at or above which the blink component saturates (per minute)
    pub blink_rate_ceiling: f64,
    /// Healthy breathing band, inclusive (breaths per minute)
    pub breathing_normal_range: [f64; 2],
    /// Deviation from the band at which the breathing component saturates
    pub breathing_deviation_span: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            score_weights: ScoreWeights::default(),
            blink_rate_floor: 10.0,
            blink_rate_ceiling: 40.0,
            breathing_normal_range: [12.0, 20.0],
            breathing_deviation_span: 8.0,
        }
    }
}

/// Zone boundaries on the total score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// `[normal_from, brain_fried_from]`, both lower bounds inclusive
    pub zone_thresholds: [f64; 2],
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            zone_thresholds: [35.0, 70.0],
        }
    }
}

/// Regulation controller parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegulationConfig {
    pub intervention_cooldown_seconds: f64,
    pub posture_cooldown_seconds: f64,
    pub toast_cooldown_seconds: f64,
    /// Upper bound for the screen-context extractor (seconds)
    pub extractor_timeout_seconds: f64,
    /// Upper bound handed to the rescue-plan generator (seconds)
    pub generator_timeout_seconds: f64,
    /// Blink rate above which the alert category becomes Critical
    pub blink_rate_critical: f64,
}

impl Default for RegulationConfig {
    fn default() -> Self {
        Self {
            intervention_cooldown_seconds: 10.0,
            posture_cooldown_seconds: 10.0,
            toast_cooldown_seconds: 5.0,
            extractor_timeout_seconds: 5.0,
            generator_timeout_seconds: 20.0,
            blink_rate_critical: 30.0,
        }
    }
}

/// In-memory retention limits and input-gap tolerance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Ring buffer capacity for history entries (one per fused tick)
    pub history_capacity: usize,
    /// Maximum number of event log entries kept
    pub event_log_capacity: usize,
    /// Consecutive no-face frames before the session zone becomes Unknown
    pub max_face_misses: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            history_capacity: Self::capacity_for(DEFAULT_HISTORY_RETENTION_SECONDS, DEFAULT_TICK_HZ),
            event_log_capacity: 200,
            max_face_misses: 25,
        }
    }
}

impl RetentionConfig {
    /// History capacity covering `retention_seconds` at `tick_hz` fused updates per second
    pub fn capacity_for(retention_seconds: f64, tick_hz: f64) -> usize {
        (retention_seconds * tick_hz).ceil().max(1.0) as usize
    }
}

/// Full engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub blink: BlinkConfig,
    pub posture: PostureConfig,
    pub scoring: ScoringConfig,
    pub zones: ZoneConfig,
    pub regulation: RegulationConfig,
    pub retention: RetentionConfig,
}

impl EngineConfig {
    /// Shorter cooldowns and a tighter breathing band
    pub fn strict() -> Self {
        let mut config = Self::default();
        config.scoring.breathing_normal_range = [13.0, 18.0];
        config.regulation.intervention_cooldown_seconds = 5.0;
        config.regulation.toast_cooldown_seconds = 3.0;
        config
    }

    /// Longer cooldowns and posture debouncing for noisy cameras
    pub fn lenient() -> Self {
        let mut config = Self::default();
        config.posture.debounce_frames = 6;
        config.regulation.intervention_cooldown_seconds = 30.0;
        config.regulation.posture_cooldown_seconds = 30.0;
        config.regulation.toast_cooldown_seconds = 10.0;
        config.retention.max_face_misses = 50;
        config
    }

    /// Check internal consistency of all options
    pub fn validate(&self) -> Result<(), EngineError> {
        let b = &self.blink;
        require_finite("blink.closed_threshold", b.closed_threshold)?;
        require_finite("blink.open_threshold", b.open_threshold)?;
        if b.closed_threshold >= b.open_threshold {
            return Err(EngineError::InvalidConfig(format!(
                "blink.closed_threshold ({}) must be below blink.open_threshold ({})",
                b.closed_threshold, b.open_threshold
            )));
        }
        require_positive("blink.window_seconds", b.window_seconds)?;
        require_positive("blink.warmup_floor_seconds", b.warmup_floor_seconds)?;
        if b.warmup_floor_seconds > b.window_seconds {
            return Err(EngineError::InvalidConfig(
                "blink.warmup_floor_seconds must not exceed blink.window_seconds".to_string(),
            ));
        }

        require_finite("posture.forward_threshold", self.posture.forward_threshold)?;
        if self.posture.debounce_frames == 0 {
            return Err(EngineError::InvalidConfig(
                "posture.debounce_frames must be at least 1".to_string(),
            ));
        }

        let s = &self.scoring;
        require_non_negative("scoring.score_weights.blink", s.score_weights.blink)?;
        require_non_negative("scoring.score_weights.posture", s.score_weights.posture)?;
        require_non_negative("scoring.score_weights.breathing", s.score_weights.breathing)?;
        require_finite("scoring.blink_rate_floor", s.blink_rate_floor)?;
        require_finite("scoring.blink_rate_ceiling", s.blink_rate_ceiling)?;
        if s.blink_rate_floor >= s.blink_rate_ceiling {
            return Err(EngineError::InvalidConfig(
                "scoring.blink_rate_floor must be below scoring.blink_rate_ceiling".to_string(),
            ));
        }
        let [low, high] = s.breathing_normal_range;
        require_finite("scoring.breathing_normal_range[0]", low)?;
        require_finite("scoring.breathing_normal_range[1]", high)?;
        if low > high {
            return Err(EngineError::InvalidConfig(format!(
                "scoring.breathing_normal_range is inverted: [{}, {}]",
                low, high
            )));
        }
        require_positive("scoring.breathing_deviation_span", s.breathing_deviation_span)?;

        let [normal_from, fried_from] = self.zones.zone_thresholds;
        require_finite("zones.zone_thresholds[0]", normal_from)?;
        require_finite("zones.zone_thresholds[1]", fried_from)?;
        if !(0.0 < normal_from && normal_from < fried_from && fried_from <= 100.0) {
            return Err(EngineError::InvalidConfig(format!(
                "zones.zone_thresholds must satisfy 0 < normal < brain_fried <= 100, got [{}, {}]",
                normal_from, fried_from
            )));
        }

        let r = &self.regulation;
        require_non_negative("regulation.intervention_cooldown_seconds", r.intervention_cooldown_seconds)?;
        require_non_negative("regulation.posture_cooldown_seconds", r.posture_cooldown_seconds)?;
        require_non_negative("regulation.toast_cooldown_seconds", r.toast_cooldown_seconds)?;
        require_positive("regulation.extractor_timeout_seconds", r.extractor_timeout_seconds)?;
        require_positive("regulation.generator_timeout_seconds", r.generator_timeout_seconds)?;
        require_finite("regulation.blink_rate_critical", r.blink_rate_critical)?;

        let t = &self.retention;
        if t.history_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "retention.history_capacity must be at least 1".to_string(),
            ));
        }
        if t.event_log_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "retention.event_log_capacity must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from JSON; missing options take their defaults
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to pretty JSON
    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn require_finite(name: &str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!("{} must be finite", name)))
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!("{} must be positive", name)))
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!("{} must be non-negative", name)))
    }
}
