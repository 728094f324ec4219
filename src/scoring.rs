//! Cognitive load scoring
//!
//! Fuses blink rate, head posture and breathing rate into three bounded
//! component scores and a clamped total:
//! - Blink: linear between the rate floor and ceiling, saturating at both ends
//! - Posture: fixed penalty while the head leans forward
//! - Breathing: grows with the distance from the healthy band
//!
//! Non-finite inputs never reach the arithmetic. They score as the worst case
//! of their component so that a broken sensor cannot hide a high load.

use crate::config::ScoringConfig;
use crate::types::LoadComponents;
use tracing::warn;

/// Scorer for fusing biometric proxies into a load score
#[derive(Debug, Clone, Default)]
pub struct LoadScorer {
    config: ScoringConfig,
}

impl LoadScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score one set of inputs
    pub fn score(&self, blink_rate: f64, head_forward: bool, breathing_rate: f64) -> LoadComponents {
        let blink_score = self.blink_component(blink_rate);
        let posture_score = self.posture_component(head_forward);
        let breathing_score = self.breathing_component(breathing_rate);

        LoadComponents {
            blink_score,
            posture_score,
            breathing_score,
            total: (blink_score + posture_score + breathing_score).clamp(0.0, 100.0),
        }
    }

    /// Blink contribution in `[0, weight]`
    pub fn blink_component(&self, blink_rate: f64) -> f64 {
        let weight = self.config.score_weights.blink;
        if !blink_rate.is_finite() {
            warn!(blink_rate, "non-finite blink rate scored as worst case");
            return weight;
        }
        let floor = self.config.blink_rate_floor;
        let span = self.config.blink_rate_ceiling - floor;
        clamp01((blink_rate - floor) / span) * weight
    }

    /// Posture contribution, either zero or the full weight
    pub fn posture_component(&self, head_forward: bool) -> f64 {
        if head_forward {
            self.config.score_weights.posture
        } else {
            0.0
        }
    }

    /// Breathing contribution in `[0, weight]`
    pub fn breathing_component(&self, breathing_rate: f64) -> f64 {
        let weight = self.config.score_weights.breathing;
        if !breathing_rate.is_finite() {
            warn!(breathing_rate, "non-finite breathing rate scored as worst case");
            return weight;
        }
        let deviation = breathing_deviation(breathing_rate, self.config.breathing_normal_range);
        clamp01(deviation / self.config.breathing_deviation_span) * weight
    }

    /// Whether a breathing rate lies outside the healthy band
    pub fn breathing_abnormal(&self, breathing_rate: f64) -> bool {
        !breathing_rate.is_finite()
            || breathing_deviation(breathing_rate, self.config.breathing_normal_range) > 0.0
    }
}

/// Distance from the nearer edge of `[low, high]`, zero inside the band
pub fn breathing_deviation(breathing_rate: f64, [low, high]: [f64; 2]) -> f64 {
    (low - breathing_rate).max(breathing_rate - high).max(0.0)
}

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_blink_component_anchors() {
        let scorer = LoadScorer::default();
        assert_eq!(scorer.blink_component(0.0), 0.0);
        assert_eq!(scorer.blink_component(10.0), 0.0);
        assert!(approx(scorer.blink_component(25.0), 25.0));
        assert_eq!(scorer.blink_component(40.0), 50.0);
        assert_eq!(scorer.blink_component(90.0), 50.0);
    }

    #[test]
    fn test_breathing_component_anchors() {
        let scorer = LoadScorer::default();
        for rate in [12.0, 14.5, 16.0, 20.0] {
            assert_eq!(scorer.breathing_component(rate), 0.0);
        }
        assert!(approx(scorer.breathing_component(22.0), 7.5));
        assert!(approx(scorer.breathing_component(8.0), 15.0));
        assert_eq!(scorer.breathing_component(28.0), 30.0);
        assert_eq!(scorer.breathing_component(4.0), 30.0);
        assert_eq!(scorer.breathing_component(40.0), 30.0);
    }

    #[test]
    fn test_moderate_load_lands_mid_range() {
        // blink 30/min, leaning forward, breathing 22/min
        let components = LoadScorer::default().score(30.0, true, 22.0);
        assert!(approx(components.blink_score, 100.0 / 3.0));
        assert_eq!(components.posture_score, 20.0);
        assert!(approx(components.breathing_score, 7.5));
        assert!(approx(components.total, 100.0 / 3.0 + 27.5));
    }

    #[test]
    fn test_calm_inputs_score_zero() {
        let components = LoadScorer::default().score(12.0, false, 16.0);
        assert_eq!(components.total, 0.0);
    }

    #[test]
    fn test_high_load_components() {
        let components = LoadScorer::default().score(35.0, true, 28.0);
        assert!(approx(components.blink_score, 125.0 / 3.0));
        assert_eq!(components.posture_score, 20.0);
        assert_eq!(components.breathing_score, 30.0);
        assert!(approx(components.total, 125.0 / 3.0 + 50.0));
        assert!(components.total < 100.0);
    }

    #[test]
    fn test_total_is_clamped_when_weights_exceed_100() {
        let mut config = ScoringConfig::default();
        config.score_weights.blink = 80.0;
        let components = LoadScorer::new(config).score(60.0, true, 40.0);
        assert_eq!(components.total, 100.0);
    }

    #[test]
    fn test_non_finite_inputs_score_worst_case() {
        let scorer = LoadScorer::default();
        assert_eq!(scorer.blink_component(f64::NAN), 50.0);
        assert_eq!(scorer.blink_component(f64::NEG_INFINITY), 50.0);
        assert_eq!(scorer.breathing_component(f64::NAN), 30.0);
        assert_eq!(scorer.breathing_component(f64::INFINITY), 30.0);

        let components = scorer.score(f64::NAN, false, f64::NAN);
        assert_eq!(components.total, 80.0);
        assert!(components.total.is_finite());
        assert!(scorer.breathing_abnormal(f64::NAN));
    }

    proptest! {
        #[test]
        fn prop_blink_component_monotonic_and_bounded(a in -100.0f64..200.0, b in -100.0f64..200.0) {
            let scorer = LoadScorer::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let s_lo = scorer.blink_component(lo);
            let s_hi = scorer.blink_component(hi);
            prop_assert!(s_lo <= s_hi);
            prop_assert!((0.0..=50.0).contains(&s_lo));
            prop_assert!((0.0..=50.0).contains(&s_hi));
        }

        #[test]
        fn prop_breathing_component_bounded(rate in -50.0f64..100.0) {
            let score = LoadScorer::default().breathing_component(rate);
            prop_assert!((0.0..=30.0).contains(&score));
            if (12.0..=20.0).contains(&rate) {
                prop_assert_eq!(score, 0.0);
            }
            if rate <= 4.0 || rate >= 28.0 {
                prop_assert_eq!(score, 30.0);
            }
        }

        #[test]
        fn prop_total_bounded(
            blink in prop::num::f64::ANY,
            forward in any::<bool>(),
            breathing in prop::num::f64::ANY,
        ) {
            let total = LoadScorer::default().score(blink, forward, breathing).total;
            prop_assert!(total.is_finite());
            prop_assert!((0.0..=100.0).contains(&total));
        }
    }
}
