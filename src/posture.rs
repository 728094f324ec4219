//! Head posture classification
//!
//! A head counts as leaning forward when the nose-tip depth drops below the
//! configured threshold. The classification itself is a single-sample decision;
//! `PostureClassifier::update` adds an optional consecutive-frame debounce.

use crate::config::PostureConfig;
use tracing::warn;

/// Forward-lean classifier
#[derive(Debug, Clone)]
pub struct PostureClassifier {
    config: PostureConfig,
    forward_streak: u32,
}

impl Default for PostureClassifier {
    fn default() -> Self {
        Self::new(PostureConfig::default())
    }
}

impl PostureClassifier {
    pub fn new(config: PostureConfig) -> Self {
        Self {
            config,
            forward_streak: 0,
        }
    }

    /// Single-sample decision, no state involved
    pub fn classify(&self, nose_depth: f64) -> bool {
        nose_depth < self.config.forward_threshold
    }

    /// Classify with debouncing: a lean is reported only after
    /// `debounce_frames` consecutive forward samples.
    pub fn update(&mut self, nose_depth: f64) -> bool {
        if !nose_depth.is_finite() {
            warn!(nose_depth, "non-finite nose depth treated as upright");
            self.forward_streak = 0;
            return false;
        }

        if self.classify(nose_depth) {
            self.forward_streak = self.forward_streak.saturating_add(1);
        } else {
            self.forward_streak = 0;
        }
        self.forward_streak >= self.config.debounce_frames.max(1)
    }

    pub fn reset(&mut self) {
        self.forward_streak = 0;
    }
}
