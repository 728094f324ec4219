//! Zone classification
//!
//! Maps a total load score onto the three ordered operating bands using
//! half-open intervals: `[0, normal) → DeepFlow`, `[normal, fried) → Normal`,
//! `[fried, 100] → BrainFried`.

use crate::config::ZoneConfig;
use crate::types::Zone;

/// Pure score-to-zone mapping
#[derive(Debug, Clone, Default)]
pub struct ZoneClassifier {
    config: ZoneConfig,
}

impl ZoneClassifier {
    pub fn new(config: ZoneConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, total: f64) -> Zone {
        let [normal_from, fried_from] = self.config.zone_thresholds;
        if total >= fried_from {
            Zone::BrainFried
        } else if total >= normal_from {
            Zone::Normal
        } else {
            Zone::DeepFlow
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_open_boundaries() {
        let zones = ZoneClassifier::default();
        assert_eq!(zones.classify(0.0), Zone::DeepFlow);
        assert_eq!(zones.classify(34.999), Zone::DeepFlow);
        assert_eq!(zones.classify(35.0), Zone::Normal);
        assert_eq!(zones.classify(69.999), Zone::Normal);
        assert_eq!(zones.classify(70.0), Zone::BrainFried);
        assert_eq!(zones.classify(100.0), Zone::BrainFried);
    }

    #[test]
    fn test_zones_are_ordered() {
        assert!(Zone::DeepFlow < Zone::Normal);
        assert!(Zone::Normal < Zone::BrainFried);
    }

    #[test]
    fn test_custom_thresholds() {
        let zones = ZoneClassifier::new(ZoneConfig {
            zone_thresholds: [20.0, 50.0],
        });
        assert_eq!(zones.classify(19.9), Zone::DeepFlow);
        assert_eq!(zones.classify(20.0), Zone::Normal);
        assert_eq!(zones.classify(50.0), Zone::BrainFried);
    }
}
