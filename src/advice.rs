//! Contextual advice tips
//!
//! Short, fixed suggestions matched to the conditions currently raised. They
//! are independent of the rescue-plan generator and always available.

use crate::config::{RegulationConfig, ScoringConfig};
use crate::scoring::breathing_deviation;
use crate::types::{AlertTrigger, FusedUpdate, Zone};

const BRAIN_FRIED_TIPS: &[&str] = &[
    "Take a 2-minute deep-breathing break (4 s in, 7 s hold, 8 s out).",
    "Write down your current thought so you won't lose it, then step away.",
    "Drink a glass of water, dehydration amplifies cognitive fatigue.",
    "Switch to ambient or lo-fi music to reduce stress.",
    "Stand up and do a 60-second stretch or walk.",
];

const POSTURE_TIPS: &[&str] = &[
    "Move your screen to eye level to reduce forward lean.",
    "Sit back in your chair, your spine will thank you.",
    "Check that your monitor is an arm's length away.",
];

const EYE_STRAIN_TIPS: &[&str] = &[
    "Look at something 20 ft away for 20 seconds (20-20-20 rule).",
    "Reduce screen brightness or enable a blue-light filter.",
];

const BREATHING_TIPS: &[&str] = &[
    "Try box breathing: 4 s inhale, 4 s hold, 4 s exhale, 4 s hold.",
    "Slow nasal breathing helps reset your autonomic system.",
];

pub const HEALTHY_MESSAGE: &str = "All metrics are in a healthy range, keep it up!";

/// Tips for a set of raised conditions, one per category.
///
/// `rotation` picks which tip of each category is shown; passing a slowly
/// increasing counter (e.g. whole seconds) cycles through them.
pub fn advice_for(triggers: &[AlertTrigger], rotation: u64) -> Vec<&'static str> {
    let pick = |tips: &'static [&'static str]| tips[(rotation % tips.len() as u64) as usize];

    let mut advice = Vec::new();
    if triggers.contains(&AlertTrigger::LoadCritical) {
        advice.push(pick(BRAIN_FRIED_TIPS));
    }
    if triggers.contains(&AlertTrigger::PostureForward) {
        advice.push(pick(POSTURE_TIPS));
    }
    if triggers.contains(&AlertTrigger::BlinkHigh) {
        advice.push(pick(EYE_STRAIN_TIPS));
    }
    if triggers.contains(&AlertTrigger::BreathingAbnormal) {
        advice.push(pick(BREATHING_TIPS));
    }
    if advice.is_empty() {
        advice.push(HEALTHY_MESSAGE);
    }
    advice
}

/// Tips for a fused update under the default thresholds
pub fn current_advice(update: &FusedUpdate, rotation: u64) -> Vec<&'static str> {
    let regulation = RegulationConfig::default();
    let scoring = ScoringConfig::default();

    let mut triggers = Vec::new();
    if update.zone == Zone::BrainFried {
        triggers.push(AlertTrigger::LoadCritical);
    }
    if update.head_forward {
        triggers.push(AlertTrigger::PostureForward);
    }
    if update.blink_rate > regulation.blink_rate_critical {
        triggers.push(AlertTrigger::BlinkHigh);
    }
    if !update.breathing_rate.is_finite()
        || breathing_deviation(update.breathing_rate, scoring.breathing_normal_range) > 0.0
    {
        triggers.push(AlertTrigger::BreathingAbnormal);
    }
    advice_for(&triggers, rotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LoadComponents;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn update(zone: Zone, blink_rate: f64, head_forward: bool, breathing_rate: f64) -> FusedUpdate {
        FusedUpdate {
            timestamp: 0.0,
            recorded_at: Utc::now(),
            blink_rate,
            breathing_rate,
            head_forward,
            components: LoadComponents::default(),
            zone,
            blink_detected: false,
        }
    }

    #[test]
    fn test_healthy_state() {
        let advice = current_advice(&update(Zone::DeepFlow, 12.0, false, 16.0), 0);
        assert_eq!(advice, vec![HEALTHY_MESSAGE]);
    }

    #[test]
    fn test_one_tip_per_condition_in_fixed_order() {
        let advice = current_advice(&update(Zone::BrainFried, 35.0, true, 28.0), 0);
        assert_eq!(
            advice,
            vec![
                BRAIN_FRIED_TIPS[0],
                POSTURE_TIPS[0],
                EYE_STRAIN_TIPS[0],
                BREATHING_TIPS[0]
            ]
        );
    }

    #[test]
    fn test_rotation_cycles_tips() {
        let triggers = [AlertTrigger::PostureForward];
        assert_eq!(advice_for(&triggers, 1), vec![POSTURE_TIPS[1]]);
        assert_eq!(advice_for(&triggers, 3), vec![POSTURE_TIPS[0]]);
        assert_eq!(advice_for(&triggers, u64::MAX), vec![POSTURE_TIPS[0]]);
    }

    #[test]
    fn test_normal_zone_alone_has_no_specific_tip() {
        let advice = advice_for(&[AlertTrigger::LoadWarning], 7);
        assert_eq!(advice, vec![HEALTHY_MESSAGE]);
    }
}
