//! Regulation controller
//!
//! Cooldown-governed state machine reacting to fused updates:
//! 1. Critical path: reserve the intervention cooldown and hand back a request
//!    for the worker while the zone is BrainFried
//! 2. Posture path: fire the posture automation while the head leans forward
//! 3. Alert edge detection on the banner category
//! 4. Toast gating on rising categories
//!
//! The controller never blocks and never talks to the slow collaborators
//! itself. Intervention results come back through [`RegulationController::on_outcome`].

use crate::collaborators::PostureAutomation;
use crate::config::{EngineConfig, RegulationConfig};
use crate::event_log::LogEvent;
use crate::intervention::{InterventionOutcome, InterventionRequest};
use crate::scoring::LoadScorer;
use crate::types::{
    Alert, AlertCategory, AlertSource, AlertTrigger, FusedUpdate, Recommendation, Toast, Zone,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Plan shown when no rescue plan could be generated
pub const FALLBACK_RESCUE_PLAN: &str =
    "- Take a 2 minute break\n- Write down your next small step\n- Resume with focus";

/// Controller state, also handed out read-only to the presentation layer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegulationState {
    pub last_intervention_ts: Option<f64>,
    pub last_posture_action_ts: Option<f64>,
    pub last_toast_ts: Option<f64>,
    pub active_alert_category: AlertCategory,
    /// Conditions behind the active category
    pub active_triggers: Vec<AlertTrigger>,
}

/// What the controller decided for one update
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegulationReport {
    /// Reserved intervention the caller must hand to the worker
    pub intervention: Option<InterventionRequest>,
    /// Whether the posture automation fired on this update
    pub posture_fix: bool,
    /// Alerts and toasts to append to the event log
    pub events: Vec<LogEvent>,
}

/// Cooldown-governed regulation state machine
pub struct RegulationController {
    config: RegulationConfig,
    zone_thresholds: [f64; 2],
    breathing_normal_range: [f64; 2],
    scorer: LoadScorer,
    automation: Arc<dyn PostureAutomation>,
    state: RegulationState,
    next_request_id: u64,
}

impl RegulationController {
    pub fn new(config: &EngineConfig, automation: Arc<dyn PostureAutomation>) -> Self {
        Self {
            config: config.regulation.clone(),
            zone_thresholds: config.zones.zone_thresholds,
            breathing_normal_range: config.scoring.breathing_normal_range,
            scorer: LoadScorer::new(config.scoring.clone()),
            automation,
            state: RegulationState::default(),
            next_request_id: 0,
        }
    }

    pub fn state(&self) -> &RegulationState {
        &self.state
    }

    /// Run the four regulation steps for one fused update
    pub fn on_update(&mut self, update: &FusedUpdate) -> RegulationReport {
        let now = update.timestamp;
        let mut report = RegulationReport::default();

        if update.zone == Zone::BrainFried
            && elapsed(
                self.state.last_intervention_ts,
                now,
                self.config.intervention_cooldown_seconds,
            )
        {
            // Reserve before dispatch so a slow worker can't cause a second start
            self.state.last_intervention_ts = Some(now);
            let request = InterventionRequest {
                id: self.next_request_id,
                timestamp: now,
                trigger_score: update.total(),
            };
            self.next_request_id += 1;
            info!(
                id = request.id,
                score = request.trigger_score,
                "starting intervention"
            );
            report.intervention = Some(request);
        }

        if update.head_forward
            && elapsed(
                self.state.last_posture_action_ts,
                now,
                self.config.posture_cooldown_seconds,
            )
        {
            self.automation.apply_posture_fix();
            self.state.last_posture_action_ts = Some(now);
            report.posture_fix = true;
        }

        let triggers = self.evaluate_triggers(update);
        let category = category_for(&triggers);
        let previous = self.state.active_alert_category;
        let previous_triggers = std::mem::replace(&mut self.state.active_triggers, triggers);
        self.state.active_alert_category = category;

        if category != previous {
            debug!(?previous, ?category, "alert category changed");
            if category != AlertCategory::None {
                report.events.push(LogEvent::Alert(Alert {
                    timestamp: now,
                    category,
                    source: AlertSource::CategoryChange,
                    triggers: self.state.active_triggers.clone(),
                    total_score: update.total(),
                    message: self.banner_message(update),
                }));
            }

            if category > previous
                && elapsed(
                    self.state.last_toast_ts,
                    now,
                    self.config.toast_cooldown_seconds,
                )
            {
                let mut fresh: Vec<AlertTrigger> = self
                    .state
                    .active_triggers
                    .iter()
                    .copied()
                    .filter(|t| !previous_triggers.contains(t))
                    .collect();
                if fresh.is_empty() {
                    fresh = self.state.active_triggers.clone();
                }
                report.events.push(LogEvent::Toast(Toast {
                    timestamp: now,
                    category,
                    messages: fresh
                        .iter()
                        .map(|t| toast_message(*t, update, self.zone_thresholds[1]))
                        .collect(),
                }));
                self.state.last_toast_ts = Some(now);
            }
        }

        report
    }

    /// Turn a finished intervention into log events stamped at `now`, the
    /// frame time at which the result was collected.
    ///
    /// Success yields a recommendation plus a Critical alert carrying the plan.
    /// Failure yields a Critical alert carrying the fallback plan and a warning
    /// naming the cause.
    pub fn on_outcome(&self, outcome: &InterventionOutcome, now: f64) -> Vec<LogEvent> {
        let request = outcome.request;
        match &outcome.result {
            Ok(plan) => {
                info!(id = request.id, "intervention produced a rescue plan");
                vec![
                    LogEvent::Recommendation(Recommendation {
                        timestamp: now,
                        triggered_at: request.timestamp,
                        trigger_score: request.trigger_score,
                        text: plan.clone(),
                    }),
                    LogEvent::Alert(Alert {
                        timestamp: now,
                        category: AlertCategory::Critical,
                        source: AlertSource::Intervention,
                        triggers: vec![AlertTrigger::LoadCritical],
                        total_score: request.trigger_score,
                        message: format!(
                            "High cognitive load detected. Here is a quick rescue plan:\n{}",
                            plan
                        ),
                    }),
                ]
            }
            Err(failure) => {
                warn!(id = request.id, %failure, "intervention failed, using fallback plan");
                vec![
                    LogEvent::Alert(Alert {
                        timestamp: now,
                        category: AlertCategory::Critical,
                        source: AlertSource::Intervention,
                        triggers: vec![AlertTrigger::LoadCritical],
                        total_score: request.trigger_score,
                        message: format!(
                            "High cognitive load detected. Here is a quick rescue plan:\n{}",
                            FALLBACK_RESCUE_PLAN
                        ),
                    }),
                    LogEvent::Warning {
                        timestamp: now,
                        cause: failure.to_string(),
                    },
                ]
            }
        }
    }

    fn evaluate_triggers(&self, update: &FusedUpdate) -> Vec<AlertTrigger> {
        let mut triggers = Vec::new();
        match update.zone {
            Zone::BrainFried => triggers.push(AlertTrigger::LoadCritical),
            Zone::Normal => triggers.push(AlertTrigger::LoadWarning),
            Zone::DeepFlow => {}
        }
        // NaN never compares greater, so a broken rate cannot raise this trigger
        if update.blink_rate > self.config.blink_rate_critical {
            triggers.push(AlertTrigger::BlinkHigh);
        }
        if self.scorer.breathing_abnormal(update.breathing_rate) {
            triggers.push(AlertTrigger::BreathingAbnormal);
        }
        if update.head_forward {
            triggers.push(AlertTrigger::PostureForward);
        }
        triggers
    }

    fn banner_message(&self, update: &FusedUpdate) -> String {
        let [normal_from, fried_from] = self.zone_thresholds;
        let [low, high] = self.breathing_normal_range;
        self.state
            .active_triggers
            .iter()
            .map(|trigger| match trigger {
                AlertTrigger::LoadCritical => format!(
                    "CRITICAL: Cognitive load is {:.1} (threshold: {}). Take a break or simplify your current task.",
                    update.total(),
                    fried_from
                ),
                AlertTrigger::LoadWarning => format!(
                    "WARNING: Cognitive load is {:.1} (threshold: {}). Monitor your pace.",
                    update.total(),
                    normal_from
                ),
                AlertTrigger::BlinkHigh => format!(
                    "ALERT: Blink rate is {:.0}/min (limit: {}). Eye strain detected, look away from the screen.",
                    update.blink_rate, self.config.blink_rate_critical
                ),
                AlertTrigger::BreathingAbnormal => format!(
                    "WARNING: Breathing rate is {:.1} bpm (normal: {}-{}). Try slow, controlled breathing.",
                    update.breathing_rate, low, high
                ),
                AlertTrigger::PostureForward => {
                    "WARNING: Forward head posture detected. Sit back and align your screen to eye level."
                        .to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::fmt::Debug for RegulationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegulationController")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Banner category implied by a set of triggers
pub fn category_for(triggers: &[AlertTrigger]) -> AlertCategory {
    let critical = triggers
        .iter()
        .any(|t| matches!(t, AlertTrigger::LoadCritical | AlertTrigger::BlinkHigh));
    if critical {
        AlertCategory::Critical
    } else if triggers.is_empty() {
        AlertCategory::None
    } else {
        AlertCategory::Warning
    }
}

fn toast_message(trigger: AlertTrigger, update: &FusedUpdate, critical_from: f64) -> String {
    match trigger {
        AlertTrigger::LoadCritical => format!(
            "Cognitive load exceeded {} ({:.0})",
            critical_from,
            update.total()
        ),
        AlertTrigger::LoadWarning => format!("Cognitive load rising ({:.0})", update.total()),
        AlertTrigger::BlinkHigh => format!("High blink rate: {:.0}/min", update.blink_rate),
        AlertTrigger::BreathingAbnormal => {
            format!("Breathing abnormal: {:.1} bpm", update.breathing_rate)
        }
        AlertTrigger::PostureForward => "Poor posture: head leaning forward".to_string(),
    }
}

/// Whether `cooldown` seconds have passed since `last` (or nothing happened yet)
fn elapsed(last: Option<f64>, now: f64, cooldown: f64) -> bool {
    last.map_or(true, |last| now - last >= cooldown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::LoggingAutomation;
    use crate::error::CollaboratorError;
    use crate::intervention::{InterventionFailure, InterventionStage};
    use crate::zone::ZoneClassifier;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn update(
        timestamp: f64,
        blink_rate: f64,
        head_forward: bool,
        breathing_rate: f64,
    ) -> FusedUpdate {
        let components = LoadScorer::default().score(blink_rate, head_forward, breathing_rate);
        FusedUpdate {
            timestamp,
            recorded_at: Utc::now(),
            blink_rate,
            breathing_rate,
            head_forward,
            components,
            zone: ZoneClassifier::default().classify(components.total),
            blink_detected: false,
        }
    }

    fn brain_fried(timestamp: f64) -> FusedUpdate {
        update(timestamp, 35.0, true, 28.0)
    }

    fn calm(timestamp: f64) -> FusedUpdate {
        update(timestamp, 12.0, false, 16.0)
    }

    fn controller() -> (RegulationController, Arc<LoggingAutomation>) {
        let automation = Arc::new(LoggingAutomation::default());
        let controller = RegulationController::new(&EngineConfig::default(), automation.clone());
        (controller, automation)
    }

    fn alerts(events: &[LogEvent]) -> Vec<&Alert> {
        events
            .iter()
            .filter_map(|e| match e {
                LogEvent::Alert(alert) => Some(alert),
                _ => None,
            })
            .collect()
    }

    fn toasts(events: &[LogEvent]) -> Vec<&Toast> {
        events
            .iter()
            .filter_map(|e| match e {
                LogEvent::Toast(toast) => Some(toast),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_intervention_cooldown() {
        let (mut controller, _) = controller();

        let first = controller.on_update(&brain_fried(0.0));
        let second = controller.on_update(&brain_fried(5.0));
        let third = controller.on_update(&brain_fried(11.0));

        assert_eq!(first.intervention.map(|r| r.id), Some(0));
        assert!(second.intervention.is_none());
        assert_eq!(third.intervention.map(|r| r.id), Some(1));
        assert_eq!(controller.state().last_intervention_ts, Some(11.0));
    }

    #[test]
    fn test_brain_fried_scenario_dispatches_once() {
        let (mut controller, automation) = controller();

        let update = brain_fried(100.0);
        assert!((update.total() - 91.666_666).abs() < 1e-3);
        assert_eq!(update.zone, Zone::BrainFried);

        let report = controller.on_update(&update);
        let request = report.intervention.unwrap();
        assert!((request.trigger_score - update.total()).abs() < 1e-9);
        assert!(report.posture_fix);

        let mut repeat = update.clone();
        repeat.timestamp = 103.0;
        let report = controller.on_update(&repeat);
        assert!(report.intervention.is_none());
        assert!(!report.posture_fix);
        assert!(report.events.is_empty());
        assert_eq!(automation.fired(), 1);
    }

    #[test]
    fn test_alerts_are_edge_triggered() {
        let (mut controller, _) = controller();

        let report = controller.on_update(&brain_fried(0.0));
        let emitted = alerts(&report.events);
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].category, AlertCategory::Critical);
        assert_eq!(emitted[0].source, AlertSource::CategoryChange);
        assert!(emitted[0].triggers.contains(&AlertTrigger::LoadCritical));
        assert!(emitted[0].message.starts_with("CRITICAL: Cognitive load is 91.7"));

        // Same category on later frames: nothing new
        for t in 1..5 {
            let report = controller.on_update(&brain_fried(t as f64));
            assert!(alerts(&report.events).is_empty());
        }

        // Drop to a calm state: category clears silently
        let report = controller.on_update(&calm(6.0));
        assert!(report.events.is_empty());
        assert_eq!(controller.state().active_alert_category, AlertCategory::None);
        assert!(controller.state().active_triggers.is_empty());
    }

    #[test]
    fn test_downgrade_emits_warning_alert_without_toast() {
        let (mut controller, _) = controller();
        controller.on_update(&brain_fried(0.0));

        // blink 30, forward, breathing 22 lands in Normal
        let report = controller.on_update(&update(20.0, 30.0, true, 22.0));
        let emitted = alerts(&report.events);
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].category, AlertCategory::Warning);
        assert!(toasts(&report.events).is_empty());
    }

    #[test]
    fn test_high_blink_rate_is_critical_outside_brain_fried() {
        let (mut controller, _) = controller();
        let update = update(0.0, 32.0, false, 16.0);
        assert_eq!(update.zone, Zone::Normal);

        let report = controller.on_update(&update);
        assert_eq!(controller.state().active_alert_category, AlertCategory::Critical);
        assert!(controller.state().active_triggers.contains(&AlertTrigger::BlinkHigh));
        assert!(report.intervention.is_none());
    }

    #[test]
    fn test_toast_cooldown() {
        let (mut controller, _) = controller();

        let report = controller.on_update(&update(0.0, 12.0, true, 16.0));
        let emitted = toasts(&report.events);
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].messages, vec!["Poor posture: head leaning forward"]);

        controller.on_update(&calm(1.0));

        // Rising again inside the toast cooldown: alert yes, toast no
        let report = controller.on_update(&update(2.0, 12.0, true, 16.0));
        assert_eq!(alerts(&report.events).len(), 1);
        assert!(toasts(&report.events).is_empty());

        controller.on_update(&calm(3.0));
        let report = controller.on_update(&update(6.0, 12.0, true, 16.0));
        assert_eq!(toasts(&report.events).len(), 1);
        assert_eq!(controller.state().last_toast_ts, Some(6.0));
    }

    #[test]
    fn test_toast_lists_new_triggers_only() {
        let (mut controller, _) = controller();
        controller.on_update(&update(0.0, 12.0, true, 16.0));

        let report = controller.on_update(&brain_fried(10.0));
        let emitted = toasts(&report.events);
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].category, AlertCategory::Critical);
        assert!(!emitted[0]
            .messages
            .contains(&"Poor posture: head leaning forward".to_string()));
        assert!(emitted[0].messages[0].starts_with("Cognitive load exceeded 70"));
    }

    #[test]
    fn test_toast_uses_configured_critical_threshold() {
        let mut config = EngineConfig::default();
        config.zones.zone_thresholds = [40.0, 65.0];
        let mut controller =
            RegulationController::new(&config, Arc::new(LoggingAutomation::default()));

        let report = controller.on_update(&brain_fried(0.0));
        let emitted = toasts(&report.events);
        assert_eq!(emitted.len(), 1);
        assert!(emitted[0].messages[0].starts_with("Cognitive load exceeded 65 ("));
        assert!(alerts(&report.events)[0].message.contains("(threshold: 65)"));
    }

    #[test]
    fn test_posture_cooldown() {
        let (mut controller, automation) = controller();
        let forward = |t: f64| update(t, 12.0, true, 16.0);

        assert!(controller.on_update(&forward(0.0)).posture_fix);
        assert!(!controller.on_update(&forward(9.9)).posture_fix);
        assert!(controller.on_update(&forward(10.0)).posture_fix);
        assert_eq!(automation.fired(), 2);
    }

    #[test]
    fn test_successful_outcome() {
        let (controller, _) = controller();
        let outcome = InterventionOutcome {
            request: InterventionRequest {
                id: 0,
                timestamp: 4.0,
                trigger_score: 88.0,
            },
            result: Ok("- Close the extra tabs".to_string()),
        };

        let events = controller.on_outcome(&outcome, 6.5);
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            LogEvent::Recommendation(Recommendation {
                timestamp: 6.5,
                triggered_at: 4.0,
                trigger_score: 88.0,
                text: "- Close the extra tabs".to_string(),
            })
        );
        let alert = alerts(&events)[0];
        assert_eq!(alert.source, AlertSource::Intervention);
        assert_eq!(alert.timestamp, 6.5);
        assert!(alert.message.ends_with("- Close the extra tabs"));
    }

    #[test]
    fn test_failed_outcome_uses_fallback_plan() {
        let (controller, _) = controller();
        let outcome = InterventionOutcome {
            request: InterventionRequest {
                id: 3,
                timestamp: 9.0,
                trigger_score: 75.0,
            },
            result: Err(InterventionFailure {
                stage: InterventionStage::RescuePlan,
                error: CollaboratorError::Timeout(20_000),
            }),
        };

        let events = controller.on_outcome(&outcome, 12.0);
        assert!(events.iter().all(|e| e.timestamp() == 12.0));
        assert!(!events
            .iter()
            .any(|e| matches!(e, LogEvent::Recommendation(_))));
        let alert = alerts(&events)[0];
        assert_eq!(alert.category, AlertCategory::Critical);
        assert!(alert.message.contains(FALLBACK_RESCUE_PLAN));
        match &events[1] {
            LogEvent::Warning { cause, .. } => assert!(cause.contains("timed out")),
            other => panic!("expected warning, got {:?}", other),
        }
    }

    #[test]
    fn test_category_for() {
        assert_eq!(category_for(&[]), AlertCategory::None);
        assert_eq!(
            category_for(&[AlertTrigger::PostureForward]),
            AlertCategory::Warning
        );
        assert_eq!(
            category_for(&[AlertTrigger::LoadWarning, AlertTrigger::BlinkHigh]),
            AlertCategory::Critical
        );
    }

    #[test]
    fn test_state_serializes_for_presentation() {
        let (mut controller, _) = controller();
        controller.on_update(&brain_fried(1.0));
        let json = serde_json::to_value(controller.state()).unwrap();
        assert_eq!(json["active_alert_category"], "critical");
        assert_eq!(json["last_intervention_ts"], 1.0);
    }

    #[test]
    fn test_calm_update_is_quiet() {
        let (mut controller, _) = controller();
        let report = controller.on_update(&calm(0.0));
        assert!(report.events.is_empty());
        assert!(report.intervention.is_none());
    }
}
