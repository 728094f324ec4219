//! Session orchestration
//!
//! This module provides the public API for Synheart CogLoad.
//! A [`MonitorSession`] owns the per-session engine state and runs the full
//! per-frame pipeline: blink detection and posture → load scoring → zone
//! classification → regulation → history and event log.
//!
//! The presentation layer never touches the session itself. It holds a
//! [`SessionView`] and pulls value snapshots from the shared stores.

use crate::advice::advice_for;
use crate::blink::BlinkDetector;
use crate::breathing::BreathingSource;
use crate::clock::SessionClock;
use crate::collaborators::Collaborators;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::event_log::{EventLog, LogEntry, LogEvent};
use crate::history::HistoryStore;
use crate::intervention::{
    DispatchError, InterventionOutcome, InterventionWorker, WorkerMetricsSnapshot, WorkerTimeouts,
};
use crate::posture::PostureClassifier;
use crate::regulation::{RegulationController, RegulationState};
use crate::scoring::LoadScorer;
use crate::stats::{SessionStats, SkipReason};
use crate::types::{
    FaceMetrics, FrameSample, FusedUpdate, HistoryEntry, Recommendation, SessionZone,
};
use crate::zone::ZoneClassifier;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// What happened to one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TickStatus {
    /// The frame produced a fused update
    Fused {
        update: FusedUpdate,
        posture_fix: bool,
        intervention_started: bool,
    },
    /// The frame was not fused; the last state is held
    Skipped {
        reason: SkipReason,
        consecutive_misses: u32,
    },
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickOutcome {
    pub timestamp: f64,
    /// Session-level zone after this tick
    pub zone: SessionZone,
    #[serde(flatten)]
    pub status: TickStatus,
    /// Log entries appended during this tick, including finished interventions
    pub events: Vec<LogEntry>,
}

impl TickOutcome {
    pub fn update(&self) -> Option<&FusedUpdate> {
        match &self.status {
            TickStatus::Fused { update, .. } => Some(update),
            TickStatus::Skipped { .. } => None,
        }
    }

    pub fn is_fused(&self) -> bool {
        self.update().is_some()
    }
}

/// Everything the presentation layer needs for one render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationSnapshot {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub zone: SessionZone,
    pub latest: Option<FusedUpdate>,
    pub history: Vec<HistoryEntry>,
    /// Most recent log entries, newest first
    pub events: Vec<LogEntry>,
    pub last_recommendation: Option<Recommendation>,
    pub regulation: RegulationState,
    pub stats: SessionStats,
    pub advice: Vec<String>,
}

/// Final report returned when a session stops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    /// Monotonic time between the first and the last accepted frame
    pub duration_seconds: f64,
    pub final_zone: SessionZone,
    pub stats: SessionStats,
    pub worker: WorkerMetricsSnapshot,
    pub history_len: usize,
    /// Fused snapshots ever written, including ones the ring overwrote
    pub history_appended: u64,
    pub event_log_len: usize,
    /// Log entries ever written, including evicted ones
    pub events_appended: u64,
}

#[derive(Debug, Default)]
struct LiveState {
    zone: SessionZone,
    latest: Option<FusedUpdate>,
    regulation: RegulationState,
    stats: SessionStats,
}

#[derive(Debug)]
struct Shared {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    history: HistoryStore,
    events: EventLog,
    live: RwLock<LiveState>,
}

/// Read-only handle for presentation consumers, cheap to clone and share
#[derive(Debug, Clone)]
pub struct SessionView {
    shared: Arc<Shared>,
}

impl SessionView {
    pub fn session_id(&self) -> Uuid {
        self.shared.session_id
    }

    pub fn zone(&self) -> SessionZone {
        self.shared.live.read().zone
    }

    pub fn latest(&self) -> Option<FusedUpdate> {
        self.shared.live.read().latest.clone()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.shared.history.snapshot()
    }

    /// The `n` most recent log entries, newest first
    pub fn events(&self, n: usize) -> Vec<LogEntry> {
        self.shared.events.tail(n)
    }

    pub fn regulation(&self) -> RegulationState {
        self.shared.live.read().regulation.clone()
    }

    pub fn stats(&self) -> SessionStats {
        self.shared.live.read().stats.clone()
    }

    /// Full value snapshot with the `tail_n` most recent log entries
    pub fn snapshot(&self, tail_n: usize) -> PresentationSnapshot {
        let (zone, latest, regulation, stats) = {
            let live = self.shared.live.read();
            (
                live.zone,
                live.latest.clone(),
                live.regulation.clone(),
                live.stats.clone(),
            )
        };
        let rotation = latest.as_ref().map_or(0, |u| u.timestamp.max(0.0) as u64);
        let advice = advice_for(&regulation.active_triggers, rotation)
            .into_iter()
            .map(str::to_string)
            .collect();

        PresentationSnapshot {
            session_id: self.shared.session_id,
            started_at: self.shared.started_at,
            zone,
            latest,
            history: self.shared.history.snapshot(),
            events: self.shared.events.tail(tail_n),
            last_recommendation: self.shared.events.last_recommendation(),
            regulation,
            stats,
            advice,
        }
    }
}

/// One monitoring session: per-frame fusion plus regulation.
///
/// `tick` is synchronous and never waits on collaborators; interventions run
/// on the session's worker thread and their results are picked up on later
/// ticks.
pub struct MonitorSession {
    config: EngineConfig,
    blink: BlinkDetector,
    posture: PostureClassifier,
    scorer: LoadScorer,
    zones: ZoneClassifier,
    regulation: RegulationController,
    worker: InterventionWorker,
    clock: SessionClock,
    shared: Arc<Shared>,
    stats: SessionStats,
    first_frame_ts: Option<f64>,
    last_frame_ts: Option<f64>,
    last_breathing: Option<f64>,
    consecutive_misses: u32,
    zone: SessionZone,
}

impl MonitorSession {
    /// Validate the configuration, start the intervention worker and create
    /// empty stores
    pub fn start(config: EngineConfig, collaborators: Collaborators) -> Result<Self, EngineError> {
        config.validate()?;

        let worker = InterventionWorker::spawn(
            Arc::clone(&collaborators.extractor),
            Arc::clone(&collaborators.generator),
            WorkerTimeouts {
                extractor: Duration::from_secs_f64(config.regulation.extractor_timeout_seconds),
                generator: Duration::from_secs_f64(config.regulation.generator_timeout_seconds),
            },
        )?;

        let shared = Arc::new(Shared {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            history: HistoryStore::new(config.retention.history_capacity),
            events: EventLog::new(config.retention.event_log_capacity),
            live: RwLock::new(LiveState::default()),
        });
        info!(session_id = %shared.session_id, "monitoring session started");

        Ok(Self {
            blink: BlinkDetector::new(config.blink.clone()),
            posture: PostureClassifier::new(config.posture.clone()),
            scorer: LoadScorer::new(config.scoring.clone()),
            zones: ZoneClassifier::new(config.zones.clone()),
            regulation: RegulationController::new(&config, Arc::clone(&collaborators.automation)),
            worker,
            clock: SessionClock::start(),
            shared,
            stats: SessionStats::default(),
            first_frame_ts: None,
            last_frame_ts: None,
            last_breathing: None,
            consecutive_misses: 0,
            zone: SessionZone::Unknown,
            config,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.shared.session_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Process one frame
    pub fn tick(&mut self, sample: &FrameSample) -> TickOutcome {
        let timestamp = sample.timestamp;

        let in_order =
            timestamp.is_finite() && self.last_frame_ts.map_or(true, |last| timestamp > last);
        if !in_order {
            warn!(timestamp, last = ?self.last_frame_ts, "skipping frame with non-monotonic timestamp");
            let events = self.collect_interventions();
            return self.skip(timestamp, SkipReason::NonMonotonic, events);
        }
        self.last_frame_ts = Some(timestamp);
        if self.first_frame_ts.is_none() {
            self.first_frame_ts = Some(timestamp);
            self.blink.start(timestamp);
        }

        // Results are stamped with the frame that collects them
        let mut events = self.collect_interventions();

        if let Some(rate) = sample.breathing_rate {
            self.last_breathing = Some(rate);
        }

        let Some(face) = sample.face else {
            self.consecutive_misses = self.consecutive_misses.saturating_add(1);
            if self.consecutive_misses >= self.config.retention.max_face_misses
                && self.zone != SessionZone::Unknown
            {
                info!(misses = self.consecutive_misses, "face lost, zone unknown");
                self.zone = SessionZone::Unknown;
            }
            return self.skip(timestamp, SkipReason::NoFace, events);
        };
        self.consecutive_misses = 0;

        let blink = self.blink.ingest(face.ear_value, timestamp);
        let head_forward = self.posture.update(face.nose_depth);

        let Some(breathing_rate) = self.last_breathing else {
            debug!(timestamp, "no breathing value yet");
            return self.skip(timestamp, SkipReason::NoBreathing, events);
        };

        let blink_rate = self.blink.rolling_rate(timestamp);
        let components = self.scorer.score(blink_rate, head_forward, breathing_rate);
        let update = FusedUpdate {
            timestamp,
            recorded_at: Utc::now(),
            blink_rate,
            breathing_rate,
            head_forward,
            components,
            zone: self.zones.classify(components.total),
            blink_detected: blink.is_some(),
        };

        self.shared.history.append(HistoryEntry::from(&update));
        self.stats.record_update(&update);
        self.zone = update.zone.into();

        let report = self.regulation.on_update(&update);
        let mut intervention_started = false;
        if let Some(request) = report.intervention {
            match self.worker.dispatch(request) {
                Ok(()) => {
                    intervention_started = true;
                    self.stats.interventions_started += 1;
                }
                Err(err) => {
                    self.stats.interventions_dropped += 1;
                    let cause = match err {
                        DispatchError::Backpressure => "intervention dropped: worker busy",
                        DispatchError::Closed => "intervention dropped: worker stopped",
                    };
                    events.push(self.record(LogEvent::Warning {
                        timestamp,
                        cause: cause.to_string(),
                    }));
                }
            }
        }
        if report.posture_fix {
            self.stats.posture_fixes += 1;
        }
        for event in report.events {
            events.push(self.record(event));
        }

        self.publish(Some(&update));

        TickOutcome {
            timestamp,
            zone: self.zone,
            status: TickStatus::Fused {
                update,
                posture_fix: report.posture_fix,
                intervention_started,
            },
            events,
        }
    }

    /// Process a frame stamped with the session clock, reading breathing from `breathing`
    pub fn tick_now(
        &mut self,
        face: Option<FaceMetrics>,
        breathing: &dyn BreathingSource,
    ) -> TickOutcome {
        let sample = FrameSample {
            timestamp: self.clock.now(),
            face,
            breathing_rate: breathing.latest(),
        };
        self.tick(&sample)
    }

    /// Pick up finished interventions without a frame, e.g. while the camera is paused
    pub fn poll_interventions(&mut self) -> Vec<LogEntry> {
        let events = self.collect_interventions();
        if !events.is_empty() {
            self.publish(None);
        }
        events
    }

    /// Block up to `timeout` for the next finished intervention and record it.
    ///
    /// Meant for replays and tests that need deterministic intervention results.
    pub fn await_intervention(&mut self, timeout: Duration) -> Vec<LogEntry> {
        match self.worker.wait_outcome(timeout) {
            Some(outcome) => {
                let events = self.apply_outcome(&outcome);
                self.publish(None);
                events
            }
            None => Vec::new(),
        }
    }

    pub fn worker_metrics(&self) -> WorkerMetricsSnapshot {
        self.worker.metrics()
    }

    /// End the session, discarding in-flight interventions
    pub fn stop(self) -> SessionSummary {
        self.worker.cancel();
        let duration_seconds = match (self.first_frame_ts, self.last_frame_ts) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        };
        let summary = SessionSummary {
            session_id: self.shared.session_id,
            started_at: self.shared.started_at,
            stopped_at: Utc::now(),
            duration_seconds,
            final_zone: self.zone,
            stats: self.stats.clone(),
            worker: self.worker.metrics(),
            history_len: self.shared.history.len(),
            history_appended: self.shared.history.total_appended(),
            event_log_len: self.shared.events.len(),
            events_appended: self.shared.events.total_appended(),
        };
        info!(
            session_id = %summary.session_id,
            frames = summary.stats.frames_processed,
            alerts = summary.stats.alerts,
            "monitoring session stopped"
        );
        summary
    }

    fn skip(&mut self, timestamp: f64, reason: SkipReason, events: Vec<LogEntry>) -> TickOutcome {
        self.stats.record_skip(reason);
        self.publish(None);
        TickOutcome {
            timestamp,
            zone: self.zone,
            status: TickStatus::Skipped {
                reason,
                consecutive_misses: self.consecutive_misses,
            },
            events,
        }
    }

    fn collect_interventions(&mut self) -> Vec<LogEntry> {
        let outcomes = self.worker.try_outcomes();
        let mut events = Vec::new();
        for outcome in &outcomes {
            events.extend(self.apply_outcome(outcome));
        }
        events
    }

    /// Record a finished intervention at the latest accepted frame time, so the
    /// event log stays in timestamp order
    fn apply_outcome(&mut self, outcome: &InterventionOutcome) -> Vec<LogEntry> {
        if outcome.result.is_ok() {
            self.stats.interventions_succeeded += 1;
        } else {
            self.stats.interventions_failed += 1;
        }
        let now = self.last_frame_ts.unwrap_or(outcome.request.timestamp);
        self.regulation
            .on_outcome(outcome, now)
            .into_iter()
            .map(|event| self.record(event))
            .collect()
    }

    fn record(&mut self, event: LogEvent) -> LogEntry {
        match &event {
            LogEvent::Alert(_) => self.stats.alerts += 1,
            LogEvent::Toast(_) => self.stats.toasts += 1,
            LogEvent::Recommendation(_) | LogEvent::Warning { .. } => {}
        }
        self.shared.events.append(event)
    }

    /// Copy the tick-owned state into the shared view
    fn publish(&self, update: Option<&FusedUpdate>) {
        let mut live = self.shared.live.write();
        live.zone = self.zone;
        if let Some(update) = update {
            live.latest = Some(update.clone());
        }
        live.regulation = self.regulation.state().clone();
        live.stats = self.stats.clone();
    }
}

impl std::fmt::Debug for MonitorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorSession")
            .field("session_id", &self.shared.session_id)
            .field("zone", &self.zone)
            .field("consecutive_misses", &self.consecutive_misses)
            .finish_non_exhaustive()
    }
}
