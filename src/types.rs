//! Core types for the Synheart CogLoad pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! engine: per-frame samples, blink events, load components, zones, fused
//! updates, alerts and the records kept for the presentation layer.
//!
//! All `timestamp` fields are monotonic seconds since the session started.
//! Wall-clock stamps (`recorded_at`) are informational only and never used for
//! gating.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Eye and head measurements extracted from one video frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceMetrics {
    /// Eye aspect ratio averaged over both eyes (low = closed)
    pub ear_value: f64,
    /// Nose-tip depth relative to the face plane (negative = towards the camera)
    pub nose_depth: f64,
}

/// One processed frame worth of raw measurements.
///
/// `face` is `None` when the face-metrics provider reported "no face detected";
/// `breathing_rate` is `None` when the breathing provider had no fresh value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSample {
    /// Monotonic seconds since session start
    pub timestamp: f64,
    /// Face metrics, absent when no face was detected
    pub face: Option<FaceMetrics>,
    /// Breathing rate in breaths per minute
    pub breathing_rate: Option<f64>,
}

impl FrameSample {
    pub fn new(timestamp: f64, ear_value: f64, nose_depth: f64, breathing_rate: f64) -> Self {
        Self {
            timestamp,
            face: Some(FaceMetrics {
                ear_value,
                nose_depth,
            }),
            breathing_rate: Some(breathing_rate),
        }
    }

    /// A frame in which the face provider found no face
    pub fn no_face(timestamp: f64, breathing_rate: Option<f64>) -> Self {
        Self {
            timestamp,
            face: None,
            breathing_rate,
        }
    }
}

/// Eyelid state tracked by the blink detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyelidPhase {
    #[default]
    Open,
    Closed,
}

/// A completed blink (Closed → Open transition)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlinkEvent {
    /// Timestamp of the re-opening transition
    pub timestamp: f64,
}

/// Bounded component scores and their clamped total
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadComponents {
    /// Blink contribution (0-50 with default weights)
    pub blink_score: f64,
    /// Posture contribution (0 or 20 with default weights)
    pub posture_score: f64,
    /// Breathing contribution (0-30 with default weights)
    pub breathing_score: f64,
    /// Sum of the components clamped to 0-100
    pub total: f64,
}

/// Operating band derived from the total load score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    DeepFlow,
    Normal,
    BrainFried,
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::DeepFlow => "deep_flow",
            Zone::Normal => "normal",
            Zone::BrainFried => "brain_fried",
        }
    }

    /// Human readable label used by dashboards
    pub fn label(&self) -> &'static str {
        match self {
            Zone::DeepFlow => "Deep Flow",
            Zone::Normal => "Normal",
            Zone::BrainFried => "Brain Fried",
        }
    }
}

/// Zone as seen by the session, which can lose track of the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionZone {
    DeepFlow,
    Normal,
    BrainFried,
    /// No fused update for too many consecutive frames, or none yet
    #[default]
    Unknown,
}

impl From<Zone> for SessionZone {
    fn from(zone: Zone) -> Self {
        match zone {
            Zone::DeepFlow => SessionZone::DeepFlow,
            Zone::Normal => SessionZone::Normal,
            Zone::BrainFried => SessionZone::BrainFried,
        }
    }
}

/// Result of fusing one frame: rates, components and zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedUpdate {
    pub timestamp: f64,
    pub recorded_at: DateTime<Utc>,
    /// Rolling blinks per minute
    pub blink_rate: f64,
    /// Breathing rate used for scoring (latest available value)
    pub breathing_rate: f64,
    pub head_forward: bool,
    pub components: LoadComponents,
    pub zone: Zone,
    /// Whether this frame completed a blink
    pub blink_detected: bool,
}

impl FusedUpdate {
    pub fn total(&self) -> f64 {
        self.components.total
    }
}

/// Severity of the user-visible alert banner
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    #[default]
    None,
    Warning,
    Critical,
}

/// Individual condition contributing to an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertTrigger {
    LoadCritical,
    LoadWarning,
    BlinkHigh,
    BreathingAbnormal,
    PostureForward,
}

/// Where an alert came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSource {
    /// Alert category changed between frames
    CategoryChange,
    /// An intervention sequence finished (with or without a plan)
    Intervention,
}

/// User-visible alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub timestamp: f64,
    pub category: AlertCategory,
    pub source: AlertSource,
    pub triggers: Vec<AlertTrigger>,
    pub total_score: f64,
    pub message: String,
}

/// Low-rate notification, separate from the alert banner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub timestamp: f64,
    pub category: AlertCategory,
    pub messages: Vec<String>,
}

/// Rescue plan produced by a successful intervention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Frame time at which the plan was collected
    pub timestamp: f64,
    /// Timestamp of the update that started the intervention
    pub triggered_at: f64,
    /// Load score of that update
    pub trigger_score: f64,
    pub text: String,
}

/// One row of the rolling history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: f64,
    pub recorded_at: DateTime<Utc>,
    pub blink_rate: f64,
    pub breathing_rate: f64,
    pub head_forward: bool,
    pub total_score: f64,
    pub zone: Zone,
}

impl From<&FusedUpdate> for HistoryEntry {
    fn from(update: &FusedUpdate) -> Self {
        Self {
            timestamp: update.timestamp,
            recorded_at: update.recorded_at,
            blink_rate: update.blink_rate,
            breathing_rate: update.breathing_rate,
            head_forward: update.head_forward,
            total_score: update.components.total,
            zone: update.zone,
        }
    }
}
