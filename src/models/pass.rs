//! Typed pass records and derived view types.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Qualitative LSO grade for a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Cut,
    NoGrade,
    Bolter,
    Fair,
    Ok,
    Perfect,
    TechniqueWaveoff,
    FoulDeckWaveoff,
    PatternWaveoff,
    OwnWaveoff,
}

/// One carrier-landing attempt.
///
/// `time` is the attempt's real-world instant with its original UTC offset
/// preserved; it is not necessarily monotonic with insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Pass {
    /// Server-assigned identifier, immutable once created
    pub id: i64,
    /// Pilot display name; `None` marks an unattributed pass
    pub pilot: Option<String>,
    /// When the attempt happened
    pub time: DateTime<FixedOffset>,
    pub ship_name: Option<String>,
    pub aircraft_type: Option<String>,
    pub grade: Option<Grade>,
    /// Numeric score derived from the grade, 0.0 to 5.0 in tenths
    pub score: Option<f64>,
    /// `Some(true)` counts toward boarding rate, `Some(false)` against it,
    /// `None` does not count at all (e.g. practice passes)
    pub trap: Option<bool>,
    /// Arresting wire number caught, if any
    pub wire: Option<i32>,
    pub notes: Option<String>,
}

/// One pilot's passes within the active window.
#[derive(Debug, Clone, PartialEq)]
pub struct PilotBucket {
    /// Pilot name, or `None` for the unattributed bucket
    pub pilot: Option<String>,
    /// This pilot's passes, most recent first
    pub passes: Vec<Pass>,
}

/// Fully derived projection of the held pass collection. Never persisted;
/// recomputed from the current collection whenever it changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedView {
    /// Buckets ordered by pilot name, unattributed bucket always last
    pub passes_by_pilot: Vec<PilotBucket>,
    /// Traps over counted attempts within the window; `None` when no pass
    /// counts toward the rate
    pub boarding_rate: Option<f64>,
    /// Largest bucket size, for presentation sizing
    pub max_passes_for_pilot: usize,
}
