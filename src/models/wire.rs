//! Wire-format pass records and their conversion to the typed model.
//!
//! The backend sends snake_case JSON with string-encoded `time` and `score`.
//! Push events reuse the same shape, tagged with a `destroyed?` flag and
//! optionally carrying an updated squadron summary.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::pass::{Grade, Pass};

/// A pass as it appears on the wire, in both directions.
///
/// `id` is absent when sending a new pass for creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub pilot: Option<String>,
    /// RFC 3339 instant with UTC offset
    pub time: String,
    pub ship_name: Option<String>,
    pub aircraft_type: Option<String>,
    pub grade: Option<Grade>,
    /// One-decimal score, e.g. `"4.0"`
    pub score: Option<String>,
    pub trap: Option<bool>,
    pub wire: Option<i32>,
    pub notes: Option<String>,
}

/// Squadron summary piggybacked on push events.
#[derive(Debug, Clone, Deserialize)]
pub struct SquadronWire {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub boarding_rate: Option<f64>,
    #[serde(default)]
    pub unknown_pass_count: Option<i64>,
}

/// A push-event payload: a wire pass plus the destruction tag.
#[derive(Debug, Clone, Deserialize)]
pub struct PassEventWire {
    #[serde(flatten)]
    pub pass: PassWire,
    #[serde(rename = "destroyed?", default)]
    pub destroyed: bool,
    #[serde(default)]
    pub squadron: Option<SquadronWire>,
}

/// Parse a wire-format pass into the typed model.
///
/// # Errors
/// Returns `Error::Decode` when `id` is missing, `time` is not a valid
/// RFC 3339 instant, or `score` is not numeric.
pub fn decode(wire: &PassWire) -> Result<Pass> {
    let id = wire
        .id
        .ok_or_else(|| Error::Decode("pass record is missing an id".to_string()))?;

    let time = DateTime::parse_from_rfc3339(&wire.time)
        .map_err(|e| Error::Decode(format!("invalid pass time '{}': {}", wire.time, e)))?;

    let score = match &wire.score {
        Some(raw) => Some(
            raw.parse::<f64>()
                .map_err(|_| Error::Decode(format!("invalid pass score '{}'", raw)))?,
        ),
        None => None,
    };

    Ok(Pass {
        id,
        pilot: wire.pilot.clone(),
        time,
        ship_name: wire.ship_name.clone(),
        aircraft_type: wire.aircraft_type.clone(),
        grade: wire.grade,
        score,
        trap: wire.trap,
        wire: wire.wire,
        notes: wire.notes.clone(),
    })
}

/// Serialize a typed pass back to the wire shape, id included.
pub fn encode(pass: &Pass) -> PassWire {
    PassWire {
        id: Some(pass.id),
        ..encode_fields(pass)
    }
}

/// Serialize a pass for creation: same shape, no id (the server assigns one).
pub fn encode_new(pass: &Pass) -> PassWire {
    encode_fields(pass)
}

fn encode_fields(pass: &Pass) -> PassWire {
    PassWire {
        id: None,
        pilot: pass.pilot.clone(),
        time: pass.time.to_rfc3339(),
        ship_name: pass.ship_name.clone(),
        aircraft_type: pass.aircraft_type.clone(),
        grade: pass.grade,
        score: pass.score.map(|s| format!("{:.1}", s)),
        trap: pass.trap,
        wire: pass.wire,
        notes: pass.notes.clone(),
    }
}
