//! Race-result domain record, draft, flags, and patch types.

use serde::{Deserialize, Serialize};

use crate::types::{RaceId, ResultId, ResultStatus};

/// Record flags that affect scoring and visibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResultFlags {
    /// True when the result is struck from scoring entirely.
    pub is_void: bool,
    /// True while a protest against this result is before the jury.
    pub protest_pending: bool,
}

/// Fully materialized, authoritative race result.
///
/// Exactly one live (non-void) record exists per (race, sail number) pair;
/// the store enforces this on insert and patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Stable result identifier.
    pub id: ResultId,
    /// Race this result belongs to.
    pub race_id: RaceId,
    /// Sail number of the competitor, the join key to the registry.
    pub sail_number: String,
    /// Finishing position within the race, 1-based. `None` for non-finishers.
    pub position: Option<u32>,
    /// Points scored, penalty values included. Lower is better under
    /// low-point scoring. Supplied by the race committee, never invented here.
    pub points: f64,
    /// Outcome classification.
    pub status: ResultStatus,
    /// Record flags.
    pub flags: ResultFlags,
}

/// Insert payload used to create a new [`ResultRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResultDraft {
    /// Race this result belongs to.
    pub race_id: RaceId,
    /// Sail number of the competitor.
    pub sail_number: String,
    /// Finishing position within the race, 1-based. `None` for non-finishers.
    pub position: Option<u32>,
    /// Points scored, penalty values included.
    pub points: f64,
    /// Outcome classification.
    pub status: ResultStatus,
    /// Record flags.
    pub flags: ResultFlags,
}

/// Sparse correction where each `Some` field overwrites the record value.
///
/// `position` is doubly optional: `Some(None)` clears the finishing position
/// (e.g. a finisher re-scored DNF), `None` leaves it untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultPatch {
    /// Optional replacement for the race id.
    pub race_id: Option<RaceId>,
    /// Optional replacement for the sail number.
    pub sail_number: Option<String>,
    /// Optional replacement for the finishing position.
    pub position: Option<Option<u32>>,
    /// Optional replacement for the points value.
    pub points: Option<f64>,
    /// Optional replacement for the outcome status.
    pub status: Option<ResultStatus>,
    /// Optional replacement for the void flag.
    pub is_void: Option<bool>,
    /// Optional replacement for the protest flag.
    pub protest_pending: Option<bool>,
}

impl ResultPatch {
    /// Returns true when no fields are set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Captures an inverse patch for all fields present in `self`.
    pub fn capture_inverse_for(&self, rec: &ResultRecord) -> Self {
        Self {
            race_id: self.race_id.map(|_| rec.race_id),
            sail_number: self.sail_number.as_ref().map(|_| rec.sail_number.clone()),
            position: self.position.map(|_| rec.position),
            points: self.points.map(|_| rec.points),
            status: self.status.map(|_| rec.status),
            is_void: self.is_void.map(|_| rec.flags.is_void),
            protest_pending: self.protest_pending.map(|_| rec.flags.protest_pending),
        }
    }

    /// Applies this patch in place to `rec`.
    pub fn apply_to(&self, rec: &mut ResultRecord) {
        if let Some(v) = self.race_id {
            rec.race_id = v;
        }
        if let Some(v) = &self.sail_number {
            rec.sail_number = v.clone();
        }
        if let Some(v) = self.position {
            rec.position = v;
        }
        if let Some(v) = self.points {
            rec.points = v;
        }
        if let Some(v) = self.status {
            rec.status = v;
        }
        if let Some(v) = self.is_void {
            rec.flags.is_void = v;
        }
        if let Some(v) = self.protest_pending {
            rec.flags.protest_pending = v;
        }
    }
}
