//! Shared primitive IDs and series-related enums.

use serde::{Deserialize, Serialize};

/// Monotonic race-result identifier.
pub type ResultId = u64;
/// Monotonic operation sequence number.
pub type OpSeq = u64;
/// Race identifier, unique within a championship.
pub type RaceId = u64;

/// Lifecycle state of one scored race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RaceStatus {
    /// Not yet started.
    Scheduled,
    /// Currently on the water.
    Racing,
    /// Results are final; the race counts toward standings.
    Finished,
    /// Called off; never scores.
    Abandoned,
}

/// Outcome classification of one result line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultStatus {
    /// Crossed the finish line and holds a finishing position.
    Finished,
    /// Did not finish.
    Dnf,
    /// Disqualified.
    Dsq,
    /// Did not start.
    Dns,
    /// On course side at the start signal.
    Ocs,
    /// Retired.
    Ret,
}

impl ResultStatus {
    /// Severity rank used to order non-finishers on a race leaderboard.
    ///
    /// Finishers sort first; among the rest a lighter infraction sorts ahead
    /// of a heavier one (DNF < RET < OCS < DNS < DSQ).
    pub fn severity(self) -> u8 {
        match self {
            Self::Finished => 0,
            Self::Dnf => 1,
            Self::Ret => 2,
            Self::Ocs => 3,
            Self::Dns => 4,
            Self::Dsq => 5,
        }
    }

    /// True for the [`ResultStatus::Finished`] variant.
    pub fn is_finisher(self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// Scoring system governing how points convert into ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoringSystem {
    /// Low-point scoring: fewer points is a better series result.
    LowPoint,
    /// Any system this engine does not implement. Always rejected.
    Other,
}
